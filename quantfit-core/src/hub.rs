//! Hugging Face Hub repository listings.
//!
//! [`RepoSource`] is the seam the analyzer talks to; [`HubClient`] is the
//! real implementation backed by the Hub's model API.

use tracing::debug;

use crate::error::HubError;

/// One file (sibling) in a repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path relative to the repository root.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Something that can list the files of a model repository.
pub trait RepoSource {
    /// List every file in `repo_id` with its size.
    /// Returns [`HubError::NotFound`] when the repo is missing or private.
    fn list_files(&self, repo_id: &str) -> Result<Vec<RemoteFile>, HubError>;
}

pub struct HubClient {
    endpoint: String,
    token: Option<String>,
}

impl Default for HubClient {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("HF_ENDPOINT")
                .ok()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "https://huggingface.co".to_string()),
            token: std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

impl HubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// `blobs=true` makes the API include per-file sizes.
    fn model_info_url(&self, repo_id: &str) -> String {
        format!(
            "{}/api/models/{}?blobs=true",
            self.endpoint.trim_end_matches('/'),
            repo_id
        )
    }
}

// -- JSON response types for the model info API --

#[derive(serde::Deserialize)]
struct ModelInfoResponse {
    #[serde(default)]
    siblings: Vec<Sibling>,
}

#[derive(serde::Deserialize)]
struct Sibling {
    rfilename: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    lfs: Option<LfsInfo>,
}

#[derive(serde::Deserialize)]
struct LfsInfo {
    size: u64,
}

impl From<Sibling> for RemoteFile {
    fn from(s: Sibling) -> Self {
        let size = s.size.or(s.lfs.map(|l| l.size)).unwrap_or(0);
        RemoteFile {
            name: s.rfilename,
            size,
        }
    }
}

impl RepoSource for HubClient {
    fn list_files(&self, repo_id: &str) -> Result<Vec<RemoteFile>, HubError> {
        let url = self.model_info_url(repo_id);
        debug!(%url, "fetching repository listing");

        let mut request = ureq::get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let resp = match request.call() {
            Ok(resp) => resp,
            // The Hub answers 401 for both private and nonexistent repos.
            Err(ureq::Error::StatusCode(401 | 403 | 404)) => {
                return Err(HubError::NotFound(repo_id.to_string()));
            }
            Err(e) => {
                return Err(HubError::Request {
                    url,
                    message: e.to_string(),
                });
            }
        };

        let info: ModelInfoResponse = match resp.into_body().read_json() {
            Ok(info) => info,
            Err(e) => {
                return Err(HubError::Request {
                    url,
                    message: e.to_string(),
                });
            }
        };

        let files: Vec<RemoteFile> = info.siblings.into_iter().map(RemoteFile::from).collect();
        debug!(repo_id, files = files.len(), "repository listing received");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_url() {
        let client = HubClient::new()
            .with_endpoint("https://hub.example/")
            .with_token(None);
        assert_eq!(
            client.model_info_url("org/Model-GGUF"),
            "https://hub.example/api/models/org/Model-GGUF?blobs=true"
        );
    }

    #[test]
    fn test_sibling_size_falls_back_to_lfs() {
        let json = r#"{
            "id": "org/model",
            "siblings": [
                {"rfilename": "config.json", "size": 512},
                {"rfilename": "model.safetensors", "lfs": {"size": 4096, "sha256": "ab"}},
                {"rfilename": "README.md"}
            ]
        }"#;
        let info: ModelInfoResponse = serde_json::from_str(json).unwrap();
        let files: Vec<RemoteFile> = info.siblings.into_iter().map(RemoteFile::from).collect();

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].size, 512);
        assert_eq!(files[1].size, 4096);
        assert_eq!(files[2].size, 0);
    }

    #[test]
    fn test_missing_siblings_is_empty_listing() {
        let info: ModelInfoResponse = serde_json::from_str(r#"{"id": "org/model"}"#).unwrap();
        assert!(info.siblings.is_empty());
    }
}
