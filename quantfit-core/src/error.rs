use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading the quantization multiplier table.
#[derive(Error, Debug)]
pub enum MultiplierError {
    #[error("{} not found", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid multiplier table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("multiplier for '{label}' must be a positive number, got {value}")]
    InvalidMultiplier { label: String, value: String },
}

/// Failures reported by a [`crate::hub::RepoSource`].
#[derive(Error, Debug)]
pub enum HubError {
    /// The repository does not exist or is not visible with the current credentials.
    #[error("repository '{0}' not found or not public")]
    NotFound(String),

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Non-fatal analysis outcomes. Each one ends the current analysis with a
/// message; nothing is retried.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("URL is not a valid Hugging Face model URL: {0}")]
    InvalidUrl(String),

    #[error("the model '{0}' does not exist or it's not public")]
    RepositoryNotFound(String),

    #[error("file '{path}' not found in repository '{repo_id}'")]
    FileNotFoundInRepository { repo_id: String, path: String },

    #[error("no {what} found in {scope}")]
    NoMatchingFiles { what: String, scope: String },

    #[error(transparent)]
    Fetch(HubError),
}

impl From<HubError> for AnalysisError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::NotFound(repo_id) => AnalysisError::RepositoryNotFound(repo_id),
            other => AnalysisError::Fetch(other),
        }
    }
}

/// Failures parsing a `--memory` / `--ram` size such as `24G`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MemorySizeError {
    #[error("empty memory size")]
    Empty,

    #[error("'{0}' is not a non-negative number")]
    Number(String),

    #[error("unknown unit '{0}' (expected M, G or T)")]
    Unit(String),
}
