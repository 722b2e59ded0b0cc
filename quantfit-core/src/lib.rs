//! Memory estimation and quantization selection for Hugging Face model
//! repositories.
//!
//! Everything here is synchronous. The only I/O lives in [`hub`] (one HTTP
//! request per analysis), [`hardware`] (local memory detection) and
//! [`multipliers`] (startup table load).

pub mod analyze;
pub mod classify;
pub mod error;
pub mod estimate;
pub mod group;
pub mod hardware;
pub mod hub;
pub mod multipliers;
pub mod url;

pub use analyze::{AnalysisResult, Analyzer, Report, WEIGHT_EXTENSIONS};
pub use classify::{Classification, Performance};
pub use error::{AnalysisError, HubError, MemorySizeError, MultiplierError};
pub use hardware::SystemMemory;
pub use hub::{HubClient, RemoteFile, RepoSource};
pub use multipliers::QuantMultipliers;
