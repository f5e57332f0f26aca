use crate::source::FetchError;
use sheetmirror_model::BuildError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheError {
    #[error("resource not registered: {name}")]
    NotRegistered { name: String },
    #[error("failed to fetch resource {name}")]
    FetchFailed {
        name: String,
        #[source]
        source: FetchError,
    },
    #[error("resource {name} is malformed")]
    MalformedResource {
        name: String,
        #[source]
        source: BuildError,
    },
}

impl CacheError {
    /// Name of the resource the error is about.
    pub fn name(&self) -> &str {
        match self {
            CacheError::NotRegistered { name }
            | CacheError::FetchFailed { name, .. }
            | CacheError::MalformedResource { name, .. } => name,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
