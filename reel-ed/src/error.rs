//! Error types for reel-ed
//!
//! Every variant is an expected condition: the pipeline logs it and reports
//! "no results" to the host instead of propagating it.

use crate::backend::BackendError;
use thiserror::Error;

/// Discovery error taxonomy
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No entity pattern matched the identifier
    #[error("Could not resolve entity from identifier '{0}'")]
    UnresolvedIdentifier(String),

    /// Backend lookup or hydration failed
    #[error("Metadata backend unavailable during {stage}: {source}")]
    BackendUnavailable {
        stage: &'static str,
        #[source]
        source: BackendError,
    },

    /// Entity holds none of the requested credit fields
    #[error("No works found for entity {0}")]
    NoWorksFound(String),

    /// Result set exceeds the configured cap
    #[error("Number of entries ({count}) exceeds maximum allowed value {max}")]
    ResultSetTooLarge { count: usize, max: usize },

    /// Configuration rejected before any backend call
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DiscoveryError {
    /// Pipeline stage the error belongs to, for diagnostics
    pub fn stage(&self) -> &'static str {
        match self {
            DiscoveryError::InvalidConfiguration(_) => "configuration",
            DiscoveryError::UnresolvedIdentifier(_) => "resolve",
            DiscoveryError::BackendUnavailable { stage, .. } => *stage,
            DiscoveryError::NoWorksFound(_) => "enumerate",
            DiscoveryError::ResultSetTooLarge { .. } => "assemble",
        }
    }
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
