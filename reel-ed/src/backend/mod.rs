//! Metadata backend seam
//!
//! The discovery core never talks to a metadata source directly. A backend is
//! passed into the pipeline explicitly so hosts can plug in a file catalog,
//! a remote client, or a test double.

pub mod catalog;

pub use catalog::Catalog;

use crate::types::{Entity, EntityReference, Work};
use thiserror::Error;

/// Metadata backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unavailable(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Synchronous metadata source
///
/// Calls are blocking and issued sequentially by the pipeline.
pub trait MetadataBackend {
    /// Fetch the entity record for a classified identifier
    fn lookup_entity(&self, reference: &EntityReference) -> Result<Entity, BackendError>;

    /// Fetch the full record for a partial credit entry
    ///
    /// Credit-specific fields carried by `work` (cast position) survive
    /// hydration.
    fn hydrate_work(&self, work: &Work) -> Result<Work, BackendError>;
}
