//! reel-ed library interface
//!
//! Entity-driven media discovery: resolve a person, company or character
//! identifier against a metadata backend, enumerate its works, filter them,
//! and assemble a bounded, deduplicated record list.

pub mod assembler;
pub mod backend;
pub mod config;
pub mod criteria;
pub mod enumerator;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use crate::backend::{BackendError, Catalog, MetadataBackend};
pub use crate::config::{DiscoveryConfig, DiscoverySettings, HostConfig};
pub use crate::criteria::{DiscoveryRequest, FilterCriteria, GenreRule, MatchType, YearSpec};
pub use crate::error::{DiscoveryError, DiscoveryResult};
pub use crate::pipeline::{DiscoveryOutcome, DiscoveryPipeline, DiscoveryStatistics};
pub use crate::types::{Entity, EntityKind, EntityReference, ResultRecord, Work, WorkId};
