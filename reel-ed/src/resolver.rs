//! Identifier Resolver
//!
//! Classifies a free-form identifier (bare id or URL containing one) into an
//! entity kind and fetches the entity from the metadata backend.
//!
//! # Recognition
//! Each kind has a fixed-width pattern: two-letter code followed by seven
//! ASCII digits (`nm0000375`, `co0051941`, `ch0001354`), searched anywhere in the
//! input.
//!
//! # Priority
//! When several kinds match, the match starting earliest in the input wins.
//! Equal starts fall back to the longer match, then to `EntityKind::ALL`
//! order (person, company, character).

use crate::backend::MetadataBackend;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::{Entity, EntityKind, EntityReference};
use regex::Regex;
use tracing::{debug, info};

/// Identifier Resolver
pub struct IdentifierResolver {
    patterns: Vec<(EntityKind, Regex)>,
}

impl IdentifierResolver {
    pub fn new() -> DiscoveryResult<Self> {
        let patterns = EntityKind::ALL
            .iter()
            .map(|&kind| {
                Regex::new(&format!(r"{}([0-9]{{7}})", kind.code()))
                    .map(|regex| (kind, regex))
                    .map_err(|e| {
                        DiscoveryError::InvalidConfiguration(format!(
                            "identifier pattern for {}: {}",
                            kind, e
                        ))
                    })
            })
            .collect::<DiscoveryResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Classify `raw_identifier` without touching the backend
    pub fn parse(&self, raw_identifier: &str) -> DiscoveryResult<EntityReference> {
        // (start, length, priority, kind, numeric id)
        let mut best: Option<(usize, usize, usize, EntityKind, String)> = None;

        for (priority, (kind, regex)) in self.patterns.iter().enumerate() {
            let Some(captures) = regex.captures(raw_identifier) else {
                continue;
            };
            let (Some(whole), Some(digits)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let candidate = (whole.start(), whole.len(), priority);
            let better = match &best {
                None => true,
                Some((start, len, prio, _, _)) => {
                    (candidate.0, std::cmp::Reverse(candidate.1), candidate.2)
                        < (*start, std::cmp::Reverse(*len), *prio)
                }
            };

            if better {
                let numeric_id = digits.as_str().to_string();
                best = Some((candidate.0, candidate.1, priority, *kind, numeric_id));
            }
        }

        match best {
            Some((_, _, _, kind, numeric_id)) => {
                debug!(
                    identifier = %raw_identifier,
                    kind = %kind,
                    numeric_id = %numeric_id,
                    "Classified identifier"
                );
                Ok(EntityReference {
                    kind,
                    raw_id: raw_identifier.to_string(),
                    numeric_id,
                })
            }
            None => Err(DiscoveryError::UnresolvedIdentifier(raw_identifier.to_string())),
        }
    }

    /// Classify `raw_identifier` and fetch its entity
    pub fn resolve(
        &self,
        raw_identifier: &str,
        backend: &dyn MetadataBackend,
    ) -> DiscoveryResult<(EntityReference, Entity)> {
        let reference = self.parse(raw_identifier)?;

        let entity = backend
            .lookup_entity(&reference)
            .map_err(|source| DiscoveryError::BackendUnavailable {
                stage: "resolve",
                source,
            })?;

        info!("Starting to retrieve items for {}: {}", reference.kind, entity);

        Ok((reference, entity))
    }
}
