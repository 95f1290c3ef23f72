//! File-backed metadata catalog
//!
//! JSON document holding entities keyed by prefixed id (`nm0000001`) and
//! full work records keyed by numeric id. Serves the host binary and tests.

use super::{BackendError, MetadataBackend};
use crate::types::{Entity, EntityReference, Work, WorkId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// In-memory catalog of entities and works
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    entities: BTreeMap<String, Entity>,
    #[serde(default)]
    works: BTreeMap<String, Work>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, BackendError> {
        let mut catalog: Catalog =
            serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;
        catalog.fill_keys();
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Unavailable(format!("Read catalog failed ({}): {}", path.display(), e))
        })?;
        let catalog = Self::from_json_str(&content)?;

        debug!(
            path = %path.display(),
            entities = catalog.entities.len(),
            works = catalog.works.len(),
            "Loaded metadata catalog"
        );

        Ok(catalog)
    }

    /// Add an entity under its prefixed id
    pub fn insert_entity(&mut self, prefixed_id: impl Into<String>, mut entity: Entity) {
        let prefixed_id = prefixed_id.into();
        entity.id = prefixed_id.clone();
        self.entities.insert(prefixed_id, entity);
    }

    /// Add a full work record
    pub fn insert_work(&mut self, work: Work) {
        self.works.insert(work.id.as_str().to_string(), work);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    // Map keys are authoritative for ids left out of the document body
    fn fill_keys(&mut self) {
        for (key, entity) in self.entities.iter_mut() {
            if entity.id.is_empty() {
                entity.id = key.clone();
            }
        }
        for (key, work) in self.works.iter_mut() {
            if work.id.as_str().is_empty() {
                work.id = WorkId::new(key.clone());
            }
        }
    }
}

impl MetadataBackend for Catalog {
    fn lookup_entity(&self, reference: &EntityReference) -> Result<Entity, BackendError> {
        let key = reference.prefixed_id();
        self.entities
            .get(&key)
            .cloned()
            .ok_or(BackendError::NotFound(key))
    }

    fn hydrate_work(&self, work: &Work) -> Result<Work, BackendError> {
        let full = self
            .works
            .get(work.id.as_str())
            .ok_or_else(|| BackendError::NotFound(format!("work {}", work.id)))?;

        let mut hydrated = full.clone();
        hydrated.cast_position = work.cast_position.or(full.cast_position);
        if hydrated.title.is_empty() {
            hydrated.title = work.title.clone();
        }

        Ok(hydrated)
    }
}
