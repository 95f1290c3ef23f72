//! Core types for entity discovery
//!
//! Entities, works and output records. All values are scoped to a single
//! discovery run; nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Prefix applied to a work's numeric id to form its canonical id
pub const CANONICAL_WORK_PREFIX: &str = "tt";

/// Kind of entity an identifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Company,
    Character,
}

impl EntityKind {
    /// All kinds, in tie-break priority order
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Person,
        EntityKind::Company,
        EntityKind::Character,
    ];

    /// Two-letter identifier code
    pub fn code(self) -> &'static str {
        match self {
            EntityKind::Person => "nm",
            EntityKind::Company => "co",
            EntityKind::Character => "ch",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Person => "person",
            EntityKind::Company => "company",
            EntityKind::Character => "character",
        };
        f.write_str(name)
    }
}

/// Classified identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    pub kind: EntityKind,
    /// Identifier exactly as configured (may be a URL)
    pub raw_id: String,
    /// Seven-digit numeric part
    pub numeric_id: String,
}

impl EntityReference {
    /// Prefixed identifier, e.g. `nm0000375`
    pub fn prefixed_id(&self) -> String {
        format!("{}{}", self.kind.code(), self.numeric_id)
    }
}

/// Entity record supplied by the metadata backend
///
/// `credits` maps a role/content label (`"actor movie"`, `"director"`,
/// `"production companies"`, `"feature"`, ...) to the works filed under it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credits: BTreeMap<String, Vec<Work>>,
}

impl Entity {
    /// Works filed under `label`, or `None` when the label is absent
    pub fn works_for(&self, label: &str) -> Option<&[Work]> {
        self.credits.get(label).map(Vec::as_slice)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// Backend's opaque numeric work identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(pub String);

impl WorkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical id used in output records (`tt` + numeric id)
    pub fn canonical(&self) -> String {
        format!("{}{}", CANONICAL_WORK_PREFIX, self.0)
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single media item
///
/// Records inside an entity's credit lists are partial (usually only id,
/// title and cast position). `MetadataBackend::hydrate_work` returns the
/// full record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    #[serde(default)]
    pub id: WorkId,
    #[serde(default)]
    pub title: String,
    /// Content-type label (`movie`, `tv series`, ...)
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Billing position; only meaningful for person/actor credits
    #[serde(default)]
    pub cast_position: Option<u32>,
}

impl Work {
    /// Partial credit record as found in an entity's credit list
    pub fn credit(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: WorkId::new(id),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Normalized output record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub title: String,
    pub canonical_id: String,
    /// Always empty: the core never produces download locations
    pub source_url: String,
}

impl ResultRecord {
    pub fn from_work(work: &Work) -> Self {
        Self {
            title: work.title.clone(),
            canonical_id: work.id.canonical(),
            source_url: String::new(),
        }
    }

    /// Record carries a usable title and id
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.canonical_id.len() > CANONICAL_WORK_PREFIX.len()
    }
}
