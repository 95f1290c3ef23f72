//! Work Enumerator
//!
//! Walks an entity's credit lists and produces the raw candidate works.
//!
//! # Per kind
//! - **Company**: `production companies` credits, verbatim
//! - **Character**: `feature`, `tv`, `video-game`, `video` credits, in that
//!   order, regardless of requested job/content types
//! - **Person**: every (job type × content type) pair is looked up under the
//!   combined label `"<job> <content>"`, falling back to the bare `"<job>"`
//!   label. Requesting `actor` also queries `actress`. Each credit is
//!   hydrated once, and kept only if its hydrated kind is a requested
//!   content type. Output is deduplicated by work id.
//!
//! # Billing
//! A work credited under several requested jobs carries one billing
//! position whatever the job order: none if any non-acting job surfaced it,
//! otherwise the best position among its acting credits.

use crate::backend::MetadataBackend;
use crate::criteria::{ACTOR_JOB, ACTRESS_JOB};
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::{Entity, EntityKind, Work, WorkId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Credit label holding a company's works
pub const COMPANY_LABEL: &str = "production companies";
/// Credit labels holding a character's works, in output order
pub const CHARACTER_LABELS: [&str; 4] = ["feature", "tv", "video-game", "video"];

/// Candidate works plus bookkeeping for run statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumeration {
    pub works: Vec<Work>,
    /// Backend hydration calls issued
    pub hydrated: usize,
    /// Credits skipped because their work was already inspected
    pub repeated_credits: usize,
}

/// Work Enumerator
pub struct WorkEnumerator<'a> {
    backend: &'a dyn MetadataBackend,
}

impl<'a> WorkEnumerator<'a> {
    pub fn new(backend: &'a dyn MetadataBackend) -> Self {
        Self { backend }
    }

    pub fn enumerate(
        &self,
        kind: EntityKind,
        entity: &Entity,
        content_types: &[String],
        job_types: &[String],
    ) -> DiscoveryResult<Enumeration> {
        match kind {
            EntityKind::Company => Self::enumerate_company(entity),
            EntityKind::Character => Self::enumerate_character(entity),
            EntityKind::Person => self.enumerate_person(entity, content_types, job_types),
        }
    }

    fn enumerate_company(entity: &Entity) -> DiscoveryResult<Enumeration> {
        let works = entity
            .works_for(COMPANY_LABEL)
            .ok_or_else(|| DiscoveryError::NoWorksFound(entity.id.clone()))?;

        Ok(Enumeration {
            works: works.to_vec(),
            ..Default::default()
        })
    }

    fn enumerate_character(entity: &Entity) -> DiscoveryResult<Enumeration> {
        let mut works = Vec::new();
        let mut any_field = false;

        for label in CHARACTER_LABELS {
            if let Some(credits) = entity.works_for(label) {
                any_field = true;
                works.extend_from_slice(credits);
            }
        }

        if !any_field {
            return Err(DiscoveryError::NoWorksFound(entity.id.clone()));
        }

        Ok(Enumeration {
            works,
            ..Default::default()
        })
    }

    fn enumerate_person(
        &self,
        entity: &Entity,
        content_types: &[String],
        job_types: &[String],
    ) -> DiscoveryResult<Enumeration> {
        let job_types = Self::expand_job_types(job_types);

        let mut enumeration = Enumeration::default();
        let mut inspected: HashSet<WorkId> = HashSet::new();
        let mut kept: HashMap<WorkId, usize> = HashMap::new();
        let mut off_cast: HashSet<WorkId> = HashSet::new();
        let mut any_field = false;

        for job_type in &job_types {
            let acting = job_type == ACTOR_JOB || job_type == ACTRESS_JOB;

            for content_type in content_types {
                let label = format!("{} {}", job_type, content_type);
                debug!(label = %label, "Searching for works that correlate to label");

                let Some(credits) = entity
                    .works_for(&label)
                    .or_else(|| entity.works_for(job_type))
                else {
                    continue;
                };
                any_field = true;

                for credit in credits {
                    if !inspected.insert(credit.id.clone()) {
                        enumeration.repeated_credits += 1;
                        if let Some(&index) = kept.get(&credit.id) {
                            let work = &mut enumeration.works[index];
                            merge_billing(work, credit, acting, &mut off_cast);
                        }
                        debug!(
                            work_id = %credit.id,
                            title = %credit.title,
                            "Work already inspected, skipping"
                        );
                        continue;
                    }

                    let mut work = self
                        .backend
                        .hydrate_work(credit)
                        .map_err(|source| DiscoveryError::BackendUnavailable {
                            stage: "hydrate",
                            source,
                        })?;
                    enumeration.hydrated += 1;

                    let requested = work
                        .kind
                        .as_deref()
                        .is_some_and(|kind| content_types.iter().any(|c| c == kind));

                    if requested {
                        debug!(
                            work_id = %work.id,
                            title = %work.title,
                            "Found item, adding to unfiltered list"
                        );
                        merge_billing(&mut work, credit, acting, &mut off_cast);
                        kept.insert(credit.id.clone(), enumeration.works.len());
                        enumeration.works.push(work);
                    } else {
                        debug!(
                            work_id = %work.id,
                            kind = work.kind.as_deref().unwrap_or("unknown"),
                            "Work kind not requested, skipping"
                        );
                    }
                }
            }
        }

        if !any_field {
            return Err(DiscoveryError::NoWorksFound(entity.id.clone()));
        }

        Ok(enumeration)
    }

    /// Requested job types plus `actress` when `actor` is requested
    fn expand_job_types(job_types: &[String]) -> Vec<String> {
        let mut expanded = job_types.to_vec();
        let wants_actor = expanded.iter().any(|j| j == ACTOR_JOB);
        let has_actress = expanded.iter().any(|j| j == ACTRESS_JOB);

        if wants_actor && !has_actress {
            expanded.push(ACTRESS_JOB.to_string());
        }

        expanded
    }

    /// Hydrate verbatim candidates (company/character), one backend call per
    /// distinct work. Order and repeats are preserved.
    pub fn hydrate_all(&self, works: Vec<Work>) -> DiscoveryResult<Enumeration> {
        let mut cache: HashMap<WorkId, Work> = HashMap::new();
        let mut enumeration = Enumeration::default();

        for credit in works {
            if let Some(work) = cache.get(&credit.id) {
                enumeration.repeated_credits += 1;
                enumeration.works.push(work.clone());
                continue;
            }

            let work = self
                .backend
                .hydrate_work(&credit)
                .map_err(|source| DiscoveryError::BackendUnavailable {
                    stage: "hydrate",
                    source,
                })?;
            enumeration.hydrated += 1;

            cache.insert(credit.id.clone(), work.clone());
            enumeration.works.push(work);
        }

        Ok(enumeration)
    }
}

// Fold one credit's billing into a kept work
fn merge_billing(work: &mut Work, credit: &Work, acting: bool, off_cast: &mut HashSet<WorkId>) {
    if !acting {
        off_cast.insert(credit.id.clone());
        work.cast_position = None;
        return;
    }
    if off_cast.contains(&credit.id) {
        return;
    }

    work.cast_position = match (work.cast_position, credit.cast_position) {
        (Some(current), Some(other)) => Some(current.min(other)),
        (current, other) => current.or(other),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, Catalog};
    use std::cell::Cell;

    /// Catalog wrapper counting hydration calls
    struct CountingBackend {
        inner: Catalog,
        hydrations: Cell<usize>,
    }

    impl MetadataBackend for CountingBackend {
        fn lookup_entity(
            &self,
            reference: &crate::types::EntityReference,
        ) -> Result<Entity, BackendError> {
            self.inner.lookup_entity(reference)
        }

        fn hydrate_work(&self, work: &Work) -> Result<Work, BackendError> {
            self.hydrations.set(self.hydrations.get() + 1);
            self.inner.hydrate_work(work)
        }
    }

    fn full(id: &str, title: &str, kind: &str) -> Work {
        Work {
            kind: Some(kind.to_string()),
            ..Work::credit(id, title)
        }
    }

    fn backend() -> CountingBackend {
        let mut catalog = Catalog::new();
        catalog.insert_work(full("0000001", "Alpha", "movie"));
        catalog.insert_work(full("0000002", "Beta", "movie"));
        catalog.insert_work(full("0000003", "Gamma", "tv series"));
        catalog.insert_work(full("0000004", "Delta", "movie"));
        CountingBackend {
            inner: catalog,
            hydrations: Cell::new(0),
        }
    }

    fn entity(credits: Vec<(&str, Vec<(&str, &str)>)>) -> Entity {
        Entity {
            id: "nm0000001".to_string(),
            name: "Sample".to_string(),
            credits: credits
                .into_iter()
                .map(|(label, works)| {
                    (
                        label.to_string(),
                        works.into_iter().map(|(id, title)| Work::credit(id, title)).collect(),
                    )
                })
                .collect(),
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ids(works: &[Work]) -> Vec<&str> {
        works.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn test_person_dedups_actor_and_actress_credits() {
        let backend = backend();
        let entity = entity(vec![
            ("actor movie", vec![("0000001", "Alpha"), ("0000002", "Beta")]),
            ("actress movie", vec![("0000002", "Beta"), ("0000004", "Delta")]),
        ]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Person, &entity, &labels(&["movie"]), &labels(&["actor"]))
            .unwrap();

        assert_eq!(ids(&result.works), vec!["0000001", "0000002", "0000004"]);
        assert_eq!(result.repeated_credits, 1);
        assert_eq!(result.hydrated, 3);
        assert_eq!(backend.hydrations.get(), 3);
    }

    #[test]
    fn test_person_falls_back_to_bare_job_label() {
        let backend = backend();
        let entity = entity(vec![("director", vec![("0000001", "Alpha"), ("0000003", "Gamma")])]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Person, &entity, &labels(&["movie"]), &labels(&["director"]))
            .unwrap();

        // Gamma is a tv series: surfaced by the bare label but not requested
        assert_eq!(ids(&result.works), vec!["0000001"]);
    }

    #[test]
    fn test_person_combined_label_preferred_over_bare() {
        let backend = backend();
        let entity = entity(vec![
            ("director movie", vec![("0000002", "Beta")]),
            ("director", vec![("0000001", "Alpha")]),
        ]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Person, &entity, &labels(&["movie"]), &labels(&["director"]))
            .unwrap();

        assert_eq!(ids(&result.works), vec!["0000002"]);
    }

    #[test]
    fn test_person_cartesian_order_and_hydrate_once() {
        let backend = backend();
        let entity = entity(vec![
            ("writer", vec![("0000003", "Gamma"), ("0000001", "Alpha")]),
            ("director tv series", vec![("0000003", "Gamma")]),
        ]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(
                EntityKind::Person,
                &entity,
                &labels(&["movie", "tv series"]),
                &labels(&["director", "writer"]),
            )
            .unwrap();

        assert_eq!(ids(&result.works), vec!["0000003", "0000001"]);
        assert_eq!(backend.hydrations.get(), 2);
    }

    #[test]
    fn test_person_without_requested_fields() {
        let backend = backend();
        let entity = entity(vec![("producer movie", vec![("0000001", "Alpha")])]);

        let result = WorkEnumerator::new(&backend).enumerate(
            EntityKind::Person,
            &entity,
            &labels(&["movie"]),
            &labels(&["actor"]),
        );

        assert!(matches!(result, Err(DiscoveryError::NoWorksFound(_))));
        assert_eq!(backend.hydrations.get(), 0);
    }

    #[test]
    fn test_person_hydration_failure_is_backend_unavailable() {
        let backend = backend();
        let entity = entity(vec![("actor movie", vec![("0000099", "Unknown")])]);

        let result = WorkEnumerator::new(&backend).enumerate(
            EntityKind::Person,
            &entity,
            &labels(&["movie"]),
            &labels(&["actor"]),
        );

        assert!(matches!(
            result,
            Err(DiscoveryError::BackendUnavailable { stage: "hydrate", .. })
        ));
    }

    #[test]
    fn test_actress_expansion_happens_once() {
        let expanded = WorkEnumerator::expand_job_types(&labels(&["actor", "director"]));
        assert_eq!(expanded, labels(&["actor", "director", "actress"]));

        let untouched = WorkEnumerator::expand_job_types(&labels(&["director"]));
        assert_eq!(untouched, labels(&["director"]));
    }

    #[test]
    fn test_company_returns_production_credits_verbatim() {
        let backend = backend();
        let entity = entity(vec![
            (COMPANY_LABEL, vec![("0000003", "Gamma"), ("0000001", "Alpha"), ("0000003", "Gamma")]),
            ("distributors", vec![("0000002", "Beta")]),
        ]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Company, &entity, &labels(&["movie"]), &labels(&["actor"]))
            .unwrap();

        assert_eq!(ids(&result.works), vec!["0000003", "0000001", "0000003"]);
        assert_eq!(backend.hydrations.get(), 0);
    }

    #[test]
    fn test_company_without_production_credits() {
        let backend = backend();
        let entity = entity(vec![("distributors", vec![("0000002", "Beta")])]);

        let result =
            WorkEnumerator::new(&backend).enumerate(EntityKind::Company, &entity, &[], &[]);

        assert!(matches!(result, Err(DiscoveryError::NoWorksFound(_))));
    }

    #[test]
    fn test_character_field_order() {
        let backend = backend();
        let entity = entity(vec![
            ("video", vec![("0000004", "Delta")]),
            ("tv", vec![("0000003", "Gamma")]),
            ("feature", vec![("0000001", "Alpha")]),
        ]);

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Character, &entity, &labels(&["movie"]), &labels(&["actor"]))
            .unwrap();

        assert_eq!(ids(&result.works), vec!["0000001", "0000003", "0000004"]);
    }

    #[test]
    fn test_character_without_sections() {
        let backend = backend();
        let result = WorkEnumerator::new(&backend).enumerate(
            EntityKind::Character,
            &entity(vec![]),
            &[],
            &[],
        );

        assert!(matches!(result, Err(DiscoveryError::NoWorksFound(_))));
    }

    #[test]
    fn test_hydrate_all_calls_backend_once_per_work() {
        let backend = backend();
        let works = vec![
            Work::credit("0000003", "Gamma"),
            Work::credit("0000001", "Alpha"),
            Work::credit("0000003", "Gamma"),
        ];

        let result = WorkEnumerator::new(&backend).hydrate_all(works).unwrap();

        assert_eq!(ids(&result.works), vec!["0000003", "0000001", "0000003"]);
        assert_eq!(result.works[0].kind.as_deref(), Some("tv series"));
        assert_eq!(result.hydrated, 2);
        assert_eq!(result.repeated_credits, 1);
        assert_eq!(backend.hydrations.get(), 2);
    }

    fn billed(id: &str, title: &str, position: u32) -> Work {
        Work {
            cast_position: Some(position),
            ..Work::credit(id, title)
        }
    }

    fn directed_and_billed_tenth() -> Entity {
        Entity {
            id: "nm0000001".to_string(),
            name: "Sample".to_string(),
            credits: [
                ("director movie".to_string(), vec![Work::credit("0000001", "Alpha")]),
                ("actor movie".to_string(), vec![billed("0000001", "Alpha", 10)]),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_person_billing_independent_of_job_order() {
        let backend = backend();
        let entity = directed_and_billed_tenth();
        let enumerator = WorkEnumerator::new(&backend);
        let movie = labels(&["movie"]);

        let director_first = enumerator
            .enumerate(EntityKind::Person, &entity, &movie, &labels(&["director", "actor"]))
            .unwrap();
        let actor_first = enumerator
            .enumerate(EntityKind::Person, &entity, &movie, &labels(&["actor", "director"]))
            .unwrap();

        assert_eq!(director_first.works, actor_first.works);
        assert_eq!(ids(&actor_first.works), vec!["0000001"]);
        assert_eq!(actor_first.works[0].cast_position, None);
    }

    #[test]
    fn test_person_keeps_best_acting_position() {
        let backend = backend();
        let entity = Entity {
            id: "nm0000001".to_string(),
            credits: [
                ("actor movie".to_string(), vec![billed("0000001", "Alpha", 7)]),
                ("actress movie".to_string(), vec![billed("0000001", "Alpha", 3)]),
            ]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let result = WorkEnumerator::new(&backend)
            .enumerate(EntityKind::Person, &entity, &labels(&["movie"]), &labels(&["actor"]))
            .unwrap();

        assert_eq!(result.works.len(), 1);
        assert_eq!(result.works[0].cast_position, Some(3));
    }
}
