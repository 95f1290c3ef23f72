//! Discovery Pipeline
//!
//! Wires the stages of one discovery run:
//! - **Criteria**: validate configuration (no backend call on failure)
//! - **Resolve**: identifier → entity
//! - **Enumerate**: entity → candidate works
//! - **Filter**: candidate works → surviving works
//! - **Assemble**: surviving works → result records
//!
//! # Error Handling
//! Every `DiscoveryError` is an expected condition. `run` logs it with the
//! identifier and stage and returns no records; `try_run` hands it back for
//! hosts and tests that need the cause.
//!
//! # Example
//! ```rust,ignore
//! let catalog = Catalog::load(Path::new("catalog.json"))?;
//! let records = DiscoveryPipeline::new(&catalog)
//!     .with_test_mode(true)
//!     .run(DiscoveryConfig::Id("nm0000375".to_string()));
//! ```

use crate::assembler::ResultAssembler;
use crate::backend::MetadataBackend;
use crate::config::DiscoveryConfig;
use crate::criteria::DiscoveryRequest;
use crate::enumerator::WorkEnumerator;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::filter::FilterEngine;
use crate::resolver::IdentifierResolver;
use crate::types::{EntityKind, EntityReference, ResultRecord};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Counts collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryStatistics {
    /// Works produced by enumeration
    pub candidates: usize,
    /// Backend hydration calls issued
    pub hydrated: usize,
    /// Credits skipped because the work was already inspected
    pub repeated_credits: usize,
    /// Works rejected by the filter engine
    pub filtered_out: usize,
    /// Records dropped for missing title or id
    pub invalid_dropped: usize,
    /// Records dropped for a repeated canonical id
    pub duplicates_dropped: usize,
    /// Records returned
    pub emitted: usize,
}

impl DiscoveryStatistics {
    pub fn display_string(&self) -> String {
        format!(
            "{} candidates ({} hydrated), {} filtered out, \
             {} duplicates and {} invalid dropped, {} emitted",
            self.candidates,
            self.hydrated,
            self.filtered_out,
            self.duplicates_dropped,
            self.invalid_dropped,
            self.emitted
        )
    }
}

/// Successful run
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOutcome {
    pub reference: EntityReference,
    pub records: Vec<ResultRecord>,
    pub statistics: DiscoveryStatistics,
}

/// Discovery pipeline over an injected backend
pub struct DiscoveryPipeline<'a> {
    backend: &'a dyn MetadataBackend,
    test_mode: bool,
}

impl<'a> DiscoveryPipeline<'a> {
    pub fn new(backend: &'a dyn MetadataBackend) -> Self {
        Self {
            backend,
            test_mode: false,
        }
    }

    /// Host's inspection/dry-run flag: dump each emitted record
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Run discovery; expected failures are logged and yield no records
    pub fn run(&self, config: DiscoveryConfig) -> Vec<ResultRecord> {
        let identifier = config.id().to_string();

        match self.try_run(config) {
            Ok(outcome) => outcome.records,
            Err(e) => {
                report_failure(&identifier, &e);
                Vec::new()
            }
        }
    }

    /// Run discovery and return the failure instead of logging it
    pub fn try_run(&self, config: DiscoveryConfig) -> DiscoveryResult<DiscoveryOutcome> {
        let request = DiscoveryRequest::from_config(config)?;
        let criteria = &request.criteria;

        let resolver = IdentifierResolver::new()?;
        let (reference, entity) = resolver.resolve(&request.id, self.backend)?;

        let enumerator = WorkEnumerator::new(self.backend);
        let mut enumeration = enumerator.enumerate(
            reference.kind,
            &entity,
            &criteria.content_types,
            &criteria.job_types,
        )?;

        let mut statistics = DiscoveryStatistics {
            hydrated: enumeration.hydrated,
            repeated_credits: enumeration.repeated_credits,
            ..Default::default()
        };

        // Company and character credits are extracted verbatim; fetch
        // details only when a rule reads them
        if reference.kind != EntityKind::Person && criteria.needs_work_details() {
            let hydration = enumerator.hydrate_all(enumeration.works)?;
            statistics.hydrated += hydration.hydrated;
            statistics.repeated_credits += hydration.repeated_credits;
            enumeration.works = hydration.works;
        }

        statistics.candidates = enumeration.works.len();
        info!("Retrieved {} items.", statistics.candidates);

        let engine = FilterEngine::new(criteria, reference.kind);
        let mut survivors = Vec::with_capacity(enumeration.works.len());
        for work in enumeration.works {
            match engine.check(&work) {
                Ok(()) => survivors.push(work),
                Err(rule) => {
                    statistics.filtered_out += 1;
                    debug!(
                        work_id = %work.id,
                        title = %work.title,
                        rule = %rule,
                        "Work rejected by filter"
                    );
                }
            }
        }

        let assembly = ResultAssembler::new(criteria.max_entries)
            .with_test_mode(self.test_mode)
            .assemble(&survivors)?;

        statistics.invalid_dropped = assembly.invalid_dropped;
        statistics.duplicates_dropped = assembly.duplicates_dropped;
        statistics.emitted = assembly.records.len();

        info!(
            identifier = %reference.raw_id,
            kind = %reference.kind,
            "Discovery complete: {}",
            statistics.display_string()
        );

        Ok(DiscoveryOutcome {
            reference,
            records: assembly.records,
            statistics,
        })
    }
}

fn report_failure(identifier: &str, e: &DiscoveryError) {
    match e {
        DiscoveryError::ResultSetTooLarge { count, max } => warn!(
            identifier = %identifier,
            "Number of entries ({}) exceeds maximum allowed value {}. \
             Edit your filters or raise the maximum value by entering a higher \"max_entries\"",
            count,
            max
        ),
        DiscoveryError::NoWorksFound(_) => error!(
            identifier = %identifier,
            stage = e.stage(),
            "Could not get item list, check your configuration: {}",
            e
        ),
        _ => error!(identifier = %identifier, stage = e.stage(), "Discovery failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Catalog;
    use crate::config::DiscoverySettings;
    use crate::types::{Entity, Work};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_entity(
            "co0000001",
            Entity {
                name: "Sample Studio".to_string(),
                credits: [(
                    "production companies".to_string(),
                    vec![Work::credit("0000001", "Alpha"), Work::credit("0000002", "Beta")],
                )]
                .into_iter()
                .collect(),
                ..Default::default()
            },
        );
        catalog.insert_work(Work {
            kind: Some("movie".to_string()),
            year: Some(1995),
            ..Work::credit("0000001", "Alpha")
        });
        catalog.insert_work(Work {
            kind: Some("movie".to_string()),
            year: Some(2010),
            ..Work::credit("0000002", "Beta")
        });
        catalog
    }

    #[test]
    fn test_statistics_display() {
        let statistics = DiscoveryStatistics {
            candidates: 5,
            hydrated: 4,
            repeated_credits: 1,
            filtered_out: 2,
            invalid_dropped: 0,
            duplicates_dropped: 1,
            emitted: 2,
        };
        assert_eq!(
            statistics.display_string(),
            "5 candidates (4 hydrated), 2 filtered out, \
             1 duplicates and 0 invalid dropped, 2 emitted"
        );
    }

    #[test]
    fn test_company_run_without_detail_rules_skips_hydration() {
        let catalog = catalog();
        let outcome = DiscoveryPipeline::new(&catalog)
            .try_run(DiscoveryConfig::Id("co0000001".to_string()))
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.statistics.hydrated, 0);
        assert_eq!(outcome.reference.kind, EntityKind::Company);
    }

    #[test]
    fn test_company_run_with_year_rule_hydrates() {
        let catalog = catalog();
        let mut settings = DiscoverySettings::new("co0000001");
        settings.years = Some("2000-".to_string());

        let outcome = DiscoveryPipeline::new(&catalog)
            .try_run(settings.into())
            .unwrap();

        assert_eq!(outcome.statistics.hydrated, 2);
        assert_eq!(outcome.statistics.filtered_out, 1);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].canonical_id, "tt0000002");
    }

    #[test]
    fn test_run_swallows_expected_failures() {
        let catalog = catalog();
        let pipeline = DiscoveryPipeline::new(&catalog);

        assert!(pipeline
            .run(DiscoveryConfig::Id("not-an-id".to_string()))
            .is_empty());
        assert!(pipeline
            .run(DiscoveryConfig::Id("nm0000404".to_string()))
            .is_empty());
    }
}
