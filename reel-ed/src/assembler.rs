//! Result Assembler
//!
//! Converts surviving works into output records, drops invalid records and
//! duplicate canonical ids (first seen wins), and enforces the `max_entries`
//! cap. An oversized result set yields no records at all.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::types::{ResultRecord, Work};
use std::collections::HashSet;
use tracing::{error, info};

/// Records plus counts of what was dropped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub records: Vec<ResultRecord>,
    pub invalid_dropped: usize,
    pub duplicates_dropped: usize,
}

/// Result Assembler
pub struct ResultAssembler {
    max_entries: usize,
    test_mode: bool,
}

impl ResultAssembler {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            test_mode: false,
        }
    }

    /// Dump every emitted record at info level
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    pub fn assemble(&self, works: &[Work]) -> DiscoveryResult<Assembly> {
        let mut assembly = Assembly::default();
        let mut seen: HashSet<String> = HashSet::new();

        for work in works {
            let record = ResultRecord::from_work(work);

            if !record.is_valid() {
                error!(work_id = %work.id, title = %work.title, "Invalid entry created, skipping");
                assembly.invalid_dropped += 1;
                continue;
            }

            if !seen.insert(record.canonical_id.clone()) {
                assembly.duplicates_dropped += 1;
                continue;
            }

            assembly.records.push(record);
        }

        if assembly.records.len() > self.max_entries {
            return Err(DiscoveryError::ResultSetTooLarge {
                count: assembly.records.len(),
                max: self.max_entries,
            });
        }

        if self.test_mode {
            for record in &assembly.records {
                info!("Test mode. Entry includes:");
                info!("    Title: {}", record.title);
                info!("    Canonical ID: {}", record.canonical_id);
            }
        }

        Ok(assembly)
    }
}
