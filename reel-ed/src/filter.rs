//! Filter Engine
//!
//! Applies the configured rules to one work at a time. All rules must pass.
//!
//! # Rules
//! 1. **Genre include**: configured set matched per `MatchType`
//! 2. **Genre exclude**: work must not match the exclusion pattern
//! 3. **Rating**: `rating >= min_rating`
//! 4. **Votes**: `votes >= min_votes`
//! 5. **Year**: year admitted by the year spec
//! 6. **Actor position**: `cast_position <= min_actor_position` (person
//!    entities with `actor` requested only). Works also credited under a
//!    non-acting job carry no position and pass.
//!
//! Missing rating, votes or year pass unless `strict_mode` is set.
//! Evaluation is pure: same inputs, same answer.

use crate::criteria::{FilterCriteria, ACTOR_JOB};
use crate::types::{EntityKind, Work};
use std::collections::BTreeSet;
use std::fmt;

/// Rule that rejected a work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRejection {
    IncludeGenres,
    ExcludeGenres,
    Rating,
    Votes,
    Year,
    ActorPosition,
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = match self {
            FilterRejection::IncludeGenres => "include_genres",
            FilterRejection::ExcludeGenres => "exclude_genres",
            FilterRejection::Rating => "rating",
            FilterRejection::Votes => "votes",
            FilterRejection::Year => "years",
            FilterRejection::ActorPosition => "actor_position",
        };
        f.write_str(rule)
    }
}

/// Filter Engine bound to one run's criteria
pub struct FilterEngine<'a> {
    criteria: &'a FilterCriteria,
    entity_kind: EntityKind,
}

impl<'a> FilterEngine<'a> {
    pub fn new(criteria: &'a FilterCriteria, entity_kind: EntityKind) -> Self {
        Self {
            criteria,
            entity_kind,
        }
    }

    pub fn passes(&self, work: &Work) -> bool {
        self.check(work).is_ok()
    }

    /// First rule `work` fails, in rule order
    pub fn check(&self, work: &Work) -> Result<(), FilterRejection> {
        let criteria = self.criteria;

        if !criteria.include_genres.is_empty() || !criteria.exclude_genres.is_empty() {
            let work_genres: BTreeSet<String> =
                work.genres.iter().map(|g| g.trim().to_lowercase()).collect();

            let include = &criteria.include_genres;
            if !include.is_empty() && !include.matches(&work_genres) {
                return Err(FilterRejection::IncludeGenres);
            }
            let exclude = &criteria.exclude_genres;
            if !exclude.is_empty() && exclude.matches(&work_genres) {
                return Err(FilterRejection::ExcludeGenres);
            }
        }

        if let Some(min_rating) = criteria.min_rating {
            if !self.threshold(work.rating, |rating| rating >= min_rating) {
                return Err(FilterRejection::Rating);
            }
        }

        if let Some(min_votes) = criteria.min_votes {
            if !self.threshold(work.votes, |votes| votes >= min_votes) {
                return Err(FilterRejection::Votes);
            }
        }

        if let Some(year_spec) = criteria.year_spec {
            if !self.threshold(work.year, |year| year_spec.admits(year)) {
                return Err(FilterRejection::Year);
            }
        }

        if !self.actor_position_ok(work) {
            return Err(FilterRejection::ActorPosition);
        }

        Ok(())
    }

    // Missing value passes iff strict mode is off
    fn threshold<T>(&self, value: Option<T>, test: impl Fn(T) -> bool) -> bool {
        match value {
            Some(value) => test(value),
            None => !self.criteria.strict_mode,
        }
    }

    fn actor_position_ok(&self, work: &Work) -> bool {
        let Some(best_allowed) = self.criteria.min_actor_position else {
            return true;
        };
        if self.entity_kind != EntityKind::Person || !self.criteria.requests_job(ACTOR_JOB) {
            return true;
        }
        match work.cast_position {
            Some(position) => position <= best_allowed,
            None => true,
        }
    }
}
