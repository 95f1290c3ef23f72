//! Validated filter criteria
//!
//! Turns a `DiscoveryConfig` into an immutable `DiscoveryRequest`. All value
//! checks happen here, before the pipeline issues any backend call.

use crate::config::{DiscoveryConfig, CONTENT_TYPES, DEFAULT_MAX_ENTRIES, JOB_TYPES};
use crate::error::{DiscoveryError, DiscoveryResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Job type that triggers the actress expansion and the actor-position rule
pub const ACTOR_JOB: &str = "actor";
/// Label actresses are filed under by the metadata source
pub const ACTRESS_JOB: &str = "actress";

/// Genre set-comparison mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// At least one configured genre present
    #[default]
    Any,
    /// Every configured genre present
    All,
    /// Work genres equal the configured set
    Exact,
}

/// Genre set plus comparison mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreRule {
    pub genres: BTreeSet<String>,
    pub match_type: MatchType,
}

impl GenreRule {
    pub fn new<I, S>(genres: I, match_type: MatchType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            genres: genres
                .into_iter()
                .map(|g| g.as_ref().trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect(),
            match_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Whether `work_genres` (lower-cased) satisfies this rule's pattern
    pub fn matches(&self, work_genres: &BTreeSet<String>) -> bool {
        match self.match_type {
            MatchType::Any => !self.genres.is_disjoint(work_genres),
            MatchType::All => self.genres.is_subset(work_genres),
            MatchType::Exact => &self.genres == work_genres,
        }
    }
}

/// Parsed `years` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSpec {
    /// `2004`
    Exact(i32),
    /// `2004-`: 2004 and later
    From(i32),
    /// `-2004`: strictly before 2004
    Before(i32),
    /// `2000-2004`: inclusive range
    Between(i32, i32),
}

impl YearSpec {
    pub fn parse(spec: &str) -> DiscoveryResult<Self> {
        let trimmed = spec.trim();
        let invalid =
            || DiscoveryError::InvalidConfiguration(format!("Malformed year spec '{}'", spec));

        if let Some(rest) = trimmed.strip_prefix('-') {
            return parse_year(rest).map(YearSpec::Before).ok_or_else(invalid);
        }

        match trimmed.split_once('-') {
            None => parse_year(trimmed).map(YearSpec::Exact).ok_or_else(invalid),
            Some((start, end)) if end.trim().is_empty() => {
                parse_year(start).map(YearSpec::From).ok_or_else(invalid)
            }
            Some((start, end)) => {
                let start = parse_year(start).ok_or_else(invalid)?;
                let end = parse_year(end).ok_or_else(invalid)?;
                if start > end {
                    return Err(DiscoveryError::InvalidConfiguration(format!(
                        "Year range '{}' starts after it ends",
                        spec
                    )));
                }
                Ok(YearSpec::Between(start, end))
            }
        }
    }

    pub fn admits(&self, year: i32) -> bool {
        match *self {
            YearSpec::Exact(y) => year == y,
            YearSpec::From(y) => year >= y,
            YearSpec::Before(y) => year < y,
            YearSpec::Between(start, end) => (start..=end).contains(&year),
        }
    }
}

impl fmt::Display for YearSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSpec::Exact(y) => write!(f, "{}", y),
            YearSpec::From(y) => write!(f, "{}-", y),
            YearSpec::Before(y) => write!(f, "-{}", y),
            YearSpec::Between(start, end) => write!(f, "{}-{}", start, end),
        }
    }
}

fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Everything the filter stages need, validated
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Requested content types, first occurrence order
    pub content_types: Vec<String>,
    /// Requested job types, first occurrence order
    pub job_types: Vec<String>,
    pub include_genres: GenreRule,
    pub exclude_genres: GenreRule,
    pub min_rating: Option<f64>,
    pub min_votes: Option<u64>,
    pub year_spec: Option<YearSpec>,
    /// Best allowed billing position
    pub min_actor_position: Option<u32>,
    pub strict_mode: bool,
    pub max_entries: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            content_types: vec![CONTENT_TYPES[0].to_string()],
            job_types: vec![JOB_TYPES[0].to_string()],
            include_genres: GenreRule::default(),
            exclude_genres: GenreRule::default(),
            min_rating: None,
            min_votes: None,
            year_spec: None,
            min_actor_position: None,
            strict_mode: false,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl FilterCriteria {
    pub fn requests_job(&self, job_type: &str) -> bool {
        self.job_types.iter().any(|j| j == job_type)
    }

    /// Whether any rule reads attributes only present on hydrated works
    pub fn needs_work_details(&self) -> bool {
        !self.include_genres.is_empty()
            || !self.exclude_genres.is_empty()
            || self.min_rating.is_some()
            || self.min_votes.is_some()
            || self.year_spec.is_some()
    }
}

/// Validated discovery task
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    pub id: String,
    pub criteria: FilterCriteria,
}

impl DiscoveryRequest {
    /// Validate `config`; no backend is involved
    pub fn from_config(config: DiscoveryConfig) -> DiscoveryResult<Self> {
        let settings = config.into_settings();

        let id = settings.id.trim().to_string();
        if id.is_empty() {
            return Err(DiscoveryError::InvalidConfiguration("id must not be empty".to_string()));
        }

        let job_types = match settings.job_types {
            Some(values) => normalize_labels(values.into_vec(), &JOB_TYPES, "job type")?,
            None => vec![JOB_TYPES[0].to_string()],
        };

        let content_types = match settings.content_types {
            Some(values) => normalize_labels(values.into_vec(), &CONTENT_TYPES, "content type")?,
            None => vec![CONTENT_TYPES[0].to_string()],
        };

        let include_genres = settings
            .include_genres
            .map(|spec| {
                let (genres, match_type) = spec.into_parts();
                GenreRule::new(genres, match_type)
            })
            .unwrap_or_default();

        let exclude_genres = settings
            .exclude_genres
            .map(|spec| {
                let (genres, match_type) = spec.into_parts();
                GenreRule::new(genres, match_type)
            })
            .unwrap_or_default();

        let min_rating = match settings.rating {
            Some(rating) if !rating.is_finite() || !(0.0..=10.0).contains(&rating) => {
                return Err(DiscoveryError::InvalidConfiguration(format!(
                    "rating {} is outside 0-10",
                    rating
                )));
            }
            other => other,
        };

        // Counts and positions are integers, so fractional thresholds
        // round to the equivalent integer bound
        let min_votes = settings
            .votes
            .map(|votes| non_negative(votes, "votes").map(|votes| votes.ceil() as u64))
            .transpose()?;

        let year_spec = settings.years.as_deref().map(YearSpec::parse).transpose()?;

        let min_actor_position = settings
            .actor_position
            .map(|position| {
                if position.is_finite() && position > 0.0 {
                    Ok(position.floor() as u32)
                } else {
                    Err(DiscoveryError::InvalidConfiguration(format!(
                        "actor_position {} must be a number greater than 0",
                        position
                    )))
                }
            })
            .transpose()?;

        let max_entries = match settings.max_entries {
            Some(max) => non_negative(max, "max_entries")?.floor() as usize,
            None => DEFAULT_MAX_ENTRIES,
        };

        Ok(Self {
            id,
            criteria: FilterCriteria {
                content_types,
                job_types,
                include_genres,
                exclude_genres,
                min_rating,
                min_votes,
                year_spec,
                min_actor_position,
                strict_mode: settings.strict_mode.unwrap_or(false),
                max_entries,
            },
        })
    }
}

fn non_negative(value: f64, field: &str) -> DiscoveryResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DiscoveryError::InvalidConfiguration(format!(
            "{} {} must be a non-negative number",
            field, value
        )))
    }
}

/// Lower-case, check against `allowed`, drop repeats keeping first occurrence
fn normalize_labels(
    values: Vec<String>,
    allowed: &[&str],
    what: &str,
) -> DiscoveryResult<Vec<String>> {
    let mut labels: Vec<String> = Vec::with_capacity(values.len());

    for value in values {
        let label = value.trim().to_lowercase();
        if !allowed.contains(&label.as_str()) {
            return Err(DiscoveryError::InvalidConfiguration(format!(
                "Unknown {} '{}' (expected one of: {})",
                what,
                value,
                allowed.join(", ")
            )));
        }
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    if labels.is_empty() {
        return Err(DiscoveryError::InvalidConfiguration(format!(
            "At least one {} is required",
            what
        )));
    }

    Ok(labels)
}
