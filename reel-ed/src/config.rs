//! Configuration for reel-ed
//!
//! Two layers:
//! - **Discovery config**: what one discovery task asks for. Either a bare
//!   identifier or a detailed object. Deserializable from any serde format.
//! - **Host config**: the TOML file read by the `reel-ed` binary (catalog
//!   location, logging, named tasks).
//!
//! Shape errors (unknown fields, wrong types) are reported by serde; value
//! errors (out-of-range numbers, unknown labels, malformed year specs) are
//! reported when the config is turned into `FilterCriteria`.

use reel_common::config::{load_toml, resolve_relative_to};
use reel_common::LoggingConfig;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::criteria::MatchType;

/// Job types accepted in `job_types`
pub const JOB_TYPES: [&str; 12] = [
    "actor",
    "director",
    "producer",
    "writer",
    "self",
    "editor",
    "miscellaneous",
    "editorial department",
    "cinematographer",
    "visual effects",
    "thanks",
    "music department",
];

/// Content types accepted in `content_types`
pub const CONTENT_TYPES: [&str; 7] = [
    "movie",
    "tv series",
    "tv mini series",
    "video game",
    "video movie",
    "tv movie",
    "episode",
];

/// Default flood-protection cap
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// `include_genres` / `exclude_genres` value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GenreSpec {
    /// `"comedy"` or `["comedy", "drama"]`, matched with `any`
    Names(OneOrMany<String>),
    /// `{ genres = [...], match_type = "all" }`
    Detailed(GenreSettings),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenreSettings {
    pub genres: OneOrMany<String>,
    #[serde(default)]
    pub match_type: MatchType,
}

impl GenreSpec {
    /// Genre names and match type
    pub fn into_parts(self) -> (Vec<String>, MatchType) {
        match self {
            GenreSpec::Names(names) => (names.into_vec(), MatchType::default()),
            GenreSpec::Detailed(settings) => (settings.genres.into_vec(), settings.match_type),
        }
    }
}

/// Detailed discovery settings
///
/// Numeric fields accept any number here so out-of-range or fractional
/// values reach validation instead of failing as shape errors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySettings {
    /// Entity identifier or URL containing one
    pub id: String,
    #[serde(default)]
    pub job_types: Option<OneOrMany<String>>,
    #[serde(default)]
    pub content_types: Option<OneOrMany<String>>,
    #[serde(default)]
    pub include_genres: Option<GenreSpec>,
    #[serde(default)]
    pub exclude_genres: Option<GenreSpec>,
    /// Minimum rating, 0-10
    #[serde(default)]
    pub rating: Option<f64>,
    /// Minimum number of votes
    #[serde(default)]
    pub votes: Option<f64>,
    /// Year spec: `2004`, `2004-`, `-2004`, `2000-2004`
    #[serde(default)]
    pub years: Option<String>,
    /// Best allowed billing position (1 = top billed)
    #[serde(default)]
    pub actor_position: Option<f64>,
    #[serde(default)]
    pub max_entries: Option<f64>,
    #[serde(default)]
    pub strict_mode: Option<bool>,
}

impl DiscoverySettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Discovery task configuration: bare identifier or detailed settings
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryConfig {
    Id(String),
    Detailed(DiscoverySettings),
}

impl DiscoveryConfig {
    /// Detailed form with defaults for a bare identifier
    pub fn into_settings(self) -> DiscoverySettings {
        match self {
            DiscoveryConfig::Id(id) => DiscoverySettings::new(id),
            DiscoveryConfig::Detailed(settings) => settings,
        }
    }

    /// Identifier as configured
    pub fn id(&self) -> &str {
        match self {
            DiscoveryConfig::Id(id) => id,
            DiscoveryConfig::Detailed(settings) => &settings.id,
        }
    }
}

impl From<DiscoverySettings> for DiscoveryConfig {
    fn from(settings: DiscoverySettings) -> Self {
        DiscoveryConfig::Detailed(settings)
    }
}

// Hand-written so unknown-field errors from the detailed form surface
// instead of a generic "no variant matched".
impl<'de> Deserialize<'de> for DiscoveryConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = DiscoveryConfig;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an identifier string or a discovery settings table")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(DiscoveryConfig::Id(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(DiscoveryConfig::Id(value))
            }

            fn visit_map<M: MapAccess<'de>>(self, map: M) -> Result<Self::Value, M::Error> {
                DiscoverySettings::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(DiscoveryConfig::Detailed)
            }
        }

        deserializer.deserialize_any(ConfigVisitor)
    }
}

/// One named task in the host file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub discover: DiscoveryConfig,
}

/// Host file for the `reel-ed` binary
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Catalog file; relative paths resolve against the host file
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tasks keyed by name, run in name order
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl HostConfig {
    /// Load the host file and anchor relative paths to its directory
    pub fn load(path: &Path) -> reel_common::Result<Self> {
        let mut config: HostConfig = load_toml(path)?;
        config.catalog = config
            .catalog
            .map(|catalog| resolve_relative_to(path, &catalog));
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        discover: DiscoveryConfig,
    }

    fn parse(toml_text: &str) -> Result<DiscoveryConfig, toml::de::Error> {
        toml::from_str::<Wrapper>(toml_text).map(|w| w.discover)
    }

    #[test]
    fn test_bare_identifier() {
        let config = parse(r#"discover = "nm0000375""#).unwrap();
        assert_eq!(config, DiscoveryConfig::Id("nm0000375".to_string()));
        assert_eq!(config.id(), "nm0000375");
    }

    #[test]
    fn test_detailed_settings() {
        let config = parse(
            r#"
            [discover]
            id = "co0051941"
            job_types = ["actor", "director"]
            content_types = "tv series"
            rating = 5.6
            exclude_genres = "animation"
            years = "2005-"
            strict_mode = true

            [discover.include_genres]
            genres = ["action", "comedy"]
            match_type = "all"
            "#,
        )
        .unwrap();

        let settings = config.into_settings();
        assert_eq!(settings.id, "co0051941");
        assert_eq!(
            settings.job_types.unwrap().into_vec(),
            vec!["actor".to_string(), "director".to_string()]
        );
        assert_eq!(
            settings.content_types.unwrap().into_vec(),
            vec!["tv series".to_string()]
        );
        assert_eq!(settings.rating, Some(5.6));
        assert_eq!(settings.years.as_deref(), Some("2005-"));
        assert_eq!(settings.strict_mode, Some(true));

        let (include, match_type) = settings.include_genres.unwrap().into_parts();
        assert_eq!(include, vec!["action".to_string(), "comedy".to_string()]);
        assert_eq!(match_type, MatchType::All);

        let (exclude, match_type) = settings.exclude_genres.unwrap().into_parts();
        assert_eq!(exclude, vec!["animation".to_string()]);
        assert_eq!(match_type, MatchType::Any);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse(
            r#"
            [discover]
            id = "nm0000375"
            min_rating = 5
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("min_rating"));
    }

    #[test]
    fn test_missing_id_rejected() {
        let result = parse(
            r#"
            [discover]
            job_types = "actor"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_genre_settings_unknown_match_type_rejected() {
        let result = parse(
            r#"
            [discover]
            id = "nm0000375"
            include_genres = { genres = "drama", match_type = "some" }
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_json_config_accepted() {
        let config: DiscoveryConfig =
            serde_json::from_str(r#"{"id": "nm0000375", "votes": 1000, "max_entries": 10}"#)
                .unwrap();

        let settings = config.into_settings();
        assert_eq!(settings.votes, Some(1000.0));
        assert_eq!(settings.max_entries, Some(10.0));
    }

    #[test]
    fn test_fractional_numbers_accepted() {
        let config = parse(
            r#"
            [discover]
            id = "nm0000375"
            votes = 1500.5
            actor_position = 3
            max_entries = 200.0
            "#,
        )
        .unwrap();

        let settings = config.into_settings();
        assert_eq!(settings.votes, Some(1500.5));
        assert_eq!(settings.actor_position, Some(3.0));
        assert_eq!(settings.max_entries, Some(200.0));
    }
}
