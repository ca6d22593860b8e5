//! Application configuration management.

use serde::Deserialize;

use crate::error::AppResult;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregate cache configuration.
    pub cache: CacheConfig,
    /// Localization keys for synthetic report nodes.
    pub labels: LabelConfig,
    /// Record selection configuration.
    pub selection: SelectionConfig,
}

/// Aggregate cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached aggregate views and tables.
    pub max_capacity: u64,
    /// Time-to-live in seconds for each entry.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl_secs: 300, // 5 minutes
        }
    }
}

/// Keys handed to the localizer when synthesizing "other" and "duplicates" nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Key for records matched by no child objective.
    pub other_key: String,
    /// Key for records matched by several child objectives.
    pub duplicates_key: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            other_key: "reporting.other".to_string(),
            duplicates_key: "reporting.duplicates".to_string(),
        }
    }
}

/// Record selection configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// How records without a resolvable classification code are treated.
    pub unresolved_codes: UnresolvedCodePolicy,
}

/// Handling of records whose classification code cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedCodePolicy {
    /// Fail closed: the record is excluded from every node.
    #[default]
    Exclude,
    /// Abort the selection with a data-quality error.
    Reject,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("COSTREE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
