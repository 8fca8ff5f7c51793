//! Extractor configuration file support
//!
//! Handles parsing of `.etl-extract.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::import::loader::DEFAULT_JOB_EXTENSION;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".etl-extract.toml";

/// Environment variable for job file extensions (comma separated)
pub const ENV_EXTENSIONS: &str = "ETL_EXTRACT_EXTENSIONS";

/// Environment variable for the large-query threshold
pub const ENV_LARGE_QUERY_CHARS: &str = "ETL_EXTRACT_LARGE_QUERY_CHARS";

/// Environment variable enabling the generation timestamp
pub const ENV_STAMP_GENERATED_AT: &str = "ETL_EXTRACT_STAMP_GENERATED_AT";

/// Environment variable for the source platform label
pub const ENV_SOURCE_PLATFORM: &str = "ETL_EXTRACT_SOURCE_PLATFORM";

/// Environment variable for the target platform label
pub const ENV_TARGET_PLATFORM: &str = "ETL_EXTRACT_TARGET_PLATFORM";

/// Error loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Config error: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Job discovery section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySection {
    /// File extensions of job definitions (without leading dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![DEFAULT_JOB_EXTENSION.to_string()]
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Thresholds used by suggestions and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsSection {
    /// Cleaned SQL longer than this is a complex query
    #[serde(default = "default_large_query_chars")]
    pub large_query_chars: usize,

    /// Tables referenced more often than this are staging candidates
    #[serde(default = "default_table_access_count")]
    pub table_access_count: usize,

    /// Transform expressions longer than this are complex
    #[serde(default = "default_complex_expression_chars")]
    pub complex_expression_chars: usize,

    /// Job count above which a phased migration is recommended
    #[serde(default = "default_phased_migration_jobs")]
    pub phased_migration_jobs: usize,

    /// Table count above which model documentation is recommended
    #[serde(default = "default_documentation_tables")]
    pub documentation_tables: usize,
}

fn default_large_query_chars() -> usize {
    1000
}

fn default_table_access_count() -> usize {
    3
}

fn default_complex_expression_chars() -> usize {
    100
}

fn default_phased_migration_jobs() -> usize {
    10
}

fn default_documentation_tables() -> usize {
    20
}

impl Default for ThresholdsSection {
    fn default() -> Self {
        Self {
            large_query_chars: default_large_query_chars(),
            table_access_count: default_table_access_count(),
            complex_expression_chars: default_complex_expression_chars(),
            phased_migration_jobs: default_phased_migration_jobs(),
            documentation_tables: default_documentation_tables(),
        }
    }
}

/// Limits of the generated validation queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Row-count checks for the first N tables (sorted)
    #[serde(default = "default_row_count_tables")]
    pub row_count_tables: usize,

    /// Schema probes among the first N SQL entries
    #[serde(default = "default_probe_limit")]
    pub schema_probe_queries: usize,

    /// Null checks for the first N distinct output columns
    #[serde(default = "default_probe_limit")]
    pub null_check_columns: usize,
}

fn default_row_count_tables() -> usize {
    10
}

fn default_probe_limit() -> usize {
    5
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            row_count_tables: default_row_count_tables(),
            schema_probe_queries: default_probe_limit(),
            null_check_columns: default_probe_limit(),
        }
    }
}

/// Aggregate document labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Record the generation time in the document metadata.
    /// Off by default so repeated runs produce identical output.
    #[serde(default)]
    pub stamp_generated_at: bool,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_source_platform")]
    pub source_platform: String,

    #[serde(default = "default_target_platform")]
    pub target_platform: String,
}

fn default_version() -> String {
    "3.0".to_string()
}

fn default_source_platform() -> String {
    "Talend".to_string()
}

fn default_target_platform() -> String {
    "BigQuery".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            stamp_generated_at: false,
            version: default_version(),
            source_platform: default_source_platform(),
            target_platform: default_target_platform(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.etl-extract.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub thresholds: ThresholdsSection,

    #[serde(default)]
    pub validation: ValidationSection,

    #[serde(default)]
    pub output: OutputSection,
}

impl ExtractorConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a workspace directory
    ///
    /// Looks for `.etl-extract.toml` in the workspace directory.
    /// Falls back to defaults if not found.
    pub fn load(workspace_path: &Path) -> ConfigResult<Self> {
        let config_path = workspace_path.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a workspace directory
    pub fn save(&self, workspace_path: &Path) -> ConfigResult<()> {
        let config_path = workspace_path.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(extensions) = std::env::var(ENV_EXTENSIONS) {
            let extensions: Vec<String> = extensions
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect();
            if !extensions.is_empty() {
                self.discovery.extensions = extensions;
            }
        }

        if let Ok(chars) = std::env::var(ENV_LARGE_QUERY_CHARS)
            && let Ok(chars) = chars.parse()
        {
            self.thresholds.large_query_chars = chars;
        }

        if let Ok(stamp) = std::env::var(ENV_STAMP_GENERATED_AT)
            && let Ok(stamp) = stamp.parse()
        {
            self.output.stamp_generated_at = stamp;
        }

        if let Ok(platform) = std::env::var(ENV_SOURCE_PLATFORM) {
            self.output.source_platform = platform;
        }

        if let Ok(platform) = std::env::var(ENV_TARGET_PLATFORM) {
            self.output.target_platform = platform;
        }
    }

    /// Check if configuration exists in a workspace
    pub fn exists(workspace_path: &Path) -> bool {
        workspace_path.join(CONFIG_FILENAME).exists()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# ETL Extraction SDK Configuration

[discovery]
# Extensions of job definition files, searched recursively
extensions = ["item"]

[thresholds]
# Cleaned SQL longer than this is reported as a complex query
large_query_chars = 1000
# Tables referenced more often than this are staging candidates
table_access_count = 3
# Transform expressions longer than this are reported as complex
complex_expression_chars = 100
# Recommend a phased migration above this many jobs
phased_migration_jobs = 10
# Recommend model documentation above this many tables
documentation_tables = 20

[validation]
row_count_tables = 10
schema_probe_queries = 5
null_check_columns = 5

[output]
# Record the generation time (makes repeated runs differ)
stamp_generated_at = false
version = "3.0"
source_platform = "Talend"
target_platform = "BigQuery"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::new();
        assert_eq!(config.discovery.extensions, vec!["item"]);
        assert_eq!(config.thresholds.large_query_chars, 1000);
        assert_eq!(config.validation.row_count_tables, 10);
        assert!(!config.output.stamp_generated_at);
        assert_eq!(config.output.version, "3.0");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[discovery]
extensions = ["item", "xml"]

[thresholds]
table_access_count = 5
"#;
        let config = ExtractorConfig::parse(toml).unwrap();
        assert_eq!(config.discovery.extensions, vec!["item", "xml"]);
        assert_eq!(config.thresholds.table_access_count, 5);
        assert_eq!(config.thresholds.complex_expression_chars, 100);
        assert_eq!(config.output.target_platform, "BigQuery");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = ExtractorConfig::parse("[thresholds]\nlarge_query_chars = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = ExtractorConfig::new();
        config.validation.null_check_columns = 2;
        config.output.version = "3.1".to_string();

        config.save(dir.path()).unwrap();
        assert!(ExtractorConfig::exists(dir.path()));

        let loaded = ExtractorConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.validation.null_check_columns, 2);
        assert_eq!(loaded.output.version, "3.1");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ExtractorConfig::load(dir.path()).unwrap();
        assert_eq!(config.thresholds, ThresholdsSection::default());
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = ExtractorConfig::parse(sample_config()).unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }
}
