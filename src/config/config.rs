use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::data_exporter::DEFAULT_EXPORT_FILENAME;
use crate::data::data_view::{DataView, DEFAULT_IDENTIFIER_COLUMN};
use crate::data::pagination::DEFAULT_PAGE_SIZE;
use crate::data::value_formatter::{ValueFormatter, DEFAULT_PLACEHOLDER, DEFAULT_TRUNCATE_LEN};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub upload: UploadConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Rows per page
    pub page_size: usize,

    /// Column never offered as a range filter
    pub identifier_column: String,

    /// Text longer than this is shown truncated
    pub truncate_len: usize,

    /// Shown in place of empty cells
    pub empty_placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Backend that parses spreadsheets
    pub base_url: String,

    pub upload_path: String,

    /// Only files with this extension are sent
    pub accepted_extension: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, RUST_LOG takes precedence
    pub filter: String,

    /// Number of recent log lines kept in memory
    pub buffer_capacity: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            truncate_len: DEFAULT_TRUNCATE_LEN,
            empty_placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            upload_path: "/upload".to_string(),
            accepted_extension: "xlsx".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            buffer_capacity: 1000,
        }
    }
}

impl ViewConfig {
    /// An empty data view set up from this section
    pub fn build_view(&self) -> DataView {
        DataView::new(self.page_size)
            .with_identifier_column(self.identifier_column.clone())
            .with_formatter(ValueFormatter::new(
                self.truncate_len,
                self.empty_placeholder.clone(),
            ))
    }
}

impl UploadConfig {
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.upload_path.trim_start_matches('/')
        )
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("sheet-viewer").join("config.toml"))
    }

    /// A commented sample config, printed by `--print-config`
    pub fn create_default_with_comments() -> String {
        r#"# Sheet viewer configuration
# Location: ~/.config/sheet-viewer/config.toml (Linux)

[view]
# Rows per page
page_size = 50

# Identifier column, never offered as a range filter
identifier_column = "Name"

# Longer text cells are truncated with "..."
truncate_len = 20

# Shown for empty cells
empty_placeholder = "-"

[upload]
base_url = "http://127.0.0.1:5000"
upload_path = "/upload"
accepted_extension = "xlsx"
timeout_secs = 60

[export]
default_filename = "stock_screener_data.csv"

[logging]
# tracing filter directive (RUST_LOG overrides)
filter = "info"
buffer_capacity = 1000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.view.page_size, 50);
        assert_eq!(config.view.identifier_column, "Name");
        assert_eq!(config.export.default_filename, "stock_screener_data.csv");
        assert_eq!(config.upload.upload_url(), "http://127.0.0.1:5000/upload");
    }

    #[test]
    fn test_commented_sample_matches_defaults() {
        let parsed = Config::parse(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let parsed = Config::parse("[view]\npage_size = 25\n").unwrap();
        assert_eq!(parsed.view.page_size, 25);
        assert_eq!(parsed.view.identifier_column, "Name");
        assert_eq!(parsed.upload, UploadConfig::default());
    }

    #[test]
    fn test_load_from_missing_and_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        std::fs::write(&path, "[upload]\nbase_url = \"http://example.test/\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.upload.upload_url(), "http://example.test/upload");
    }

    #[test]
    fn test_invalid_config_reports_error() {
        assert!(Config::parse("[view]\npage_size = \"many\"\n").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_build_view_uses_page_size() {
        let config = ViewConfig {
            page_size: 7,
            ..ViewConfig::default()
        };
        assert_eq!(config.build_view().window().page_size(), 7);
    }
}
