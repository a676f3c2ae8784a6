//! Application configuration for seograph.
//!
//! User config lives at `~/.seograph/seograph.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeoGraphError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seograph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".seograph";

// ---------------------------------------------------------------------------
// Config structs (matching seograph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site identity.
    #[serde(default)]
    pub site: SiteConfig,

    /// Schema output settings.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Per sub-type description templates.
    #[serde(default)]
    pub search_appearance: SearchAppearanceConfig,

    /// Indexable database location.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site home URL, with trailing slash.
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Language code emitted as `inLanguage`.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            language: default_language(),
        }
    }
}

fn default_site_url() -> String {
    "https://example.org/".into()
}
fn default_language() -> String {
    "en-US".into()
}

/// Who the site represents in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyOrPerson {
    #[default]
    None,
    Person,
    Organization,
}

/// `[schema]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Whether breadcrumb nodes are part of the graph.
    #[serde(default = "default_true")]
    pub breadcrumbs_enabled: bool,

    /// Whether the site represents a person or organization.
    #[serde(default)]
    pub company_or_person: CompanyOrPerson,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            breadcrumbs_enabled: true,
            company_or_person: CompanyOrPerson::None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[search_appearance]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchAppearanceConfig {
    /// Meta description templates keyed by object sub type (`post`, `page`, ...).
    #[serde(default)]
    pub metadesc: BTreeMap<String, String>,
}

impl SearchAppearanceConfig {
    /// The template for `sub_type`, or `""` when none is configured.
    pub fn metadesc_for(&self, sub_type: &str) -> &str {
        self.metadesc.get(sub_type).map(String::as_str).unwrap_or("")
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the indexables database. A leading `~/` expands to the home directory.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "~/.seograph/indexables.db".into()
}

impl StorageConfig {
    /// Resolve `database_path`, expanding a leading `~/`.
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        match self.database_path.strip_prefix("~/") {
            Some(rest) => {
                let home = dirs::home_dir()
                    .ok_or_else(|| SeoGraphError::config("could not determine home directory"))?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(&self.database_path)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.seograph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SeoGraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.seograph/seograph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SeoGraphError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SeoGraphError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeoGraphError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SeoGraphError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeoGraphError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
