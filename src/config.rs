// ⚙️ Catalog configuration
// Feed-specific conventions that the extraction layer does not settle for us

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What happens to offers whose category is removed by a prune
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrunePolicy {
    /// Move the offer up to its ancestor at the threshold level
    Reassign,

    /// Drop the offer from the catalog
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Parent id meaning "no parent" (feeds use "0")
    #[serde(default = "default_root_parent_id")]
    pub root_parent_id: String,

    /// Rate used when a currency record has none
    #[serde(default = "default_rate")]
    pub default_rate: String,

    /// Surcharge (percent) used when a currency record has none
    #[serde(default = "default_plus")]
    pub default_plus: String,

    #[serde(default = "default_prune_policy")]
    pub prune_policy: PrunePolicy,

    /// chrono formats tried after RFC 3339 for the generation date
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

fn default_root_parent_id() -> String {
    "0".to_string()
}

fn default_rate() -> String {
    "1".to_string()
}

fn default_plus() -> String {
    "0".to_string()
}

fn default_prune_policy() -> PrunePolicy {
    PrunePolicy::Reassign
}

fn default_date_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d %H:%M".to_string(),
        "%Y-%m-%d %H:%M:%S".to_string(),
        "%Y-%m-%dT%H:%M:%S".to_string(),
    ]
}

impl CatalogConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse catalog config JSON")
    }

    /// Load configuration from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json_str(&content)
    }

    /// Builder: set prune policy
    pub fn with_prune_policy(mut self, policy: PrunePolicy) -> Self {
        self.prune_policy = policy;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            root_parent_id: default_root_parent_id(),
            default_rate: default_rate(),
            default_plus: default_plus(),
            prune_policy: default_prune_policy(),
            date_formats: default_date_formats(),
        }
    }
}
