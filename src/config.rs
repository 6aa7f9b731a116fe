// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for faqdesk
//!
//! Loads configuration from .faqdeskrc.toml in the data root or
//! ~/.config/faqdesk/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderType {
    #[default]
    Builtin,
    Dummy,
}

/// Knowledge-base source configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Primary structured source (JSON array of records)
    pub json_path: Option<String>,
    /// Secondary tabular source, used when the JSON source is absent
    pub csv_path: Option<String>,
}

impl KbConfig {
    /// Get JSON source path (defaults to restaurant_kb.json)
    pub fn json_path(&self) -> &str {
        self.json_path.as_deref().unwrap_or("restaurant_kb.json")
    }

    /// Get CSV source path (defaults to restaurant_kb.csv)
    pub fn csv_path(&self) -> &str {
        self.csv_path.as_deref().unwrap_or("restaurant_kb.csv")
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type (builtin, dummy)
    pub provider: Option<EmbeddingProviderType>,
    /// Cache file path, relative to the data root
    pub cache_path: Option<String>,
}

impl EmbeddingConfig {
    /// Get provider type (defaults to Builtin)
    pub fn provider(&self) -> EmbeddingProviderType {
        self.provider.unwrap_or_default()
    }

    /// Get cache path (defaults to .faqdesk/embeddings.sqlite)
    pub fn cache_path(&self) -> &str {
        self.cache_path
            .as_deref()
            .unwrap_or(".faqdesk/embeddings.sqlite")
    }
}

/// Resolver thresholds and limits
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum similarity to answer directly instead of suggesting
    pub confidence_threshold: Option<f32>,
    /// Minimum similarity for a suggestion to be offered at all
    pub suggestion_floor: Option<f32>,
    /// Maximum number of suggestions in a fallback response
    pub max_suggestions: Option<usize>,
    /// Maximum autocomplete matches returned while typing
    pub autocomplete_limit: Option<usize>,
}

impl ResolverConfig {
    /// Get confidence threshold (defaults to 0.40)
    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold.unwrap_or(0.40)
    }

    /// Get suggestion floor (defaults to 0.20)
    pub fn suggestion_floor(&self) -> f32 {
        self.suggestion_floor.unwrap_or(0.20)
    }

    /// Get max suggestions (defaults to 3)
    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions.unwrap_or(3)
    }

    /// Get autocomplete limit (defaults to 5)
    pub fn autocomplete_limit(&self) -> usize {
        self.autocomplete_limit.unwrap_or(5)
    }
}

/// Interaction log configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path, relative to the data root
    pub path: Option<String>,
}

impl LogConfig {
    /// Get log path (defaults to .faqdesk/interactions.csv)
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(".faqdesk/interactions.csv")
    }
}

/// One keyword route rule; table order is priority order.
///
/// `response` is ignored for the dynamic categories (menu, kids-menu),
/// whose responses are rendered from the live knowledge base.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRuleConfig {
    pub category: String,
    pub triggers: Vec<String>,
    #[serde(default)]
    pub response: Option<String>,
}

/// Configuration loaded from .faqdeskrc.toml or ~/.config/faqdesk/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Knowledge-base source configuration
    #[serde(default)]
    pub kb: KbConfig,

    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,

    /// Resolver thresholds
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Interaction log configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Full replacement for the built-in keyword route table
    #[serde(default)]
    pub routes: Option<Vec<RouteRuleConfig>>,
}

impl Config {
    /// Load configuration for a data root
    ///
    /// Precedence (highest to lowest):
    /// 1. .faqdeskrc.toml in the data root
    /// 2. ~/.config/faqdesk/config.toml
    pub fn load_for_dir(root: &Path) -> Self {
        if let Some(config) = Self::load_from_path(&root.join(".faqdeskrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("faqdesk").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Load configuration relative to the current directory
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_for_dir(&cwd)
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }
}
