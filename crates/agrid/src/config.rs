//! Configuration management for agrid.
//!
//! Loads settings from a TOML file or uses defaults, then applies
//! environment overrides.

use agri_shared::detection::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TOP_K};
use agri_shared::Language;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "AGRIDETECT_CONFIG";

/// System-wide config file path
pub const CONFIG_PATH: &str = "/etc/agridetect/config.toml";

/// Config file in the working directory, tried last
pub const LOCAL_CONFIG_PATH: &str = "agridetect.toml";

/// HTTP listener and request limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS origins; "*" allows any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Upload cap for /api/v1/detect-disease, in megabytes
    #[serde(default = "default_max_image_mb")]
    pub max_image_mb: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_image_mb() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            max_image_mb: default_max_image_mb(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_mb.saturating_mul(1024 * 1024)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

/// Chat assistant behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Language used when a request names none or an unknown one
    #[serde(default)]
    pub default_language: Language,

    /// Match "precoce" against "précoce"
    #[serde(default = "default_true")]
    pub fold_accents: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            fold_accents: true,
        }
    }
}

/// Classifier output interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f32,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Classifier index -> dataset label. Empty uses the knowledge base order.
    #[serde(default)]
    pub class_labels: Vec<String>,
}

fn default_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_threshold(),
            top_k: default_top_k(),
            class_labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// JSON knowledge file replacing the built-in tables
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,

    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl Config {
    /// Load config from the first file found, or defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::search_paths()
            .iter()
            .find_map(|path| match Self::load_from_path(path) {
                Ok(config) => Some(config),
                Err(e) if path.exists() => {
                    warn!("Ignoring unreadable config {}: {}", path.display(), e);
                    None
                }
                Err(_) => None,
            })
            .unwrap_or_else(|| {
                info!("No config file found, using defaults");
                Config::default()
            });
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from(CONFIG_PATH));
        paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
        paths
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides. Unparseable values are ignored.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lang) = var("AGRIDETECT_DEFAULT_LANG") {
            match Language::parse(&lang) {
                Some(lang) => self.assistant.default_language = lang,
                None => warn!("Unknown AGRIDETECT_DEFAULT_LANG '{}'", lang),
            }
        }
        if let Some(origins) = var("AGRIDETECT_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if !origins.is_empty() {
                self.server.allowed_origins = origins;
            }
        }
        if let Some(mb) = var("AGRIDETECT_MAX_IMAGE_MB").and_then(|v| v.trim().parse().ok()) {
            self.server.max_image_mb = mb;
        }
        if let Some(host) = var("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = var("PORT").and_then(|v| v.trim().parse().ok()) {
            self.server.port = port;
        }
    }
}
