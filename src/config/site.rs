//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Environment variable that selects the runtime mode
pub const MODE_ENV_VAR: &str = "FOLIO_ENV";

/// Runtime mode. Drafts are only hidden in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Parse a mode name; anything other than "production" is development
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Mode::Production
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub language: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub projects_dir: String,
    pub blog_dir: String,
    pub data_dir: String,
    pub public_dir: String,

    // Runtime
    pub mode: Mode,

    // Derived fields
    pub words_per_minute: u32,
    pub project_excerpt_length: usize,
    pub post_excerpt_length: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
            language: "fr".to_string(),
            url: "http://localhost:3000".to_string(),

            content_dir: "content".to_string(),
            projects_dir: "projects".to_string(),
            blog_dir: "blog".to_string(),
            data_dir: "data".to_string(),
            public_dir: "public".to_string(),

            mode: Mode::Development,

            words_per_minute: 200,
            project_excerpt_length: 160,
            post_excerpt_length: 200,

            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply the `FOLIO_ENV` override, if set
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(MODE_ENV_VAR) {
            let mode = Mode::from_name(&value);
            tracing::debug!("{}={} selects {} mode", MODE_ENV_VAR, value, mode);
            self.mode = mode;
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Preview server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
