//! folio: content pipeline for a personal portfolio site
//!
//! Projects and blog posts live as Markdown/MDX files with YAML front-matter.
//! This crate validates them, fills in derived fields (slug, summary, reading
//! time, table of contents), renders them to HTML and answers the queries a
//! portfolio front end needs: listings, lookups, siblings, tags, search.

pub mod commands;
pub mod config;
pub mod content;
pub mod data;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use config::{Mode, SiteConfig};
use content::{ContentIndex, ContentRepository, MarkdownRenderer};
use data::DataStore;

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The main application: configuration plus resolved directories
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding `projects/` and `blog/`
    pub content_dir: PathBuf,
    /// JSON data documents
    pub data_dir: PathBuf,
    /// Static assets served by the preview server
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory.
    ///
    /// `_config.yml` is optional; the `FOLIO_ENV` variable overrides its mode.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            SiteConfig::default()
        };
        config.apply_env();

        let content_dir = base_dir.join(&config.content_dir);
        let data_dir = base_dir.join(&config.data_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            data_dir,
            public_dir,
        })
    }

    /// Force the runtime mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn repository(&self) -> ContentRepository {
        ContentRepository::from_config(&self.base_dir, &self.config)
    }

    /// Load every project and post
    pub fn index(&self) -> ContentIndex {
        ContentIndex::load(&self.repository())
    }

    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        )
    }

    pub fn data(&self) -> Result<DataStore> {
        DataStore::load(&self.data_dir, &self.config.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.content_dir, dir.path().join("content"));
        assert_eq!(folio.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_config_directories_are_used() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "content_dir: src/content\nblog_dir: posts\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src/content/posts")).unwrap();
        fs::write(
            dir.path().join("src/content/posts/hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-01\ndraft: true\n---\nHi",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap().with_mode(Mode::Development);
        assert_eq!(folio.index().list(ContentKind::Post).len(), 1);

        let folio = folio.with_mode(Mode::Production);
        assert!(folio.index().list(ContentKind::Post).is_empty());
    }
}
