//! Content repository - loads projects and posts from the content directory

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::ContentError;
use super::schema::{self, DeriveOptions, SourceFile};
use super::{ContentKind, ContentRecord, FrontMatter};
use crate::config::{Mode, SiteConfig};

/// Result of scanning one content directory
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Valid records, sorted for the kind
    pub records: Vec<ContentRecord>,
    /// Files that were skipped, with the reason
    pub rejected: Vec<ContentError>,
    /// Valid drafts left out because of production mode
    pub drafts_hidden: usize,
}

/// Loads content records from disk.
///
/// Every call reads the directory again; use [`super::ContentIndex`] to keep
/// a loaded collection around.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    projects_dir: PathBuf,
    blog_dir: PathBuf,
    mode: Mode,
    project_options: DeriveOptions,
    post_options: DeriveOptions,
}

impl ContentRepository {
    /// Create a repository for the directories named in `config`
    pub fn from_config(base_dir: &Path, config: &SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        Self {
            projects_dir: content_dir.join(&config.projects_dir),
            blog_dir: content_dir.join(&config.blog_dir),
            mode: config.mode,
            project_options: DeriveOptions {
                words_per_minute: config.words_per_minute,
                excerpt_length: config.project_excerpt_length,
            },
            post_options: DeriveOptions {
                words_per_minute: config.words_per_minute,
                excerpt_length: config.post_excerpt_length,
            },
        }
    }

    /// Override the runtime mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Directory holding content of `kind`
    pub fn dir(&self, kind: ContentKind) -> &Path {
        match kind {
            ContentKind::Project => &self.projects_dir,
            ContentKind::Post => &self.blog_dir,
        }
    }

    fn options(&self, kind: ContentKind) -> &DeriveOptions {
        match kind {
            ContentKind::Project => &self.project_options,
            ContentKind::Post => &self.post_options,
        }
    }

    /// All valid records of `kind`, sorted
    pub fn list_all(&self, kind: ContentKind) -> Vec<ContentRecord> {
        self.scan(kind).records
    }

    /// Look up one record by slug. Re-reads the whole directory.
    pub fn get_by_slug(&self, kind: ContentKind, slug: &str) -> Option<ContentRecord> {
        self.list_all(kind).into_iter().find(|r| r.slug == slug)
    }

    /// Load every content file of `kind`.
    ///
    /// Files that cannot be read, parsed or validated are logged and reported
    /// in `rejected`; they never abort the scan.
    pub fn scan(&self, kind: ContentKind) -> ScanReport {
        let dir = self.dir(kind);
        let mut report = ScanReport::default();

        if !dir.is_dir() {
            tracing::warn!("Content directory {:?} does not exist", dir);
            return report;
        }

        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_content_file(path) {
                continue;
            }

            let record = match self.load_file(kind, path) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", kind, e);
                    report.rejected.push(e);
                    continue;
                }
            };

            // Hidden drafts never claim a slug
            if record.draft && self.mode.is_production() {
                tracing::debug!("Hiding draft {:?} in production", record.slug);
                report.drafts_hidden += 1;
                continue;
            }

            if let Some(first) = seen.get(&record.slug) {
                let err = ContentError::DuplicateSlug {
                    path: path.to_path_buf(),
                    slug: record.slug.clone(),
                    first: first.clone(),
                };
                tracing::warn!("Skipping {}: {}", kind, err);
                report.rejected.push(err);
                continue;
            }
            seen.insert(record.slug.clone(), path.to_path_buf());

            report.records.push(record);
        }

        sort_records(kind, &mut report.records);

        tracing::debug!(
            "Loaded {} {} from {:?} ({} rejected)",
            report.records.len(),
            kind.plural(),
            dir,
            report.rejected.len()
        );

        report
    }

    /// Load a single content file
    fn load_file(&self, kind: ContentKind, path: &Path) -> Result<ContentRecord, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let last_modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(|t| DateTime::<Local>::from(t).naive_local());

        let source = SourceFile {
            path: path.to_path_buf(),
            stem: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled")
                .to_string(),
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("md")
                .to_ascii_lowercase(),
            last_modified,
        };

        schema::validate(kind, fm, body, &source, self.options(kind)).map_err(|errors| {
            ContentError::Invalid {
                path: path.to_path_buf(),
                kind,
                errors,
            }
        })
    }
}

/// Projects: featured first, then newest first. Posts: newest first.
pub fn sort_records(kind: ContentKind, records: &mut [ContentRecord]) {
    match kind {
        ContentKind::Project => {
            records.sort_by(|a, b| b.featured.cmp(&a.featured).then(b.date.cmp(&a.date)))
        }
        ContentKind::Post => records.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}

/// Check if a file is a markdown or MDX file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("mdx"))
        .unwrap_or(false)
}
