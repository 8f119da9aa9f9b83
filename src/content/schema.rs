//! Front-matter validation and record linting

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;

use super::derive::{self, generate_slug};
use super::error::ValidationError;
use super::markdown::strip_mdx_esm;
use super::{ContentKind, ContentRecord, FrontMatter, Status};

/// Settings for fields computed when front-matter leaves them out
#[derive(Debug, Clone, Copy)]
pub struct DeriveOptions {
    pub words_per_minute: u32,
    pub excerpt_length: usize,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            words_per_minute: derive::DEFAULT_WORDS_PER_MINUTE,
            excerpt_length: derive::DEFAULT_EXCERPT_LENGTH,
        }
    }
}

/// Where a record comes from
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without extension
    pub stem: String,
    pub extension: String,
    pub last_modified: Option<NaiveDateTime>,
}

/// Validate front-matter against the rules of `kind` and build the record.
///
/// Titles are always required, dates only for posts. A date that is present
/// but unparseable, or a project without one, falls back to today.
pub fn validate(
    kind: ContentKind,
    fm: FrontMatter,
    body: &str,
    source: &SourceFile,
    options: &DeriveOptions,
) -> Result<ContentRecord, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let title = fm
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    if title.is_none() {
        errors.push(ValidationError::MissingTitle);
    }

    let raw_date = fm.date.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let date = match (raw_date, kind) {
        (Some(raw), _) => match fm.parse_date() {
            Some(date) => Some(date),
            None => {
                tracing::warn!("{:?}: unparseable date {:?}, using today", source.path, raw);
                Some(Local::now().naive_local())
            }
        },
        (None, ContentKind::Post) => {
            errors.push(ValidationError::MissingDate);
            None
        }
        (None, ContentKind::Project) => Some(Local::now().naive_local()),
    };

    let (Some(title), Some(date)) = (title, date) else {
        return Err(errors);
    };

    for key in fm.extra.keys() {
        tracing::debug!("{:?}: ignoring unknown front-matter key {:?}", source.path, key);
    }

    let updated = fm.parse_updated();
    let status = Status::parse(fm.status.as_deref());

    let text = if source.extension == "mdx" {
        strip_mdx_esm(body)
    } else {
        body.to_string()
    };

    let slug = fm
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(source.stem.as_str())
        .to_string();

    let summary = fm
        .summary
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| derive::extract_excerpt(&text, options.excerpt_length));

    let reading_time = fm
        .reading_time
        .unwrap_or_else(|| derive::reading_time(body, options.words_per_minute));

    let cover = match kind {
        ContentKind::Post => fm.cover.or_else(|| fm.images.first().cloned()),
        ContentKind::Project => fm.cover,
    };

    Ok(ContentRecord {
        kind,
        slug,
        title,
        date,
        updated,
        summary,
        content: body.to_string(),
        tags: fm.tags,
        technologies: fm.technologies,
        status,
        featured: fm.featured,
        draft: fm.draft,
        cover,
        gallery: fm.gallery,
        reading_time,
        lang: fm.lang,
        role: fm.role,
        demo: fm.demo,
        repo: fm.repo,
        author: fm.author,
        category: fm.category,
        source: source.path.clone(),
        extension: source.extension.clone(),
        last_modified: source.last_modified,
    })
}

/// A quality problem in a record that still loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub kind: ContentKind,
    pub slug: String,
    pub message: String,
}

/// Minimum summary length before the linter complains
const MIN_SUMMARY_LEN: usize = 10;

/// Check a loaded record for content that renders poorly
pub fn lint(record: &ContentRecord) -> Vec<LintIssue> {
    let mut messages = Vec::new();

    if record.summary.trim().chars().count() < MIN_SUMMARY_LEN {
        messages.push(format!(
            "summary is shorter than {} characters",
            MIN_SUMMARY_LEN
        ));
    }
    if record.kind == ContentKind::Project && record.technologies.is_empty() {
        messages.push("no technologies listed".to_string());
    }
    if generate_slug(&record.slug) != record.slug {
        messages.push(format!("slug {:?} is not URL-safe", record.slug));
    }

    messages
        .into_iter()
        .map(|message| LintIssue {
            kind: record.kind,
            slug: record.slug.clone(),
            message,
        })
        .collect()
}
