//! Content record models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::derive::TocEntry;

/// The two kinds of content the site publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Project,
    Post,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Project, ContentKind::Post];

    /// Parse a kind from a user-facing name ("project", "posts", "blog", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "project" | "projects" => Some(ContentKind::Project),
            "post" | "posts" | "blog" => Some(ContentKind::Post),
            _ => None,
        }
    }

    /// Plural name, used in URLs and CLI output
    pub fn plural(self) -> &'static str {
        match self {
            ContentKind::Project => "projects",
            ContentKind::Post => "posts",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Project => f.write_str("project"),
            ContentKind::Post => f.write_str("post"),
        }
    }
}

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Completed,
    InProgress,
    Planned,
    Archived,
}

impl Status {
    /// Parse a front-matter status, falling back to `Completed`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("completed") => Status::Completed,
            Some("in-progress") | Some("in_progress") => Status::InProgress,
            Some("planned") => Status::Planned,
            Some("archived") => Status::Archived,
            Some(other) => {
                tracing::debug!("Unrecognized status {:?}, using completed", other);
                Status::Completed
            }
            None => Status::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::InProgress => "in-progress",
            Status::Planned => "planned",
            Status::Archived => "archived",
        }
    }

    /// Display label for a locale (French unless "en")
    pub fn label(self, lang: &str) -> &'static str {
        let english = lang.eq_ignore_ascii_case("en");
        match (self, english) {
            (Status::Completed, false) => "Terminé",
            (Status::InProgress, false) => "En cours",
            (Status::Planned, false) => "Planifié",
            (Status::Archived, false) => "Archivé",
            (Status::Completed, true) => "Completed",
            (Status::InProgress, true) => "In progress",
            (Status::Planned, true) => "Planned",
            (Status::Archived, true) => "Archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project or blog post, fully validated and with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    pub kind: ContentKind,

    /// URL segment and lookup key, unique per kind
    pub slug: String,

    pub title: String,

    /// Publication date
    pub date: NaiveDateTime,

    /// Last updated date from front-matter
    pub updated: Option<NaiveDateTime>,

    /// Explicit summary, or an excerpt of the body
    pub summary: String,

    /// Raw Markdown/MDX body
    pub content: String,

    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub status: Status,
    pub featured: bool,
    pub draft: bool,

    pub cover: Option<String>,
    pub gallery: Vec<String>,

    /// Minutes
    pub reading_time: u32,

    pub lang: Option<String>,
    pub role: Option<String>,
    pub demo: Option<String>,
    pub repo: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,

    /// Source file the record was loaded from
    pub source: PathBuf,

    /// "md" or "mdx"
    pub extension: String,

    /// File modification time
    pub last_modified: Option<NaiveDateTime>,
}

impl ContentRecord {
    pub fn is_mdx(&self) -> bool {
        self.extension == "mdx"
    }

    /// Lowercase text used by full-text search
    pub fn search_haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title, &self.summary, &self.content];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.extend(self.technologies.iter().map(String::as_str));
        if let Some(role) = &self.role {
            parts.push(role);
        }
        parts.join(" ").to_lowercase()
    }
}

/// Chronologically adjacent records
#[derive(Debug, Clone, Default, Serialize)]
pub struct Siblings {
    /// The next older record
    pub previous: Option<ContentRecord>,
    /// The next newer record
    pub next: Option<ContentRecord>,
}

/// Everything a detail page needs
#[derive(Debug, Clone, Serialize)]
pub struct ContentDetail {
    pub record: ContentRecord,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub siblings: Siblings,
}
