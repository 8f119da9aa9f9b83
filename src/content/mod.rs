//! Content module - loads, validates and queries projects and blog posts

pub mod derive;
mod error;
mod frontmatter;
mod index;
mod markdown;
mod record;
pub mod repository;
pub mod schema;

pub use derive::TocEntry;
pub use error::{ContentError, ValidationError};
pub use frontmatter::FrontMatter;
pub use index::{ContentIndex, ContentStats};
pub use markdown::{strip_mdx_esm, table_of_contents, MarkdownRenderer};
pub use record::{ContentDetail, ContentKind, ContentRecord, Siblings, Status};
pub use repository::{ContentRepository, ScanReport};
pub use schema::LintIssue;
