//! CLI command implementations

pub mod check;
pub mod list;
pub mod new;
pub mod search;
pub mod show;
pub mod stats;

use anyhow::Result;

use crate::content::ContentKind;

/// Parse a content kind argument ("projects", "post", "blog", ...)
pub fn parse_kind(name: &str) -> Result<ContentKind> {
    ContentKind::from_name(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown content kind: {}. Available: projects, posts", name))
}
