//! Content statistics

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::content::{ContentKind, ContentStats};
use crate::Folio;

pub fn run(folio: &Folio, kind: ContentKind) -> Result<()> {
    let index = folio.index();
    print!("{}", render(kind, &index.stats(kind)));
    Ok(())
}

fn render(kind: ContentKind, stats: &ContentStats) -> String {
    let mut out = format!(
        "{} {} ({} featured)\n",
        stats.total,
        kind.plural(),
        stats.featured
    );

    section(&mut out, "By status", &stats.by_status);
    section(&mut out, "By year", &stats.by_year);
    section(&mut out, "By tag", &stats.by_tag);
    section(&mut out, "By technology", &stats.by_technology);
    section(&mut out, "By category", &stats.by_category);

    out
}

fn section<K: Display>(out: &mut String, title: &str, counts: &BTreeMap<K, usize>) {
    if counts.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title));
    for (key, count) in counts {
        out.push_str(&format!("  {:<24} {}\n", key, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_skips_empty_sections() {
        let mut stats = ContentStats {
            total: 3,
            featured: 1,
            ..Default::default()
        };
        stats.by_year.insert(2024, 2);
        stats.by_year.insert(2023, 1);

        let text = render(ContentKind::Post, &stats);
        assert!(text.starts_with("3 posts (1 featured)\n"));
        assert!(text.contains("By year:\n  2023"));
        assert!(!text.contains("By tag"));
    }
}
