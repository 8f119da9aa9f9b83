//! Show one project or post

use anyhow::Result;

use crate::content::{ContentDetail, ContentKind};
use crate::Folio;

/// Print metadata, table of contents and siblings of one record
pub fn run(folio: &Folio, kind: ContentKind, slug: &str, html: bool) -> Result<()> {
    let index = folio.index();
    let renderer = folio.renderer();

    let Some(detail) = index.detail(kind, slug, &renderer)? else {
        anyhow::bail!("No {} with slug {:?}", kind, slug);
    };

    print!("{}", describe(&detail, &folio.config.language));
    if html {
        println!();
        println!("{}", detail.html);
    }

    Ok(())
}

fn describe(detail: &ContentDetail, lang: &str) -> String {
    let record = &detail.record;
    let mut out = String::new();

    out.push_str(&format!("{} [{}]\n", record.title, record.slug));
    out.push_str(&format!("  Date:         {}\n", record.date.format("%Y-%m-%d")));
    if let Some(updated) = record.updated {
        out.push_str(&format!("  Updated:      {}\n", updated.format("%Y-%m-%d")));
    }
    if record.kind == ContentKind::Project {
        out.push_str(&format!("  Status:       {}\n", record.status.label(lang)));
    }
    if record.featured {
        out.push_str("  Featured:     yes\n");
    }
    if record.draft {
        out.push_str("  Draft:        yes\n");
    }
    out.push_str(&format!("  Reading time: {} min\n", record.reading_time));
    if !record.tags.is_empty() {
        out.push_str(&format!("  Tags:         {}\n", record.tags.join(", ")));
    }
    if !record.technologies.is_empty() {
        out.push_str(&format!("  Technologies: {}\n", record.technologies.join(", ")));
    }
    for (label, value) in [
        ("Role", &record.role),
        ("Demo", &record.demo),
        ("Repository", &record.repo),
        ("Cover", &record.cover),
    ] {
        if let Some(value) = value {
            out.push_str(&format!("  {:<13} {}\n", format!("{}:", label), value));
        }
    }
    out.push_str(&format!("  Source:       {}\n", record.source.display()));
    out.push_str(&format!("\n{}\n", record.summary));

    if !detail.toc.is_empty() {
        out.push_str("\nContents:\n");
        for entry in &detail.toc {
            let indent = "  ".repeat(usize::from(entry.level));
            out.push_str(&format!("{}{} (#{})\n", indent, entry.text, entry.slug));
        }
    }

    if let Some(previous) = &detail.siblings.previous {
        out.push_str(&format!("\nPrevious: {} [{}]\n", previous.title, previous.slug));
    }
    if let Some(next) = &detail.siblings.next {
        out.push_str(&format!("Next:     {} [{}]\n", next.title, next.slug));
    }

    out
}
