//! Full-text search over projects or posts

use anyhow::Result;

use crate::content::ContentKind;
use crate::Folio;

pub fn run(folio: &Folio, kind: ContentKind, query: &str) -> Result<()> {
    let index = folio.index();
    let results = index.search(kind, query);

    if results.is_empty() {
        println!("No {} matching {:?}", kind.plural(), query.trim());
        return Ok(());
    }

    println!("Found {} {} matching {:?}:", results.len(), kind.plural(), query.trim());
    for record in results {
        println!(
            "  {} - {} [{}]",
            record.date.format("%Y-%m-%d"),
            record.title,
            record.slug
        );
    }

    Ok(())
}
