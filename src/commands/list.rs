//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::ContentKind;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let index = folio.index();

    match content_type {
        "project" | "projects" => {
            let projects = index.list(ContentKind::Project);
            println!("Projects ({}):", projects.len());
            for project in projects {
                println!(
                    "  {}{} - {} [{}] ({})",
                    if project.featured { "* " } else { "" },
                    project.date.format("%Y-%m-%d"),
                    project.title,
                    project.slug,
                    project.status
                );
            }
        }
        "post" | "posts" | "blog" => {
            let posts = index.list(ContentKind::Post);
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}] {} min{}",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.slug,
                    post.reading_time,
                    if post.draft { " (draft)" } else { "" }
                );
            }
        }
        "tag" | "tags" => {
            let tags = count_by(|kind| index.stats(kind).by_tag);
            print_counts("Tags", tags);
        }
        "technology" | "technologies" | "tech" => {
            let techs = count_by(|kind| index.stats(kind).by_technology);
            print_counts("Technologies", techs);
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: projects, posts, tags, technologies",
                content_type
            );
        }
    }

    Ok(())
}

/// Merge per-kind counts, grouping spellings that differ only in case
fn count_by<F>(counts: F) -> Vec<(String, usize)>
where
    F: Fn(ContentKind) -> BTreeMap<String, usize>,
{
    let mut merged: BTreeMap<String, (String, usize)> = BTreeMap::new();
    for kind in ContentKind::ALL {
        for (name, count) in counts(kind) {
            merged
                .entry(name.to_lowercase())
                .or_insert_with(|| (name.clone(), 0))
                .1 += count;
        }
    }

    let mut counts: Vec<(String, usize)> = merged.into_values().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn print_counts(label: &str, counts: Vec<(String, usize)>) {
    println!("{} ({}):", label, counts.len());
    for (name, count) in counts {
        println!("  {} ({})", name, count);
    }
}
