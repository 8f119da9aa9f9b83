//! Create a new project or post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::derive::generate_slug;
use crate::content::ContentKind;
use crate::Folio;

/// Scaffold a content file and return its path.
///
/// Posts are created as drafts in `.mdx`, projects as `.md`.
pub fn create(folio: &Folio, kind: ContentKind, title: &str) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = generate_slug(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let repo = folio.repository();
    let target_dir = repo.dir(kind);
    fs::create_dir_all(target_dir)?;

    let extension = match kind {
        ContentKind::Project => "md",
        ContentKind::Post => "mdx",
    };
    let file_path = target_dir.join(format!("{}.{}", slug, extension));

    // Load scaffold template
    let scaffold_path = folio
        .base_dir
        .join("scaffolds")
        .join(format!("{}.md", kind));
    let scaffold_content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
    } else {
        default_scaffold(kind).to_string()
    };

    let content = scaffold_content
        .replace("{{ title }}", &yaml_quote(title))
        .replace("{{ date }}", &now.format("%Y-%m-%d").to_string())
        .replace("{{ lang }}", &folio.config.language);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, content)?;
    tracing::debug!("Scaffolded {} {:?}", kind, file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(folio: &Folio, kind: ContentKind, title: &str) -> Result<()> {
    let path = create(folio, kind, title)?;
    println!("Created: {:?}", path);
    Ok(())
}

fn default_scaffold(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Project => {
            "---\ntitle: {{ title }}\ndate: {{ date }}\nsummary: \"\"\nstatus: in-progress\nfeatured: false\ntags: []\ntechnologies: []\nlang: {{ lang }}\n---\n"
        }
        ContentKind::Post => {
            "---\ntitle: {{ title }}\ndate: {{ date }}\nsummary: \"\"\ntags: []\ndraft: true\nlang: {{ lang }}\n---\n"
        }
    }
}

/// Double-quote a scalar so titles with `:` or `#` stay valid YAML
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
