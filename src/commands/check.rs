//! Validate every content file

use anyhow::Result;

use crate::content::{ContentIndex, ContentKind};
use crate::Folio;

/// Number of rejected files and lint issues found
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub rejected: usize,
    pub issues: usize,
}

impl CheckSummary {
    pub fn is_clean(&self) -> bool {
        self.rejected == 0 && self.issues == 0
    }
}

/// Report rejected files and lint issues for both kinds
pub fn check(index: &ContentIndex) -> CheckSummary {
    let mut summary = CheckSummary::default();

    for kind in ContentKind::ALL {
        let records = index.list(kind);
        let rejected = index.rejected(kind);
        let issues = index.lint(kind);

        println!(
            "{}: {} loaded, {} rejected, {} issues",
            kind.plural(),
            records.len(),
            rejected.len(),
            issues.len()
        );
        for error in rejected {
            println!("  error: {}", error);
        }
        for issue in &issues {
            println!("  warning: {} {}: {}", issue.kind, issue.slug, issue.message);
        }

        summary.rejected += rejected.len();
        summary.issues += issues.len();
    }

    summary
}

/// Run the check command, failing when anything is wrong
pub fn run(folio: &Folio) -> Result<()> {
    let summary = check(&folio.index());
    if !summary.is_clean() {
        anyhow::bail!(
            "{} file(s) rejected, {} issue(s) found",
            summary.rejected,
            summary.issues
        );
    }
    println!("All content is valid.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folio_with(files: &[(&str, &str)]) -> (TempDir, Folio) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let folio = Folio::new(dir.path()).unwrap();
        (dir, folio)
    }

    #[test]
    fn test_clean_content() {
        let (_dir, folio) = folio_with(&[(
            "content/projects/api.md",
            "---\ntitle: API\ndate: 2024-01-01\nsummary: A JSON API for the site\ntechnologies: [Rust]\n---\n",
        )]);
        assert!(check(&folio.index()).is_clean());
        assert!(run(&folio).is_ok());
    }

    #[test]
    fn test_problems_fail_the_check() {
        let (_dir, folio) = folio_with(&[
            ("content/blog/no-date.mdx", "---\ntitle: No date\n---\nBody"),
            (
                "content/projects/thin.md",
                "---\ntitle: Thin\ndate: 2024-01-01\n---\nShort",
            ),
        ]);
        let summary = check(&folio.index());
        assert_eq!(summary, CheckSummary { rejected: 1, issues: 2 });
        assert!(run(&folio).is_err());
    }
}
