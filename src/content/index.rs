//! In-memory query layer over the loaded content

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::markdown::{strip_mdx_esm, table_of_contents};
use super::repository::ContentRepository;
use super::schema::{self, LintIssue};
use super::{ContentDetail, ContentError, ContentKind, ContentRecord, MarkdownRenderer, Siblings};

/// Shortest search query that returns anything
const MIN_QUERY_LEN: usize = 2;

/// Aggregate numbers about one kind of content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub total: usize,
    pub featured: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_year: BTreeMap<i32, usize>,
    pub by_tag: BTreeMap<String, usize>,
    pub by_technology: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

/// Listing and lookup tables for one kind
#[derive(Debug, Default)]
struct Collection {
    records: Vec<ContentRecord>,
    rejected: Vec<ContentError>,
    drafts_hidden: usize,
    by_slug: HashMap<String, usize>,
    by_tag: HashMap<String, Vec<usize>>,
    by_technology: HashMap<String, Vec<usize>>,
}

impl Collection {
    fn build(repo: &ContentRepository, kind: ContentKind) -> Self {
        let report = repo.scan(kind);
        let mut collection = Collection {
            records: report.records,
            rejected: report.rejected,
            drafts_hidden: report.drafts_hidden,
            ..Default::default()
        };

        for (i, record) in collection.records.iter().enumerate() {
            collection.by_slug.insert(record.slug.clone(), i);
            for tag in dedup_lowercase(&record.tags) {
                collection.by_tag.entry(tag).or_default().push(i);
            }
            for tech in dedup_lowercase(&record.technologies) {
                collection.by_technology.entry(tech).or_default().push(i);
            }
        }

        collection
    }

    fn lookup(&self, table: &HashMap<String, Vec<usize>>, key: &str) -> Vec<&ContentRecord> {
        table
            .get(&key.trim().to_lowercase())
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }
}

fn dedup_lowercase(values: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
    keys.sort();
    keys.dedup();
    keys
}

/// Projects and posts loaded once, queried many times.
///
/// The index never touches the disk after loading; call [`ContentIndex::reload`]
/// to pick up changes.
#[derive(Debug)]
pub struct ContentIndex {
    repo: ContentRepository,
    projects: Collection,
    posts: Collection,
}

impl ContentIndex {
    /// Scan both content directories
    pub fn load(repo: &ContentRepository) -> Self {
        let index = Self {
            repo: repo.clone(),
            projects: Collection::build(repo, ContentKind::Project),
            posts: Collection::build(repo, ContentKind::Post),
        };
        tracing::info!(
            "Indexed {} projects and {} posts",
            index.projects.records.len(),
            index.posts.records.len()
        );
        index
    }

    /// Rebuild from disk
    pub fn reload(&mut self) {
        *self = Self::load(&self.repo);
    }

    pub fn repository(&self) -> &ContentRepository {
        &self.repo
    }

    fn collection(&self, kind: ContentKind) -> &Collection {
        match kind {
            ContentKind::Project => &self.projects,
            ContentKind::Post => &self.posts,
        }
    }

    /// Sorted listing of `kind`
    pub fn list(&self, kind: ContentKind) -> &[ContentRecord] {
        &self.collection(kind).records
    }

    /// Files skipped while loading `kind`
    pub fn rejected(&self, kind: ContentKind) -> &[ContentError] {
        &self.collection(kind).rejected
    }

    /// Number of drafts hidden because of production mode
    pub fn drafts_hidden(&self, kind: ContentKind) -> usize {
        self.collection(kind).drafts_hidden
    }

    pub fn get(&self, kind: ContentKind, slug: &str) -> Option<&ContentRecord> {
        let collection = self.collection(kind);
        collection.by_slug.get(slug).map(|&i| &collection.records[i])
    }

    /// Chronological neighbours of `slug` in the sorted listing.
    ///
    /// `previous` is the next older record, `next` the next newer one.
    pub fn siblings(&self, kind: ContentKind, slug: &str) -> Siblings {
        let collection = self.collection(kind);
        let Some(&i) = collection.by_slug.get(slug) else {
            return Siblings::default();
        };

        Siblings {
            previous: collection.records.get(i + 1).cloned(),
            next: i
                .checked_sub(1)
                .and_then(|j| collection.records.get(j))
                .cloned(),
        }
    }

    pub fn by_tag(&self, kind: ContentKind, tag: &str) -> Vec<&ContentRecord> {
        let collection = self.collection(kind);
        collection.lookup(&collection.by_tag, tag)
    }

    pub fn by_technology(&self, kind: ContentKind, tech: &str) -> Vec<&ContentRecord> {
        let collection = self.collection(kind);
        collection.lookup(&collection.by_technology, tech)
    }

    /// Latest records for a locale.
    ///
    /// Records without a `lang` match every locale. When nothing matches, the
    /// unfiltered listing is used instead.
    pub fn recent(&self, kind: ContentKind, limit: usize, locale: Option<&str>) -> Vec<&ContentRecord> {
        let records = self.list(kind);

        if let Some(locale) = locale {
            let localized: Vec<&ContentRecord> = records
                .iter()
                .filter(|r| {
                    r.lang
                        .as_deref()
                        .map_or(true, |lang| lang.eq_ignore_ascii_case(locale))
                })
                .take(limit)
                .collect();
            if !localized.is_empty() {
                return localized;
            }
            tracing::debug!("No {} for locale {:?}, falling back", kind.plural(), locale);
        }

        records.iter().take(limit).collect()
    }

    pub fn featured(&self, kind: ContentKind, limit: usize) -> Vec<&ContentRecord> {
        self.list(kind)
            .iter()
            .filter(|r| r.featured)
            .take(limit)
            .collect()
    }

    /// Case-insensitive substring search over text, tags, technologies and role
    pub fn search(&self, kind: ContentKind, query: &str) -> Vec<&ContentRecord> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        self.list(kind)
            .iter()
            .filter(|r| r.search_haystack().contains(&query))
            .collect()
    }

    pub fn all_tags(&self, kind: ContentKind) -> Vec<String> {
        unique_sorted(self.list(kind).iter().flat_map(|r| r.tags.iter()))
    }

    pub fn all_technologies(&self, kind: ContentKind) -> Vec<String> {
        unique_sorted(self.list(kind).iter().flat_map(|r| r.technologies.iter()))
    }

    /// Record, rendered HTML, table of contents and siblings for one slug
    pub fn detail(
        &self,
        kind: ContentKind,
        slug: &str,
        renderer: &MarkdownRenderer,
    ) -> Result<Option<ContentDetail>> {
        let Some(record) = self.get(kind, slug) else {
            return Ok(None);
        };

        let body = if record.is_mdx() {
            strip_mdx_esm(&record.content)
        } else {
            record.content.clone()
        };
        let html = renderer.render(&body)?;
        let toc = table_of_contents(&body);

        Ok(Some(ContentDetail {
            record: record.clone(),
            html,
            toc,
            siblings: self.siblings(kind, slug),
        }))
    }

    pub fn stats(&self, kind: ContentKind) -> ContentStats {
        let records = self.list(kind);
        let mut stats = ContentStats {
            total: records.len(),
            featured: records.iter().filter(|r| r.featured).count(),
            ..Default::default()
        };

        for record in records {
            *stats
                .by_status
                .entry(record.status.as_str().to_string())
                .or_default() += 1;
            *stats.by_year.entry(record.date.year()).or_default() += 1;
            for tag in &record.tags {
                *stats.by_tag.entry(tag.clone()).or_default() += 1;
            }
            for tech in &record.technologies {
                *stats.by_technology.entry(tech.clone()).or_default() += 1;
            }
            if let Some(category) = &record.category {
                *stats.by_category.entry(category.clone()).or_default() += 1;
            }
        }

        stats
    }

    /// Quality issues across every loaded record of `kind`
    pub fn lint(&self, kind: ContentKind) -> Vec<LintIssue> {
        self.list(kind).iter().flat_map(schema::lint).collect()
    }
}

/// Deduplicate ignoring case (first spelling wins) and sort alphabetically
fn unique_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashMap<String, &String> = HashMap::new();
    for value in values {
        seen.entry(value.to_lowercase()).or_insert(value);
    }

    let mut unique: Vec<(String, String)> = seen
        .into_iter()
        .map(|(key, value)| (key, value.clone()))
        .collect();
    unique.sort();
    unique.into_iter().map(|(_, value)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, SiteConfig};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("content/projects")).unwrap();
            fs::create_dir_all(dir.path().join("content/blog")).unwrap();
            Self { dir }
        }

        fn post(&self, name: &str, front: &str, body: &str) -> &Self {
            let path = self.dir.path().join("content/blog").join(name);
            fs::write(path, format!("---\n{}\n---\n{}", front, body)).unwrap();
            self
        }

        fn project(&self, name: &str, front: &str, body: &str) -> &Self {
            let path = self.dir.path().join("content/projects").join(name);
            fs::write(path, format!("---\n{}\n---\n{}", front, body)).unwrap();
            self
        }

        fn repo(&self) -> ContentRepository {
            ContentRepository::from_config(self.dir.path(), &SiteConfig::default())
        }

        fn index(&self) -> ContentIndex {
            ContentIndex::load(&self.repo())
        }
    }

    fn slugs(records: &[&ContentRecord]) -> Vec<String> {
        records.iter().map(|r| r.slug.clone()).collect()
    }

    #[test]
    fn test_siblings() {
        let fx = Fixture::new();
        fx.post("a.mdx", "title: A\ndate: 2024-01-01", "Body")
            .post("b.mdx", "title: B\ndate: 2024-02-01", "Body");
        let index = fx.index();

        let b = index.siblings(ContentKind::Post, "b");
        assert_eq!(b.previous.map(|r| r.slug), Some("a".to_string()));
        assert!(b.next.is_none());

        let a = index.siblings(ContentKind::Post, "a");
        assert!(a.previous.is_none());
        assert_eq!(a.next.map(|r| r.slug), Some("b".to_string()));

        let missing = index.siblings(ContentKind::Post, "zzz");
        assert!(missing.previous.is_none() && missing.next.is_none());
    }

    #[test]
    fn test_single_record_has_no_siblings() {
        let fx = Fixture::new();
        fx.post("only.mdx", "title: Only\ndate: 2024-01-01", "Body");
        let siblings = fx.index().siblings(ContentKind::Post, "only");
        assert!(siblings.previous.is_none());
        assert!(siblings.next.is_none());
    }

    #[test]
    fn test_get_and_list() {
        let fx = Fixture::new();
        fx.project("p.md", "title: P\ndate: 2024-01-01", "Body");
        let index = fx.index();
        assert_eq!(index.get(ContentKind::Project, "p").unwrap().title, "P");
        assert!(index.get(ContentKind::Post, "p").is_none());
        assert_eq!(index.list(ContentKind::Project).len(), 1);
    }

    #[test]
    fn test_tag_and_technology_lookup_ignores_case() {
        let fx = Fixture::new();
        fx.project(
            "one.md",
            "title: One\ndate: 2024-02-01\ntags: [Web, design]\ntechnologies: [React, Node.js]",
            "",
        )
        .project(
            "two.md",
            "title: Two\ndate: 2024-01-01\ntags: web\ntechnologies: [react]",
            "",
        );
        let index = fx.index();

        assert_eq!(slugs(&index.by_tag(ContentKind::Project, "WEB")), vec!["one", "two"]);
        assert_eq!(slugs(&index.by_tag(ContentKind::Project, "design")), vec!["one"]);
        assert_eq!(
            slugs(&index.by_technology(ContentKind::Project, "REACT")),
            vec!["one", "two"]
        );
        assert!(index.by_tag(ContentKind::Project, "mobile").is_empty());

        assert_eq!(index.all_tags(ContentKind::Project), vec!["design", "Web"]);
        assert_eq!(
            index.all_technologies(ContentKind::Project),
            vec!["Node.js", "React"]
        );
    }

    #[test]
    fn test_recent_filters_by_locale() {
        let fx = Fixture::new();
        fx.post("fr.mdx", "title: FR\ndate: 2024-03-01\nlang: fr", "")
            .post("en.mdx", "title: EN\ndate: 2024-02-01\nlang: en", "")
            .post("any.mdx", "title: Any\ndate: 2024-01-01", "");
        let index = fx.index();

        assert_eq!(
            slugs(&index.recent(ContentKind::Post, 10, Some("en"))),
            vec!["en", "any"]
        );
        assert_eq!(slugs(&index.recent(ContentKind::Post, 1, Some("fr"))), vec!["fr"]);
        assert_eq!(
            slugs(&index.recent(ContentKind::Post, 2, None)),
            vec!["fr", "en"]
        );
    }

    #[test]
    fn test_recent_falls_back_when_locale_has_nothing() {
        let fx = Fixture::new();
        fx.post("fr.mdx", "title: FR\ndate: 2024-03-01\nlang: fr", "")
            .post("fr2.mdx", "title: FR2\ndate: 2024-02-01\nlang: fr", "");
        let index = fx.index();

        assert_eq!(
            slugs(&index.recent(ContentKind::Post, 1, Some("en"))),
            vec!["fr"]
        );
    }

    #[test]
    fn test_featured() {
        let fx = Fixture::new();
        fx.project("a.md", "title: A\ndate: 2024-01-01\nfeatured: true", "")
            .project("b.md", "title: B\ndate: 2024-02-01", "")
            .project("c.md", "title: C\ndate: 2023-01-01\nfeatured: true", "");
        let index = fx.index();

        assert_eq!(slugs(&index.featured(ContentKind::Project, 10)), vec!["a", "c"]);
        assert_eq!(slugs(&index.featured(ContentKind::Project, 1)), vec!["a"]);
    }

    #[test]
    fn test_search() {
        let fx = Fixture::new();
        fx.project(
            "shop.md",
            "title: Boutique\ndate: 2024-01-01\nrole: Lead developer\ntechnologies: [Stripe]",
            "An online store.",
        )
        .project("blog.md", "title: Blog engine\ndate: 2023-01-01", "Static pages.");
        let index = fx.index();

        assert_eq!(slugs(&index.search(ContentKind::Project, "  STRIPE ")), vec!["shop"]);
        assert_eq!(slugs(&index.search(ContentKind::Project, "lead")), vec!["shop"]);
        assert_eq!(slugs(&index.search(ContentKind::Project, "static")), vec!["blog"]);
        assert!(index.search(ContentKind::Project, "s").is_empty());
        assert!(index.search(ContentKind::Project, "   ").is_empty());
        assert!(index.search(ContentKind::Project, "nothing here").is_empty());
    }

    #[test]
    fn test_detail() {
        let fx = Fixture::new();
        fx.post("a.mdx", "title: A\ndate: 2024-01-01", "Intro")
            .post(
                "b.mdx",
                "title: B\ndate: 2024-02-01",
                "import X from './x'\n\n## Setup\n\nText\n\n## Setup\n",
            );
        let index = fx.index();
        let renderer = MarkdownRenderer::new();

        let detail = index
            .detail(ContentKind::Post, "b", &renderer)
            .unwrap()
            .unwrap();
        assert_eq!(detail.record.title, "B");
        assert!(!detail.html.contains("import X"));
        let anchors: Vec<_> = detail.toc.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(anchors, vec!["setup", "setup-1"]);
        assert!(detail.html.contains(r#"id="setup-1""#));
        assert_eq!(detail.siblings.previous.map(|r| r.slug), Some("a".into()));

        assert!(index
            .detail(ContentKind::Post, "missing", &renderer)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_stats() {
        let fx = Fixture::new();
        fx.project(
            "a.md",
            "title: A\ndate: 2024-01-01\nfeatured: true\nstatus: in-progress\ntags: [web]\ntechnologies: [Rust]",
            "",
        )
        .project(
            "b.md",
            "title: B\ndate: 2023-05-01\ntags: [web, cli]\ncategory: tools",
            "",
        );
        let stats = fx.index().stats(ContentKind::Project);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.featured, 1);
        assert_eq!(stats.by_status.get("in-progress"), Some(&1));
        assert_eq!(stats.by_status.get("completed"), Some(&1));
        assert_eq!(stats.by_year.get(&2024), Some(&1));
        assert_eq!(stats.by_year.get(&2023), Some(&1));
        assert_eq!(stats.by_tag.get("web"), Some(&2));
        assert_eq!(stats.by_technology.get("Rust"), Some(&1));
        assert_eq!(stats.by_category.get("tools"), Some(&1));
    }

    #[test]
    fn test_lint_and_rejected() {
        let fx = Fixture::new();
        fx.project("ok.md", "title: Ok\ndate: 2024-01-01\ntechnologies: [Rust]", "A body long enough.")
            .project("thin.md", "title: Thin\ndate: 2024-01-01", "Tiny");
        fs::write(fx.dir.path().join("content/projects/bad.md"), "---\ndate: 2024-01-01\n---\n").unwrap();
        let index = fx.index();

        let issues = index.lint(ContentKind::Project);
        assert!(issues.iter().all(|i| i.slug == "thin"));
        assert_eq!(issues.len(), 2);
        assert_eq!(index.rejected(ContentKind::Project).len(), 1);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let fx = Fixture::new();
        fx.post("a.mdx", "title: A\ndate: 2024-01-01", "");
        let mut index = ContentIndex::load(&fx.repo().with_mode(Mode::Production));
        assert_eq!(index.list(ContentKind::Post).len(), 1);

        fx.post("b.mdx", "title: B\ndate: 2024-02-01", "")
            .post("c.mdx", "title: C\ndate: 2024-03-01\ndraft: true", "");
        assert_eq!(index.list(ContentKind::Post).len(), 1);

        index.reload();
        assert_eq!(index.list(ContentKind::Post).len(), 2);
        assert_eq!(index.drafts_hidden(ContentKind::Post), 1);
        assert!(index.get(ContentKind::Post, "b").is_some());
    }
}
