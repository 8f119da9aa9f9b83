//! Site data documents and localized strings
//!
//! `<data_dir>/*.json` documents (profile, navigation, social links) are kept
//! as-is and served by name. `<data_dir>/locales/<lang>.json` holds the
//! translation tables.

use anyhow::Result;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Name of the locale subdirectory inside the data directory
const LOCALES_DIR: &str = "locales";

/// JSON data documents and translations
#[derive(Debug, Default)]
pub struct DataStore {
    /// Fallback language for translations
    default_language: String,
    /// Document name (file stem) -> document
    documents: IndexMap<String, Value>,
    /// lang -> translation table
    locales: HashMap<String, Value>,
}

impl DataStore {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: default_language.to_string(),
            ..Default::default()
        }
    }

    /// Load every document and locale table under `dir`.
    ///
    /// A missing directory is not an error. Files that fail to parse are
    /// skipped with a warning.
    pub fn load<P: AsRef<Path>>(dir: P, default_language: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new(default_language);

        if !dir.exists() {
            tracing::debug!("Data directory {:?} does not exist", dir);
            return Ok(store);
        }

        for (name, value) in read_json_dir(dir)? {
            store.documents.insert(name, value);
        }

        let locales_dir = dir.join(LOCALES_DIR);
        if locales_dir.exists() {
            for (lang, value) in read_json_dir(&locales_dir)? {
                store.locales.insert(lang, value);
            }
        }

        tracing::debug!(
            "Loaded {} data documents and {} locales from {:?}",
            store.documents.len(),
            store.locales.len(),
            dir
        );

        Ok(store)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Document names in load order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// A whole document by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.documents.get(name)
    }

    /// A value inside a document, addressed as "name.key.subkey"
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let (name, rest) = match path.split_once('.') {
            Some((name, rest)) => (name, Some(rest)),
            None => (path, None),
        };
        let document = self.documents.get(name)?;
        match rest {
            Some(rest) => get_nested_value(document, rest),
            None => Some(document),
        }
    }

    /// Languages with a translation table
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Translate a dotted key such as "nav.home".
    ///
    /// Falls back to the default language, then to the key itself.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        if let Some(value) = self.locales.get(lang).and_then(|t| get_nested_value(t, key)) {
            return value_to_string(value);
        }

        if lang != self.default_language {
            if let Some(value) = self
                .locales
                .get(&self.default_language)
                .and_then(|t| get_nested_value(t, key))
            {
                return value_to_string(value);
            }
        }

        key.to_string()
    }

    /// All strings for a language as a flat map with dotted keys, with the
    /// default language filling the gaps
    pub fn translations(&self, lang: &str) -> BTreeMap<String, String> {
        let mut result = BTreeMap::new();

        if let Some(table) = self.locales.get(lang) {
            flatten_translations(table, "", &mut result);
        }

        if lang != self.default_language {
            if let Some(table) = self.locales.get(&self.default_language) {
                let mut fallback = BTreeMap::new();
                flatten_translations(table, "", &mut fallback);
                for (k, v) in fallback {
                    result.entry(k).or_insert(v);
                }
            }
        }

        result
    }
}

/// Parse every `*.json` file directly inside `dir`, keyed by file stem
fn read_json_dir(dir: &Path) -> Result<Vec<(String, Value)>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read data file {:?}: {}", path, e);
                continue;
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => {
                tracing::debug!("Loaded data file: {:?}", path);
                documents.push((name.to_string(), value));
            }
            Err(e) => tracing::warn!("Failed to parse data file {:?}: {}", path, e),
        }
    }

    Ok(documents)
}

/// Get a nested value using dot notation. Numeric parts index arrays.
fn get_nested_value<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(data, |current, part| match current {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn flatten_translations(value: &Value, prefix: &str, result: &mut BTreeMap<String, String>) {
    let Value::Object(map) = value else {
        return;
    };

    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(_) => flatten_translations(value, &full_key, result),
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                result.insert(full_key, value_to_string(value));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        let data = dir.path();
        fs::create_dir_all(data.join("locales")).unwrap();
        fs::write(
            data.join("profile.json"),
            r#"{"name": "Ada", "links": [{"label": "GitHub", "url": "https://github.com/ada"}]}"#,
        )
        .unwrap();
        fs::write(data.join("navigation.json"), r#"[{"href": "/", "label": "home"}]"#).unwrap();
        fs::write(data.join("broken.json"), "{ not json").unwrap();
        fs::write(data.join("notes.txt"), "ignored").unwrap();
        fs::write(
            data.join("locales/fr.json"),
            r#"{"nav": {"home": "Accueil", "blog": "Blog"}, "footer": "Fait main"}"#,
        )
        .unwrap();
        fs::write(
            data.join("locales/en.json"),
            r#"{"nav": {"home": "Home"}}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_documents_by_name() {
        let dir = setup();
        let store = DataStore::load(dir.path(), "fr").unwrap();

        let names: Vec<_> = store.names().collect();
        assert_eq!(names, vec!["navigation", "profile"]);
        assert_eq!(store.get("profile").unwrap()["name"], json!("Ada"));
        assert!(store.get("broken").is_none());
        assert!(store.get("notes").is_none());
    }

    #[test]
    fn test_lookup_dotted_path() {
        let dir = setup();
        let store = DataStore::load(dir.path(), "fr").unwrap();

        assert_eq!(store.lookup("profile.name"), Some(&json!("Ada")));
        assert_eq!(store.lookup("profile.links.0.label"), Some(&json!("GitHub")));
        assert_eq!(store.lookup("navigation.0.href"), Some(&json!("/")));
        assert!(store.lookup("profile.missing").is_none());
        assert!(store.lookup("nope").is_none());
    }

    #[test]
    fn test_translate_with_fallback() {
        let dir = setup();
        let store = DataStore::load(dir.path(), "fr").unwrap();

        assert_eq!(store.languages(), vec!["en", "fr"]);
        assert_eq!(store.translate("en", "nav.home"), "Home");
        assert_eq!(store.translate("en", "nav.blog"), "Blog");
        assert_eq!(store.translate("de", "footer"), "Fait main");
        assert_eq!(store.translate("en", "nav.contact"), "nav.contact");
    }

    #[test]
    fn test_translations_flattened() {
        let dir = setup();
        let store = DataStore::load(dir.path(), "fr").unwrap();

        let all = store.translations("en");
        assert_eq!(all.get("nav.home"), Some(&"Home".to_string()));
        assert_eq!(all.get("nav.blog"), Some(&"Blog".to_string()));
        assert_eq!(all.get("footer"), Some(&"Fait main".to_string()));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = DataStore::load(dir.path().join("data"), "fr").unwrap();
        assert_eq!(store.names().count(), 0);
        assert_eq!(store.translate("fr", "nav.home"), "nav.home");
    }
}
