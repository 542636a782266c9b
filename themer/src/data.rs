//! The data context shared by every parser during a render
//!
//! Data is an ordered map from keys to [`Value`]s. It is filled from YAML files found on a
//! list of search paths: each [`Data::load`] merges one file over what is already there,
//! and a file is never merged twice. Language files are special: [`Data::load_lang`]
//! replaces the `lang` key outright instead of merging into it.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::error::{Result, ThemerError};

/// Key holding the active language strings
pub const LANG_KEY: &str = "lang";

/// Directory below each search path holding `<locale>.yml` files
const LOCALES_DIR: &str = "locales";

/// Ordered map of named values
pub type Map = IndexMap<String, Value>;

/// A value in the data context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Map(Map),
    List(Vec<Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Empty text, an empty map and an empty list are all empty
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::List(list) => list.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

/// Converts YAML scalars to the text a theme would print for them
impl From<serde_yaml::Value> for Value {
    fn from(yaml: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match yaml {
            Yaml::Null => Value::Text(String::new()),
            Yaml::Bool(true) => Value::Text("1".to_string()),
            Yaml::Bool(false) => Value::Text(String::new()),
            Yaml::Number(number) => Value::Text(number.to_string()),
            Yaml::String(text) => Value::Text(text),
            Yaml::Sequence(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Yaml::Mapping(mapping) => Value::Map(
                mapping
                    .into_iter()
                    .filter_map(|(key, value)| Some((yaml_key(key)?, Value::from(value))))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// Scalar YAML keys become strings, anything else is dropped
fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(key) => Some(key),
        serde_yaml::Value::Number(key) => Some(key.to_string()),
        serde_yaml::Value::Bool(key) => Some(key.to_string()),
        other => {
            log::warn!("ignoring non-scalar data key {other:?}");
            None
        }
    }
}

/// Merges `from` into `into`; nested maps merge, anything else overwrites in place
fn merge(into: &mut Map, from: Map) {
    for (key, value) in from {
        if let Value::Map(incoming) = value {
            if let Some(Value::Map(existing)) = into.get_mut(&key) {
                merge(existing, incoming);
                continue;
            }
            into.insert(key, Value::Map(incoming));
        } else {
            into.insert(key, value);
        }
    }
}

/// Reads a YAML file whose top level is a mapping
fn read_yaml(path: &Path) -> Result<Map> {
    let content = fs::read_to_string(path).map_err(|err| ThemerError::invalid_data(path, err))?;
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| ThemerError::invalid_data(path, err))?;
    match Value::from(yaml) {
        Value::Map(map) => Ok(map),
        // an empty document
        Value::Text(text) if text.is_empty() => Ok(Map::new()),
        _ => Err(ThemerError::invalid_data(path, "expected a mapping at the top level")),
    }
}

/// The data context
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Data {
    values: Map,
    paths: Vec<PathBuf>,
    loaded: HashSet<PathBuf>,
}

impl Data {
    /// Creates an empty context with no search paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context searching the data bundled with this crate
    pub fn bundled() -> Self {
        let mut data = Self::new();
        data.add_path(Self::bundled_path());
        data
    }

    /// Directory of the data files bundled with this crate
    pub fn bundled_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    /// Appends a directory to search for data files
    pub fn add_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Resolves a data file name against the search paths, in order
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = Path::new(name);
        if name.is_absolute() {
            return name.is_file().then(|| name.to_path_buf());
        }
        self.paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }

    fn canonical(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    /// Merges a YAML data file into the context.
    ///
    /// Loading a file that was already merged does nothing.
    pub fn load(&mut self, name: &str) -> Result<()> {
        let path = self
            .resolve(name)
            .ok_or_else(|| ThemerError::DataNotFound(name.to_string()))?;
        let canonical = Self::canonical(&path);
        if self.loaded.contains(&canonical) {
            log::debug!("data file {} already loaded", canonical.display());
            return Ok(());
        }

        let map = read_yaml(&path)?;
        log::debug!("merging {} key(s) from {}", map.len(), path.display());
        merge(&mut self.values, map);
        self.loaded.insert(canonical);
        Ok(())
    }

    /// Whether the file at `path` has been merged into the context
    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        self.loaded.contains(&Self::canonical(path.as_ref()))
    }

    /// Replaces the `lang` key with the strings of a locale
    pub fn load_lang(&mut self, locale: &str) -> Result<()> {
        let path = self
            .resolve(&format!("{LOCALES_DIR}/{locale}.yml"))
            .ok_or_else(|| ThemerError::UnsupportedLanguage(locale.to_string()))?;
        let strings = read_yaml(&path)?;
        log::debug!("loaded {} string(s) for locale {locale}", strings.len());
        self.values.insert(LANG_KEY.to_string(), Value::Map(strings));
        Ok(())
    }

    /// Lists the locales available on the search paths
    pub fn available_locales(&self) -> Vec<String> {
        let mut locales = BTreeSet::new();
        for dir in &self.paths {
            let dir = dir.join(LOCALES_DIR);
            if !dir.is_dir() {
                continue;
            }
            let files = WalkDir::new(&dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file());
            for entry in files {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "yml") {
                    if let Some(stem) = path.file_stem() {
                        locales.insert(stem.to_string_lossy().into_owned());
                    }
                }
            }
        }
        locales.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns a text value, if the key holds one
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets a value, returning the one it replaced.
    ///
    /// A key already present keeps its position.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Result<Option<Value>> {
        if key.is_empty() {
            return Err(ThemerError::MissingKey);
        }
        Ok(self.values.insert(key.to_string(), value.into()))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn as_map(&self) -> &Map {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn data_in(dir: &TempDir) -> Data {
        let mut data = Data::new();
        data.add_path(dir.path());
        data
    }

    #[test]
    fn loads_yaml_into_the_context() {
        let dir = TempDir::new().unwrap();
        write(&dir, "defaults.yml", "Title: My Blog\nPosts:\n  - Title: First\nCount: 3\nPrivate: false\n");

        let mut data = data_in(&dir);
        data.load("defaults.yml").unwrap();

        assert_eq!(data.text("Title"), Some("My Blog"));
        assert_eq!(data.text("Count"), Some("3"));
        assert_eq!(data.text("Private"), Some(""));
        let posts = data.get("Posts").and_then(Value::as_list).unwrap();
        assert_eq!(posts[0].as_map().and_then(|p| p.get("Title")), Some(&Value::from("First")));
    }

    #[test]
    fn caches_previously_loaded_files() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "defaults.yml", "Title: Original\n");

        let mut data = data_in(&dir);
        data.load("defaults.yml").unwrap();
        data.insert("Title", "Changed").unwrap();
        data.load("defaults.yml").unwrap();

        assert!(data.is_loaded(&path));
        assert_eq!(data.text("Title"), Some("Changed"));
    }

    #[test]
    fn later_loads_merge_over_earlier_ones() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yml", "First: a\nGroup:\n  One: a\n  Two: a\nLast: a\n");
        write(&dir, "b.yml", "Group:\n  Two: b\n  Three: b\nFirst: b\n");

        let mut data = data_in(&dir);
        data.load("a.yml").unwrap();
        data.load("b.yml").unwrap();

        let keys: Vec<_> = data.as_map().keys().cloned().collect();
        assert_eq!(keys, vec!["First", "Group", "Last"]);
        assert_eq!(data.text("First"), Some("b"));

        let group = data.get("Group").and_then(Value::as_map).unwrap();
        let group: Vec<_> = group.iter().map(|(k, v)| (k.as_str(), v.as_text().unwrap())).collect();
        assert_eq!(group, vec![("One", "a"), ("Two", "b"), ("Three", "b")]);
    }

    #[test]
    fn is_map_accessible() {
        let mut data = Data::new();
        data.insert("new-index", "Hello World!").unwrap();
        assert!(data.contains_key("new-index"));

        assert_eq!(data.remove("new-index"), Some(Value::from("Hello World!")));
        assert!(!data.contains_key("new-index"));
        assert_eq!(data.get("undefined"), None);
    }

    #[test]
    fn rejects_values_without_a_key() {
        let mut data = Data::new();
        assert!(matches!(data.insert("", "value"), Err(ThemerError::MissingKey)));
    }

    #[test]
    fn fails_on_non_existent_data_files() {
        let err = Data::bundled().load("some-fake-file.yml").unwrap_err();
        assert!(err.to_string().starts_with("Data file not found"));
    }

    #[test]
    fn fails_on_malformed_data_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.yml", "Title: [unclosed\n");
        let err = data_in(&dir).load("broken.yml").unwrap_err();
        assert!(matches!(err, ThemerError::DataInvalid { .. }));
    }

    #[test]
    fn language_loads_replace_rather_than_merge() {
        let dir = TempDir::new().unwrap();
        write(&dir, "locales/en.yml", "About: About\nArchive: Archive\n");
        write(&dir, "locales/fr.yml", "About: À propos\n");

        let mut data = data_in(&dir);
        data.load_lang("en").unwrap();
        data.load_lang("fr").unwrap();

        let lang = data.get(LANG_KEY).and_then(Value::as_map).unwrap();
        assert_eq!(lang.len(), 1);
        assert_eq!(lang.get("About"), Some(&Value::from("À propos")));
        assert_eq!(data.available_locales(), vec!["en", "fr"]);
    }

    #[test]
    fn fails_on_unsupported_languages() {
        let err = Data::bundled().load_lang("some-fake-file").unwrap_err();
        assert!(err.to_string().starts_with("Language is not supported"));
    }

    #[test]
    fn bundles_english() {
        let mut data = Data::bundled();
        data.load_lang("en").unwrap();
        assert!(data.available_locales().contains(&"en".to_string()));
        let lang = data.get(LANG_KEY).and_then(Value::as_map).unwrap();
        assert!(lang.contains_key("About"));
    }
}
