//! View and label-key registry.
//!
//! Sitemap sources name views and label keys as plain strings. The registry is
//! the explicit table those names are checked against: which views exist in
//! which namespace (and whether they are page views), and which label-key
//! types exist together with the key names each one defines.
//!
//! A registry is either built in code:
//!
//! ```text
//! Registry::new()
//!     .with_page_view("app.views", "HomeView")
//!     .with_key_type(KeyType::enumeration("LabelKey").localizable().with_names(["Home"]))
//! ```
//!
//! or read from JSON (see [`Registry::from_json`]):
//!
//! ```json
//! {
//!   "views": { "app.views.HomeView": { "page_view": true } },
//!   "label_keys": { "LabelKey": { "shape": "enumeration", "localizable": true, "names": ["Home"] } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Failure to load a registry file.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unable to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("registry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a configured label-key type cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyTypeError {
    #[error("label key type '{0}' is not registered")]
    NotFound(String),
    #[error("label key type '{0}' is not an enumeration")]
    NotEnumeration(String),
    #[error("label key type '{0}' is not a localizable key")]
    NotLocalizable(String),
}

/// Fully qualified view identifier, `<namespace>.<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(namespace: &str, name: &str) -> Self {
        ViewId(qualify(namespace, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved label key: the key type plus the member name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelKey {
    pub key_type: String,
    pub name: String,
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.key_type, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    /// Whether the view can be shown as a page.
    #[serde(default = "yes")]
    pub page_view: bool,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyShape {
    #[default]
    Enumeration,
    Other,
}

/// A label-key type and the key names it defines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyType {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub shape: KeyShape,
    #[serde(default)]
    pub localizable: bool,
    #[serde(default)]
    pub names: BTreeSet<String>,
}

impl KeyType {
    pub fn enumeration(name: &str) -> Self {
        KeyType { name: name.to_string(), shape: KeyShape::Enumeration, ..Default::default() }
    }

    pub fn other(name: &str) -> Self {
        KeyType { name: name.to_string(), shape: KeyShape::Other, ..Default::default() }
    }

    pub fn localizable(mut self) -> Self {
        self.localizable = true;
        self
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Exact-name lookup of a member.
    pub fn key_for(&self, name: &str) -> Option<LabelKey> {
        self.names.contains(name).then(|| LabelKey { key_type: self.name.clone(), name: name.to_string() })
    }
}

/// Views and label-key types known to the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    views: BTreeMap<String, ViewDescriptor>,
    #[serde(default)]
    label_keys: BTreeMap<String, KeyType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        let mut registry: Registry = serde_json::from_str(text)?;
        for (name, key_type) in registry.label_keys.iter_mut() {
            key_type.name = name.clone();
        }
        Ok(registry)
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| RegistryError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&text)
    }

    pub fn with_view(mut self, namespace: &str, name: &str, page_view: bool) -> Self {
        self.views.insert(qualify(namespace, name), ViewDescriptor { page_view });
        self
    }

    pub fn with_page_view(self, namespace: &str, name: &str) -> Self {
        self.with_view(namespace, name, true)
    }

    pub fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.label_keys.insert(key_type.name.clone(), key_type);
        self
    }

    pub fn view(&self, namespace: &str, name: &str) -> Option<&ViewDescriptor> {
        self.views.get(&qualify(namespace, name))
    }

    /// Check that `name` is a usable label-key type: registered, an
    /// enumeration, and localizable, in that order.
    ///
    /// Only the first failing check is reported. A type that is neither an
    /// enumeration nor localizable yields `NotEnumeration` alone.
    pub fn key_type(&self, name: &str) -> Result<&KeyType, KeyTypeError> {
        let key_type = self.label_keys.get(name).ok_or_else(|| KeyTypeError::NotFound(name.to_string()))?;
        if key_type.shape != KeyShape::Enumeration {
            return Err(KeyTypeError::NotEnumeration(name.to_string()));
        }
        if !key_type.localizable {
            return Err(KeyTypeError::NotLocalizable(name.to_string()));
        }
        Ok(key_type)
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() { name.to_string() } else { format!("{namespace}.{name}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_checks_in_order() {
        let registry = Registry::new()
            .with_key_type(KeyType::enumeration("Labels").localizable())
            .with_key_type(KeyType::other("Loose").localizable())
            .with_key_type(KeyType::enumeration("Plain"))
            .with_key_type(KeyType::other("Bare"));

        assert!(registry.key_type("Labels").is_ok());
        assert_eq!(registry.key_type("Nope"), Err(KeyTypeError::NotFound("Nope".into())));
        assert_eq!(registry.key_type("Loose"), Err(KeyTypeError::NotEnumeration("Loose".into())));
        assert_eq!(registry.key_type("Plain"), Err(KeyTypeError::NotLocalizable("Plain".into())));
        assert_eq!(registry.key_type("Bare"), Err(KeyTypeError::NotEnumeration("Bare".into())));
    }

    #[test]
    fn json_registry_names_its_key_types() {
        let registry = Registry::from_json(
            r#"{
                "views": { "app.HomeView": {}, "app.Widget": { "page_view": false } },
                "label_keys": { "LabelKey": { "shape": "enumeration", "localizable": true, "names": ["Home"] } }
            }"#,
        )
        .unwrap();

        assert_eq!(registry.view("app", "HomeView"), Some(&ViewDescriptor { page_view: true }));
        assert_eq!(registry.view("app", "Widget"), Some(&ViewDescriptor { page_view: false }));
        let key = registry.key_type("LabelKey").unwrap().key_for("Home").unwrap();
        assert_eq!(key.to_string(), "LabelKey.Home");
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(Registry::from_json("{ views: "), Err(RegistryError::Json(_))));
    }
}
