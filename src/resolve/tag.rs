//! Tag descriptors and their attributes.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::utils::html;

/// What a descriptor loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// `<script src>` for an entry file
    File,
    /// `<link rel="stylesheet">`
    Css,
    /// `<link rel="modulepreload">` for a statically imported chunk
    Import,
}

/// An attribute value: text, or a boolean attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Ordered attribute list.
///
/// Setting an existing name replaces its value in place, so merged lists
/// keep the position of the first occurrence and the value of the last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(String, AttrValue)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `set`.
    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Apply every attribute of `other` on top of this list.
    pub fn merge(&mut self, other: &Attrs) {
        for (name, value) in &other.0 {
            self.set(name, value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as ` name="value"` pairs; `true` is a bare attribute and
    /// `false` is left out.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.0 {
            match value {
                AttrValue::Text(text) => html::push_attr(&mut out, name, Some(text)),
                AttrValue::Flag(true) => html::push_attr(&mut out, name, None),
                AttrValue::Flag(false) => {}
            }
        }
        out
    }
}

impl<K: AsRef<str>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name.as_ref(), value);
        }
        attrs
    }
}

impl Serialize for Attrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One resolved element to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDescriptor {
    pub kind: TagKind,
    /// Dedupe key: manifest key for `File`, output path otherwise
    pub key: String,
    pub url: String,
    pub attrs: Attrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
}
