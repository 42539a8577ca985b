//! Case-insensitive ordered header list used on the wire side

use serde::Serialize;

use crate::models::Header;

/// Ordered header map. Names compare case-insensitively and the last write wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn new() -> Self {
        HeaderList(Vec::new())
    }

    /// Set a header, replacing any earlier value under the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.0.push((name, value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Apply every active row in order
    pub fn extend_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a Header>) {
        for row in rows.into_iter().filter(|r| r.is_active()) {
            self.set(row.key.clone(), row.value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Apply the body's content-type hint unless a content-type is already set
pub fn merge_headers(headers: &mut HeaderList, content_type_hint: Option<&str>) {
    if let Some(hint) = content_type_hint {
        if !headers.contains("content-type") {
            headers.set("Content-Type", hint);
        }
    }
}
