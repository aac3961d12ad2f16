//! Transport headers carried alongside a message
//!
//! [`Headers`] is a case-insensitive, multi-valued map. Names are normalized
//! on every write and lookup: lowercased, with `_` turned into `-`, so
//! `Content-Type`, `content_type` and `CONTENT-TYPE` all address the same
//! entry. Headers are not part of the JSON-RPC envelope; a transport moves
//! them on its own.
//!
//! # Examples
//!
//! ```rust
//! use rpc_common_core::Headers;
//!
//! let mut headers = Headers::new();
//! headers.set("Content-Type", "application/json");
//! headers.append("X_Trace", ["a", "b"]);
//!
//! assert_eq!(headers.first("content_type"), Some("application/json"));
//! assert_eq!(headers.get_all("x-trace"), ["a", "b"]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Normalize a header name: lowercase, `_` becomes `-`
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Conversion of a single value or a sequence into header values
pub trait IntoHeaderValues {
    /// Produce the ordered list of values
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T: Into<String>> IntoHeaderValues for Vec<T> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<String>, const N: usize> IntoHeaderValues for [T; N] {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Clone + Into<String>> IntoHeaderValues for &[T] {
    fn into_header_values(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

/// Case-insensitive multimap of header name to values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct Headers {
    entries: BTreeMap<String, Vec<String>>,
}

impl Headers {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, keyed by normalized name
    pub fn all(&self) -> BTreeMap<String, Vec<String>> {
        self.entries.clone()
    }

    /// First value of a header
    ///
    /// `None` when the header is missing or has no values.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&normalize_name(name))
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value of a header, or `default`
    pub fn first_or(&self, name: &str, default: impl Into<String>) -> String {
        self.first(name).map(str::to_string).unwrap_or_else(|| default.into())
    }

    /// All values of a header; empty when the header is missing
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .get(&normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All values of a header, or `[default]` when the header is missing
    ///
    /// A header that exists with no values yields an empty list.
    pub fn get_all_or(&self, name: &str, default: impl Into<String>) -> Vec<String> {
        match self.entries.get(&normalize_name(name)) {
            Some(values) => values.clone(),
            None => vec![default.into()],
        }
    }

    /// Set a header, discarding previous values
    pub fn set(&mut self, name: &str, values: impl IntoHeaderValues) {
        self.set_with(name, values, true);
    }

    /// Append values to a header, creating it if needed
    pub fn append(&mut self, name: &str, values: impl IntoHeaderValues) {
        self.set_with(name, values, false);
    }

    /// Set a header, replacing or appending depending on `replace`
    pub fn set_with(&mut self, name: &str, values: impl IntoHeaderValues, replace: bool) {
        let values = values.into_header_values();
        let key = normalize_name(name);

        match self.entries.entry(key) {
            btree_map::Entry::Occupied(mut entry) if !replace => entry.get_mut().extend(values),
            btree_map::Entry::Occupied(mut entry) => {
                entry.insert(values);
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(values);
            }
        }
    }

    /// Set every header in `headers`, replacing existing values
    pub fn add<K, V, I>(&mut self, headers: I)
    where
        K: AsRef<str>,
        V: IntoHeaderValues,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, values) in headers {
            self.set(name.as_ref(), values);
        }
    }

    /// Whether a header is present
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Remove a header and all its values
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries.remove(&normalize_name(name))
    }

    /// Number of distinct headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, values)` entries
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: IntoHeaderValues,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.add(iter);
        headers
    }
}

impl From<BTreeMap<String, Vec<String>>> for Headers {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Headers> for BTreeMap<String, Vec<String>> {
    fn from(headers: Headers) -> Self {
        headers.entries
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Headers {
    type Item = (String, Vec<String>);
    type IntoIter = btree_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "http")]
mod http_interop {
    use super::Headers;
    use http::header::{HeaderMap, HeaderName, HeaderValue};

    impl From<&HeaderMap> for Headers {
        /// Values that are not visible ASCII are skipped.
        fn from(map: &HeaderMap) -> Self {
            let mut headers = Headers::new();
            for (name, value) in map {
                match value.to_str() {
                    Ok(value) => headers.append(name.as_str(), value),
                    Err(_) => tracing::debug!(header = %name, "Skipping non-ASCII header value"),
                }
            }
            headers
        }
    }

    impl Headers {
        /// Build an HTTP header map
        ///
        /// Entries whose name or value is not valid HTTP are skipped.
        pub fn to_header_map(&self) -> HeaderMap {
            let mut map = HeaderMap::new();
            for (name, values) in self {
                let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
                    tracing::debug!(header = %name, "Skipping invalid header name");
                    continue;
                };
                for value in values {
                    match HeaderValue::from_str(value) {
                        Ok(value) => {
                            map.append(header_name.clone(), value);
                        }
                        Err(_) => tracing::debug!(header = %name, "Skipping invalid header value"),
                    }
                }
            }
            map
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Content_Type"), "content-type");
        assert_eq!(normalize_name("X-Request-ID"), "x-request-id");
        assert_eq!(normalize_name("ÄCCEPT"), "äccept");
    }

    #[test]
    fn test_set_then_get_normalized() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");

        assert_eq!(headers.first("content_type"), Some("application/json"));
        assert_eq!(headers.all().keys().collect::<Vec<_>>(), vec!["content-type"]);
    }

    #[test]
    fn test_replace_and_append() {
        let mut headers = Headers::new();
        headers.set("Accept", vec!["text/html", "text/plain"]);
        headers.append("accept", "application/json");
        assert_eq!(headers.get_all("ACCEPT"), ["text/html", "text/plain", "application/json"]);

        headers.set("accept", "*/*");
        assert_eq!(headers.get_all("accept"), ["*/*"]);

        headers.set_with("accept", "text/csv", false);
        assert_eq!(headers.get_all("accept"), ["*/*", "text/csv"]);
    }

    #[test]
    fn test_missing_header_defaults() {
        let headers = Headers::new();

        assert_eq!(headers.first("x-missing"), None);
        assert_eq!(headers.first_or("x-missing", "fallback"), "fallback");
        assert!(headers.get_all("x-missing").is_empty());
        assert_eq!(headers.get_all_or("x-missing", "fallback"), vec!["fallback"]);
    }

    #[test]
    fn test_present_but_empty_header() {
        let mut headers = Headers::new();
        headers.set("X-Empty", Vec::<String>::new());

        assert!(headers.has("x_empty"));
        assert_eq!(headers.first("x-empty"), None);
        assert_eq!(headers.first_or("x-empty", "fallback"), "fallback");
        assert!(headers.get_all_or("x-empty", "fallback").is_empty());
    }

    #[test]
    fn test_add_replaces() {
        let mut headers = Headers::new();
        headers.set("a", "1");
        headers.add([("A", vec!["2"]), ("B_c", vec!["3", "4"])]);

        assert_eq!(headers.get_all("a"), ["2"]);
        assert_eq!(headers.get_all("b-c"), ["3", "4"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_has_and_remove() {
        let mut headers: Headers = [("X-Token", "abc")].into_iter().collect();

        assert!(headers.has("x_token"));
        assert_eq!(headers.remove("X_TOKEN"), Some(vec!["abc".to_string()]));
        assert!(!headers.has("x-token"));
        assert!(headers.is_empty());
        assert_eq!(headers.remove("x-token"), None);
    }

    #[test]
    fn test_iteration() {
        let headers: Headers = [("b", "2"), ("a", "1")].into_iter().collect();

        let names: Vec<&String> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);

        let mut count = 0;
        for (_, values) in &headers {
            count += values.len();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let headers: Headers = serde_json::from_str(r#"{"Content_Type":["text/plain"]}"#).unwrap();
        assert_eq!(headers.first("content-type"), Some("text/plain"));

        let serialized = serde_json::to_string(&headers).unwrap();
        assert_eq!(serialized, r#"{"content-type":["text/plain"]}"#);
    }
}
