//! Value types shared by requests and responses
//!
//! - **Id**: correlation identifier (string, number or null)
//! - **Params**: positional or keyed method parameters, never a scalar
//! - **ErrorCode**: integer or string code of a JSON-RPC error
//!
//! # Params
//!
//! Params behave like an ordered array that is either a list addressed by
//! decimal indices or an insertion-ordered object. Keyed writes to a list
//! that do not extend it turn the list into an object keyed `"0".."n-1"`,
//! so the JSON form always matches what was written.

use crate::error::{Error, ErrorObject};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// JSON-RPC 2.0 request ID
///
/// Whether a message has an id at all is tracked separately
/// (`Option<Id>`); `Id::Null` is an explicit `null`.
///
/// # Examples
///
/// ```rust
/// use rpc_common_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
/// let id3: Id = serde_json::from_str("1.5").unwrap();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// assert_eq!(id3.to_string(), "1.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier, integer or float
    Number(Number),
    /// Explicit null identifier
    Null,
}

impl Id {
    /// Whether the id is `null`, `0` or the empty string
    ///
    /// Falsy ids are dropped from request envelopes under
    /// [`IdOmission::Falsy`](crate::IdOmission::Falsy).
    pub fn is_falsy(&self) -> bool {
        match self {
            Id::String(s) => s.is_empty(),
            Id::Number(n) => n.as_f64() == Some(0.0),
            Id::Null => true,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i32> for Id {
    fn from(n: i32) -> Self {
        Id::Number(n.into())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n.into())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n.into())
    }
}

impl From<Number> for Id {
    fn from(n: Number) -> Self {
        Id::Number(n)
    }
}

/// Code of a JSON-RPC error, integer or string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    /// Integer code, the usual form
    Number(i64),
    /// String code used by some servers
    Text(String),
}

impl ErrorCode {
    /// Integer value of the code, if it is numeric
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ErrorCode::Number(n) => Some(*n),
            ErrorCode::Text(_) => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Number(n) => write!(f, "{}", n),
            ErrorCode::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(n: i32) -> Self {
        ErrorCode::Number(n.into())
    }
}

impl From<i64> for ErrorCode {
    fn from(n: i64) -> Self {
        ErrorCode::Number(n)
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        ErrorCode::Text(s.to_string())
    }
}

impl From<String> for ErrorCode {
    fn from(s: String) -> Self {
        ErrorCode::Text(s)
    }
}

/// Method parameters
///
/// # Examples
///
/// ```rust
/// use rpc_common_core::Params;
/// use serde_json::json;
///
/// let mut params = Params::try_from(json!({"a": 1})).unwrap();
/// params.insert("b", json!(2));
/// assert_eq!(params.to_string(), r#"{"a":1,"b":2}"#);
///
/// assert!(Params::try_from(json!(42)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Positional parameters
    Array(Vec<Value>),
    /// Named parameters, in insertion order
    Object(Map<String, Value>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Array(Vec::new())
    }
}

impl Params {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Params::Array(items) => items.len(),
            Params::Object(map) => map.len(),
        }
    }

    /// Whether there are no entries (omitted from the wire)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an entry by name; list entries are addressed by index
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Params::Array(items) => list_index(name).and_then(|i| items.get(i)),
            Params::Object(map) => map.get(name),
        }
    }

    /// Whether an entry with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace an entry
    ///
    /// On a list, `name == len` appends and `name < len` replaces in place.
    /// Any other name turns the list into an object first. An object whose
    /// keys end up exactly `"0".."n-1"` in order becomes a list again.
    pub fn insert(&mut self, name: &str, value: Value) {
        if let Params::Array(items) = self {
            match list_index(name) {
                Some(index) if index < items.len() => {
                    items[index] = value;
                    return;
                }
                Some(index) if index == items.len() => {
                    items.push(value);
                    return;
                }
                _ => self.make_keyed(),
            }
        }

        if let Params::Object(map) = self {
            map.insert(name.to_string(), value);
        }
        self.make_list();
    }

    /// Remove an entry, returning it
    ///
    /// Removing the last entry of a list keeps it a list; removing any other
    /// index leaves a gap, so the remainder becomes an object keyed by the
    /// surviving indices. As with [`insert`](Self::insert), an object keyed
    /// `"0".."n-1"` in order becomes a list again.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        match self {
            Params::Array(items) => {
                let index = list_index(name).filter(|i| *i < items.len())?;
                if index + 1 == items.len() {
                    return items.pop();
                }
                self.make_keyed();
                self.remove(name)
            }
            Params::Object(map) => {
                let removed = map.shift_remove(name);
                self.make_list();
                removed
            }
        }
    }

    /// Iterate over `(name, value)` pairs in order
    pub fn iter(&self) -> Box<dyn Iterator<Item = (String, &Value)> + '_> {
        match self {
            Params::Array(items) => Box::new(items.iter().enumerate().map(|(i, v)| (i.to_string(), v))),
            Params::Object(map) => Box::new(map.iter().map(|(k, v)| (k.clone(), v))),
        }
    }

    /// Copy of the params with top-level keys sorted
    ///
    /// Lists are returned unchanged.
    pub fn sorted(&self) -> Params {
        match self {
            Params::Array(_) => self.clone(),
            Params::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                Params::Object(entries.into_iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
        }
    }

    /// Convert into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            Params::Array(items) => Value::Array(items),
            Params::Object(map) => Value::Object(map),
        }
    }

    fn make_keyed(&mut self) {
        if let Params::Array(items) = self {
            let map = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *self = Params::Object(map);
        }
    }

    fn make_list(&mut self) {
        if let Params::Object(map) = self {
            let sequential = map.keys().enumerate().all(|(i, key)| list_index(key) == Some(i));
            if sequential {
                let items = std::mem::take(map).into_iter().map(|(_, v)| v).collect();
                *self = Params::Array(items);
            }
        }
    }
}

/// Position addressed by `name` in a list
///
/// Only canonical decimal names qualify: no sign and no leading zero, so
/// `"01"` and `"+1"` are plain keys.
pub(crate) fn list_index(name: &str) -> Option<usize> {
    let canonical = name == "0" || (name.starts_with(|c: char| matches!(c, '1'..='9')) && name.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        name.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for Params {
    /// Compact JSON, keys in insertion order
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Params::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Params::Object(map) => write!(f, "{}", Value::Object(map.clone())),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(items: Vec<Value>) -> Self {
        Params::Array(items)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Object(map)
    }
}

impl TryFrom<Value> for Params {
    type Error = Error;

    /// Arrays and objects convert, `null` becomes empty params, scalars are
    /// rejected with an invalid params error.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(Params::Array(items)),
            Value::Object(map) => Ok(Params::Object(map)),
            Value::Null => Ok(Params::default()),
            other => Err(Error::JsonRpc(ErrorObject::invalid_params(format!(
                "Params must be an array or an object, got {}",
                other
            )))),
        }
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        params.into_value()
    }
}
