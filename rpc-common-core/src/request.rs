//! Outbound JSON-RPC call
//!
//! A [`Request`] is a shared handle: clones refer to the same message, so a
//! transport, a cache and the caller can all hold it while the response is
//! attached later. The request only keeps a weak reference to its
//! [`Response`]; the response keeps the request alive. Linking is mutual and
//! can start from either side:
//!
//! ```rust
//! use rpc_common_core::{Id, Params, Request, Response};
//!
//! let request = Request::new("foo", Params::default(), Some(Id::from(7)));
//! let response = Response::for_request(&request);
//!
//! assert_eq!(response.id(), Some(Id::from(7)));
//! assert!(request.response().unwrap().ptr_eq(&response));
//! ```
//!
//! # Concurrency
//!
//! Each handle guards its state with a lock, so handles can move between
//! threads. Locks are never held across a call into the other side of the
//! link. Two threads linking the same pair concurrently still race on which
//! link wins; callers serialize that themselves.

use crate::codec;
use crate::config::CodecConfig;
use crate::error::Result;
use crate::headers::Headers;
use crate::response::{Response, ResponseState};
use crate::types::{Id, Params};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

pub(crate) const JSONRPC_VERSION: &str = "2.0";

pub(crate) struct RequestState {
    pub(crate) jsonrpc: String,
    pub(crate) id: Option<Id>,
    pub(crate) method: String,
    pub(crate) params: Params,
    pub(crate) response: Option<Weak<RwLock<ResponseState>>>,
    pub(crate) headers: Headers,
}

/// JSON-RPC 2.0 request
///
/// No validation happens at construction: an empty method is accepted and
/// left for the consumer to reject.
///
/// # Examples
///
/// ```rust
/// use rpc_common_core::Request;
/// use serde_json::json;
///
/// let request = Request::try_new("sum", json!({"a": 1, "b": 2}), None).unwrap();
/// assert_eq!(request.to_wire(), json!({"jsonrpc": "2.0", "method": "sum", "params": {"a": 1, "b": 2}}));
/// ```
#[derive(Clone)]
pub struct Request {
    pub(crate) inner: Arc<RwLock<RequestState>>,
}

impl Request {
    /// Create a request
    ///
    /// `id: None` makes a notification.
    pub fn new(method: impl Into<String>, params: impl Into<Params>, id: Option<Id>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RequestState {
                jsonrpc: JSONRPC_VERSION.to_string(),
                id,
                method: method.into(),
                params: params.into(),
                response: None,
                headers: Headers::new(),
            })),
        }
    }

    /// Create a request from untyped params
    ///
    /// # Errors
    ///
    /// Returns an invalid params error when `params` is a scalar.
    pub fn try_new(method: impl Into<String>, params: Value, id: Option<Id>) -> Result<Self> {
        Ok(Self::new(method, Params::try_from(params)?, id))
    }

    /// Create a request that expects a response
    pub fn call(method: impl Into<String>, params: impl Into<Params>, id: impl Into<Id>) -> Self {
        Self::new(method, params, Some(id.into()))
    }

    /// Create a notification (no id)
    pub fn notification(method: impl Into<String>, params: impl Into<Params>) -> Self {
        Self::new(method, params, None)
    }

    /// Decode a request from a wire value
    ///
    /// # Errors
    ///
    /// See [`codec::decode_request`].
    pub fn from_wire(value: Value) -> Result<Self> {
        codec::request_from_value(value)
    }

    pub(crate) fn from_state(state: RequestState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Protocol version
    pub fn jsonrpc(&self) -> String {
        self.inner.read().jsonrpc.clone()
    }

    /// Correlation id; `None` when absent
    pub fn id(&self) -> Option<Id> {
        self.inner.read().id.clone()
    }

    /// Method name
    pub fn method(&self) -> String {
        self.inner.read().method.clone()
    }

    /// Snapshot of the params
    pub fn params(&self) -> Params {
        self.inner.read().params.clone()
    }

    /// Whether no response is expected (id absent or null)
    pub fn is_notification(&self) -> bool {
        matches!(self.inner.read().id, None | Some(Id::Null))
    }

    /// Insert or replace a single param
    pub fn set(&self, name: &str, value: impl Into<Value>) -> &Self {
        self.inner.write().params.insert(name, value.into());
        self
    }

    /// Remove a single param if present
    pub fn delete(&self, name: &str) -> &Self {
        self.inner.write().params.remove(name);
        self
    }

    /// Read a single param
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.read().params.get(name).cloned()
    }

    /// Read a single param, falling back to `default`
    pub fn get_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.get(name).unwrap_or_else(|| default.into())
    }

    /// Snapshot of the transport headers
    pub fn headers(&self) -> Headers {
        self.inner.read().headers.clone()
    }

    /// Access the transport headers mutably
    ///
    /// ```rust
    /// use rpc_common_core::{Params, Request};
    ///
    /// let request = Request::notification("ping", Params::default());
    /// request.with_headers(|h| h.set("X-Request-Id", "abc"));
    /// assert_eq!(request.headers().first("x_request_id"), Some("abc"));
    /// ```
    pub fn with_headers<R>(&self, f: impl FnOnce(&mut Headers) -> R) -> R {
        f(&mut self.inner.write().headers)
    }

    /// The attached response, if it is still alive
    pub fn response(&self) -> Option<Response> {
        self.inner
            .read()
            .response
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Response { inner })
    }

    pub(crate) fn has_response(&self) -> bool {
        self.inner
            .read()
            .response
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Attach a response
    ///
    /// The first live response wins: a different response passed while one
    /// is attached is not stored. If the response has no request yet, it is
    /// linked back to this one; a response that already belongs to a
    /// request keeps it.
    pub fn set_response(&self, response: &Response) -> &Self {
        let stored = {
            let mut state = self.inner.write();
            let current = state.response.as_ref().and_then(Weak::upgrade);
            match current {
                Some(current) if !Arc::ptr_eq(&current, &response.inner) => false,
                _ => {
                    state.response = Some(Arc::downgrade(&response.inner));
                    true
                }
            }
        };

        if !stored {
            tracing::debug!(method = %self.method(), "Request already has a response, keeping it");
        }

        match response.request() {
            None => {
                response.set_request(self);
            }
            Some(existing) if !existing.ptr_eq(self) => {
                tracing::debug!(method = %self.method(), "Response belongs to another request, keeping its link");
            }
            Some(_) => {}
        }

        self
    }

    /// Decode a wire response and attach it to this request
    ///
    /// The response takes this request's id, version and method. A request
    /// that already has a live response keeps it.
    ///
    /// # Errors
    ///
    /// See [`codec::decode_response`].
    pub fn resolve(&self, data: &str) -> Result<Response> {
        let response = codec::decode_response(data)?;
        self.set_response(&response);
        Ok(response)
    }

    /// Wire form using the default codec configuration
    pub fn to_wire(&self) -> Value {
        self.to_wire_with(&CodecConfig::default())
    }

    /// Wire form
    ///
    /// `params` is included only when non-empty; `id` follows
    /// `config.request_id`.
    pub fn to_wire_with(&self, config: &CodecConfig) -> Value {
        codec::request_to_value(&self.inner.read(), config)
    }

    /// Fingerprint of method and params using the default configuration
    ///
    /// Two requests with the same method and the same params serialization
    /// share a fingerprint regardless of their ids. Meant for cache and
    /// deduplication keys, not for security.
    pub fn fingerprint(&self) -> String {
        self.fingerprint_with(&CodecConfig::default())
    }

    /// Fingerprint of method and params
    pub fn fingerprint_with(&self, config: &CodecConfig) -> String {
        let state = self.inner.read();
        codec::fingerprint(&state.method, &state.params, config.fingerprint)
    }

    /// Whether two handles refer to the same request
    pub fn ptr_eq(&self, other: &Request) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("Request")
            .field("jsonrpc", &state.jsonrpc)
            .field("id", &state.id)
            .field("method", &state.method)
            .field("params", &state.params)
            .field("has_response", &state.response.as_ref().is_some_and(|w| w.strong_count() > 0))
            .field("headers", &state.headers)
            .finish()
    }
}

impl fmt::Display for Request {
    /// Wire JSON
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Request::from_wire(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdOmission;
    use serde_json::json;

    fn sum_request() -> Request {
        Request::try_new("sum", json!({"a": 1, "b": 2}), None).unwrap()
    }

    #[test]
    fn test_wire_without_id() {
        assert_eq!(
            sum_request().to_wire(),
            json!({"jsonrpc": "2.0", "method": "sum", "params": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn test_wire_key_order() {
        let request = Request::call("sum", vec![json!(1)], 9);
        assert_eq!(request.to_string(), r#"{"jsonrpc":"2.0","method":"sum","params":[1],"id":9}"#);
    }

    #[test]
    fn test_empty_params_omitted() {
        let request = Request::call("ping", Params::default(), "p1");
        assert_eq!(request.to_wire(), json!({"jsonrpc": "2.0", "method": "ping", "id": "p1"}));
    }

    #[test]
    fn test_empty_method_accepted() {
        let request = Request::notification("", Params::default());
        assert_eq!(request.method(), "");
        assert_eq!(request.to_wire(), json!({"jsonrpc": "2.0", "method": ""}));
    }

    #[test]
    fn test_falsy_ids_omitted_by_default() {
        for id in [Id::from(0), Id::String(String::new()), Id::Null] {
            let request = Request::new("m", Params::default(), Some(id));
            assert!(request.to_wire().get("id").is_none());
        }
    }

    #[test]
    fn test_strict_id_omission() {
        let config = CodecConfig::new().with_request_id(IdOmission::Absent);

        let zero = Request::call("m", Params::default(), 0);
        assert_eq!(zero.to_wire_with(&config)["id"], json!(0));

        let null = Request::new("m", Params::default(), Some(Id::Null));
        assert_eq!(null.to_wire_with(&config)["id"], Value::Null);

        let absent = Request::notification("m", Params::default());
        assert!(absent.to_wire_with(&config).get("id").is_none());
    }

    #[test]
    fn test_set_get_delete_chain() {
        let request = Request::notification("m", Params::default());
        request.set("a", 1).set("b", "two").delete("a");

        assert_eq!(request.get("a"), None);
        assert_eq!(request.get("b"), Some(json!("two")));
        assert_eq!(request.get_or("missing", 5), json!(5));
        assert_eq!(request.params().len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let request = sum_request();
        let clone = request.clone();
        clone.set("c", 3);

        assert_eq!(request.get("c"), Some(json!(3)));
        assert!(request.ptr_eq(&clone));
    }

    #[test]
    fn test_notification() {
        assert!(Request::notification("n", Params::default()).is_notification());
        assert!(Request::new("n", Params::default(), Some(Id::Null)).is_notification());
        assert!(!Request::call("n", Params::default(), 1).is_notification());
    }

    #[test]
    fn test_try_new_rejects_scalar() {
        assert!(Request::try_new("m", json!("scalar"), None).is_err());
    }

    #[test]
    fn test_fingerprint_shape() {
        let fingerprint = sum_request().fingerprint();
        assert_eq!(fingerprint.len(), 32);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_changes_with_params() {
        let request = sum_request();
        let before = request.fingerprint();
        request.set("c", 3);
        assert_ne!(before, request.fingerprint());
    }

    #[test]
    fn test_serde_round_trip_through_wire() {
        let request = Request::call("sum", vec![json!(1), json!(2)], "abc");
        let text = serde_json::to_string(&request).unwrap();
        let decoded: Request = serde_json::from_str(&text).unwrap();

        assert_eq!(decoded.method(), "sum");
        assert_eq!(decoded.id(), Some(Id::from("abc")));
        assert_eq!(decoded.params(), request.params());
    }

    #[test]
    fn test_headers_travel_with_handle() {
        let request = sum_request();
        request.with_headers(|h| h.set("Authorization", "Bearer t"));

        assert_eq!(request.clone().headers().first("authorization"), Some("Bearer t"));
        assert!(request.to_wire().get("headers").is_none());
    }
}
