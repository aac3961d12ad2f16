//! Result of executing a request
//!
//! A [`Response`] holds either a result value or an error object, never
//! both: the two are variants of [`Outcome`]. Setting an error code switches
//! the response to the error outcome, and the error wins from then on: a
//! result set later is kept aside until [`Response::clear_error`]. An error
//! message or data set before the code is kept and attached once the code
//! arrives, so the setters can be called in any order.
//!
//! # Examples
//!
//! ```rust
//! use rpc_common_core::Response;
//! use serde_json::json;
//!
//! let response = Response::new();
//! response.set_id("x1").set_result(42);
//! assert_eq!(response.to_wire(), json!({"jsonrpc": "2.0", "result": 42, "id": "x1"}));
//!
//! let failed = Response::new();
//! failed.set_error_code(-32601).set_error_message("Method not found");
//! assert_eq!(
//!     failed.to_string(),
//!     r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":null}"#
//! );
//! ```

use crate::codec;
use crate::error::{ErrorObject, Result};
use crate::headers::Headers;
use crate::request::{Request, JSONRPC_VERSION};
use crate::types::{list_index, ErrorCode, Id};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Success or failure of a response
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The method returned a value (possibly `null`)
    Result(Value),
    /// The method failed
    Error(ErrorObject),
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Result(Value::Null)
    }
}

/// Values of the inactive side of the outcome
///
/// Error message and data set while the response is not an error yet, or
/// the result set while it is one.
#[derive(Debug, Default)]
pub(crate) struct ErrorDraft {
    pub(crate) message: Option<String>,
    pub(crate) data: Option<Value>,
    pub(crate) result: Option<Value>,
}

pub(crate) struct ResponseState {
    pub(crate) jsonrpc: String,
    pub(crate) id: Option<Id>,
    pub(crate) method: Option<String>,
    pub(crate) outcome: Outcome,
    pub(crate) draft: ErrorDraft,
    pub(crate) request: Option<Request>,
    pub(crate) headers: Headers,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: None,
            outcome: Outcome::default(),
            draft: ErrorDraft::default(),
            request: None,
            headers: Headers::new(),
        }
    }
}

/// JSON-RPC 2.0 response
///
/// Like [`Request`], a shared handle: clones refer to the same response.
/// The response keeps its request alive.
#[derive(Clone)]
pub struct Response {
    pub(crate) inner: Arc<RwLock<ResponseState>>,
}

impl Response {
    /// Create a standalone response
    pub fn new() -> Self {
        Self::from_state(ResponseState::default())
    }

    /// Create a response linked to `request`
    pub fn for_request(request: &Request) -> Self {
        let response = Self::new();
        response.set_request(request);
        response
    }

    /// Decode a response from a wire value
    ///
    /// # Errors
    ///
    /// See [`codec::decode_response`].
    pub fn from_wire(value: Value) -> Result<Self> {
        codec::response_from_value(value)
    }

    pub(crate) fn from_state(state: ResponseState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Link this response to a request
    ///
    /// Copies the request's id, version and method, and always records the
    /// request. The request is linked back only if it has no live response
    /// yet. The id is not re-synced if the request changes later.
    pub fn set_request(&self, request: &Request) -> &Self {
        let (jsonrpc, id, method) = {
            let req = request.inner.read();
            (req.jsonrpc.clone(), req.id.clone(), req.method.clone())
        };

        tracing::debug!(method = %method, id = ?id, "Linking response to request");

        {
            let mut state = self.inner.write();
            state.jsonrpc = jsonrpc;
            state.id = id;
            state.method = Some(method);
            state.request = Some(request.clone());
        }

        if !request.has_response() {
            request.set_response(self);
        }

        self
    }

    /// The request this response answers
    pub fn request(&self) -> Option<Request> {
        self.inner.read().request.clone()
    }

    /// Protocol version, copied from the request or `"2.0"`
    pub fn jsonrpc(&self) -> String {
        self.inner.read().jsonrpc.clone()
    }

    /// Correlation id
    pub fn id(&self) -> Option<Id> {
        self.inner.read().id.clone()
    }

    /// Method of the linked request; not part of the wire form
    pub fn method(&self) -> Option<String> {
        self.inner.read().method.clone()
    }

    /// Set the id
    pub fn set_id(&self, id: impl Into<Id>) -> &Self {
        self.inner.write().id = Some(id.into());
        self
    }

    /// Remove the id; the wire form then carries `null`
    pub fn clear_id(&self) -> &Self {
        self.inner.write().id = None;
        self
    }

    /// Set the result
    ///
    /// On an error response the result is kept aside and only becomes
    /// visible after [`clear_error`](Self::clear_error).
    pub fn set_result(&self, result: impl Into<Value>) -> &Self {
        let result = result.into();
        let mut state = self.inner.write();
        let state = &mut *state;
        match state.outcome {
            Outcome::Error(_) => state.draft.result = Some(result),
            Outcome::Result(ref mut value) => *value = result,
        }
        self
    }

    /// Set the error code, switching to the error outcome
    pub fn set_error_code(&self, code: impl Into<ErrorCode>) -> &Self {
        let code = code.into();
        let mut state = self.inner.write();
        let state = &mut *state;
        match state.outcome {
            Outcome::Error(ref mut error) => error.code = code,
            Outcome::Result(_) => {
                let error = ErrorObject {
                    code,
                    message: state.draft.message.take(),
                    data: state.draft.data.take(),
                };
                if let Outcome::Result(result) = std::mem::replace(&mut state.outcome, Outcome::Error(error)) {
                    state.draft.result = Some(result);
                }
            }
        }
        self
    }

    /// Set the error message
    pub fn set_error_message(&self, message: impl Into<String>) -> &Self {
        let message = Some(message.into());
        let mut state = self.inner.write();
        let state = &mut *state;
        match state.outcome {
            Outcome::Error(ref mut error) => error.message = message,
            Outcome::Result(_) => state.draft.message = message,
        }
        self
    }

    /// Set the error data
    pub fn set_error_data(&self, data: impl Into<Value>) -> &Self {
        let data = Some(data.into());
        let mut state = self.inner.write();
        let state = &mut *state;
        match state.outcome {
            Outcome::Error(ref mut error) => error.data = data,
            Outcome::Result(_) => state.draft.data = data,
        }
        self
    }

    /// Replace the outcome with a complete error object
    pub fn set_error(&self, error: impl Into<ErrorObject>) -> &Self {
        let mut state = self.inner.write();
        let result = match std::mem::replace(&mut state.outcome, Outcome::Error(error.into())) {
            Outcome::Result(result) => Some(result),
            Outcome::Error(_) => state.draft.result.take(),
        };
        state.draft = ErrorDraft {
            result,
            ..ErrorDraft::default()
        };
        drop(state);
        self
    }

    /// Leave the error outcome
    ///
    /// The result set while the response was an error (or the one it had
    /// before) becomes active again, `null` if there was none. The error
    /// message and data are kept aside.
    pub fn clear_error(&self) -> &Self {
        let mut state = self.inner.write();
        if matches!(state.outcome, Outcome::Error(_)) {
            let result = state.draft.result.take().unwrap_or(Value::Null);
            if let Outcome::Error(error) = std::mem::replace(&mut state.outcome, Outcome::Result(result)) {
                state.draft.message = error.message;
                state.draft.data = error.data;
            }
        }
        drop(state);
        self
    }

    /// Snapshot of the outcome
    pub fn outcome(&self) -> Outcome {
        self.inner.read().outcome.clone()
    }

    /// Whether an error code has been set
    ///
    /// Any code counts, including `0` and `""`.
    pub fn is_error(&self) -> bool {
        matches!(self.inner.read().outcome, Outcome::Error(_))
    }

    /// Result value; `None` for an error response
    pub fn result(&self) -> Option<Value> {
        match &self.inner.read().outcome {
            Outcome::Result(value) => Some(value.clone()),
            Outcome::Error(_) => None,
        }
    }

    /// Error object; `None` for a success response
    pub fn error(&self) -> Option<ErrorObject> {
        match &self.inner.read().outcome {
            Outcome::Error(error) => Some(error.clone()),
            Outcome::Result(_) => None,
        }
    }

    /// Error code; `None` for a success response
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error().map(|error| error.code)
    }

    /// Error message, including one set before the code
    pub fn error_message(&self) -> Option<String> {
        let state = self.inner.read();
        match &state.outcome {
            Outcome::Error(error) => error.message.clone(),
            Outcome::Result(_) => state.draft.message.clone(),
        }
    }

    /// Error data, including data set before the code
    pub fn error_data(&self) -> Option<Value> {
        let state = self.inner.read();
        match &state.outcome {
            Outcome::Error(error) => error.data.clone(),
            Outcome::Result(_) => state.draft.data.clone(),
        }
    }

    /// Look up a key in the active value
    ///
    /// The active value is the error data for an error response and the
    /// result otherwise. Objects are looked up by key, arrays by index;
    /// anything else yields `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        let state = self.inner.read();
        let active = match &state.outcome {
            Outcome::Result(value) => Some(value),
            Outcome::Error(error) => error.data.as_ref(),
        };

        match active? {
            Value::Object(map) => map.get(name).cloned(),
            Value::Array(items) => list_index(name).and_then(|i| items.get(i)).cloned(),
            _ => None,
        }
    }

    /// Look up a key in the active value, falling back to `default`
    pub fn get_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.get(name).unwrap_or_else(|| default.into())
    }

    /// Snapshot of the transport headers
    pub fn headers(&self) -> Headers {
        self.inner.read().headers.clone()
    }

    /// Access the transport headers mutably
    pub fn with_headers<R>(&self, f: impl FnOnce(&mut Headers) -> R) -> R {
        f(&mut self.inner.write().headers)
    }

    /// Wire form
    ///
    /// Always `"jsonrpc": "2.0"` and an `id` (`null` when missing or empty).
    pub fn to_wire(&self) -> Value {
        codec::response_to_value(&self.inner.read())
    }

    /// Whether two handles refer to the same response
    pub fn ptr_eq(&self, other: &Response) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("Response")
            .field("jsonrpc", &state.jsonrpc)
            .field("id", &state.id)
            .field("method", &state.method)
            .field("outcome", &state.outcome)
            .field("has_request", &state.request.is_some())
            .field("headers", &state.headers)
            .finish()
    }
}

impl fmt::Display for Response {
    /// Wire JSON
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Response::from_wire(value).map_err(serde::de::Error::custom)
    }
}
