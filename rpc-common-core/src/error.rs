//! Error types for rpc-common
//!
//! Two kinds of error live here:
//!
//! - **Error**: application-level failures raised while decoding wire data
//!   (uses thiserror)
//! - **ErrorObject**: the JSON-RPC 2.0 `error` member carried by a
//!   [`Response`](crate::Response)
//!
//! Reading a message never fails. Only the codec entry points that turn
//! untrusted text or values into messages return [`Result`].
//!
//! # Standard Error Codes
//!
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (not a request object)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000 to -32099`: Server error (implementation-defined)
//!
//! # Examples
//!
//! ```rust
//! use rpc_common_core::{Error, ErrorObject};
//!
//! let error = Error::MethodNotFound("unknownMethod".into());
//! let wire = ErrorObject::from(&error);
//! assert_eq!(wire.code, (-32601).into());
//! ```

use crate::types::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for rpc-common operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type
///
/// Produced by the codec when wire input cannot be turned into a message.
/// Every variant maps onto a standard JSON-RPC error object through
/// `From<&Error> for ErrorObject`, so a transport can answer any failure
/// with a well-formed error response.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// An error that is already a JSON-RPC error object
    ///
    /// Decoding failures are reported this way so the exact wire error
    /// (parse error, invalid request, ...) travels with them.
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] ErrorObject),

    /// Serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The value is not a JSON-RPC request object
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found. Maps to -32601.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Params are not an array or an object. Maps to -32602.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Internal error. Maps to -32603.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// JSON-RPC 2.0 error object
///
/// The `code` may be an integer or a string; the message may be missing when
/// a caller only set a code. On the wire the message is always emitted
/// (`null` when missing) and `data` is emitted only when it is non-empty.
///
/// # Examples
///
/// ```rust
/// use rpc_common_core::ErrorObject;
/// use serde_json::json;
///
/// let error = ErrorObject::method_not_found("calculate");
/// assert_eq!(error.code, (-32601).into());
///
/// let custom = ErrorObject::with_data(
///     1001,
///     "Insufficient funds",
///     json!({"balance": 50, "required": 100}),
/// );
/// assert!(custom.data.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Error code, integer or string
    pub code: ErrorCode,

    /// Human-readable error message
    #[serde(default)]
    pub message: Option<String>,

    /// Additional error information
    ///
    /// Skipped on the wire when absent or empty (`null`, `false`, `0`, `""`,
    /// `"0"`, `[]`, `{}`).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create an error with code and message
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: Some(message.into()),
            data: None,
        }
    }

    /// Create an error with code, message and additional data
    pub fn with_data(code: impl Into<ErrorCode>, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.into(),
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Create an error carrying only a code
    pub fn code_only(code: impl Into<ErrorCode>) -> Self {
        Self {
            code: code.into(),
            message: None,
            data: None,
        }
    }

    /// Parse error (-32700)
    ///
    /// Invalid JSON was received.
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    /// Invalid request error (-32600)
    ///
    /// The JSON is valid but it is not a request object.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(-32600, msg)
    }

    /// Method not found error (-32601)
    ///
    /// ```rust
    /// use rpc_common_core::ErrorObject;
    ///
    /// let error = ErrorObject::method_not_found("calculateFoo");
    /// assert_eq!(error.message.as_deref(), Some("Method not found: calculateFoo"));
    /// ```
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(-32601, format!("Method not found: {}", method.into()))
    }

    /// Invalid params error (-32602)
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(-32602, msg)
    }

    /// Internal error (-32603)
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(-32603, msg)
    }

    /// Whether the error carries data that would be emitted on the wire
    pub fn has_data(&self) -> bool {
        !is_blank(&self.data)
    }
}

impl From<&Error> for ErrorObject {
    fn from(err: &Error) -> Self {
        match err {
            Error::JsonRpc(obj) => obj.clone(),
            Error::Serialization(msg) => ErrorObject::internal_error(msg.clone()),
            Error::InvalidRequest(msg) => ErrorObject::invalid_request(msg.clone()),
            Error::MethodNotFound(method) => ErrorObject::method_not_found(method.clone()),
            Error::InvalidParams(msg) => ErrorObject::invalid_params(msg.clone()),
            Error::Internal(msg) => ErrorObject::internal_error(msg.clone()),
        }
    }
}

impl From<Error> for ErrorObject {
    fn from(err: Error) -> Self {
        ErrorObject::from(&err)
    }
}

impl std::fmt::Display for ErrorObject {
    /// Formats as "[code] message", e.g. "[-32601] Method not found: foo"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ErrorObject {}

/// Emptiness test applied to optional error data before it reaches the wire
pub(crate) fn is_blank(data: &Option<Value>) -> bool {
    match data {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_from_serde() {
        let serde_error = serde_json::from_str::<Value>(r#"{"invalid": json"#).unwrap_err();
        let error = Error::from(serde_error);

        match error {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_object_with_data() {
        let error = ErrorObject::with_data(
            -32602,
            "Invalid params",
            json!({"missing": ["username", "password"]}),
        );

        assert_eq!(error.code, ErrorCode::Number(-32602));
        assert_eq!(error.message.as_deref(), Some("Invalid params"));
        assert!(error.has_data());

        if let Some(data) = error.data {
            assert_eq!(data["missing"][0], "username");
            assert_eq!(data["missing"][1], "password");
        }
    }

    #[test]
    fn test_error_object_display() {
        let display = ErrorObject::method_not_found("unknownMethod").to_string();

        assert!(display.contains("-32601"));
        assert!(display.contains("Method not found"));
    }

    #[test]
    fn test_all_standard_codes() {
        let errors = vec![
            (ErrorObject::parse_error(), -32700),
            (ErrorObject::invalid_request("test"), -32600),
            (ErrorObject::method_not_found("test"), -32601),
            (ErrorObject::invalid_params("test"), -32602),
            (ErrorObject::internal_error("test"), -32603),
        ];

        for (error, expected_code) in errors {
            assert_eq!(error.code, ErrorCode::Number(expected_code));
            assert!(error.message.is_some());
        }
    }

    #[test]
    fn test_string_code_serialization() {
        let error = ErrorObject::new("E_QUOTA", "Quota exceeded");
        let serialized = serde_json::to_value(&error).unwrap();

        assert_eq!(serialized, json!({"code": "E_QUOTA", "message": "Quota exceeded"}));
    }

    #[test]
    fn test_missing_message_serializes_null() {
        let serialized = serde_json::to_value(ErrorObject::code_only(7)).unwrap();
        assert_eq!(serialized, json!({"code": 7, "message": null}));
    }

    #[test]
    fn test_blank_data_is_skipped() {
        for blank in [json!(null), json!(""), json!("0"), json!(0), json!(false), json!([]), json!({})] {
            let error = ErrorObject::with_data(1, "x", blank.clone());
            let serialized = serde_json::to_value(&error).unwrap();
            assert!(serialized.get("data").is_none(), "data {} should be skipped", blank);
        }

        let error = ErrorObject::with_data(1, "x", json!({"field": "name"}));
        let serialized = serde_json::to_value(&error).unwrap();
        assert_eq!(serialized["data"], json!({"field": "name"}));
    }

    #[test]
    fn test_error_deserialization() {
        let json = r#"{"code":-32601,"message":"Method not found"}"#;
        let error: ErrorObject = serde_json::from_str(json).unwrap();

        assert_eq!(error.code, ErrorCode::Number(-32601));
        assert_eq!(error.message.as_deref(), Some("Method not found"));
        assert!(error.data.is_none());
    }

    #[test]
    fn test_application_error_mapping() {
        let cases = vec![
            (Error::InvalidRequest("no method".into()), -32600),
            (Error::MethodNotFound("foo".into()), -32601),
            (Error::InvalidParams("scalar".into()), -32602),
            (Error::Internal("boom".into()), -32603),
            (Error::Serialization("bad".into()), -32603),
        ];

        for (error, code) in cases {
            assert_eq!(ErrorObject::from(&error).code, ErrorCode::Number(code));
        }

        let wrapped = Error::JsonRpc(ErrorObject::parse_error());
        assert_eq!(ErrorObject::from(wrapped), ErrorObject::parse_error());
    }
}
