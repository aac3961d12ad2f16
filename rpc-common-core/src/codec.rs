//! Envelope codec
//!
//! Converts [`Request`] and [`Response`] to and from the JSON-RPC 2.0 wire
//! envelope and computes request fingerprints.
//!
//! # Wire format
//!
//! ```text
//! Request:          {"jsonrpc": "2.0", "method": <string>, "params"?: <object|array>, "id"?: <string|number>}
//! Response success: {"jsonrpc": "2.0", "result": <any>, "id": <string|number|null>}
//! Response error:   {"jsonrpc": "2.0", "error": {"code": <int|string>, "message": <string>, "data"?: <any>}, "id": <string|number|null>}
//! ```
//!
//! - `params` is omitted when empty
//! - a request `id` is omitted according to [`IdOmission`]
//! - a response always carries `id`, `null` when missing or empty
//!
//! Transport headers never appear in the envelope.
//!
//! # Decoding
//!
//! Decoding checks structure only:
//! - Invalid JSON → `-32700` (Parse error)
//! - Not an object, missing or non-string `method`, bad `id` → `-32600` (Invalid Request)
//! - Scalar `params` → `-32602` (Invalid params)
//!
//! # Examples
//!
//! ```rust
//! use rpc_common_core::{codec, Request};
//! use serde_json::json;
//!
//! let request = Request::try_new("ping", json!([]), Some(1.into())).unwrap();
//! let json = codec::encode_request(&request).unwrap();
//! assert_eq!(json, r#"{"jsonrpc":"2.0","method":"ping","id":1}"#);
//!
//! let decoded = codec::decode(&json).unwrap();
//! assert!(decoded.is_request());
//! ```

use crate::config::{CodecConfig, FingerprintMode, IdOmission};
use crate::error::{Error, ErrorObject, Result};
use crate::headers::Headers;
use crate::request::{Request, RequestState, JSONRPC_VERSION};
use crate::response::{Outcome, Response, ResponseState};
use crate::types::{ErrorCode, Id, Params};
use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::{Map, Value};

/// Any decoded JSON-RPC message
#[derive(Debug, Clone)]
pub enum Message {
    /// A request or notification (has `method`)
    Request(Request),
    /// A response (has `result` or `error`)
    Response(Response),
    /// A batch; items are decoded separately
    Batch(Vec<Value>),
}

impl Message {
    /// Whether this is a request or notification
    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    /// Whether this is a response
    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    /// Whether this is a batch
    pub fn is_batch(&self) -> bool {
        matches!(self, Message::Batch(_))
    }
}

/// Encode any serializable value to a JSON string
///
/// # Errors
///
/// Returns `Error::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request with the default configuration
///
/// # Errors
///
/// Returns `Error::Serialization` if serialization fails.
pub fn encode_request(req: &Request) -> Result<String> {
    encode_request_with(req, &CodecConfig::default())
}

/// Encode a request
///
/// # Errors
///
/// Returns `Error::Serialization` if serialization fails.
pub fn encode_request_with(req: &Request, config: &CodecConfig) -> Result<String> {
    encode(&req.to_wire_with(config))
}

/// Encode a response
///
/// # Errors
///
/// Returns `Error::Serialization` if serialization fails.
pub fn encode_response(resp: &Response) -> Result<String> {
    encode(&resp.to_wire())
}

/// Encode requests as a batch array
///
/// # Errors
///
/// Returns `Error::Serialization` if serialization fails.
pub fn encode_batch_requests(requests: &[Request]) -> Result<String> {
    let items: Vec<Value> = requests.iter().map(Request::to_wire).collect();
    encode(&items)
}

/// Encode responses as a batch array
///
/// # Errors
///
/// Returns `Error::Serialization` if serialization fails.
pub fn encode_batch_responses(responses: &[Response]) -> Result<String> {
    let items: Vec<Value> = responses.iter().map(Response::to_wire).collect();
    encode(&items)
}

/// Decode a single message or a batch
///
/// Objects with `method` decode as requests, objects with `result` or
/// `error` as responses. Arrays are returned as batches of raw values.
///
/// # Errors
///
/// - Parse error if the text is not JSON
/// - Invalid request for an empty batch or an object that is neither a
///   request nor a response
pub fn decode(data: &str) -> Result<Message> {
    match parse(data)? {
        Value::Array(items) if items.is_empty() => {
            Err(Error::JsonRpc(ErrorObject::invalid_request("Batch cannot be empty")))
        }
        Value::Array(items) => Ok(Message::Batch(items)),
        value @ Value::Object(_) if value.get("method").is_some() => {
            request_from_value(value).map(Message::Request)
        }
        value @ Value::Object(_) if value.get("result").is_some() || value.get("error").is_some() => {
            response_from_value(value).map(Message::Response)
        }
        _ => {
            tracing::debug!("Rejecting message that is neither a request nor a response");
            Err(Error::JsonRpc(ErrorObject::invalid_request(
                "Expected a request or response object",
            )))
        }
    }
}

/// Decode a request
///
/// # Errors
///
/// Parse error for invalid JSON; invalid request or invalid params for
/// malformed envelopes.
pub fn decode_request(data: &str) -> Result<Request> {
    request_from_value(parse(data)?)
}

/// Decode a response
///
/// A response with a non-null `error` member decodes into the error
/// outcome; otherwise `result` is taken (`null` when missing).
///
/// # Errors
///
/// Parse error for invalid JSON; invalid request for malformed envelopes.
pub fn decode_response(data: &str) -> Result<Response> {
    response_from_value(parse(data)?)
}

/// Decode a batch of responses
///
/// Each item is decoded on its own so one malformed response does not hide
/// the others.
///
/// # Errors
///
/// Parse error for invalid JSON; invalid request if the text is not a
/// non-empty array.
pub fn decode_batch_responses(data: &str) -> Result<Vec<Result<Response>>> {
    match parse(data)? {
        Value::Array(items) if !items.is_empty() => Ok(items.into_iter().map(response_from_value).collect()),
        Value::Array(_) => Err(Error::JsonRpc(ErrorObject::invalid_request("Batch cannot be empty"))),
        _ => Err(Error::JsonRpc(ErrorObject::invalid_request("Batch must be an array"))),
    }
}

/// MD5 fingerprint of a method and its params, as 32 lowercase hex chars
///
/// The input is the method name immediately followed by the compact JSON of
/// the params. Empty params hash as `[]` whatever their shape.
///
/// ```rust
/// use rpc_common_core::{codec, FingerprintMode, Params};
///
/// let fingerprint = codec::fingerprint("ping", &Params::default(), FingerprintMode::InsertionOrder);
/// assert_eq!(fingerprint.len(), 32);
/// ```
pub fn fingerprint(method: &str, params: &Params, mode: FingerprintMode) -> String {
    let serialized = match mode {
        _ if params.is_empty() => "[]".to_string(),
        FingerprintMode::InsertionOrder => params.to_string(),
        FingerprintMode::SortedKeys => params.sorted().to_string(),
    };

    let mut hasher = Md5::new();
    hasher.update(method.as_bytes());
    hasher.update(serialized.as_bytes());
    let fingerprint = format!("{:x}", hasher.finalize());

    tracing::trace!(method = %method, fingerprint = %fingerprint, "Computed request fingerprint");
    fingerprint
}

pub(crate) fn request_to_value(state: &RequestState, config: &CodecConfig) -> Value {
    let mut map = Map::new();
    map.insert("jsonrpc".to_string(), Value::String(state.jsonrpc.clone()));
    map.insert("method".to_string(), Value::String(state.method.clone()));

    if !state.params.is_empty() {
        map.insert("params".to_string(), state.params.clone().into_value());
    }

    match (&state.id, config.request_id) {
        (None, _) => {}
        (Some(id), IdOmission::Falsy) if id.is_falsy() => {}
        (Some(id), _) => {
            map.insert("id".to_string(), id_to_value(id));
        }
    }

    Value::Object(map)
}

pub(crate) fn response_to_value(state: &ResponseState) -> Value {
    let mut map = Map::new();
    map.insert("jsonrpc".to_string(), Value::String(JSONRPC_VERSION.to_string()));

    match &state.outcome {
        Outcome::Result(result) => {
            map.insert("result".to_string(), result.clone());
        }
        Outcome::Error(error) => {
            map.insert("error".to_string(), error_to_value(error));
        }
    }

    let id = match &state.id {
        Some(Id::String(s)) if s.is_empty() => Value::Null,
        Some(id) => id_to_value(id),
        None => Value::Null,
    };
    map.insert("id".to_string(), id);

    Value::Object(map)
}

pub(crate) fn request_from_value(value: Value) -> Result<Request> {
    let Value::Object(mut map) = value else {
        return Err(invalid_request("Request must be a JSON object"));
    };

    let method = match map.remove("method") {
        Some(Value::String(method)) => method,
        Some(_) => return Err(invalid_request("Method must be a string")),
        None => return Err(invalid_request("Missing method")),
    };
    let jsonrpc = version_from(map.remove("jsonrpc"))?;
    let params = match map.remove("params") {
        Some(params) => Params::try_from(params)?,
        None => Params::default(),
    };
    let id = map.remove("id").map(id_from_value).transpose()?;

    Ok(Request::from_state(RequestState {
        jsonrpc,
        id,
        method,
        params,
        response: None,
        headers: Headers::new(),
    }))
}

pub(crate) fn response_from_value(value: Value) -> Result<Response> {
    let Value::Object(mut map) = value else {
        return Err(invalid_request("Response must be a JSON object"));
    };

    let jsonrpc = version_from(map.remove("jsonrpc"))?;
    let id = map.remove("id").map(id_from_value).transpose()?;
    let outcome = match map.remove("error") {
        None | Some(Value::Null) => Outcome::Result(map.remove("result").unwrap_or(Value::Null)),
        Some(error) => Outcome::Error(
            serde_json::from_value(error).map_err(|_| invalid_request("Invalid error object"))?,
        ),
    };

    Ok(Response::from_state(ResponseState {
        jsonrpc,
        id,
        outcome,
        ..ResponseState::default()
    }))
}

fn parse(data: &str) -> Result<Value> {
    serde_json::from_str(data).map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse JSON-RPC message");
        Error::JsonRpc(ErrorObject::parse_error())
    })
}

fn invalid_request(msg: &str) -> Error {
    Error::JsonRpc(ErrorObject::invalid_request(msg))
}

fn version_from(value: Option<Value>) -> Result<String> {
    match value {
        Some(Value::String(version)) => Ok(version),
        None => Ok(JSONRPC_VERSION.to_string()),
        Some(_) => Err(invalid_request("Version must be a string")),
    }
}

fn id_from_value(value: Value) -> Result<Id> {
    serde_json::from_value(value).map_err(|_| invalid_request("Id must be a string, a number or null"))
}

fn id_to_value(id: &Id) -> Value {
    match id {
        Id::String(s) => Value::String(s.clone()),
        Id::Number(n) => Value::Number(n.clone()),
        Id::Null => Value::Null,
    }
}

fn error_to_value(error: &ErrorObject) -> Value {
    let mut map = Map::new();
    let code = match &error.code {
        ErrorCode::Number(n) => Value::from(*n),
        ErrorCode::Text(s) => Value::String(s.clone()),
    };
    map.insert("code".to_string(), code);
    map.insert(
        "message".to_string(),
        error.message.clone().map(Value::String).unwrap_or(Value::Null),
    );
    if error.has_data() {
        if let Some(data) = &error.data {
            map.insert("data".to_string(), data.clone());
        }
    }
    Value::Object(map)
}
