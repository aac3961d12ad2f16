//! JSON-RPC 2.0 message model
//!
//! Transport-agnostic building blocks shared by JSON-RPC clients and servers:
//!
//! - **Request / Response**: mutable, shareable message handles that link to
//!   each other from either side
//! - **Headers**: case-insensitive, multi-valued transport header bag carried
//!   by both messages but never put on the wire
//! - **Codec**: JSON-RPC 2.0 envelopes, decoding and MD5 request fingerprints
//! - **Observability**: optional `tracing` subscriber and OTLP span export
//!
//! # Example
//!
//! ```rust
//! use rpc_common_core::{codec, Id, Request, Response};
//! use serde_json::json;
//!
//! let request = Request::try_new("sum", json!({"a": 1, "b": 2}), Some(Id::from(1))).unwrap();
//! request.with_headers(|headers| headers.set("Content_Type", "application/json"));
//!
//! assert_eq!(
//!     codec::encode_request(&request).unwrap(),
//!     r#"{"jsonrpc":"2.0","method":"sum","params":{"a":1,"b":2},"id":1}"#
//! );
//!
//! let response = Response::for_request(&request);
//! response.set_result(3);
//! assert_eq!(
//!     codec::encode_response(&response).unwrap(),
//!     r#"{"jsonrpc":"2.0","result":3,"id":1}"#
//! );
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod headers;
pub mod observability;
pub mod request;
pub mod response;
pub mod types;

pub use codec::Message;
pub use config::{CodecConfig, FingerprintMode, IdOmission};
pub use error::{Error, ErrorObject, Result};
pub use headers::{normalize_name, Headers, IntoHeaderValues};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use request::Request;
pub use response::{Outcome, Response};
pub use types::{ErrorCode, Id, Params};
