//! rpc-common - JSON-RPC 2.0 request/response model
//!
//! Convenience crate re-exporting [`rpc_common_core`]. Depend on this one to
//! get the message types at the crate root and the whole core under `core`.
//!
//! # Quick Start - Client side
//!
//! ```rust
//! use rpc_common::{Id, Request};
//! use serde_json::json;
//!
//! let request = Request::try_new("user.get", json!({"id": 10}), Some(Id::from("req-1"))).unwrap();
//! request.with_headers(|headers| headers.set("Authorization", "Bearer token"));
//!
//! // send request.to_string() over a transport, then:
//! let response = request
//!     .resolve(r#"{"jsonrpc":"2.0","result":{"name":"Ann"},"id":"req-1"}"#)
//!     .unwrap();
//!
//! assert_eq!(response.get("name"), Some(json!("Ann")));
//! assert!(request.response().unwrap().ptr_eq(&response));
//! ```
//!
//! # Quick Start - Server side
//!
//! ```rust
//! use rpc_common::{ErrorObject, Request, Response};
//!
//! let request = Request::from_wire(serde_json::json!({
//!     "jsonrpc": "2.0",
//!     "method": "user.delete",
//!     "id": 4
//! }))
//! .unwrap();
//!
//! let response = Response::for_request(&request);
//! response.set_error(ErrorObject::method_not_found(request.method()));
//!
//! assert!(response.is_error());
//! assert_eq!(
//!     response.to_string(),
//!     r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found: user.delete"},"id":4}"#
//! );
//! ```

pub use rpc_common_core as core;

pub use rpc_common_core::{
    codec, CodecConfig, ErrorCode, ErrorObject, FingerprintMode, Headers, Id, IdOmission, Outcome,
    Params, Request, Response,
};
