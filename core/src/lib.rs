//! Async HTTP API client with bearer-token injection and JSON bodies.
//!
//! # Overview
//! `ApiClient` prefixes every endpoint with a base URL, injects
//! `Authorization: Bearer <token>` and `Content-Type: application/json`,
//! serializes request data, sends it through a `Transport`, and turns the
//! response into either the caller's type or a normalized `ApiError`.
//!
//! # Design
//! - The client is stateless: configuration plus a transport, nothing else.
//! - Each call is `build_request` (pure) -> `Transport::send` (I/O) ->
//!   `handle_response` (pure), so both pure halves are testable without a
//!   network.
//! - Tokens come from an injected `TokenSource`, then the per-call token,
//!   then the configured default.
//! - Non-2xx responses are normalized to `{ code, message, payload }`.
//!
//! ```no_run
//! use air_core::{ApiClient, ClientConfig, RequestData, RequestOptions};
//! use serde_json::{json, Value};
//!
//! # async fn run() -> Result<(), air_core::ApiError> {
//! let config = ClientConfig::new("https://api.example.com", || std::env::var("TOKEN").unwrap_or_default());
//! let client = ApiClient::new(config);
//! let created: Value = client
//!     .post("/things", RequestData::json(json!({"name": "x"})), RequestOptions::new(), None)
//!     .await?;
//! # let _ = created;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::{prepare_request_body, ApiClient, RequestData, RequestOptions};
pub use config::{ClientConfig, NoToken, StaticToken, TokenSource};
pub use error::{ApiError, ApiErrorResponse, TransportError};
pub use http::{
    FormPart, HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartValue, RequestBody,
    ReqwestTransport, Transport,
};
