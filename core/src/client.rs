//! Request composition, dispatch and response normalization.
//!
//! # Design
//! `ApiClient` holds only its `ClientConfig` and a transport, and carries no
//! mutable state between calls. Each call is split into `build_request`,
//! which produces an `HttpRequest` without I/O, and `handle_response`, which
//! consumes an `HttpResponse`. `request` runs the transport in between. The
//! two pure halves are public so callers can drive their own I/O.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorResponse};
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, RequestBody, Transport,
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// Per-call transport options.
///
/// The method is fixed by the verb helper and cannot be set here.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Merged after the generated headers; a caller header replaces a
    /// generated one with the same (case-insensitive) name.
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Payload of a write request.
#[derive(Debug, Clone)]
pub enum RequestData<D = Value> {
    /// No body is sent.
    Empty,
    /// Serialized to JSON text.
    Json(D),
    /// Sent as-is; the transport sets the multipart `Content-Type`.
    Multipart(MultipartForm),
}

impl RequestData<Value> {
    pub fn empty() -> Self {
        RequestData::Empty
    }

    pub fn multipart(form: MultipartForm) -> Self {
        RequestData::Multipart(form)
    }
}

impl<D> RequestData<D> {
    pub fn json(data: D) -> Self {
        RequestData::Json(data)
    }
}

impl<D> From<MultipartForm> for RequestData<D> {
    fn from(form: MultipartForm) -> Self {
        RequestData::Multipart(form)
    }
}

/// HTTP API client with bearer-token injection and JSON bodies.
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Get, endpoint, RequestData::empty(), options, token)
            .await
    }

    pub async fn post<R: DeserializeOwned, D: Serialize>(
        &self,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Post, endpoint, data, options, token)
            .await
    }

    pub async fn put<R: DeserializeOwned, D: Serialize>(
        &self,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Put, endpoint, data, options, token)
            .await
    }

    pub async fn patch<R: DeserializeOwned, D: Serialize>(
        &self,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Patch, endpoint, data, options, token)
            .await
    }

    pub async fn delete<R: DeserializeOwned, D: Serialize>(
        &self,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Delete, endpoint, data, options, token)
            .await
    }

    /// Build, send and handle one request.
    pub async fn request<R: DeserializeOwned, D: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        let request = self.build_request(method, endpoint, data, options, token)?;
        let url = request.url.clone();
        debug!(%method, %url, "sending API request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%method, %url, error = %err, "API request failed");
                return Err(ApiError::Transport(err));
            }
        };
        debug!(%method, %url, status = response.status, "received API response");

        self.handle_response(response)
    }

    /// Produce the `HttpRequest` for a call without sending it.
    pub fn build_request<D: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: RequestData<D>,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = prepare_request_body(data)?;
        let headers = self.create_headers(&options, body.as_ref(), token);
        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.config.base_url(), endpoint),
            headers,
            body,
            timeout: options.timeout,
        })
    }

    /// Generated headers followed by the caller's.
    pub fn create_headers(
        &self,
        options: &RequestOptions,
        body: Option<&RequestBody>,
        access_token: Option<&str>,
    ) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2 + options.headers.len());
        if !body.is_some_and(RequestBody::is_multipart) {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        if let Some(token) = self.config.resolve_token(access_token) {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value);
        }
        headers
    }

    /// Parse the body as JSON, then return it as `R` on 2xx or as a
    /// normalized `ApiError::Api` otherwise.
    pub fn handle_response<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<R, ApiError> {
        let status = response.status;
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|source| ApiError::Deserialization { status, source })?;

        if response.is_success() {
            return serde_json::from_value(value)
                .map_err(|source| ApiError::Deserialization { status, source });
        }

        let error = ApiErrorResponse::from_body(value);
        warn!(status, code = %error.code, "API responded with an error");
        Err(ApiError::Api { status, error })
    }
}

/// Turn request data into a wire body: multipart untouched, `Empty` to no
/// body, anything else to JSON text.
pub fn prepare_request_body<D: Serialize>(
    data: RequestData<D>,
) -> Result<Option<RequestBody>, ApiError> {
    match data {
        RequestData::Empty => Ok(None),
        RequestData::Multipart(form) => Ok(Some(RequestBody::Multipart(form))),
        RequestData::Json(data) => serde_json::to_string(&data)
            .map(|text| Some(RequestBody::Json(text)))
            .map_err(ApiError::Serialization),
    }
}

/// Replace every header named `name` (ignoring case) with one `name: value`.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}
