//! HTTP transport types and the `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds an `HttpRequest`
//! and parses an `HttpResponse` without touching the network; the single
//! async `Transport::send` call in between is the only I/O. Tests plug in an
//! in-memory transport, production code uses `ReqwestTransport`.
//!
//! All fields use owned types so requests can be recorded, cloned and
//! replayed without lifetime concerns.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    Bytes {
        data: Vec<u8>,
        file_name: Option<String>,
        mime_type: Option<String>,
    },
}

/// A multipart form payload. The transport picks the boundary, so requests
/// carrying one never get a client-generated `Content-Type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Add a binary part, typically a file upload.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Bytes {
                data: data.into(),
                file_name: Some(file_name.into()),
                mime_type: Some(mime_type.into()),
            },
        });
        self
    }

    pub fn bytes(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Bytes {
                data: data.into(),
                file_name: None,
                mime_type: None,
            },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn into_reqwest(self) -> Result<reqwest::multipart::Form, TransportError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            let value = match part.value {
                PartValue::Text(text) => reqwest::multipart::Part::text(text),
                PartValue::Bytes {
                    data,
                    file_name,
                    mime_type,
                } => {
                    let mut value = reqwest::multipart::Part::bytes(data);
                    if let Some(file_name) = file_name {
                        value = value.file_name(file_name);
                    }
                    if let Some(mime_type) = mime_type {
                        value = value.mime_str(&mime_type)?;
                    }
                    value
                }
            };
            form = form.part(part.name, value);
        }
        Ok(form)
    }
}

/// A prepared request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// JSON text, already serialized.
    Json(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }

    /// The JSON text, if this is a JSON body.
    pub fn as_json(&self) -> Option<&str> {
        match self {
            RequestBody::Json(text) => Some(text),
            RequestBody::Multipart(_) => None,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_request`. `timeout` is passed through to the
/// transport untouched.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok`; only failures to
/// obtain a response at all (connect, DNS, timeout, body read) are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Network transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (proxy, TLS, default timeout, ...).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(RequestBody::Json(text)) => builder.body(text),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.into_reqwest()?),
            None => builder,
        };
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "reqwest transport read response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_are_uppercase() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("authorization"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        let mut response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 302;
        assert!(!response.is_success());
        response.status = 199;
        assert!(!response.is_success());
    }

    #[test]
    fn multipart_form_keeps_part_order() {
        let form = MultipartForm::new()
            .text("title", "report")
            .file("upload", "a.txt", "text/plain", b"hello".to_vec())
            .bytes("raw", vec![0u8, 1, 2]);
        assert!(!form.is_empty());
        assert!(MultipartForm::new().is_empty());
        let names: Vec<&str> = form.parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["title", "upload", "raw"]);
        assert!(matches!(
            &form.parts()[1].value,
            PartValue::Bytes { file_name: Some(name), .. } if name == "a.txt"
        ));
    }

    #[test]
    fn multipart_with_bad_mime_type_fails_conversion() {
        let form = MultipartForm::new().file("upload", "a.bin", "not a mime", vec![1u8]);
        assert!(form.into_reqwest().is_err());
    }

    #[test]
    fn body_accessors() {
        let json = RequestBody::Json("{}".to_string());
        assert!(!json.is_multipart());
        assert_eq!(json.as_json(), Some("{}"));
        let multipart = RequestBody::Multipart(MultipartForm::new());
        assert!(multipart.is_multipart());
        assert_eq!(multipart.as_json(), None);
    }
}
