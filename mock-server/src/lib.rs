use std::time::Duration;

use axum::{
    extract::{Multipart, Path},
    http::{header, HeaderMap, Method, StatusCode},
    response::Html,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Highest id `/things/{id}` knows about.
pub const MAX_THING_ID: u32 = 100;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thing {
    pub id: u32,
}

/// What `/echo` saw on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Upload {
    pub parts: Vec<String>,
    pub content_type: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/things/{id}", get(get_thing))
        .route("/echo", any(echo))
        .route("/uploads", post(upload))
        .route("/broken", get(broken))
        .route("/failing", get(failing))
        .route("/slow", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn get_thing(Path(id): Path<u32>) -> Result<Json<Thing>, (StatusCode, Json<Value>)> {
    if (1..=MAX_THING_ID).contains(&id) {
        Ok(Json(Thing { id }))
    } else {
        Err((StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))))
    }
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    tracing::debug!(%method, bytes = body.len(), "echo");
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(Echo {
        method: method.to_string(),
        authorization: header_string(&headers, header::AUTHORIZATION),
        content_type: header_string(&headers, header::CONTENT_TYPE),
        body,
    })
}

async fn upload(
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Upload>), (StatusCode, Json<Value>)> {
    let bad_multipart = |err: axum::extract::multipart::MultipartError| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "BAD_MULTIPART", "message": err.body_text() })),
        )
    };
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        field.bytes().await.map_err(bad_multipart)?;
        parts.push(name);
    }
    tracing::debug!(parts = parts.len(), "upload");
    Ok((
        StatusCode::CREATED,
        Json(Upload {
            parts,
            content_type: header_string(&headers, header::CONTENT_TYPE),
        }),
    ))
}

async fn broken() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<html><body><h1>502 Bad Gateway</h1></body></html>"),
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}

async fn failing() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "code": "VALIDATION_FAILED",
            "message": "name is required",
            "field": "name",
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_missing_headers_as_null() {
        let echo = Echo {
            method: "GET".to_string(),
            authorization: None,
            content_type: Some("application/json".to_string()),
            body: Value::Null,
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["authorization"], Value::Null);
        assert_eq!(json["content_type"], "application/json");
    }

    #[test]
    fn header_string_reads_visible_ascii() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(
            header_string(&headers, header::AUTHORIZATION).as_deref(),
            Some("Bearer abc")
        );
        assert_eq!(header_string(&headers, header::CONTENT_TYPE), None);
    }
}
