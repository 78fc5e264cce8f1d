//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] (or return something that converts into one)
//! and the server turns it into a hyper response. Serialisation failures are
//! the only error a response can hit on the way out, and they degrade to a
//! bodiless `500`.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use userstore::{Response, Status};
///
/// Response::text("hello");
/// Response::status(Status::NotFound);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use userstore::{Response, Status};
///
/// Response::builder()
///     .status(Status::Created)
///     .header("location", "/user/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: http::StatusCode,
}

impl Response {
    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok }
    }

    pub fn status_code(&self) -> http::StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// First value of the named header. Names are matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                // Only reachable with a header that is not valid on the wire.
                error!("invalid response head: {e}");
                let mut fallback = http::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with pre-encoded JSON bytes (`application/json`).
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with `value` encoded by serde_json.
    ///
    /// An encoding failure replaces the whole response with a bodiless `500`.
    pub fn serialize<T: Serialize + ?Sized>(self, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.finish(JSON, bytes),
            Err(e) => {
                error!("response encoding failed: {e}");
                Response::status(Status::InternalServerError)
            }
        }
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status.into() }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status.into() }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

/// `200 OK` with a serde-encoded JSON body.
///
/// ```rust,ignore
/// async fn list(state: Arc<AppState>, _req: Request) -> Json<Vec<User>> {
///     Json(users)
/// }
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        Response::builder().serialize(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_puts_content_type_first() {
        let res = Response::builder()
            .status(Status::Created)
            .header("location", "/user/1")
            .json(b"{}".to_vec());
        assert_eq!(res.status_code(), http::StatusCode::CREATED);
        assert_eq!(res.headers[0].1, JSON);
        assert_eq!(res.header("Location"), Some("/user/1"));
    }

    #[test]
    fn json_wrapper_encodes_value() {
        let res = Json(serde_json::json!({ "ok": true })).into_response();
        assert_eq!(res.status_code(), http::StatusCode::OK);
        assert_eq!(res.body(), br#"{"ok":true}"#);
    }

    #[test]
    fn status_converts_to_a_bodiless_response() {
        let res = Status::NotFound.into_response();
        assert_eq!(res.status_code(), http::StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), None);
    }

    #[test]
    fn into_inner_carries_status_and_headers() {
        let inner = Response::builder()
            .status(Status::PartialContent)
            .text("partial")
            .into_inner();
        assert_eq!(inner.status(), http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(inner.headers()["content-type"], TEXT);
    }
}
