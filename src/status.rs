//! HTTP status codes the service answers with, as a typed enum.
//!
//! ```rust
//! use userstore::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NotFound);
//!
//! // partial aggregation results
//! Response::builder()
//!     .status(Status::PartialContent)
//!     .json(br#"{"results":[],"errors":[]}"#.to_vec());
//! ```

/// The status codes produced by handlers, the router and the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201
    PartialContent,      // 206

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    PayloadTooLarge,     // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
    ServiceUnavailable,  // 503
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::Created             => http::StatusCode::CREATED,
            Status::PartialContent      => http::StatusCode::PARTIAL_CONTENT,
            Status::BadRequest          => http::StatusCode::BAD_REQUEST,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => http::StatusCode::METHOD_NOT_ALLOWED,
            Status::PayloadTooLarge     => http::StatusCode::PAYLOAD_TOO_LARGE,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Status::ServiceUnavailable  => http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
