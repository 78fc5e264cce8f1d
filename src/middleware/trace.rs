//! Per-request tracing: one span per request carrying method and path, plus a
//! completion event with status and latency.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use crate::response::Response;

/// Runs `handle` inside a request span and logs how it finished.
///
/// Server errors are logged at `warn` so they stand out from normal traffic.
pub async fn instrument<F>(method: &http::Method, path: &str, handle: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", method = %method, path = %path);
    let started = Instant::now();

    let response = handle.instrument(span.clone()).await;

    let status = response.status_code().as_u16();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    span.in_scope(|| {
        if response.status_code().is_server_error() {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    #[tokio::test]
    async fn passes_the_response_through() {
        let res = instrument(&http::Method::GET, "/health", async {
            Response::status(Status::ServiceUnavailable)
        })
        .await;
        assert_eq!(res.status_code(), http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
