//! Health-check handlers.
//!
//! | Path | Question |
//! |---|---|
//! | `/healthz` | Is the process alive? Never touches the store. |
//! | `/readyz` | Can the store be reached right now? |
//! | `/health` | Human-facing status with a server timestamp. |

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::AppState;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::store::within;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    time: String,
}

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub async fn liveness(_state: Arc<AppState>, _req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe: `200 "ready"` once the store answers a ping within the
/// request deadline, `503` otherwise.
pub async fn readiness(state: Arc<AppState>, _req: Request) -> Response {
    match within(state.request_timeout, state.store.ping()).await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!("readiness check failed: {e}");
            Response::status(Status::ServiceUnavailable)
        }
    }
}

/// `{"status":"healthy","time":"<RFC 3339>"}`.
///
/// The access log line is written by a detached task: the response never
/// waits on it and nothing the task does can fail the request.
pub async fn health(_state: Arc<AppState>, req: Request) -> Response {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let peer = req.remote_addr();
    let accessed_at = now.clone();
    tokio::spawn(async move {
        match peer {
            Some(peer) => info!(%peer, at = %accessed_at, "health check accessed"),
            None => info!(at = %accessed_at, "health check accessed"),
        }
    });

    Json(HealthBody { status: "healthy", time: now }).into_response()
}
