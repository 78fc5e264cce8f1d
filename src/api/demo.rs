//! `GET /demo/concurrent`: counts the configured collections in parallel.

use std::sync::Arc;

use tracing::info;

use super::AppState;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Answers `200` when every count succeeded and `206` when any failed.
/// The body always carries both `results` and `errors`.
pub async fn concurrent_counts(state: Arc<AppState>, _req: Request) -> Response {
    let aggregation = state.aggregator.run(Arc::clone(&state.store)).await;

    let status = if aggregation.is_partial() {
        info!(
            succeeded = aggregation.results.len(),
            failed = aggregation.errors.len(),
            "partial aggregation"
        );
        Status::PartialContent
    } else {
        Status::Ok
    };

    Response::builder().status(status).serialize(&aggregation)
}
