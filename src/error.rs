//! Unified error type.

use crate::store::StoreError;

/// Infrastructure failures: binding the listener or reaching the store at
/// startup.
///
/// Request-level failures (404, 500, ...) are expressed as
/// [`Response`](crate::Response) values, never as `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The listener could not be bound or its address read back.
    #[error("bind: {0}")]
    Bind(#[source] std::io::Error),

    /// The document store refused the initial connection or ping.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}
