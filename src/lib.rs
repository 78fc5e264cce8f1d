//! # userstore
//!
//! A small HTTP service for one `User` resource stored in MongoDB, plus a
//! demo endpoint that counts several collections concurrently.
//!
//! ## Endpoints
//!
//! | Method | Path | Answers |
//! |---|---|---|
//! | GET | `/users` | every user |
//! | GET | `/user/{id}` | one user, `404` if unknown or malformed |
//! | POST | `/user` | `201` with the stored user and its new id |
//! | PUT | `/user/{id}` | full replacement, `400` on a bad body |
//! | DELETE | `/user/{id}` | text confirmation, `404` if unknown |
//! | GET | `/demo/concurrent` | `200`, or `206` when some counts failed |
//! | GET | `/health`, `/healthz`, `/readyz` | health checks |
//!
//! ## Layout
//!
//! - [`Router`] / [`Server`]: radix-tree routing via [`matchit`], hyper
//!   connections, graceful SIGTERM / Ctrl-C drain.
//! - [`store`]: the [`DocumentStore`](store::DocumentStore) port with a pooled
//!   MongoDB adapter and an in-memory one.
//! - [`aggregate`]: the concurrent count fan-out behind `/demo/concurrent`.
//!
//! ## Running without MongoDB
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use userstore::aggregate::Aggregator;
//! use userstore::api::{self, AppState};
//! use userstore::store::MemoryStore;
//! use userstore::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new().with_collection("orders", 3));
//!     let aggregator = Aggregator::new(["users", "products", "orders"], Duration::from_secs(5));
//!     let app = api::router(AppState::new(store, aggregator, Duration::from_secs(5)));
//!
//!     Server::bind("127.0.0.1:9000".parse().unwrap()).serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod aggregate;
pub mod api;
pub mod config;
pub mod health;
pub mod middleware;
pub mod model;
pub mod store;
pub mod telemetry;

pub use error::Error;
pub use handler::Handler;
pub use method::{Method, UnsupportedMethod};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
