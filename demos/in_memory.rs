//! userstore without MongoDB: the full route table over the in-memory store.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example in_memory
//!
//! Try:
//!   curl -X POST http://localhost:9000/user \
//!        -d '{"name":"alice","gender":"f","age":31}'
//!   curl http://localhost:9000/users
//!   curl -i http://localhost:9000/demo/concurrent
//!   curl http://localhost:9000/health

use std::sync::Arc;
use std::time::Duration;

use userstore::Server;
use userstore::aggregate::Aggregator;
use userstore::api::{self, AppState};
use userstore::config::LogFormat;
use userstore::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    userstore::telemetry::init(LogFormat::Pretty)?;

    let store = MemoryStore::new()
        .with_collection("users", 2)
        .with_collection("orders", 17);
    let aggregator = Aggregator::new(["users", "products", "orders"], Duration::from_secs(5));
    let app = api::router(AppState::new(Arc::new(store), aggregator, Duration::from_secs(5)));

    Server::bind("127.0.0.1:9000".parse()?).serve(app).await?;
    Ok(())
}
