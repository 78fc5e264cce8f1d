use std::sync::Arc;

use clap::Parser;
use tracing::info;
use userstore::aggregate::Aggregator;
use userstore::api::{self, AppState};
use userstore::config::{CliArgs, ServiceConfig, StoreBackend};
use userstore::store::{DocumentStore, MemoryStore, MongoStore};
use userstore::{Server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServiceConfig::try_from(args)?;

    telemetry::init(config.log_format)?;

    // A store we cannot reach is fatal: nothing would be served.
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreBackend::Mongo => Arc::new(
            MongoStore::connect(&config.pool)
                .await
                .map_err(userstore::Error::from)?,
        ),
        StoreBackend::Memory => {
            info!("using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let aggregator = Aggregator::new(config.aggregate_collections.clone(), config.aggregate_deadline);
    info!(
        collections = ?aggregator.collections(),
        deadline_ms = u64::try_from(aggregator.deadline().as_millis()).unwrap_or(u64::MAX),
        "concurrent demo configured"
    );

    let app = api::router(AppState::new(store, aggregator, config.request_timeout));

    Server::bind(config.bind_addr).serve(app).await?;
    Ok(())
}
