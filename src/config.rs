//! Runtime configuration, from CLI flags or environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, ValueEnum};

use crate::store::PoolSettings;

/// Which [`DocumentStore`](crate::store::DocumentStore) adapter to run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Pooled MongoDB client. The server refuses to start if it cannot connect.
    Mongo,
    /// Process-local maps. Nothing survives a restart.
    Memory,
}

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Command-line arguments for the `userstore` binary.
///
/// Every flag can also be set through the environment variable named next to
/// it, and a `.env` file in the working directory is loaded first.
#[derive(Parser, Debug, Clone)]
#[command(name = "userstore", version, about = "CRUD HTTP service for users over MongoDB")]
pub struct CliArgs {
    /// Address the HTTP server listens on.
    ///
    /// Environment variable: `BIND_ADDR`
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:9000")]
    pub bind_addr: SocketAddr,

    /// Storage adapter.
    ///
    /// Environment variable: `STORE_BACKEND`
    #[arg(long = "store", env = "STORE_BACKEND", value_enum, default_value_t = StoreBackend::Mongo)]
    pub store: StoreBackend,

    /// MongoDB connection string.
    ///
    /// Environment variable: `MONGO_URI`
    #[arg(long, env = "MONGO_URI", default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Database holding the `users` collection.
    ///
    /// Environment variable: `USERS_DATABASE`
    #[arg(long, env = "USERS_DATABASE", default_value = "mongo-golang")]
    pub users_database: String,

    /// Database the concurrent demo counts collections in.
    ///
    /// Environment variable: `DEMO_DATABASE`
    #[arg(long, env = "DEMO_DATABASE", default_value = "testdb")]
    pub demo_database: String,

    /// Connections the driver keeps open even when idle.
    ///
    /// Environment variable: `MIN_POOL_SIZE`
    #[arg(long, env = "MIN_POOL_SIZE", default_value_t = 10)]
    pub min_pool_size: u32,

    /// Upper bound on concurrently checked-out connections.
    ///
    /// Environment variable: `MAX_POOL_SIZE`
    #[arg(long, env = "MAX_POOL_SIZE", default_value_t = 100)]
    pub max_pool_size: u32,

    /// Seconds an idle pooled connection may live before it is closed.
    ///
    /// Environment variable: `MAX_IDLE_SECS`
    #[arg(long, env = "MAX_IDLE_SECS", default_value_t = 300)]
    pub max_idle_secs: u64,

    /// Seconds allowed for the initial connection and ping.
    ///
    /// Environment variable: `CONNECT_TIMEOUT_SECS`
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Deadline for each single-user store operation, in milliseconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    pub request_timeout_ms: u64,

    /// Shared deadline for the concurrent counts, in milliseconds.
    ///
    /// Environment variable: `AGGREGATE_DEADLINE_MS`
    #[arg(long, env = "AGGREGATE_DEADLINE_MS", default_value_t = 5_000)]
    pub aggregate_deadline_ms: u64,

    /// Collections counted by `GET /demo/concurrent`, comma separated.
    ///
    /// Environment variable: `AGGREGATE_COLLECTIONS`
    #[arg(
        long,
        env = "AGGREGATE_COLLECTIONS",
        value_delimiter = ',',
        default_value = "users,products,orders"
    )]
    pub aggregate_collections: Vec<String>,

    /// Log output format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub pool: PoolSettings,
    pub request_timeout: Duration,
    pub aggregate_deadline: Duration,
    pub aggregate_collections: Vec<String>,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for ServiceConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_pool_size == 0 {
            bail!("MAX_POOL_SIZE must be greater than 0");
        }

        if args.min_pool_size > args.max_pool_size {
            bail!(
                "MIN_POOL_SIZE ({}) exceeds MAX_POOL_SIZE ({})",
                args.min_pool_size,
                args.max_pool_size
            );
        }

        for (name, value) in [
            ("CONNECT_TIMEOUT_SECS", args.connect_timeout_secs),
            ("REQUEST_TIMEOUT_MS", args.request_timeout_ms),
            ("AGGREGATE_DEADLINE_MS", args.aggregate_deadline_ms),
        ] {
            if value == 0 {
                bail!("{name} must be greater than 0");
            }
        }

        let aggregate_collections: Vec<String> = args
            .aggregate_collections
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
            .collect();
        if aggregate_collections.is_empty() {
            bail!("AGGREGATE_COLLECTIONS must name at least one collection");
        }

        Ok(Self {
            bind_addr: args.bind_addr,
            store: args.store,
            pool: PoolSettings {
                uri: args.mongo_uri,
                app_name: env!("CARGO_PKG_NAME").to_owned(),
                users_database: args.users_database,
                demo_database: args.demo_database,
                min_pool_size: args.min_pool_size,
                max_pool_size: args.max_pool_size,
                max_idle_time: Duration::from_secs(args.max_idle_secs),
                connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            },
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            aggregate_deadline: Duration::from_millis(args.aggregate_deadline_ms),
            aggregate_collections,
            log_format: args.log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(extra: &[&str]) -> anyhow::Result<ServiceConfig> {
        let argv = std::iter::once("userstore").chain(extra.iter().copied());
        ServiceConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_describe_local_mongo() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.store, StoreBackend::Mongo);
        assert_eq!(config.pool.users_database, "mongo-golang");
        assert_eq!(config.pool.demo_database, "testdb");
        assert_eq!(config.pool.min_pool_size, 10);
        assert_eq!(config.pool.max_pool_size, 100);
        assert_eq!(config.pool.max_idle_time, Duration::from_secs(300));
        assert_eq!(config.aggregate_deadline, Duration::from_secs(5));
        assert_eq!(config.aggregate_collections, ["users", "products", "orders"]);
    }

    #[test]
    fn collections_are_trimmed() {
        let config = parse(&["--aggregate-collections", " a, ,b "]).unwrap();
        assert_eq!(config.aggregate_collections, ["a", "b"]);
    }

    #[rstest]
    #[case(&["--max-pool-size", "0"])]
    #[case(&["--min-pool-size", "20", "--max-pool-size", "5"])]
    #[case(&["--request-timeout-ms", "0"])]
    #[case(&["--aggregate-deadline-ms", "0"])]
    #[case(&["--aggregate-collections", ","])]
    #[case(&["--store", "postgres"])]
    fn rejects_invalid_settings(#[case] extra: &[&str]) {
        assert!(parse(extra).is_err());
    }
}
