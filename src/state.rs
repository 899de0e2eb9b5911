use std::sync::Arc;

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all HTTP-based services to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Cinelog/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Process-wide dependencies, injected into every handler through the
/// router state instead of reached through globals.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub tmdb: Arc<TmdbClient>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds)?;
        let tmdb = Arc::new(TmdbClient::with_shared_client(http_client, &config.tmdb));

        Ok(Self {
            config,
            store,
            tmdb,
        })
    }
}
