pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod notice;
pub mod service;
pub mod state;
pub mod storage;
pub mod upload;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use auth::AuthClient;
use config::Config;
use error::Result;
use state::AppState;
use upload::ObjectStorage;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("FOLIO_LOG"))
        .init();

    let config = Config::from_env()?;

    let pool = storage::connect(&config.database_url).await?;
    storage::migrate(&pool).await?;

    let auth = AuthClient::from_config(&config.baas);
    if auth.is_none() {
        tracing::warn!("baas auth is not configured, admin routes are open");
    }

    let state = AppState::new(storage::PgStore::new(pool), &config.site_url)
        .with_auth(auth)
        .with_storage(ObjectStorage::from_config(&config.baas));

    api::run_server(state, &config.listen).await
}
