use anyhow::Result;
use tracing::info;

use campus_api::{api, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("campus_api=info".parse()?)
        )
        .init();

    info!("Starting Campus API v{}", env!("CARGO_PKG_VERSION"));

    let cfg = config::load()?;
    info!("Configuration loaded");

    let db_pool = db::init(&cfg).await?;
    info!("Database initialized");

    db::seed_admin(&db_pool).await?;

    api::serve(cfg, db_pool).await
}
