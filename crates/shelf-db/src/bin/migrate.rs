//! Apply the review schema migrations
//!
//! Run with:
//! ```bash
//! cargo run -p shelf-db --bin shelf-migrate
//! ```
//!
//! Reads `DATABASE_URL` and `DATABASE_MIGRATIONS_DIR` from the environment or `.env`.

use shelf_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use shelf_db::pool::{create_pool, run_migrations, DatabaseConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Migration failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(env = ?config.app.env, dir = %config.database.migrations_dir, "Configuration loaded");

    let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
    run_migrations(&pool, &config.database.migrations_dir).await?;
    pool.close().await;

    info!("Migrations applied");
    Ok(())
}
