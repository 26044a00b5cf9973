//! roster server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ROSTER_*` environment variables, initialises the database pool, and
//! serves the REST API until interrupted.
//!
//! ```sh
//! ROSTER_DATABASE_URI=sqlite://~/roster.db cargo run -p roster-server --bin server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roster_server::ServerConfig;
use roster_store_sqlite::Database;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster REST server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROSTER").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let db_config = server_cfg
    .database_config()
    .with_context(|| format!("invalid database uri {:?}", server_cfg.database_uri))?;

  // Build the pool before accepting connections, so a bad database fails
  // startup rather than the first request.
  let db = Arc::new(Database::new(db_config));
  db.get_connection()
    .await
    .context("failed to initialise database")?;

  let app = roster_server::router(Arc::clone(&db), &server_cfg);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  db.close_connection()
    .await
    .context("failed to close database")?;
  tracing::info!("shut down cleanly");

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}
