//! termbridge server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `TERMBRIDGE_*` environment variables, loads the reference data, opens the
//! SQLite history ledger, and serves the JSON API over HTTP.
//!
//! # Session secret generation
//!
//! To generate a value for `session_secret`:
//!
//! ```
//! cargo run -p termbridge-server -- --generate-secret
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use rand_core::{OsRng, RngCore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "NAMASTE ↔ ICD-11 TM2 terminology server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a random session secret and exit.
  #[arg(long)]
  generate_secret: bool,
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

  // Helper mode: mint a secret and exit.
  if cli.generate_secret {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    println!("{}", hex::encode(secret));
    return Ok(());
  }

  let server_cfg = termbridge_server::load_config(&cli.config)?;
  let state = termbridge_server::build_state(&server_cfg).await?;
  let app = termbridge_server::app(state, &server_cfg);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
