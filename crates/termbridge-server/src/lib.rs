//! Process wiring for the termbridge server.
//!
//! Loads configuration and the static reference data (ABHA users, the code
//! mapping table, the NAMASTE terminology), opens the history ledger, and
//! assembles the HTTP application. Reference data is read once here and
//! handed to the core as constructor arguments.

use std::{
  fs::File,
  io::BufReader,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use serde::{Deserialize, de::DeserializeOwned};
use termbridge_api::AppState;
use termbridge_core::{
  directory::{UserDirectory, UserRecord},
  mapping::{MappingRecord, MappingTable},
  session::SessionKeys,
  terminology::{SearchConcept, Terminology},
  translate::Translator,
};
use termbridge_store_sqlite::SqliteLedger;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Prefix of environment variables that override the config file.
pub const ENV_PREFIX: &str = "TERMBRIDGE";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TERMBRIDGE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// HMAC key for session tokens. Must be supplied; there is no fallback.
  pub session_secret:   String,
  pub users_path:       PathBuf,
  pub mappings_path:    PathBuf,
  pub terminology_path: PathBuf,
  pub history_path:     PathBuf,
  /// Allow any origin, method and header. Meant for local front-end work.
  pub cors_permissive:  bool,
}

/// Read `path` (optional) layered under the environment, on top of defaults.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("session_secret", "")?
    .set_default("users_path", "data/abha_users.json")?
    .set_default("mappings_path", "data/mappings.json")?
    .set_default("terminology_path", "data/namaste_terms.json")?
    .set_default("history_path", "data/translation_history.db")?
    .set_default("cors_permissive", false)?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix(ENV_PREFIX))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

// ─── Reference data ───────────────────────────────────────────────────────────

/// Read a JSON array of records from `path`.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
  let file = File::open(path).with_context(|| format!("failed to open {path:?}"))?;
  serde_json::from_reader(BufReader::new(file))
    .with_context(|| format!("failed to parse {path:?}"))
}

/// Build the shared application state from `cfg`.
pub async fn build_state(cfg: &ServerConfig) -> anyhow::Result<AppState<SqliteLedger>> {
  let sessions = SessionKeys::new(cfg.session_secret.as_bytes()).with_context(|| {
    format!("session_secret must be set (config file or {ENV_PREFIX}_SESSION_SECRET)")
  })?;

  let users: Vec<UserRecord> = load_records(&expand_tilde(&cfg.users_path))?;
  let mappings: Vec<MappingRecord> = load_records(&expand_tilde(&cfg.mappings_path))?;
  let concepts: Vec<SearchConcept> = load_records(&expand_tilde(&cfg.terminology_path))?;

  let directory = UserDirectory::new(users);
  let table = MappingTable::new(mappings);
  let terminology = Terminology::new(concepts);
  tracing::info!(
    users = directory.len(),
    mappings = table.len(),
    concepts = terminology.len(),
    "reference data loaded"
  );

  let history_path = expand_tilde(&cfg.history_path);
  if let Some(parent) = history_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let ledger = SqliteLedger::open(&history_path)
    .await
    .with_context(|| format!("failed to open history ledger at {history_path:?}"))?;

  Ok(AppState {
    directory:   Arc::new(directory),
    sessions:    Arc::new(sessions),
    translator:  Arc::new(Translator::new(Arc::new(table))),
    terminology: Arc::new(terminology),
    ledger:      Arc::new(ledger),
  })
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router with request tracing and, if configured, permissive CORS.
pub fn app(state: AppState<SqliteLedger>, cfg: &ServerConfig) -> Router {
  let router = termbridge_api::api_router(state).layer(TraceLayer::new_for_http());
  if cfg.cors_permissive {
    router.layer(CorsLayer::permissive())
  } else {
    router
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  expand_tilde_with(path, std::env::var("HOME").ok().as_deref())
}

/// Expand a leading `~` against `home`; paths are unchanged without one.
fn expand_tilde_with(path: &Path, home: Option<&str>) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = home
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
