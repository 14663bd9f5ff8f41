//! JSON REST API for termbridge.
//!
//! Exposes an axum [`Router`] backed by any
//! [`HistoryLedger`](termbridge_core::ledger::HistoryLedger). TLS, CORS and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = termbridge_api::api_router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod abha;
pub mod auth;
pub mod error;
pub mod mapping;
pub mod namaste;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use serde_json::{Value, json};
use termbridge_core::{
  directory::CredentialStore, ledger::HistoryLedger, session::SessionKeys,
  terminology::Terminology, translate::Translator,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// Everything except the ledger is immutable after startup.
#[derive(Clone)]
pub struct AppState<L: HistoryLedger> {
  pub directory:   Arc<dyn CredentialStore>,
  pub sessions:    Arc<SessionKeys>,
  pub translator:  Arc<Translator>,
  pub terminology: Arc<Terminology>,
  pub ledger:      Arc<L>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<L>(state: AppState<L>) -> Router<()>
where
  L: HistoryLedger + Clone + 'static,
{
  Router::new()
    .route("/", get(root))
    // ABHA
    .route("/abha/login", post(abha::login::<L>))
    .route("/abha/profile", get(abha::profile::<L>))
    .route("/abha/save-translation", post(abha::save_translation::<L>))
    .route("/abha/translation-history", get(abha::translation_history::<L>))
    // Mapping
    .route("/mapping/translate", get(mapping::translate::<L>))
    // NAMASTE search; the doubled path is what the web client calls.
    .route("/namaste/search", get(namaste::search::<L>))
    .route("/namaste/namaste/search", get(namaste::search::<L>))
    .with_state(state)
}

async fn root() -> Json<Value> {
  Json(json!({ "message": "Welcome to the NAMASTE ↔ ICD11 FHIR API" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
