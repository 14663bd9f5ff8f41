//! Handlers for `/abha` endpoints: mock login, profile and history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/abha/login` | Body: `{"abha_id": "...", "phone": "..."}` |
//! | `GET`  | `/abha/profile` | Bearer token required |
//! | `POST` | `/abha/save-translation` | Bearer token required; body: [`NewHistoryEntry`] |
//! | `GET`  | `/abha/translation-history` | Bearer token required |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use termbridge_core::{
  directory::UserRecord,
  ledger::{HistoryEntry, HistoryLedger, NewHistoryEntry, read_history},
};

use crate::{AppState, auth::Identity, error::ApiError};

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub abha_id: String,
  pub phone:   String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub message:      String,
  pub abha_user:    Option<UserRecord>,
  pub access_token: Option<String>,
}

/// `POST /abha/login` — exact match on ABHA id and phone; returns a session
/// token on success.
pub async fn login<L>(
  State(state): State<AppState<L>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
  L: HistoryLedger + Clone + 'static,
{
  let Json(body) = body?;
  let user = state
    .directory
    .find_by_identifier_and_phone(&body.abha_id, &body.phone)
    .map_err(|_| ApiError::Unauthorized("Invalid ABHA ID or phone number".to_owned()))?;

  let token = state.sessions.issue(&user.abha_id)?;
  tracing::info!(abha_id = %user.abha_id, "login succeeded");

  Ok(Json(LoginResponse {
    message:      "Login successful".to_owned(),
    abha_user:    Some(user),
    access_token: Some(token),
  }))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /abha/profile`
pub async fn profile<L>(
  State(state): State<AppState<L>>,
  Identity(abha_id): Identity,
) -> Result<Json<UserRecord>, ApiError>
where
  L: HistoryLedger + Clone + 'static,
{
  Ok(Json(state.directory.find_by_identifier(&abha_id)?))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
  pub message:  String,
  pub entry_id: String,
}

/// `POST /abha/save-translation` — append one entry to the caller's history.
pub async fn save_translation<L>(
  State(state): State<AppState<L>>,
  Identity(abha_id): Identity,
  body: Result<Json<NewHistoryEntry>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError>
where
  L: HistoryLedger + Clone + 'static,
{
  let Json(body) = body?;
  let entry = state
    .ledger
    .append(body, &abha_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(SaveResponse {
    message:  "Translation history saved successfully".to_owned(),
    entry_id: entry.id,
  }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
  pub history: Vec<HistoryEntry>,
}

/// `GET /abha/translation-history` — never fails once authenticated; an
/// unreadable ledger yields an empty list.
pub async fn translation_history<L>(
  State(state): State<AppState<L>>,
  Identity(abha_id): Identity,
) -> Json<HistoryResponse>
where
  L: HistoryLedger + Clone + 'static,
{
  Json(HistoryResponse {
    history: read_history(state.ledger.as_ref(), &abha_id).await,
  })
}
