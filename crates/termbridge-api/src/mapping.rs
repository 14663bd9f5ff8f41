//! Handler for `GET /mapping/translate`.
//!
//! `?system=NAM|TM2&code=...[&save_history=true]`. The optional bearer token
//! only decides whether the lookup is recorded; it never changes the answer.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
  http::HeaderMap,
};
use serde::{Deserialize, Deserializer};
use termbridge_core::{ledger::HistoryLedger, translate::TranslationResult};

use crate::{AppState, auth::authorization, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TranslateParams {
  pub system:       String,
  pub code:         String,
  #[serde(default, deserialize_with = "lenient_flag")]
  pub save_history: bool,
}

/// Query-string boolean. Accepts `true/false`, `1/0`, `yes/no`, `on/off`,
/// `t/f` and `y/n` in any case; anything else reads as `false` so the flag
/// can never fail the lookup itself.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
  let raw = String::deserialize(deserializer)?;
  Ok(matches!(
    raw.trim().to_ascii_lowercase().as_str(),
    "true" | "1" | "yes" | "on" | "t" | "y"
  ))
}

pub async fn translate<L>(
  State(state): State<AppState<L>>,
  headers: HeaderMap,
  params: Result<Query<TranslateParams>, QueryRejection>,
) -> Result<Json<TranslationResult>, ApiError>
where
  L: HistoryLedger + Clone + 'static,
{
  let Query(params) = params?;
  let identity = params
    .save_history
    .then(|| state.sessions.verify_optional(authorization(&headers)))
    .flatten();

  let result = state
    .translator
    .translate_and_record(
      state.ledger.as_ref(),
      &params.system,
      &params.code,
      params.save_history,
      identity.as_deref(),
    )
    .await?;

  Ok(Json(result))
}
