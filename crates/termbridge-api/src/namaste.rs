//! Handler for `GET /namaste/search?query=...`.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use termbridge_core::{ledger::HistoryLedger, terminology::SearchConcept};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
  #[serde(rename = "resourceType")]
  pub resource_type: String,
  pub concepts:      Vec<SearchConcept>,
}

pub async fn search<L>(
  State(state): State<AppState<L>>,
  params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError>
where
  L: HistoryLedger + Clone + 'static,
{
  let Query(params) = params?;
  if params.query.is_empty() {
    return Err(ApiError::BadRequest("query must be at least 1 character".to_owned()));
  }

  Ok(Json(SearchResponse {
    resource_type: "CodeSystem".to_owned(),
    concepts:      state.terminology.search(&params.query),
  }))
}
