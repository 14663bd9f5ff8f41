//! Bearer-token extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use termbridge_core::ledger::HistoryLedger;

use crate::{AppState, error::ApiError};

/// The verified ABHA id of the caller. Present in a handler means the request
/// carried a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

/// The raw `Authorization` header value, if any.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
}

impl<L> FromRequestParts<AppState<L>> for Identity
where
  L: HistoryLedger + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<L>,
  ) -> Result<Self, Self::Rejection> {
    let abha_id = state.sessions.verify(authorization(&parts.headers))?;
    Ok(Identity(abha_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{body::Body, http::Request};
  use termbridge_store_sqlite::SqliteLedger;

  use crate::tests::make_state;

  async fn extract(req: Request<Body>, state: &AppState<SqliteLedger>) -> Result<Identity, ApiError> {
    let (mut parts, _) = req.into_parts();
    Identity::from_request_parts(&mut parts, state).await
  }

  #[tokio::test]
  async fn valid_token() {
    let state = make_state().await;
    let token = state.sessions.issue("ABHA001").unwrap();
    let req = Request::builder()
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty()).unwrap();
    assert_eq!(extract(req, &state).await.unwrap(), Identity("ABHA001".into()));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state().await;
    let req = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized(_))));
  }

  #[tokio::test]
  async fn basic_scheme_is_rejected() {
    let state = make_state().await;
    let token = state.sessions.issue("ABHA001").unwrap();
    let req = Request::builder()
      .header(header::AUTHORIZATION, format!("Basic {token}"))
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized(_))));
  }

  #[tokio::test]
  async fn token_from_another_secret_is_rejected() {
    let state = make_state().await;
    let foreign = termbridge_core::session::SessionKeys::new(b"not-the-server-secret").unwrap();
    let token = foreign.issue("ABHA001").unwrap();
    let req = Request::builder()
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized(_))));
  }
}
