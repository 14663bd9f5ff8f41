//! Signed, time-bound session tokens.
//!
//! Tokens are HS256 JWTs carrying a single `abha_id` claim and an `exp`
//! 24 hours after issuance. They are self-contained: there is no server-side
//! session table and no revocation list.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, TokenRejection};

/// Lifetime of an issued token, in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

const BEARER_PREFIX: &str = "Bearer ";

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub abha_id: Option<String>,
  /// Expiry as Unix seconds.
  pub exp:     i64,
}

/// Signing and verification keys derived from the server-held secret.
#[derive(Clone)]
pub struct SessionKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl SessionKeys {
  /// Derive keys from `secret`. The secret must come from configuration; an
  /// empty one is refused.
  pub fn new(secret: &[u8]) -> Result<Self> {
    if secret.is_empty() {
      return Err(Error::EmptySecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Ok(Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    })
  }

  /// Issue a token for `abha_id`, valid for [`SESSION_TTL_HOURS`] from now.
  pub fn issue(&self, abha_id: &str) -> Result<String> {
    self.issue_at(abha_id, Utc::now())
  }

  /// Issue a token as though it had been minted at `issued_at`.
  pub fn issue_at(&self, abha_id: &str, issued_at: DateTime<Utc>) -> Result<String> {
    let claims = SessionClaims {
      abha_id: Some(abha_id.to_owned()),
      exp:     (issued_at + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
    };
    self.sign(&claims)
  }

  fn sign(&self, claims: &SessionClaims) -> Result<String> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
  }

  /// Verify an `Authorization` header value and return the identity it
  /// carries.
  ///
  /// The signature is checked before the expiry, so a forged token is
  /// reported as a bad signature even when it is also stale.
  pub fn verify(&self, authorization: Option<&str>) -> Result<String> {
    let header =
      authorization.ok_or(Error::Unauthorized(TokenRejection::MissingHeader))?;

    let token = header
      .strip_prefix(BEARER_PREFIX)
      .map(str::trim)
      .filter(|t| !t.is_empty() && !t.contains(' '))
      .ok_or(Error::Unauthorized(TokenRejection::MalformedScheme))?;

    let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)
      .map_err(|e| {
        let cause = match e.kind() {
          ErrorKind::InvalidSignature => TokenRejection::BadSignature,
          ErrorKind::ExpiredSignature => TokenRejection::Expired,
          _ => TokenRejection::Malformed,
        };
        Error::Unauthorized(cause)
      })?;

    data
      .claims
      .abha_id
      .filter(|id| !id.is_empty())
      .ok_or(Error::Unauthorized(TokenRejection::MissingIdentity))
  }

  /// Like [`verify`](Self::verify), but an absent or invalid token simply
  /// yields `None`.
  pub fn verify_optional(&self, authorization: Option<&str>) -> Option<String> {
    match self.verify(authorization) {
      Ok(identity) => Some(identity),
      Err(e) => {
        tracing::debug!(error = %e, "ignoring session token");
        None
      }
    }
  }
}
