//! Error types for `termbridge-core`.

use thiserror::Error;

/// Why a bearer token was refused.
///
/// Callers only ever see [`Error::Unauthorized`]; the cause is kept for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
  MissingHeader,
  MalformedScheme,
  BadSignature,
  Expired,
  MissingIdentity,
  Malformed,
}

impl std::fmt::Display for TokenRejection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      TokenRejection::MissingHeader => "authorization header missing",
      TokenRejection::MalformedScheme => {
        "authorization header must start with 'Bearer '"
      }
      TokenRejection::BadSignature => "signature verification failed",
      TokenRejection::Expired => "token expired",
      TokenRejection::MissingIdentity => "token carries no identity",
      TokenRejection::Malformed => "token is malformed",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found")]
  UserNotFound,

  #[error("unauthorized: {0}")]
  Unauthorized(TokenRejection),

  #[error("unsupported system {0:?}; use NAM or TM2")]
  UnsupportedSystem(String),

  #[error("session secret must not be empty")]
  EmptySecret,

  #[error("token encoding error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
