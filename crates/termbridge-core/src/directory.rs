//! The mock ABHA user directory.
//!
//! Users are provisioned out of band and loaded once at startup. The
//! directory never mutates them; it only answers credential checks and
//! profile lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A provisioned ABHA user. Every field is plain text, including `phone`,
/// whose leading zeros and formatting are significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
  pub abha_id:    String,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub dob:        String,
  pub gender:     String,
  pub address:    String,
  pub created_at: String,
}

/// Read-only lookup of provisioned users.
///
/// The mock check compares the identifier and phone as exact strings. A real
/// identity provider would sit behind the same two methods.
pub trait CredentialStore: Send + Sync {
  /// Return the user whose identifier *and* phone both match exactly.
  fn find_by_identifier_and_phone(
    &self,
    abha_id: &str,
    phone: &str,
  ) -> Result<UserRecord>;

  /// Return the user with the given identifier.
  fn find_by_identifier(&self, abha_id: &str) -> Result<UserRecord>;
}

/// In-memory [`CredentialStore`] keyed by ABHA id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
  users: HashMap<String, UserRecord>,
}

impl UserDirectory {
  /// Build the directory. When an identifier appears more than once the
  /// first record is kept.
  pub fn new(records: Vec<UserRecord>) -> Self {
    let mut users = HashMap::with_capacity(records.len());
    for record in records {
      if users.contains_key(&record.abha_id) {
        tracing::warn!(abha_id = %record.abha_id, "duplicate user record ignored");
        continue;
      }
      users.insert(record.abha_id.clone(), record);
    }
    Self { users }
  }

  pub fn len(&self) -> usize { self.users.len() }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }
}

impl CredentialStore for UserDirectory {
  fn find_by_identifier_and_phone(
    &self,
    abha_id: &str,
    phone: &str,
  ) -> Result<UserRecord> {
    self
      .users
      .get(abha_id)
      .filter(|u| u.phone == phone)
      .cloned()
      .ok_or(Error::UserNotFound)
  }

  fn find_by_identifier(&self, abha_id: &str) -> Result<UserRecord> {
    self.users.get(abha_id).cloned().ok_or(Error::UserNotFound)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(abha_id: &str, phone: &str) -> UserRecord {
    UserRecord {
      abha_id:    abha_id.into(),
      name:       "Asha Rao".into(),
      email:      "asha@example.com".into(),
      phone:      phone.into(),
      dob:        "1990-01-01".into(),
      gender:     "F".into(),
      address:    "Pune".into(),
      created_at: "2024-01-01".into(),
    }
  }

  #[test]
  fn matches_identifier_and_phone() {
    let dir = UserDirectory::new(vec![user("ABHA001", "9876543210")]);
    let found = dir
      .find_by_identifier_and_phone("ABHA001", "9876543210")
      .unwrap();
    assert_eq!(found.abha_id, "ABHA001");
  }

  #[test]
  fn wrong_phone_is_not_found() {
    let dir = UserDirectory::new(vec![user("ABHA001", "9876543210")]);
    assert!(matches!(
      dir.find_by_identifier_and_phone("ABHA001", "9876543211"),
      Err(Error::UserNotFound)
    ));
  }

  #[test]
  fn phone_is_compared_as_text() {
    let dir = UserDirectory::new(vec![user("ABHA002", "0123456789")]);
    assert!(dir.find_by_identifier_and_phone("ABHA002", "123456789").is_err());
    assert!(
      dir
        .find_by_identifier_and_phone("ABHA002", "0123456789")
        .is_ok()
    );
  }

  #[test]
  fn identifier_match_is_case_sensitive() {
    let dir = UserDirectory::new(vec![user("ABHA001", "9876543210")]);
    assert!(dir.find_by_identifier("abha001").is_err());
    assert!(dir.find_by_identifier("ABHA001").is_ok());
  }

  #[test]
  fn first_duplicate_wins() {
    let mut second = user("ABHA001", "1111111111");
    second.name = "Someone Else".into();
    let dir = UserDirectory::new(vec![user("ABHA001", "9876543210"), second]);
    assert_eq!(dir.len(), 1);
    assert_eq!(dir.find_by_identifier("ABHA001").unwrap().phone, "9876543210");
  }

  #[test]
  fn numeric_phone_is_rejected_at_load() {
    let json = r#"{"abha_id":"ABHA003","name":"n","email":"e","phone":9876543210,
      "dob":"d","gender":"g","address":"a","created_at":"c"}"#;
    assert!(serde_json::from_str::<UserRecord>(json).is_err());
  }
}
