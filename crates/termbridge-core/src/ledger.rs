//! The translation history ledger.
//!
//! The ledger is append-only: entries are never updated, compacted or
//! deleted. Ids are assigned by the backend from the ledger length at append
//! time, so append order, id order and chronological order coincide.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every history entry id.
pub const ENTRY_ID_PREFIX: &str = "TRANS_";

/// Format the id of the entry at 1-based position `seq`.
pub fn format_entry_id(seq: u64) -> String { format!("{ENTRY_ID_PREFIX}{seq:04}") }

/// A history entry before the ledger has assigned its id, owner and time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewHistoryEntry {
  pub source_system:  String,
  pub source_code:    String,
  pub target_system:  String,
  pub target_code:    String,
  pub snomed_ct_code: String,
  pub loinc_code:     String,
}

/// A stored history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub id:             String,
  pub abha_id:        String,
  pub source_system:  String,
  pub source_code:    String,
  pub target_system:  String,
  pub target_code:    String,
  pub snomed_ct_code: String,
  pub loinc_code:     String,
  pub timestamp:      DateTime<Utc>,
}

impl HistoryEntry {
  pub fn new(id: String, abha_id: String, entry: NewHistoryEntry, timestamp: DateTime<Utc>) -> Self {
    Self {
      id,
      abha_id,
      source_system: entry.source_system,
      source_code: entry.source_code,
      target_system: entry.target_system,
      target_code: entry.target_code,
      snomed_ct_code: entry.snomed_ct_code,
      loinc_code: entry.loinc_code,
      timestamp,
    }
  }
}

/// Abstraction over a history ledger backend.
///
/// Implementations must serialise the id assignment in
/// [`append`](Self::append): two concurrent appends may never observe the
/// same ledger length.
pub trait HistoryLedger: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append `entry` under `abha_id` and return the stored record.
  fn append(
    &self,
    entry: NewHistoryEntry,
    abha_id: &str,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send;

  /// Every entry owned by `abha_id`, oldest first.
  fn list_for(
    &self,
    abha_id: &str,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send;
}

/// Read `abha_id`'s history, treating an unreadable ledger as empty.
pub async fn read_history<L: HistoryLedger>(ledger: &L, abha_id: &str) -> Vec<HistoryEntry> {
  match ledger.list_for(abha_id).await {
    Ok(entries) => entries,
    Err(e) => {
      tracing::warn!(error = %e, abha_id, "history ledger unreadable; returning no history");
      Vec::new()
    }
  }
}
