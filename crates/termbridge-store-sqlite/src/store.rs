//! [`SqliteLedger`] — the SQLite implementation of [`HistoryLedger`].

use std::path::Path;

use chrono::Utc;
use rusqlite::TransactionBehavior;
use termbridge_core::ledger::{HistoryEntry, HistoryLedger, NewHistoryEntry, format_entry_id};

use crate::{
  Result,
  encode::{HISTORY_COLUMNS, RawHistoryEntry, encode_dt},
  schema::SCHEMA,
};

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A history ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// on the connection runs on its one worker thread, one at a time, and
/// appends additionally take an immediate (write-locking) transaction, so id
/// assignment is serialised even across processes sharing the file.
#[derive(Clone)]
pub struct SqliteLedger {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  /// Open an in-memory ledger — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Total number of entries across all identities.
  pub async fn len(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM translation_history", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }
}

// ─── HistoryLedger impl ──────────────────────────────────────────────────────

impl HistoryLedger for SqliteLedger {
  type Error = crate::Error;

  async fn append(&self, entry: NewHistoryEntry, abha_id: &str) -> Result<HistoryEntry> {
    let owner = abha_id.to_owned();
    let row = entry.clone();

    let (id, timestamp) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let count: i64 =
          tx.query_row("SELECT COUNT(*) FROM translation_history", [], |r| r.get(0))?;
        let seq = count + 1;
        let id = format_entry_id(seq as u64);
        let timestamp = Utc::now();

        tx.execute(
          "INSERT INTO translation_history
             (seq, id, abha_id, source_system, source_code, target_system,
              target_code, snomed_ct_code, loinc_code, timestamp)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            seq,
            id,
            owner,
            row.source_system,
            row.source_code,
            row.target_system,
            row.target_code,
            row.snomed_ct_code,
            row.loinc_code,
            encode_dt(timestamp),
          ],
        )?;
        tx.commit()?;

        Ok((id, timestamp))
      })
      .await?;

    tracing::debug!(%id, abha_id, "appended history entry");
    Ok(HistoryEntry::new(id, abha_id.to_owned(), entry, timestamp))
  }

  async fn list_for(&self, abha_id: &str) -> Result<Vec<HistoryEntry>> {
    let owner = abha_id.to_owned();

    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM translation_history WHERE abha_id = ?1 ORDER BY seq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }
}
