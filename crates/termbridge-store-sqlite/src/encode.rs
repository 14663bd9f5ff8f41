//! Encoding and decoding helpers between ledger types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use termbridge_core::ledger::HistoryEntry;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawHistoryEntry::from_row`].
pub const HISTORY_COLUMNS: &str = "id, abha_id, source_system, source_code, target_system, \
   target_code, snomed_ct_code, loinc_code, timestamp";

/// Raw strings read directly from a `translation_history` row.
pub struct RawHistoryEntry {
  pub id:             String,
  pub abha_id:        String,
  pub source_system:  String,
  pub source_code:    String,
  pub target_system:  String,
  pub target_code:    String,
  pub snomed_ct_code: String,
  pub loinc_code:     String,
  pub timestamp:      String,
}

impl RawHistoryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      abha_id:        row.get(1)?,
      source_system:  row.get(2)?,
      source_code:    row.get(3)?,
      target_system:  row.get(4)?,
      target_code:    row.get(5)?,
      snomed_ct_code: row.get(6)?,
      loinc_code:     row.get(7)?,
      timestamp:      row.get(8)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      timestamp:      decode_dt(&self.timestamp)?,
      id:             self.id,
      abha_id:        self.abha_id,
      source_system:  self.source_system,
      source_code:    self.source_code,
      target_system:  self.target_system,
      target_code:    self.target_code,
      snomed_ct_code: self.snomed_ct_code,
      loinc_code:     self.loinc_code,
    })
  }
}
