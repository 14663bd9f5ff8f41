//! The NAMASTE ↔ ICD-11 TM2 code mapping table.
//!
//! Loaded once at startup and read-only afterwards. Codes are not unique on
//! either side, so both indices map a code to every record position that
//! carries it, in insertion order.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of the mapping table, in stored orientation
/// (`source_code` is NAMASTE, `target_code` is ICD-11 TM2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
  pub source_code:    String,
  pub target_code:    String,
  pub relationship:   String,
  #[serde(default, deserialize_with = "code_text")]
  pub snomed_ct_code: String,
  #[serde(default, deserialize_with = "code_text")]
  pub loinc_code:     String,
}

/// Accept a reference code written as a string, a number, or nothing at all,
/// and keep it as text.
fn code_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Null => String::new(),
    Value::String(s) => s,
    other => other.to_string(),
  })
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
  records:   Vec<MappingRecord>,
  by_source: HashMap<String, Vec<usize>>,
  by_target: HashMap<String, Vec<usize>>,
}

impl MappingTable {
  pub fn new(records: Vec<MappingRecord>) -> Self {
    let mut by_source: HashMap<String, Vec<usize>> = HashMap::new();
    let mut by_target: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, r) in records.iter().enumerate() {
      by_source.entry(r.source_code.clone()).or_default().push(i);
      by_target.entry(r.target_code.clone()).or_default().push(i);
    }
    Self { records, by_source, by_target }
  }

  /// Records whose `source_code` equals `code` exactly.
  pub fn lookup_by_source(&self, code: &str) -> Vec<&MappingRecord> {
    self.resolve(self.by_source.get(code))
  }

  /// Records whose `target_code` equals `code` exactly.
  pub fn lookup_by_target(&self, code: &str) -> Vec<&MappingRecord> {
    self.resolve(self.by_target.get(code))
  }

  fn resolve(&self, positions: Option<&Vec<usize>>) -> Vec<&MappingRecord> {
    positions
      .map(|ps| ps.iter().map(|&i| &self.records[i]).collect())
      .unwrap_or_default()
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(source: &str, target: &str, snomed: &str) -> MappingRecord {
    MappingRecord {
      source_code:    source.into(),
      target_code:    target.into(),
      relationship:   "equivalent".into(),
      snomed_ct_code: snomed.into(),
      loinc_code:     String::new(),
    }
  }

  #[test]
  fn one_to_many_in_both_directions_keeps_insertion_order() {
    let table = MappingTable::new(vec![
      record("NAM001", "TM2.A", "1"),
      record("NAM002", "TM2.A", "2"),
      record("NAM001", "TM2.B", "3"),
    ]);

    let from_source: Vec<_> =
      table.lookup_by_source("NAM001").iter().map(|r| r.snomed_ct_code.as_str()).collect();
    assert_eq!(from_source, ["1", "3"]);

    let from_target: Vec<_> =
      table.lookup_by_target("TM2.A").iter().map(|r| r.snomed_ct_code.as_str()).collect();
    assert_eq!(from_target, ["1", "2"]);
  }

  #[test]
  fn lookups_are_exact_and_case_sensitive() {
    let table = MappingTable::new(vec![record("NAM001", "TM2.A", "1")]);
    assert!(table.lookup_by_source("nam001").is_empty());
    assert!(table.lookup_by_source("NAM00").is_empty());
    assert!(table.lookup_by_target("TM2.a").is_empty());
  }

  #[test]
  fn duplicates_are_preserved() {
    let table = MappingTable::new(vec![
      record("NAM001", "TM2.A", "1"),
      record("NAM001", "TM2.A", "1"),
    ]);
    assert_eq!(table.lookup_by_source("NAM001").len(), 2);
  }

  #[test]
  fn reference_codes_are_coerced_to_text() {
    let json = r#"[
      {"source_code":"NAM001","target_code":"TM2.A","relationship":"equivalent",
       "snomed_ct_code":22298006,"loinc_code":null},
      {"source_code":"NAM002","target_code":"TM2.B","relationship":"broader"}
    ]"#;
    let records: Vec<MappingRecord> = serde_json::from_str(json).unwrap();
    assert_eq!(records[0].snomed_ct_code, "22298006");
    assert_eq!(records[0].loinc_code, "");
    assert_eq!(records[1].snomed_ct_code, "");
  }
}
