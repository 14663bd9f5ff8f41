//! Direction-aware translation between NAMASTE and ICD-11 TM2.
//!
//! The mapping table stores rows in NAMASTE → TM2 orientation. Queries from
//! either side are answered from the caller's point of view: `source_code` is
//! always the code that was asked about.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ledger::{HistoryLedger, NewHistoryEntry},
  mapping::{MappingRecord, MappingTable},
};

pub const CONCEPT_MAP_ID: &str = "ConceptMap";
pub const CONCEPT_MAP_NAME: &str = "NAMASTE-ICD11-SNOMED-LOINC Map";

/// The coding system a translation query starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSystem {
  /// The NAMASTE local terminology (`NAM`).
  Namaste,
  /// The ICD-11 Traditional Medicine chapter 2 classification (`TM2`).
  Icd11Tm2,
}

impl CodeSystem {
  /// Parse a query token; surrounding whitespace and case are ignored.
  pub fn parse(raw: &str) -> Result<Self> {
    match raw.trim().to_uppercase().as_str() {
      "NAM" => Ok(Self::Namaste),
      "TM2" => Ok(Self::Icd11Tm2),
      _ => Err(Error::UnsupportedSystem(raw.to_owned())),
    }
  }

  /// The token used to query from this system.
  pub fn query_token(self) -> &'static str {
    match self {
      Self::Namaste => "NAM",
      Self::Icd11Tm2 => "TM2",
    }
  }

  /// The ledger label of the system a query from `self` translates *into*.
  pub fn target_label(self) -> &'static str {
    match self {
      Self::Namaste => "ICD11_TM2",
      Self::Icd11Tm2 => "NAMASTE",
    }
  }
}

/// One translated mapping, oriented from the queried code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMapping {
  pub source_code:    String,
  pub target_code:    String,
  pub relationship:   String,
  pub snomed_ct_code: String,
  pub loinc_code:     String,
}

impl ConceptMapping {
  fn oriented(record: &MappingRecord, system: CodeSystem) -> Self {
    let (source, target) = match system {
      CodeSystem::Namaste => (&record.source_code, &record.target_code),
      CodeSystem::Icd11Tm2 => (&record.target_code, &record.source_code),
    };
    Self {
      source_code:    source.clone(),
      target_code:    target.clone(),
      relationship:   record.relationship.clone(),
      snomed_ct_code: record.snomed_ct_code.clone(),
      loinc_code:     record.loinc_code.clone(),
    }
  }
}

/// A FHIR-flavoured `ConceptMap` answering one translation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
  #[serde(rename = "resourceType")]
  pub resource_type: String,
  pub id:            String,
  pub name:          String,
  pub mappings:      Vec<ConceptMapping>,
}

impl TranslationResult {
  fn concept_map(mappings: Vec<ConceptMapping>) -> Self {
    Self {
      resource_type: "ConceptMap".to_owned(),
      id: CONCEPT_MAP_ID.to_owned(),
      name: CONCEPT_MAP_NAME.to_owned(),
      mappings,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Translator {
  table: Arc<MappingTable>,
}

impl Translator {
  pub fn new(table: Arc<MappingTable>) -> Self { Self { table } }

  /// Translate `code` from `system`. No match is an empty result, not an
  /// error; an unknown system is [`Error::UnsupportedSystem`].
  pub fn translate(&self, system: &str, code: &str) -> Result<(CodeSystem, TranslationResult)> {
    let system = CodeSystem::parse(system)?;
    let code = code.trim();

    let records = match system {
      CodeSystem::Namaste => self.table.lookup_by_source(code),
      CodeSystem::Icd11Tm2 => self.table.lookup_by_target(code),
    };

    let mappings = records
      .into_iter()
      .map(|r| ConceptMapping::oriented(r, system))
      .collect();

    Ok((system, TranslationResult::concept_map(mappings)))
  }

  /// Translate, then, if asked to and an identity was verified, append every
  /// resulting mapping to the caller's history.
  ///
  /// History failures never affect the returned result.
  pub async fn translate_and_record<L: HistoryLedger>(
    &self,
    ledger: &L,
    system: &str,
    code: &str,
    save_history: bool,
    identity: Option<&str>,
  ) -> Result<TranslationResult> {
    let (system, result) = self.translate(system, code)?;

    if let (true, Some(abha_id)) = (save_history, identity) {
      for entry in history_entries(system, &result) {
        if let Err(e) = ledger.append(entry, abha_id).await {
          tracing::warn!(error = %e, abha_id, "failed to save translation history");
          break;
        }
      }
    }

    Ok(result)
  }
}

/// The ledger entries recording `result`, one per mapping.
pub fn history_entries(system: CodeSystem, result: &TranslationResult) -> Vec<NewHistoryEntry> {
  result
    .mappings
    .iter()
    .map(|m| NewHistoryEntry {
      source_system:  system.query_token().to_owned(),
      source_code:    m.source_code.clone(),
      target_system:  system.target_label().to_owned(),
      target_code:    m.target_code.clone(),
      snomed_ct_code: m.snomed_ct_code.clone(),
      loinc_code:     m.loinc_code.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::Utc;

  use super::*;
  use crate::ledger::{HistoryEntry, format_entry_id};

  fn translator() -> Translator {
    let rows = vec![
      MappingRecord {
        source_code:    "NAM001".into(),
        target_code:    "TM2.SK01".into(),
        relationship:   "equivalent".into(),
        snomed_ct_code: "22298006".into(),
        loinc_code:     "".into(),
      },
      MappingRecord {
        source_code:    "NAM001".into(),
        target_code:    "TM2.SK02".into(),
        relationship:   "broader".into(),
        snomed_ct_code: "".into(),
        loinc_code:     "8480-6".into(),
      },
      MappingRecord {
        source_code:    "NAM002".into(),
        target_code:    "TM2.SK01".into(),
        relationship:   "narrower".into(),
        snomed_ct_code: "".into(),
        loinc_code:     "".into(),
      },
    ];
    Translator::new(Arc::new(MappingTable::new(rows)))
  }

  #[derive(Default)]
  struct VecLedger(Mutex<Vec<HistoryEntry>>);

  impl HistoryLedger for VecLedger {
    type Error = std::convert::Infallible;

    async fn append(&self, entry: NewHistoryEntry, abha_id: &str) -> Result<HistoryEntry, Self::Error> {
      let mut all = self.0.lock().unwrap();
      let stored = HistoryEntry::new(
        format_entry_id(all.len() as u64 + 1),
        abha_id.to_owned(),
        entry,
        Utc::now(),
      );
      all.push(stored.clone());
      Ok(stored)
    }

    async fn list_for(&self, abha_id: &str) -> Result<Vec<HistoryEntry>, Self::Error> {
      Ok(self.0.lock().unwrap().iter().filter(|e| e.abha_id == abha_id).cloned().collect())
    }
  }

  #[test]
  fn system_parsing_trims_and_ignores_case() {
    assert_eq!(CodeSystem::parse(" nam ").unwrap(), CodeSystem::Namaste);
    assert_eq!(CodeSystem::parse("Tm2").unwrap(), CodeSystem::Icd11Tm2);
    assert!(matches!(CodeSystem::parse("ICD10"), Err(Error::UnsupportedSystem(_))));
  }

  #[test]
  fn from_namaste_keeps_orientation() {
    let (_, result) = translator().translate("NAM", " NAM001 ").unwrap();
    assert_eq!(result.mappings.len(), 2);
    assert!(result.mappings.iter().all(|m| m.source_code == "NAM001"));
    assert_eq!(result.mappings[0].target_code, "TM2.SK01");
    assert_eq!(result.mappings[1].loinc_code, "8480-6");
  }

  #[test]
  fn from_tm2_swaps_orientation() {
    let (_, result) = translator().translate("TM2", "TM2.SK01").unwrap();
    let targets: Vec<_> = result.mappings.iter().map(|m| m.target_code.as_str()).collect();
    assert_eq!(targets, ["NAM001", "NAM002"]);
    assert!(result.mappings.iter().all(|m| m.source_code == "TM2.SK01"));
  }

  #[test]
  fn unknown_code_is_empty_not_error() {
    let (_, result) = translator().translate("NAM", "NAM404").unwrap();
    assert!(result.mappings.is_empty());
    assert_eq!(result.resource_type, "ConceptMap");
  }

  #[test]
  fn translation_is_symmetric() {
    let t = translator();
    let (_, forward) = t.translate("NAM", "NAM002").unwrap();
    let y = &forward.mappings[0].target_code;
    let (_, back) = t.translate("TM2", y).unwrap();
    assert!(back.mappings.iter().any(|m| m.target_code == "NAM002"));
  }

  #[test]
  fn serialises_resource_type_in_camel_case() {
    let (_, result) = translator().translate("NAM", "NAM404").unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["resourceType"], "ConceptMap");
    assert_eq!(json["mappings"], serde_json::json!([]));
  }

  #[tokio::test]
  async fn records_history_only_with_identity_and_flag() {
    let t = translator();
    let ledger = VecLedger::default();

    let anon = t.translate_and_record(&ledger, "NAM", "NAM001", true, None).await.unwrap();
    let unflagged = t
      .translate_and_record(&ledger, "NAM", "NAM001", false, Some("ABHA001"))
      .await
      .unwrap();
    assert!(ledger.list_for("ABHA001").await.unwrap().is_empty());

    let saved = t
      .translate_and_record(&ledger, "NAM", "NAM001", true, Some("ABHA001"))
      .await
      .unwrap();
    assert_eq!(anon, saved);
    assert_eq!(unflagged, saved);

    let history = ledger.list_for("ABHA001").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].source_system, "NAM");
    assert_eq!(history[0].target_system, "ICD11_TM2");
    assert_eq!(history[1].snomed_ct_code, "");
  }

  #[tokio::test]
  async fn reverse_queries_are_labelled_namaste() {
    let t = translator();
    let ledger = VecLedger::default();
    t.translate_and_record(&ledger, "tm2", "TM2.SK01", true, Some("ABHA001"))
      .await
      .unwrap();
    let history = ledger.list_for("ABHA001").await.unwrap();
    assert!(history.iter().all(|e| e.source_system == "TM2" && e.target_system == "NAMASTE"));
  }
}
