//! Autocomplete search over the NAMASTE terminology.

use serde::{Deserialize, Serialize};

/// A NAMASTE concept as listed in the terminology source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConcept {
  pub code:       String,
  pub display:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub definition: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Terminology {
  concepts: Vec<SearchConcept>,
  /// Lowercased `(code, display)` per concept, computed once.
  folded:   Vec<(String, String)>,
}

impl Terminology {
  pub fn new(concepts: Vec<SearchConcept>) -> Self {
    let folded = concepts
      .iter()
      .map(|c| (c.code.to_lowercase(), c.display.to_lowercase()))
      .collect();
    Self { concepts, folded }
  }

  /// Concepts whose code or display contains `query`, ignoring case, in
  /// source order.
  pub fn search(&self, query: &str) -> Vec<SearchConcept> {
    let needle = query.to_lowercase();
    self
      .concepts
      .iter()
      .zip(&self.folded)
      .filter(|(_, (code, display))| code.contains(&needle) || display.contains(&needle))
      .map(|(c, _)| c.clone())
      .collect()
  }

  pub fn len(&self) -> usize { self.concepts.len() }

  pub fn is_empty(&self) -> bool { self.concepts.is_empty() }
}
