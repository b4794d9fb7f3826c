//! Keyword boosting: a declarative rule table of lexical nudges.
//!
//! Each [`BoostRule`] pairs a query needle with a needle on one chunk field.
//! When both are found (case-insensitive substring match) the rule's bonus is
//! added to the chunk score. Rules are independent and their bonuses sum, so
//! rule order never changes the result.
//!
//! Rules file format (JSON array):
//! ```json
//! [
//!   { "name": "uci-file", "query_contains": "uci", "field": "path",
//!     "chunk_contains": "uci.cpp", "bonus": 0.25 }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::DocumentChunk;
use crate::error::BoostRuleError;

/// Default bonus for the built-in rules; small next to the cosine range.
pub const DEFAULT_BONUS: f32 = 0.25;

/// Chunk attribute a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkField {
    Path,
    Text,
}

/// One `(query predicate, chunk predicate, bonus)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostRule {
    pub name: String,
    pub query_contains: String,
    pub field: ChunkField,
    pub chunk_contains: String,
    pub bonus: f32,
}

impl BoostRule {
    pub fn new(
        name: impl Into<String>,
        query_contains: impl Into<String>,
        field: ChunkField,
        chunk_contains: impl Into<String>,
        bonus: f32,
    ) -> Self {
        Self {
            name: name.into(),
            query_contains: query_contains.into(),
            field,
            chunk_contains: chunk_contains.into(),
            bonus,
        }
    }

    fn validate(&self) -> Result<(), BoostRuleError> {
        let invalid = |reason| BoostRuleError::Invalid {
            name: self.name.clone(),
            reason,
        };
        if self.query_contains.trim().is_empty() {
            return Err(invalid("`query_contains` must not be empty"));
        }
        if self.chunk_contains.trim().is_empty() {
            return Err(invalid("`chunk_contains` must not be empty"));
        }
        if !self.bonus.is_finite() {
            return Err(invalid("`bonus` must be a finite number"));
        }
        Ok(())
    }

    /// Lowercased copy used for matching.
    fn normalized(mut self) -> Self {
        self.query_contains = self.query_contains.to_lowercase();
        self.chunk_contains = self.chunk_contains.to_lowercase();
        self
    }
}

/// Built-in table for the Stockfish corpus.
pub fn stockfish_rules(bonus: f32) -> Vec<BoostRule> {
    vec![
        BoostRule::new("uci-file", "uci", ChunkField::Path, "uci.cpp", bonus),
        BoostRule::new("uci-loop-call", "uci", ChunkField::Text, "uci::loop", bonus),
        BoostRule::new("search-file", "search", ChunkField::Path, "search.cpp", bonus),
        BoostRule::new("eval-file", "eval", ChunkField::Path, "evaluate.cpp", bonus),
    ]
}

/// Applies a validated, normalized rule table.
#[derive(Debug, Clone, Default)]
pub struct KeywordBooster {
    rules: Vec<BoostRule>,
}

impl KeywordBooster {
    /// # Errors
    /// [`BoostRuleError::Invalid`] for empty needles or a non-finite bonus.
    pub fn new(rules: Vec<BoostRule>) -> Result<Self, BoostRuleError> {
        for r in &rules {
            r.validate()?;
        }
        Ok(Self {
            rules: rules.into_iter().map(BoostRule::normalized).collect(),
        })
    }

    /// Booster that never adjusts scores.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Reads a JSON rules file (see module docs).
    ///
    /// # Errors
    /// IO, parse or validation failures.
    pub fn from_json_file(path: &Path) -> Result<Self, BoostRuleError> {
        let raw = fs::read_to_string(path).map_err(|source| BoostRuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules: Vec<BoostRule> =
            serde_json::from_str(&raw).map_err(|source| BoostRuleError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[BoostRule] {
        &self.rules
    }

    /// Sum of bonuses of every rule matching `query` and `chunk`.
    pub fn boost(&self, query: &str, chunk: &DocumentChunk) -> f32 {
        self.boost_lowercased(&query.to_lowercase(), chunk)
    }

    /// Same as [`boost`](Self::boost) for a query that is already lowercased.
    /// Chunk fields are lowercased lazily, only when some rule needs them.
    pub fn boost_lowercased(&self, query_lc: &str, chunk: &DocumentChunk) -> f32 {
        let mut path_lc: Option<String> = None;
        let mut text_lc: Option<String> = None;
        let mut total = 0.0f32;

        for rule in &self.rules {
            if !query_lc.contains(rule.query_contains.as_str()) {
                continue;
            }
            let hay = match rule.field {
                ChunkField::Path => path_lc.get_or_insert_with(|| chunk.path.to_lowercase()),
                ChunkField::Text => text_lc.get_or_insert_with(|| chunk.text.to_lowercase()),
            };
            if hay.contains(rule.chunk_contains.as_str()) {
                total += rule.bonus;
            }
        }
        total
    }
}
