//! Typed errors for the code-retriever crate.

use std::path::PathBuf;
use std::time::Duration;

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Two vectors that were expected to share a dimension do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vector dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Errors raised while loading or validating the chunk corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be opened or read.
    #[error("cannot read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus file is not a JSON array of chunks.
    #[error("cannot parse corpus {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A chunk's embedding length differs from the first chunk's.
    #[error("chunk #{index} ({path}) has dimension {got}, corpus dimension is {expected}")]
    InconsistentDimensions {
        index: usize,
        path: String,
        expected: usize,
        got: usize,
    },

    /// A chunk carries no embedding at all.
    #[error("chunk #{index} ({path}) has an empty embedding")]
    EmptyEmbedding { index: usize, path: String },
}

impl CorpusError {
    /// Missing or unreadable resources degrade to an empty corpus; corrupt
    /// vectors do not.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CorpusError::Io { .. } | CorpusError::Parse { .. })
    }
}

/// Errors raised while loading the keyword boost table.
#[derive(Debug, Error)]
pub enum BoostRuleError {
    #[error("cannot read boost rules {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse boost rules {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid boost rule `{name}`: {reason}")]
    Invalid { name: String, reason: &'static str },
}

/// The only failure `Retriever::retrieve` reports; provider failures degrade
/// to an empty result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrieveError {
    #[error("query embedding does not match corpus: {0}")]
    DimensionMismatch(#[from] DimensionMismatch),
}

/// Request-level failures of the chat pipeline.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrieveError),

    #[error("completion failed: {0}")]
    Completion(#[source] AiLlmError),

    #[error("completion timed out after {0:?}")]
    CompletionTimeout(Duration),
}
