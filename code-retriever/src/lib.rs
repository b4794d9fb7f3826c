//! Retrieval-augmented chat over a pre-embedded code corpus.
//!
//! The corpus is loaded once ([`Corpus::load_or_empty`]) and shared by every
//! request. For each chat turn the [`ChatOrchestrator`] embeds the last
//! message, ranks every chunk by cosine similarity plus [`KeywordBooster`]
//! nudges, prepends the top-K as a system message ([`PromptAssembler`]) and
//! forwards the conversation to the completion provider.
//!
//! Embedding failures degrade to "no context"; completion failures and
//! query/corpus dimension mismatches are reported as [`ChatError`].

mod api_types;
pub mod boost;
mod cfg;
pub mod chat;
pub mod corpus;
mod error;
pub mod prompt;
pub mod providers;
pub mod retrieve;
pub mod similarity;

pub use api_types::{ChatOutcome, ChatRequest};
pub use boost::{BoostRule, ChunkField, KeywordBooster};
pub use cfg::RetrieverConfig;
pub use chat::{ChatDefaults, ChatOrchestrator};
pub use corpus::{Corpus, DocumentChunk};
pub use error::{BoostRuleError, ChatError, CorpusError, DimensionMismatch, RetrieveError};
pub use prompt::PromptAssembler;
pub use providers::{CompletionProvider, EmbeddingsProvider};
pub use retrieve::{RetrievalResult, Retriever, RetrieverOptions, ScoredChunk};
pub use similarity::cosine_similarity;
