//! Pre-embedded chunk corpus: loaded once at startup, read-only afterwards.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CorpusError;

/// A span of source text with its precomputed embedding.
///
/// Field names match the JSON written by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub path: String,
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
    pub embedding: Vec<f32>,
}

/// Ordered, immutable set of chunks sharing one embedding dimension.
///
/// Wrap it in an `Arc` and hand clones to every request; there is no write path.
#[derive(Debug, Default)]
pub struct Corpus {
    chunks: Vec<Arc<DocumentChunk>>,
    dimension: Option<usize>,
}

impl Corpus {
    /// Corpus with no chunks; retrieval against it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a corpus, checking that every chunk has the same non-zero dimension.
    ///
    /// # Errors
    /// [`CorpusError::EmptyEmbedding`] or [`CorpusError::InconsistentDimensions`].
    pub fn new(chunks: Vec<DocumentChunk>) -> Result<Self, CorpusError> {
        let mut dimension = None;
        for (index, c) in chunks.iter().enumerate() {
            if c.embedding.is_empty() {
                return Err(CorpusError::EmptyEmbedding {
                    index,
                    path: c.path.clone(),
                });
            }
            match dimension {
                None => dimension = Some(c.embedding.len()),
                Some(expected) if expected != c.embedding.len() => {
                    return Err(CorpusError::InconsistentDimensions {
                        index,
                        path: c.path.clone(),
                        expected,
                        got: c.embedding.len(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            chunks: chunks.into_iter().map(Arc::new).collect(),
            dimension,
        })
    }

    /// Reads a JSON array of [`DocumentChunk`] from `path`.
    ///
    /// # Errors
    /// IO and parse failures, plus the validation errors of [`Corpus::new`].
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let chunks: Vec<DocumentChunk> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| CorpusError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(chunks)
    }

    /// Like [`Corpus::load`], but a missing or unparseable file yields an
    /// empty corpus and a warning instead of an error.
    ///
    /// # Errors
    /// Only dimension corruption is reported.
    pub fn load_or_empty(path: &Path) -> Result<Self, CorpusError> {
        match Self::load(path) {
            Ok(corpus) => {
                info!(
                    path = %path.display(),
                    chunks = corpus.len(),
                    dim = corpus.dimension().unwrap_or(0),
                    "corpus loaded"
                );
                Ok(corpus)
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "corpus unavailable; retrieval disabled");
                Ok(Self::empty())
            }
            Err(e) => Err(e),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Shared embedding dimension, `None` for an empty corpus.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn chunks(&self) -> &[Arc<DocumentChunk>] {
        &self.chunks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DocumentChunk>> {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn chunk(path: &str, text: &str, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            path: path.into(),
            text: text.into(),
            start_line: 1,
            end_line: 40,
            embedding,
        }
    }

    #[test]
    fn new_records_dimension_and_order() {
        let c = Corpus::new(vec![
            chunk("a.cpp", "a", vec![1.0, 0.0]),
            chunk("b.cpp", "b", vec![0.0, 1.0]),
        ])
        .unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.dimension(), Some(2));
        let paths: Vec<_> = c.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["a.cpp", "b.cpp"]);
    }

    #[test]
    fn new_rejects_mixed_dimensions() {
        let err = Corpus::new(vec![
            chunk("a.cpp", "a", vec![1.0, 0.0]),
            chunk("b.cpp", "b", vec![0.0, 1.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CorpusError::InconsistentDimensions { index: 1, expected: 2, got: 3, .. }
        ));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn new_rejects_empty_embedding() {
        let err = Corpus::new(vec![chunk("a.cpp", "a", vec![])]).unwrap_err();
        assert!(matches!(err, CorpusError::EmptyEmbedding { index: 0, .. }));
    }

    #[test]
    fn loads_indexer_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[{{"text":"void loop() {{}}","path":"Stockfish/src/uci.cpp","start_line":1,"end_line":40,"embedding":[0.5,0.5,0.0]}}]"#
        )
        .unwrap();

        let c = Corpus::load(f.path()).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.dimension(), Some(3));
        assert_eq!(c.chunks()[0].path, "Stockfish/src/uci.cpp");
        assert_eq!(c.chunks()[0].end_line, 40);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let c = Corpus::load_or_empty(&dir.path().join("stockfish_docs.json")).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.dimension(), None);
    }

    #[test]
    fn garbage_file_degrades_to_empty() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{{ not json").unwrap();
        assert!(matches!(Corpus::load(f.path()), Err(CorpusError::Parse { .. })));
        assert!(Corpus::load_or_empty(f.path()).unwrap().is_empty());
    }

    #[test]
    fn corrupt_vectors_are_not_absorbed() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[{{"text":"a","path":"a","start_line":1,"end_line":2,"embedding":[1.0]}},
                {{"text":"b","path":"b","start_line":1,"end_line":2,"embedding":[1.0,2.0]}}]"#
        )
        .unwrap();
        assert!(Corpus::load_or_empty(f.path()).is_err());
    }
}
