//! Property tests for similarity, keyword boosting and top-K ranking.

use std::sync::Arc;

use ai_llm_service::AiLlmError;
use code_retriever::providers::BoxFuture;
use code_retriever::{
    BoostRule, ChunkField, Corpus, DocumentChunk, EmbeddingsProvider, KeywordBooster, Retriever,
    RetrieverOptions, cosine_similarity,
};
use proptest::prelude::*;

/// Always answers with the same vector.
struct FixedEmbedder(Vec<f32>);

impl EmbeddingsProvider for FixedEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>> {
        let v = self.0.clone();
        Box::pin(async move { Ok(v) })
    }
}

fn chunk(index: usize, embedding: Vec<f32>) -> DocumentChunk {
    DocumentChunk {
        path: format!("src/chunk_{index}.cpp"),
        text: format!("// chunk {index}"),
        start_line: 1,
        end_line: 1,
        embedding,
    }
}

fn index_of(c: &DocumentChunk) -> usize {
    c.path
        .trim_start_matches("src/chunk_")
        .trim_end_matches(".cpp")
        .parse()
        .unwrap()
}

/// Small integer coordinates: ties and zero vectors show up often.
fn arb_vector(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec((-3i8..=3).prop_map(f32::from), dim)
}

fn arb_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..16).prop_flat_map(|dim| {
        (
            prop::collection::vec(-100.0f32..100.0, dim),
            prop::collection::vec(-100.0f32..100.0, dim),
        )
    })
}

/// `(corpus embeddings, query vector, k)` sharing one dimension.
fn arb_corpus() -> impl Strategy<Value = (Vec<Vec<f32>>, Vec<f32>, usize)> {
    (1usize..6).prop_flat_map(|dim| {
        (
            prop::collection::vec(arb_vector(dim), 0..24),
            arb_vector(dim),
            0usize..30,
        )
    })
}

fn retriever(embeddings: Vec<Vec<f32>>, query: Vec<f32>, booster: KeywordBooster) -> Retriever {
    let chunks = embeddings
        .into_iter()
        .enumerate()
        .map(|(i, e)| chunk(i, e))
        .collect();
    Retriever::new(
        Arc::new(Corpus::new(chunks).unwrap()),
        Arc::new(FixedEmbedder(query)),
        booster,
        RetrieverOptions::default(),
    )
}

const WORDS: &[&str] = &["uci", "loop", "search", "eval", "tt", "movegen"];

fn arb_word() -> impl Strategy<Value = String> {
    (prop::sample::select(WORDS), any::<bool>())
        .prop_map(|(w, upper)| if upper { w.to_uppercase() } else { w.to_string() })
}

fn arb_phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 0..5).prop_map(|ws| ws.join(" "))
}

fn arb_rule() -> impl Strategy<Value = BoostRule> {
    (
        prop::sample::select(WORDS),
        prop_oneof![Just(ChunkField::Path), Just(ChunkField::Text)],
        prop::sample::select(WORDS),
        0.0f32..1.0,
    )
        .prop_map(|(q, field, c, bonus)| BoostRule::new(format!("{q}-{c}"), q, field, c, bonus))
}

// ── Cosine similarity ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn cosine_is_symmetric((a, b) in arb_pair()) {
        prop_assert_eq!(cosine_similarity(&a, &b).unwrap(), cosine_similarity(&b, &a).unwrap());
    }

    #[test]
    fn cosine_stays_finite_and_bounded((a, b) in arb_pair()) {
        let s = cosine_similarity(&a, &b).unwrap();
        prop_assert!(s.is_finite());
        prop_assert!((-1.0..=1.0).contains(&s), "out of range: {}", s);
    }

    #[test]
    fn nonzero_vector_is_similar_to_itself(v in prop::collection::vec(-100.0f32..100.0, 1..16)) {
        prop_assume!(v.iter().any(|x| x.abs() > 1e-3));
        let s = cosine_similarity(&v, &v).unwrap();
        prop_assert!((s - 1.0).abs() < 1e-5, "self similarity {}", s);
    }

    #[test]
    fn zero_norm_operand_scores_zero(v in prop::collection::vec(-100.0f32..100.0, 1..16)) {
        let zero = vec![0.0f32; v.len()];
        prop_assert_eq!(cosine_similarity(&zero, &v).unwrap(), 0.0);
        prop_assert_eq!(cosine_similarity(&v, &zero).unwrap(), 0.0);
    }
}

// ── Keyword boost ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn boost_is_sum_of_matching_bonuses(
        rules in prop::collection::vec(arb_rule(), 0..8),
        query in arb_phrase(),
        path in arb_phrase(),
        text in arb_phrase(),
    ) {
        let booster = KeywordBooster::new(rules.clone()).unwrap();
        let c = DocumentChunk { path: path.clone(), text: text.clone(), start_line: 1, end_line: 1, embedding: vec![1.0] };

        let (q, p, t) = (query.to_lowercase(), path.to_lowercase(), text.to_lowercase());
        let mut expected = 0.0f32;
        for r in &rules {
            let hay = match r.field {
                ChunkField::Path => &p,
                ChunkField::Text => &t,
            };
            if q.contains(r.query_contains.as_str()) && hay.contains(r.chunk_contains.as_str()) {
                expected += r.bonus;
            }
        }
        prop_assert_eq!(booster.boost(&query, &c), expected);
    }

    #[test]
    fn boost_adds_across_rule_tables(
        left in prop::collection::vec(arb_rule(), 0..5),
        right in prop::collection::vec(arb_rule(), 0..5),
        query in arb_phrase(),
        path in arb_phrase(),
        text in arb_phrase(),
    ) {
        let c = DocumentChunk { path, text, start_line: 1, end_line: 1, embedding: vec![1.0] };
        let both: Vec<BoostRule> = left.iter().chain(&right).cloned().collect();

        let split = KeywordBooster::new(left).unwrap().boost(&query, &c)
            + KeywordBooster::new(right).unwrap().boost(&query, &c);
        let joined = KeywordBooster::new(both).unwrap().boost(&query, &c);
        prop_assert!((split - joined).abs() < 1e-4, "{} != {}", split, joined);
    }
}

// ── Top-K ranking ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn result_length_is_min_of_k_and_corpus((embeddings, query, k) in arb_corpus()) {
        let n = embeddings.len();
        let r = retriever(embeddings, query, KeywordBooster::disabled());
        let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();

        let hits = rt.block_on(r.retrieve("explain uci", k)).unwrap();
        prop_assert_eq!(hits.len(), k.min(n));
    }

    #[test]
    fn ranking_is_descending_and_ties_keep_corpus_order((embeddings, query, k) in arb_corpus()) {
        let scores: Vec<f32> = embeddings
            .iter()
            .map(|e| cosine_similarity(&query, e).unwrap())
            .collect();
        let r = retriever(embeddings, query.clone(), KeywordBooster::disabled());

        let hits = r.rank("explain uci", &query, k).unwrap();
        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(index_of(&pair[0].chunk) < index_of(&pair[1].chunk));
            }
        }

        // Nothing left out beats the last kept hit, and equal scores lose to earlier chunks.
        if let Some(last) = hits.last() {
            let last_index = index_of(&last.chunk);
            let kept: Vec<usize> = hits.iter().map(|h| index_of(&h.chunk)).collect();
            for (i, &s) in scores.iter().enumerate().filter(|(i, _)| !kept.contains(i)) {
                prop_assert!(s <= last.score);
                if s == last.score {
                    prop_assert!(i > last_index);
                }
            }
        }
    }

    #[test]
    fn identical_embeddings_come_back_in_corpus_order(
        n in 1usize..20,
        k in 1usize..25,
        v in arb_vector(4),
    ) {
        let r = retriever(vec![v.clone(); n], v.clone(), KeywordBooster::disabled());

        let hits = r.rank("explain uci", &v, k).unwrap();
        let order: Vec<usize> = hits.iter().map(|h| index_of(&h.chunk)).collect();
        prop_assert_eq!(order, (0..k.min(n)).collect::<Vec<_>>());
    }
}
