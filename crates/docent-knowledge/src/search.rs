//! Scoring and ranking over the knowledge store.
//!
//! The engine is stateless: each query walks the candidate entries, scores
//! them word-by-word, and ranks the survivors. Weights are tuned against the
//! existing corpus; changing them shifts result ordering downstream.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use docent_core::types::Category;

use crate::error::Result;
use crate::normalize::{normalize, tokenize};
use crate::store::{KnowledgeEntry, KnowledgeStore};

// Per-word match weights. A query word contributes its single best check.
const WEIGHT_QUESTION_EXACT: f64 = 0.5;
const WEIGHT_QUESTION_PARTIAL: f64 = 0.3;
const WEIGHT_ANSWER_EXACT: f64 = 0.2;
const WEIGHT_KEYWORD_EXACT: f64 = 0.4;
const WEIGHT_KEYWORD_PARTIAL: f64 = 0.25;

/// Query options with the standard defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Restrict candidates to one category.
    pub category: Option<Category>,
    /// Maximum results returned.
    pub limit: usize,
    /// Minimum score a result needs to survive filtering.
    pub min_score: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            limit: 10,
            min_score: 0.1,
        }
    }
}

/// One ranked match.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub entry: KnowledgeEntry,
    /// Non-negative relevance score; higher is better.
    pub score: f64,
    /// Distinct query words that matched anything, in query order.
    pub matched_keywords: Vec<String>,
}

/// Stateless search engine over a [`KnowledgeStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank entries against a free-text query.
    ///
    /// Results are filtered by `min_score`, sorted descending by score
    /// (ties keep store insertion order), and truncated to `limit`.
    pub fn search(
        &self,
        store: &KnowledgeStore,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let query_words = tokenize(query);

        let candidates = match options.category {
            Some(category) => store.get_by_category(category)?,
            None => store.get_all()?,
        };

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .filter_map(|entry| {
                let (score, matched_keywords) = score_entry(&entry, &query_words);
                if score >= options.min_score {
                    Some(SearchResult {
                        entry,
                        score,
                        matched_keywords,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort: equal scores keep candidate (insertion) order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(options.limit);

        debug!(
            query = query,
            results = results.len(),
            "knowledge search completed"
        );
        Ok(results)
    }
}

/// Score one entry against the query words.
///
/// Each query word contributes the best weight among the question, answer,
/// and keyword checks, so a word is never counted twice against the same
/// field. The raw sum is then scaled by a density bonus that rewards
/// queries where a larger fraction of words matched.
fn score_entry(entry: &KnowledgeEntry, query_words: &[String]) -> (f64, Vec<String>) {
    if query_words.is_empty() {
        return (0.0, Vec::new());
    }

    let question_words = tokenize(&entry.question);
    let answer_words = tokenize(&entry.answer);
    let keywords: Vec<String> = entry
        .keywords
        .iter()
        .map(|k| normalize(k))
        .filter(|k| !k.is_empty())
        .collect();

    let mut raw = 0.0;
    let mut matched_count = 0usize;
    let mut matched_keywords: Vec<String> = Vec::new();

    for word in query_words {
        let mut best = 0.0f64;

        if question_words.iter().any(|w| w == word) {
            best = best.max(WEIGHT_QUESTION_EXACT);
        }
        if question_words.iter().any(|w| partial_match(w, word)) {
            best = best.max(WEIGHT_QUESTION_PARTIAL);
        }
        if answer_words.iter().any(|w| w == word) {
            best = best.max(WEIGHT_ANSWER_EXACT);
        }
        if keywords.iter().any(|k| k == word) {
            best = best.max(WEIGHT_KEYWORD_EXACT);
        }
        if keywords.iter().any(|k| partial_match(k, word)) {
            best = best.max(WEIGHT_KEYWORD_PARTIAL);
        }

        if best > 0.0 {
            raw += best;
            matched_count += 1;
            if !matched_keywords.contains(word) {
                matched_keywords.push(word.clone());
            }
        }
    }

    if raw <= 0.0 {
        return (0.0, matched_keywords);
    }

    let density = 0.5 + matched_count as f64 / query_words.len() as f64;
    (raw * density, matched_keywords)
}

/// Substring match in either direction.
fn partial_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

// =============================================================================
// Tests
// =============================================================================
