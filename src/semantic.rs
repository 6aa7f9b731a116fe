// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic fallback over the embedded knowledge base.
//!
//! Invoked only when no keyword route fires. Ranks every entry by cosine
//! similarity to the query embedding and applies a two-tier threshold
//! policy: a confidence threshold that gates direct answers, and a lower
//! suggestion floor that keeps unrelated entries out of "did you mean"
//! lists.

use crate::kb::KbEntry;

/// Thresholds and limits for the semantic resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Minimum similarity to answer directly (non-strict: equality answers)
    pub confidence_threshold: f32,
    /// Suggestions must score strictly above this floor
    pub suggestion_floor: f32,
    /// Number of top entries considered for suggestions
    pub max_suggestions: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.40,
            suggestion_floor: 0.20,
            max_suggestions: 3,
        }
    }
}

/// A scored knowledge-base entry.
#[derive(Debug, Clone, Copy)]
pub struct Ranked {
    /// Index into the entry/vector sequences
    pub index: usize,
    /// Cosine similarity in [-1, 1]
    pub score: f32,
}

/// The resolved outcome of a semantic lookup.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub response: String,
    /// Top similarity score, reported even for suggestion fallbacks
    pub confidence: f32,
}

/// Response when nothing in the knowledge base comes close.
pub const GENERIC_FALLBACK: &str =
    "🤔 I'm not sure about that. Try asking about menu items, prices, prep time, or dietary info! 🍟";

/// Confidence-gated semantic retrieval with suggestion ranking.
#[derive(Debug, Clone)]
pub struct SemanticResolver {
    settings: ResolverSettings,
}

impl SemanticResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn with_defaults() -> Self {
        Self::new(ResolverSettings::default())
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Scores every vector against the query and sorts descending.
    ///
    /// Ties break on ascending entry index, so the first occurrence in
    /// knowledge-base order wins among equal scores.
    pub fn rank(&self, query_embedding: &[f32], vectors: &[Vec<f32>]) -> Vec<Ranked> {
        let mut ranked: Vec<Ranked> = vectors
            .iter()
            .enumerate()
            .map(|(index, vector)| Ranked {
                index,
                score: cosine_similarity(query_embedding, vector),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
        });

        ranked
    }

    /// Resolves a query embedding into a response and confidence score.
    ///
    /// Below the confidence threshold the response is a ranked suggestion
    /// list (or the generic fallback when nothing clears the floor); the
    /// reported confidence is the top similarity either way.
    pub fn resolve(
        &self,
        query_embedding: &[f32],
        entries: &[KbEntry],
        vectors: &[Vec<f32>],
    ) -> Resolution {
        let ranked = self.rank(query_embedding, vectors);

        let Some(best) = ranked.first().copied() else {
            return Resolution {
                response: GENERIC_FALLBACK.to_string(),
                confidence: 0.0,
            };
        };

        if best.score < self.settings.confidence_threshold {
            let suggestions: Vec<&str> = ranked
                .iter()
                .take(self.settings.max_suggestions)
                .filter(|r| r.score > self.settings.suggestion_floor)
                .map(|r| entries[r.index].question.as_str())
                .collect();

            let response = if suggestions.is_empty() {
                GENERIC_FALLBACK.to_string()
            } else {
                format!(
                    "🤔 I'm not sure about that. Did you mean: {}?",
                    suggestions.join(", ")
                )
            };

            tracing::debug!(
                best_score = best.score,
                suggestions = suggestions.len(),
                "below confidence threshold"
            );
            return Resolution {
                response,
                confidence: best.score,
            };
        }

        Resolution {
            response: format_answer(&entries[best.index]),
            confidence: best.score,
        }
    }
}

/// Bare answer text, or the bordered annotation block when the entry
/// carries price/prep-time/diet details.
fn format_answer(entry: &KbEntry) -> String {
    let flair = entry.annotations();
    if flair.is_empty() {
        return entry.answer.clone();
    }

    let mut answer = String::from(
        "<div style='border:2px solid #FF5733; padding:10px; border-radius:10px; background-color:#FFF5F0'>",
    );
    answer.push_str(&format!("<b>{}</b><br>{}", entry.question, entry.answer));
    answer.push_str(&format!("<br><i>{}</i>", flair.join(" | ")));
    answer.push_str("</div>");
    answer
}

/// Computes cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.0 rather than erroring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
