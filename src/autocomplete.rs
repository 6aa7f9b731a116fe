// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-typing autocomplete over the question set.
//!
//! A pure substring matcher, independent of the response pipeline: it
//! never touches the embedding index and never logs. Safe to call on
//! every keystroke.

/// Case-insensitive substring matches of `partial` against the question
/// list, in knowledge-base order, truncated to `limit`.
pub fn suggest(partial: &str, questions: &[String], limit: usize) -> Vec<String> {
    let needle = partial.to_lowercase();
    questions
        .iter()
        .filter(|q| q.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}
