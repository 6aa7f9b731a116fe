// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed cache of knowledge-base question embeddings.
//!
//! The cache stores the ordered question list and one vector per question.
//! It is valid only while the stored question sequence is element-wise
//! equal, in the same order, to the live knowledge base's question
//! sequence and the stored model id matches the active provider; any
//! mismatch invalidates the whole cache and forces a full recompute.
//! Rewrites happen in a single transaction, so a partial cache is never
//! observable on disk.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::provider::EmbeddingProvider;

/// Directory holding faqdesk state next to the knowledge base.
pub const STATE_DIR: &str = ".faqdesk";

/// Persistent store for the parallel (questions, vectors) sequences.
pub struct VectorCache {
    conn: Connection,
    path: PathBuf,
}

impl VectorCache {
    /// Opens or creates a vector cache at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open cache: {}", path.display()))?;

        let cache = Self { conn, path };
        cache.init_schema()?;
        Ok(cache)
    }

    /// Opens the cache in the default location under a data root.
    pub fn open_default<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::open(root.as_ref().join(STATE_DIR).join("embeddings.sqlite"))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS question_embeddings (
                position INTEGER PRIMARY KEY,
                question TEXT NOT NULL,
                embedding BLOB NOT NULL
            );
            "#,
            )
            .context("Failed to initialize cache schema")?;
        Ok(())
    }

    /// Returns the path to the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Model id stamped into the cache at the last rewrite.
    pub fn model_id(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'model'",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read cache meta")?;
        Ok(value)
    }

    /// Loads the stored (questions, vectors) pair in position order.
    ///
    /// Returns `None` when the cache holds no rows.
    pub fn load(&self) -> Result<Option<(Vec<String>, Vec<Vec<f32>>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT question, embedding FROM question_embeddings ORDER BY position",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let question: String = row.get(0)?;
                let blob: Vec<u8> = row.get(1)?;
                Ok((question, blob_to_embedding(&blob)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read cached embeddings")?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut questions = Vec::with_capacity(rows.len());
        let mut vectors = Vec::with_capacity(rows.len());
        for (question, vector) in rows {
            questions.push(question);
            vectors.push(vector);
        }
        Ok(Some((questions, vectors)))
    }

    /// Replaces the entire cache contents in one transaction.
    ///
    /// All-or-nothing: prior rows are gone and every new row is present,
    /// or the cache is untouched.
    pub fn replace_all(
        &mut self,
        model_id: &str,
        questions: &[String],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        debug_assert_eq!(questions.len(), vectors.len());

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM question_embeddings", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO question_embeddings (position, question, embedding) VALUES (?1, ?2, ?3)",
            )?;
            for (position, (question, vector)) in questions.iter().zip(vectors).enumerate() {
                stmt.execute(params![
                    position as i64,
                    question,
                    embedding_to_blob(vector)
                ])?;
            }
        }

        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        tx.execute(
            "INSERT INTO meta (key, value) VALUES ('model', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![model_id],
        )?;
        tx.execute(
            "INSERT INTO meta (key, value) VALUES ('created_at', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![created_at.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

/// Returns one embedding per knowledge-base question, from the cache when
/// it is still valid, recomputing and rewriting it otherwise.
///
/// Cache failures are never fatal: an unreadable or corrupt cache file is
/// dropped and rebuilt, and a failed rewrite degrades to the in-memory
/// vectors with a warning.
pub fn prepare(
    provider: &mut dyn EmbeddingProvider,
    cache_path: &Path,
    questions: &[String],
) -> Result<Vec<Vec<f32>>> {
    let mut cache = match VectorCache::open(cache_path) {
        Ok(cache) => Some(cache),
        Err(err) => {
            tracing::warn!(
                path = %cache_path.display(),
                error = %err,
                "embedding cache unreadable, rebuilding"
            );
            std::fs::remove_file(cache_path).ok();
            VectorCache::open(cache_path).ok()
        }
    };

    if let Some(cache) = &cache {
        match cached_vectors(cache, provider.model_id(), questions) {
            Ok(Some(vectors)) => {
                tracing::debug!(count = vectors.len(), "embedding cache hit");
                return Ok(vectors);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "embedding cache read failed, recomputing");
            }
        }
    }

    tracing::info!(count = questions.len(), "computing question embeddings");
    let vectors = provider.embed_texts(questions)?;

    if let Some(cache) = cache.as_mut() {
        if let Err(err) = cache.replace_all(provider.model_id(), questions, &vectors) {
            tracing::warn!(error = %err, "failed to persist embedding cache");
        }
    }

    Ok(vectors)
}

fn cached_vectors(
    cache: &VectorCache,
    model_id: &str,
    questions: &[String],
) -> Result<Option<Vec<Vec<f32>>>> {
    if cache.model_id()?.as_deref() != Some(model_id) {
        return Ok(None);
    }
    match cache.load()? {
        Some((cached_questions, vectors)) if cached_questions == questions => Ok(Some(vectors)),
        _ => Ok(None),
    }
}

/// Converts an embedding vector to a compact little-endian blob.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Converts a blob back to an embedding vector.
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Deterministic provider that records how many embed calls it served.
    struct CountingProvider {
        calls: usize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self { calls: 0 }
        }

        fn vector_for(text: &str) -> Vec<f32> {
            let sum: u32 = text.bytes().map(u32::from).sum();
            vec![text.len() as f32, sum as f32, 1.0]
        }
    }

    impl EmbeddingProvider for CountingProvider {
        fn model_id(&self) -> &str {
            "counting"
        }

        fn embed_texts(&mut self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            self.calls += 1;
            Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
        }
    }

    fn question_list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cache_roundtrip() {
        let dir = tempdir().unwrap();
        let mut cache = VectorCache::open_default(dir.path()).unwrap();
        assert!(dir.path().join(STATE_DIR).join("embeddings.sqlite").exists());

        let questions = question_list(&["Pizza", "Burger"]);
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        cache.replace_all("m1", &questions, &vectors).unwrap();

        let (cached_q, cached_v) = cache.load().unwrap().unwrap();
        assert_eq!(cached_q, questions);
        assert_eq!(cached_v, vectors);
        assert_eq!(cache.model_id().unwrap().as_deref(), Some("m1"));
    }

    #[test]
    fn prepare_is_idempotent() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.sqlite");
        let questions = question_list(&["Pizza", "Burger", "Chips"]);

        let mut provider = CountingProvider::new();
        let first = prepare(&mut provider, &cache_path, &questions).unwrap();
        assert_eq!(provider.calls, 1);

        let second = prepare(&mut provider, &cache_path, &questions).unwrap();
        assert_eq!(provider.calls, 1, "second prepare must not recompute");
        assert_eq!(first, second);
    }

    #[test]
    fn question_change_invalidates_whole_cache() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.sqlite");

        let mut provider = CountingProvider::new();
        prepare(
            &mut provider,
            &cache_path,
            &question_list(&["Pizza", "Burger"]),
        )
        .unwrap();
        assert_eq!(provider.calls, 1);

        // Addition
        prepare(
            &mut provider,
            &cache_path,
            &question_list(&["Pizza", "Burger", "Chips"]),
        )
        .unwrap();
        assert_eq!(provider.calls, 2);

        // Reordering alone is also a miss
        prepare(
            &mut provider,
            &cache_path,
            &question_list(&["Chips", "Pizza", "Burger"]),
        )
        .unwrap();
        assert_eq!(provider.calls, 3);

        // Removal
        prepare(&mut provider, &cache_path, &question_list(&["Pizza"])).unwrap();
        assert_eq!(provider.calls, 4);
    }

    #[test]
    fn model_change_invalidates_cache() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.sqlite");
        let questions = question_list(&["Pizza"]);

        let mut provider = CountingProvider::new();
        prepare(&mut provider, &cache_path, &questions).unwrap();

        let mut cache = VectorCache::open(&cache_path).unwrap();
        cache
            .replace_all("other-model", &questions, &[vec![9.0, 9.0, 9.0]])
            .unwrap();
        drop(cache);

        let vectors = prepare(&mut provider, &cache_path, &questions).unwrap();
        assert_eq!(provider.calls, 2);
        assert_eq!(vectors[0], CountingProvider::vector_for("Pizza"));
    }

    #[test]
    fn corrupt_cache_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.sqlite");
        std::fs::write(&cache_path, b"this is not a sqlite database at all").unwrap();

        let questions = question_list(&["Pizza", "Burger"]);
        let mut provider = CountingProvider::new();
        let vectors = prepare(&mut provider, &cache_path, &questions).unwrap();
        assert_eq!(provider.calls, 1);
        assert_eq!(vectors.len(), 2);

        // The rebuilt cache serves the next call without recomputation.
        prepare(&mut provider, &cache_path, &questions).unwrap();
        assert_eq!(provider.calls, 1);
    }
}
