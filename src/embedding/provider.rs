// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider interface and implementations.
//!
//! The builtin provider wraps fastembed's all-MiniLM-L6-v2 model, the same
//! sentence-transformers model the vector cache is keyed on.

use anyhow::{bail, Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::borrow::Cow;
use std::env;

use crate::config::EmbeddingProviderType;

/// Vector dimension of all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

const DEFAULT_BATCH_SIZE: usize = 256;
const DEFAULT_MAX_CHARS: usize = 512;

/// Configuration for the builtin embedding provider.
#[derive(Debug, Clone)]
pub struct EmbeddingProviderConfig {
    pub model: EmbeddingModel,
    pub batch_size: usize,
    pub max_chars: usize,
    pub normalize: bool,
}

impl EmbeddingProviderConfig {
    pub fn from_env() -> Result<Self> {
        let mut batch_size = parse_usize_env("FASTEMBED_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            batch_size = DEFAULT_BATCH_SIZE;
        }
        let mut max_chars = parse_usize_env("FASTEMBED_MAX_CHARS", DEFAULT_MAX_CHARS)?;
        if max_chars == 0 {
            max_chars = DEFAULT_MAX_CHARS;
        }
        let normalize = parse_bool_env("FASTEMBED_NORMALIZE", true)?;

        Ok(Self {
            model: EmbeddingModel::AllMiniLML6V2,
            batch_size,
            max_chars,
            normalize,
        })
    }
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModel::AllMiniLML6V2,
            batch_size: DEFAULT_BATCH_SIZE,
            max_chars: DEFAULT_MAX_CHARS,
            normalize: true,
        }
    }
}

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send {
    /// Returns the model identifier, used to key the vector cache.
    fn model_id(&self) -> &str;

    /// Generates embeddings for the given texts, one vector per text.
    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generates an embedding for a single text.
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut result = self.embed_texts(&[text.to_string()])?;
        result
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }
}

/// Builds the provider selected by configuration.
pub fn create_provider(provider: EmbeddingProviderType) -> Result<Box<dyn EmbeddingProvider>> {
    match provider {
        EmbeddingProviderType::Builtin => Ok(Box::new(FastEmbedder::from_env()?)),
        EmbeddingProviderType::Dummy => Ok(Box::new(DummyProvider::new(DEFAULT_EMBEDDING_DIM))),
    }
}

/// FastEmbed provider using sentence-transformers/all-MiniLM-L6-v2.
pub struct FastEmbedder {
    embedder: TextEmbedding,
    config: EmbeddingProviderConfig,
    model_id: String,
}

impl FastEmbedder {
    pub fn new(config: EmbeddingProviderConfig) -> Result<Self> {
        let model = config.model.clone();
        let model_id = model.to_string();
        let init = InitOptions::new(model);
        let embedder =
            TextEmbedding::try_new(init).context("Failed to initialize fastembed model")?;

        Ok(Self {
            embedder,
            config,
            model_id,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingProviderConfig::from_env()?)
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = truncate_texts(texts, self.config.max_chars);
        let mut embeddings = self
            .embedder
            .embed(&prepared, Some(self.config.batch_size))?;

        if self.config.normalize {
            for embedding in embeddings.iter_mut() {
                l2_normalize(embedding);
            }
        }

        Ok(embeddings)
    }
}

/// Dummy provider that returns zero vectors (for testing/offline runs).
pub struct DummyProvider {
    model: String,
    dimension: usize,
}

impl DummyProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            model: "dummy".to_string(),
            dimension,
        }
    }
}

impl EmbeddingProvider for DummyProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.0; self.dimension]).collect())
    }
}

fn truncate_texts<'a>(texts: &'a [String], max_chars: usize) -> Vec<Cow<'a, str>> {
    texts
        .iter()
        .map(|text| truncate_to_chars(text.as_str(), max_chars))
        .collect()
}

fn truncate_to_chars(input: &str, max_chars: usize) -> Cow<'_, str> {
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    let mut count = 0;
    for (idx, _) in input.char_indices() {
        if count == max_chars {
            return Cow::Owned(input[..idx].to_string());
        }
        count += 1;
    }

    Cow::Borrowed(input)
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

fn parse_usize_env(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw.trim();
            if value.is_empty() {
                Ok(default)
            } else {
                value
                    .parse::<usize>()
                    .with_context(|| format!("Invalid {} value: {}", name, value))
            }
        }
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", name)),
    }
}

fn parse_bool_env(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw.trim().to_lowercase();
            if value.is_empty() {
                return Ok(default);
            }
            match value.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => bail!("Invalid {} value: {}", name, other),
            }
        }
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", name)),
    }
}
