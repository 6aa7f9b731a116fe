// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - question vectors and their durable cache.
//!
//! Produces one vector per knowledge-base question and keeps them in a
//! SQLite cache keyed on exact question-list equality, so an unchanged
//! knowledge base never re-runs the embedding model.

pub mod cache;
pub mod provider;

pub use cache::{prepare, VectorCache, STATE_DIR};
pub use provider::{
    create_provider, DummyProvider, EmbeddingProvider, EmbeddingProviderConfig, FastEmbedder,
    DEFAULT_EMBEDDING_DIM,
};
