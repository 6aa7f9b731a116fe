// SPDX-License-Identifier: MIT OR Apache-2.0

//! The response-resolution pipeline.
//!
//! [`Chatbot`] is the context object constructed once at startup: it owns
//! the knowledge base, the embedding vectors, the route table, the
//! semantic resolver, and the interaction log. Everything is read-only
//! after construction except the embedding provider (embedding a query
//! takes `&mut`) and the log's append cursor, both behind their own
//! locks. Queries resolve synchronously: keyword routing first, semantic
//! fallback second, one log record per resolved query.

use anyhow::Result;
use std::path::Path;
use std::sync::Mutex;

use crate::autocomplete;
use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::kb::{self, KbEntry};
use crate::logger::InteractionLogger;
use crate::router::RouteTable;
use crate::semantic::{ResolverSettings, SemanticResolver, GENERIC_FALLBACK};

/// Process-wide chatbot state, constructed once at startup.
pub struct Chatbot {
    entries: Vec<KbEntry>,
    questions: Vec<String>,
    vectors: Vec<Vec<f32>>,
    provider: Mutex<Box<dyn EmbeddingProvider>>,
    routes: RouteTable,
    resolver: SemanticResolver,
    logger: InteractionLogger,
    autocomplete_limit: usize,
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot")
            .field("entries", &self.entries.len())
            .field("questions", &self.questions.len())
            .field("vectors", &self.vectors.len())
            .field("routes", &self.routes)
            .field("resolver", &self.resolver)
            .field("autocomplete_limit", &self.autocomplete_limit)
            .finish_non_exhaustive()
    }
}

impl Chatbot {
    /// Loads the knowledge base, prepares the embedding cache, and wires
    /// up the pipeline for a data root.
    ///
    /// Fails only on startup-fatal conditions: a missing knowledge base
    /// ([`crate::errors::ConfigurationError`]) or an embedding model that
    /// cannot be initialized at all.
    pub fn new(config: &Config, root: &Path) -> Result<Self> {
        let entries = kb::load(
            &root.join(config.kb.json_path()),
            &root.join(config.kb.csv_path()),
        )?;
        let questions = kb::questions(&entries);

        let mut provider = embedding::create_provider(config.embeddings.provider())?;
        let cache_path = root.join(config.embeddings.cache_path());
        let vectors = embedding::prepare(provider.as_mut(), &cache_path, &questions)?;

        let routes = match &config.routes {
            Some(rules) => RouteTable::from_config(rules)?,
            None => RouteTable::builtin(),
        };

        let resolver = SemanticResolver::new(ResolverSettings {
            confidence_threshold: config.resolver.confidence_threshold(),
            suggestion_floor: config.resolver.suggestion_floor(),
            max_suggestions: config.resolver.max_suggestions(),
        });

        let logger = InteractionLogger::new(root.join(config.log.path()));

        Ok(Self {
            entries,
            questions,
            vectors,
            provider: Mutex::new(provider),
            routes,
            resolver,
            logger,
            autocomplete_limit: config.resolver.autocomplete_limit(),
        })
    }

    /// The loaded knowledge base, external entries first, FAQ last.
    pub fn entries(&self) -> &[KbEntry] {
        &self.entries
    }

    /// Resolves one query to a response and confidence.
    ///
    /// Never fails from the caller's point of view: an embedding error
    /// degrades to the generic fallback message, and a log-write failure
    /// is reported as a diagnostic while the response is still returned.
    pub fn answer(&self, text: &str) -> (String, f32) {
        let (response, confidence) = self.resolve(text);
        if let Err(err) = self.logger.record(text, &response, confidence) {
            tracing::warn!(error = %err, "failed to log interaction");
        }
        (response, confidence)
    }

    fn resolve(&self, text: &str) -> (String, f32) {
        if let Some(routed) = self.routes.route(text, &self.entries) {
            return (routed.response, 1.0);
        }

        let query_embedding = {
            let mut provider = self
                .provider
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            provider.embed_one(text)
        };

        match query_embedding {
            Ok(query_embedding) => {
                let resolution =
                    self.resolver
                        .resolve(&query_embedding, &self.entries, &self.vectors);
                (resolution.response, resolution.confidence)
            }
            Err(err) => {
                tracing::error!(error = %err, "query embedding failed");
                (GENERIC_FALLBACK.to_string(), 0.0)
            }
        }
    }

    /// Autocomplete matches for a partial input; independent of the
    /// response pipeline and never logged.
    pub fn autocomplete(&self, partial: &str) -> Vec<String> {
        autocomplete::suggest(partial, &self.questions, self.autocomplete_limit)
    }
}
