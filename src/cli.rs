// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// faqdesk - keyword-routed FAQ chatbot with semantic fallback
///
/// Answers questions about a small knowledge base by keyword routing
/// first and embedding similarity second. Run `prepare` once to warm the
/// vector cache, then `ask`, `chat`, or `suggest`.
#[derive(Parser, Debug)]
#[command(name = "faqdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a single question and print the response
    Ask {
        /// The question to resolve
        query: String,

        /// Data root holding the knowledge base (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Interactive chat over stdin (type exit or quit to leave)
    Chat {
        /// Data root holding the knowledge base (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Autocomplete question matches for a partial input
    Suggest {
        /// Partial input, as typed so far
        partial: String,

        /// Maximum number of matches to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Data root holding the knowledge base (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Warm the embedding cache for the current knowledge base
    Prepare {
        /// Data root holding the knowledge base (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Drop any existing cache and recompute every vector
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
