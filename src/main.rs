// SPDX-License-Identifier: MIT OR Apache-2.0

//! faqdesk - keyword-routed FAQ chatbot with semantic fallback
//!
//! Deterministic keyword routing over a restaurant knowledge base, with
//! embedding-based similarity as the fallback for everything else.

mod cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, OutputFormat};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use faqdesk::autocomplete;
use faqdesk::config::Config;
use faqdesk::embedding;
use faqdesk::kb;
use faqdesk::output::{colorize_prompt, colorize_response, render_markup, use_colors};
use faqdesk::pipeline::Chatbot;

fn main() -> Result<()> {
    // Initialize tracing with FAQDESK_LOG env var (e.g., FAQDESK_LOG=debug faqdesk ask "query")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FAQDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match cli.command {
        Commands::Ask { query, path } => {
            let root = data_root(path)?;
            let config = Config::load_for_dir(&root);
            let bot = Chatbot::new(&config, &root)?;

            let (response, confidence) = bot.answer(&query);
            match format {
                OutputFormat::Text => {
                    let use_color = use_colors();
                    println!(
                        "{}",
                        colorize_response(&render_markup(&response), use_color)
                    );
                }
                OutputFormat::Json => {
                    let payload = serde_json::json!({
                        "response": response,
                        "confidence": confidence,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }
        }
        Commands::Chat { path } => {
            let root = data_root(path)?;
            let config = Config::load_for_dir(&root);
            let bot = Chatbot::new(&config, &root)?;
            run_chat(&bot)?;
        }
        Commands::Suggest {
            partial,
            limit,
            path,
        } => {
            // Autocomplete only needs the question list; skip embedding
            // preparation entirely.
            let root = data_root(path)?;
            let config = Config::load_for_dir(&root);
            let entries = kb::load(
                &root.join(config.kb.json_path()),
                &root.join(config.kb.csv_path()),
            )?;
            let questions = kb::questions(&entries);
            let limit = limit.unwrap_or_else(|| config.resolver.autocomplete_limit());

            let matches = autocomplete::suggest(&partial, &questions, limit);
            match format {
                OutputFormat::Text => {
                    for m in matches {
                        println!("{}", m);
                    }
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&matches)?);
                }
            }
        }
        Commands::Prepare { path, force } => {
            let root = data_root(path)?;
            let config = Config::load_for_dir(&root);
            let entries = kb::load(
                &root.join(config.kb.json_path()),
                &root.join(config.kb.csv_path()),
            )?;
            let questions = kb::questions(&entries);

            let cache_path = root.join(config.embeddings.cache_path());
            if force && cache_path.exists() {
                std::fs::remove_file(&cache_path)?;
            }

            let mut provider = embedding::create_provider(config.embeddings.provider())?;
            let vectors = embedding::prepare(provider.as_mut(), &cache_path, &questions)?;
            eprintln!(
                "Prepared {} question embeddings at {}",
                vectors.len(),
                cache_path.display()
            );
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "faqdesk", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn data_root(path: Option<String>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(PathBuf::from(path)),
        None => std::env::current_dir().map_err(Into::into),
    }
}

fn run_chat(bot: &Chatbot) -> Result<()> {
    let use_color = use_colors();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    eprintln!("Ask about the menu, reservations, hours... (exit to quit)");
    loop {
        write!(stdout, "{} ", colorize_prompt("you>", use_color))?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let (response, _confidence) = bot.answer(line);
        println!(
            "{}",
            colorize_response(&render_markup(&response), use_color)
        );
    }

    Ok(())
}
