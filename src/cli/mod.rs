//! Command-line interface for semqa.
//!
//! Provides commands for asking a question about a document, reviewing
//! recorded feedback, and showing the resolved configuration.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::adapters::{Backend, HttpBackend};
use crate::config::{self, Overrides, ResolvedConfig};
use crate::core::{read_log, render_document, QueryOrchestrator};
use crate::domain::{FeedbackChoice, Session, DEFAULT_QUERY};
use crate::error::QaError;
use crate::intake;

/// semqa - Question answering over your documents, with feedback capture
#[derive(Parser, Debug)]
#[command(name = "semqa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question about a document and rate the answer
    Ask {
        /// Document file (plain text)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Document text given inline
        #[arg(long)]
        text: Option<String>,

        /// Read the document from stdin
        #[arg(long)]
        stdin: bool,

        /// Question to ask
        #[arg(short, long, default_value = DEFAULT_QUERY)]
        query: String,

        /// Number of results to request (1-10)
        #[arg(short = 'n', long)]
        results: Option<u32>,

        /// Maximum chunks to print per document
        #[arg(long)]
        max_chunks: Option<usize>,

        /// Answer the feedback prompt up front: a chunk index, "none", or "skip"
        #[arg(long)]
        feedback: Option<String>,

        /// Print rendered results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// List recorded feedback
    Feedback {
        /// Maximum number of rows to show (most recent last)
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Show resolved configuration (debug)
    Config {
        #[command(flatten)]
        backend: BackendArgs,
    },
}

/// Connection and log settings shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Backend host
    #[arg(long, env = "SEMQA_HOST")]
    pub host: Option<String>,

    /// Backend port
    #[arg(long, env = "SEMQA_PORT")]
    pub port: Option<u16>,

    /// Backend endpoint path
    #[arg(long, env = "SEMQA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// File to append feedback to
    #[arg(long, env = "SEMQA_FEEDBACK_FILE")]
    pub feedback_file: Option<PathBuf>,
}

impl BackendArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            endpoint: self.endpoint.clone(),
            feedback_file: self.feedback_file.clone(),
            ..Default::default()
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Ask {
                file,
                text,
                stdin,
                query,
                results,
                max_chunks,
                feedback,
                json,
                backend,
            } => {
                let overrides = Overrides {
                    n_of_results: results,
                    max_chunks,
                    ..backend.overrides()
                };
                let config = resolved(overrides)?;
                let source = DocumentSource::pick(file, text, stdin);
                ask(&config, source, &query, feedback.as_deref(), json).await
            }
            Commands::Feedback { limit, backend } => {
                let config = resolved(backend.overrides())?;
                list_feedback(&config.feedback_file, limit)
            }
            Commands::Config { backend } => {
                let config = resolved(backend.overrides())?;
                show_config(&config);
                Ok(())
            }
        }
    }
}

fn resolved(overrides: Overrides) -> Result<ResolvedConfig> {
    Ok(config::config()?.clone().with_overrides(overrides))
}

/// Where the document text comes from
#[derive(Debug)]
enum DocumentSource {
    File(PathBuf),
    Inline(String),
    Stdin,
    /// Keep the session's example document
    Example,
}

impl DocumentSource {
    fn pick(file: Option<PathBuf>, text: Option<String>, use_stdin: bool) -> Self {
        if let Some(path) = file {
            DocumentSource::File(path)
        } else if let Some(text) = text {
            DocumentSource::Inline(text)
        } else if use_stdin || !io::stdin().is_terminal() {
            DocumentSource::Stdin
        } else {
            DocumentSource::Example
        }
    }

    fn uses_stdin(&self) -> bool {
        matches!(self, DocumentSource::Stdin)
    }
}

/// Run one submit/feedback cycle against the configured backend
async fn ask(
    config: &ResolvedConfig,
    source: DocumentSource,
    query: &str,
    preset_feedback: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut session = Session::new();

    match &source {
        DocumentSource::File(path) => {
            let (details, text) = match intake::load_document(path) {
                Ok(loaded) => loaded,
                Err(e) => return warn_or_fail(e),
            };
            eprintln!(
                "File: {} ({}, {} bytes)",
                details.name, details.content_type, details.size
            );
            session.edit_text(text)?;
        }
        DocumentSource::Inline(text) => session.edit_text(text.as_str())?,
        DocumentSource::Stdin => session.edit_text(intake::read_document(io::stdin())?)?,
        DocumentSource::Example => eprintln!("No document given, using the example document"),
    }

    let orchestrator = QueryOrchestrator::new(HttpBackend::new(&config.backend));
    eprintln!(
        "Querying {} backend at {}",
        orchestrator.backend().name(),
        config.backend.url()
    );

    let doc_text = session.text().to_string();
    match orchestrator
        .submit(&mut session, &doc_text, query, config.n_of_results)
        .await
    {
        Ok(()) => {}
        Err(e) if e.is_warning() => {
            eprintln!("Warning: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let results = session
        .results()
        .context("Session holds no results after a successful submission")?;
    let rendered = results
        .documents
        .iter()
        .enumerate()
        .map(|(i, doc)| render_document(doc, i, config.max_chunks))
        .collect::<Result<Vec<_>, _>>()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        for (i, doc) in rendered.iter().enumerate() {
            println!("### Document {}", i);
            println!("{}", doc);
        }
    }
    let n_chunks = results.first().map(|d| d.chunks.len()).unwrap_or(0);

    if let Some(preset) = preset_feedback {
        let choice = FeedbackChoice::parse(preset)
            .with_context(|| format!("Invalid feedback choice: {}", preset))?;
        orchestrator.give_feedback(&mut session, &config.feedback_file, choice)?;
        return Ok(());
    }

    // Document came through stdin, so there is nobody left to prompt
    if source.uses_stdin() {
        orchestrator.give_feedback(&mut session, &config.feedback_file, FeedbackChoice::Skip)?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!(
            "Preferred chunk [0-{}], 'none' to keep the best answer, or 'nah' to skip: ",
            n_chunks.saturating_sub(1)
        );
        io::stderr().flush().ok();

        let choice = match lines.next() {
            Some(line) => {
                let line = line.context("Failed to read feedback choice")?;
                if line.trim().is_empty() {
                    continue;
                }
                match FeedbackChoice::parse(&line) {
                    Some(choice) => choice,
                    None => {
                        eprintln!("Warning: '{}' is not a valid choice", line.trim());
                        continue;
                    }
                }
            }
            None => FeedbackChoice::Skip,
        };

        match orchestrator.give_feedback(&mut session, &config.feedback_file, choice) {
            Ok(Some(_)) => {
                eprintln!("Feedback sent to {}", config.feedback_file.display());
                return Ok(());
            }
            Ok(None) => return Ok(()),
            Err(e @ QaError::FeedbackWrite { .. }) => {
                eprintln!("Error: {}. Retry, or 'nah' to skip.", e);
            }
            Err(e) => eprintln!("Warning: {}", e),
        }
    }
}

/// Print user-input problems as warnings; anything else is a hard error
fn warn_or_fail(err: anyhow::Error) -> Result<()> {
    match err.downcast_ref::<QaError>() {
        Some(qa) if qa.is_warning() => {
            eprintln!("Warning: {}", qa);
            Ok(())
        }
        _ => Err(err),
    }
}

/// Print the most recent feedback rows
fn list_feedback(path: &Path, limit: usize) -> Result<()> {
    if !path.exists() {
        println!("No feedback recorded at {}", path.display());
        return Ok(());
    }

    let records = read_log(path)?;
    if records.is_empty() {
        println!("No feedback recorded at {}", path.display());
        return Ok(());
    }

    let skip = records.len().saturating_sub(limit);
    println!("{:<30} {:<30} {:<30}", "QUERY", "PREDICTED", "PREFERRED");
    println!("{}", "-".repeat(92));

    for record in records.iter().skip(skip) {
        println!(
            "{:<30} {:<30} {:<30}",
            truncate(&record.query, 28),
            truncate(&record.predicted_best_answer, 28),
            truncate(&record.user_preferred_answer, 28)
        );
    }

    println!("\n{} of {} rows", records.len() - skip, records.len());
    Ok(())
}

/// Show the resolved configuration
fn show_config(config: &ResolvedConfig) {
    println!("Backend URL:    {}", config.backend.url());
    println!("Feedback file:  {}", config.feedback_file.display());
    println!("Results:        {}", config.n_of_results);
    match config.max_chunks {
        Some(n) => println!("Max chunks:     {}", n),
        None => println!("Max chunks:     (all)"),
    }
    match &config.config_file {
        Some(path) => println!("Config file:    {}", path.display()),
        None => println!("Config file:    (none, using defaults)"),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let single_line = s.replace(['\n', '\t'], " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let head: String = single_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
