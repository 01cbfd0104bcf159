//! # docqa CLI
//!
//! The `docqa` binary is the primary interface for the document
//! question-answering pipeline. It provides commands for database
//! initialization, PDF ingestion, question answering, and starting the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa init` | Create the SQLite database and run schema migrations |
//! | `docqa ingest <file>` | Partition, chunk, embed, and store a PDF |
//! | `docqa ask "<question>"` | Answer a question from a scope's content |
//! | `docqa serve` | Start the JSON HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! docqa init --config ./docqa.toml
//!
//! # Ingest a PDF into a scope
//! docqa ingest report.pdf --scope project-1 --config ./docqa.toml
//!
//! # Seed a scope only if it has no content yet
//! docqa ingest report.pdf --scope project-1 --if-empty
//!
//! # Ask a question
//! docqa ask "What does the report conclude?" --scope project-1
//!
//! # Start the HTTP server
//! docqa serve --config ./docqa.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use docqa::ask::AskPipeline;
use docqa::config::{self, Config};
use docqa::db;
use docqa::embedding::create_provider as create_embedder;
use docqa::generation::create_provider as create_generator;
use docqa::ingest::IngestPipeline;
use docqa::migrate;
use docqa::models::Sender;
use docqa::server;
use docqa::store::ContentStore;

/// docqa CLI — ingest PDFs and answer questions over their content.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "docqa",
    about = "docqa — PDF ingestion and document question answering over SQLite",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./docqa.toml`. Database, chunking, embedding,
    /// generation, and server settings are read from this file.
    #[arg(long, global = true, default_value = "./docqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and both tables (messages,
    /// answers). This command is idempotent — running it multiple times
    /// is safe.
    Init,

    /// Ingest a PDF into a scope.
    ///
    /// Partitions the document into blocks, chunks by title with size
    /// caps, embeds each chunk (storing the text even when embedding
    /// fails), and writes everything to the store.
    Ingest {
        /// Path to the PDF file.
        file: PathBuf,

        /// Scope (collection) the document belongs to.
        #[arg(long)]
        scope: String,

        /// Sender identity recorded on every stored chunk.
        #[arg(long, default_value = "cli")]
        sender_id: String,

        /// Sender role recorded on every stored chunk.
        #[arg(long, default_value = "user")]
        sender_role: String,

        /// Skip ingestion if the scope already has content.
        #[arg(long)]
        if_empty: bool,
    },

    /// Answer a question from a scope's stored content.
    ///
    /// Checks the answer cache first; on a miss, retrieves the scope's
    /// chunks, assembles the prompt, calls the generation model, and
    /// records the answer.
    Ask {
        /// The question. Used verbatim as the answer-cache key.
        query: String,

        /// Scope whose content provides the context.
        #[arg(long)]
        scope: String,

        /// Identity of the asker.
        #[arg(long, default_value = "cli")]
        user: String,
    },

    /// Start the JSON HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and exposes
    /// `POST /ingest`, `POST /query`, and `GET /health`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            file,
            scope,
            sender_id,
            sender_role,
            if_empty,
        } => {
            run_ingest(&cfg, &file, &scope, &sender_id, &sender_role, if_empty).await?;
        }
        Commands::Ask { query, scope, user } => {
            run_ask(&cfg, &query, &scope, &user).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

async fn run_ingest(
    cfg: &Config,
    file: &PathBuf,
    scope: &str,
    sender_id: &str,
    sender_role: &str,
    if_empty: bool,
) -> anyhow::Result<()> {
    let data = std::fs::read(file)?;

    let pool = db::connect(cfg).await?;
    let store = ContentStore::new(pool);

    if if_empty && store.scope_has_content(scope).await? {
        println!("Scope '{}' already has content; skipping.", scope);
        return Ok(());
    }

    let embedder = create_embedder(&cfg.embedding)?;
    let pipeline = IngestPipeline::new(store, embedder, cfg.chunking.clone());
    let producer = Sender::new(sender_id, sender_role);

    let report = pipeline.ingest_document(&data, scope, &producer).await?;

    println!(
        "Ingested {} chunks into scope '{}' ({} embedded, {} without vectors).",
        report.stored, scope, report.embedded, report.embedding_failures
    );

    Ok(())
}

async fn run_ask(cfg: &Config, query: &str, scope: &str, user: &str) -> anyhow::Result<()> {
    let pool = db::connect(cfg).await?;
    let store = ContentStore::new(pool);
    let embedder = create_embedder(&cfg.embedding)?;
    let generator = create_generator(&cfg.generation)?;

    let pipeline = Arc::new(AskPipeline::new(
        store,
        embedder,
        generator,
        cfg.retrieval.top_k,
    ));

    let outcome = pipeline.ask(query, scope, user).await?;

    if outcome.cache_hit {
        println!("(cached)");
    }
    println!("{}", outcome.answer);

    Ok(())
}
