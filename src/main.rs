//! # Sith Holocron
//!
//! Scrape Star Wars articles from Wikipedia, index them, and talk to the
//! Holocron about them.
//!
//! Usage:
//!   holocron scrape                  # Build ./web_pages from Wikipedia
//!   holocron scrape --only movies    # One category only
//!   holocron index                   # Build (or load) the vector index
//!   holocron chat                    # Terminal chat
//!   holocron serve --port 8501       # Browser chat
//!   holocron models                  # Providers and the backend's models

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use holocron_agent::{AgentFactory, ChatSession};
use holocron_core::config::HolocronConfig;
use holocron_knowledge::VectorIndex;
use holocron_scraper::{CorpusWriter, ExportReport, Scraper};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "holocron",
    version,
    about = "🔴 Sith Holocron — a retrieval-augmented Star Wars oracle"
)]
struct Cli {
    /// Config file (default: ./holocron.toml, then ~/.holocron/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape Wikipedia into the corpus directory
    Scrape {
        /// Export a single category
        #[arg(long, value_enum)]
        only: Option<Category>,
    },
    /// Build the vector index (or load it if it already exists)
    Index {
        /// Delete the existing index first
        #[arg(long)]
        rebuild: bool,
    },
    /// Chat with the Holocron in the terminal
    Chat,
    /// Serve the browser chat UI
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List supported providers and the models the configured backend serves
    Models,
    /// Write a default ./holocron.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Category {
    Planets,
    Series,
    Movies,
    Characters,
}

const EXIT_WORDS: &[&str] = &["exit", "quit", "leave"];

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

fn load_config(path: Option<&str>) -> Result<HolocronConfig> {
    let mut config = match path {
        Some(p) => HolocronConfig::load_from(Path::new(&expand_path(p)))?,
        None => HolocronConfig::load()?,
    };
    config.corpus.dir = expand_path(&config.corpus.dir);
    config.index.persist_dir = expand_path(&config.index.persist_dir);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `holocron` prefixes every workspace crate's target.
    let filter = if cli.verbose {
        "holocron=debug,tower_http=debug"
    } else {
        "holocron=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    if let Command::Init { force } = cli.command {
        return init(force);
    }
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Scrape { only } => scrape(&config, only).await,
        Command::Index { rebuild } => index(&config, rebuild).await,
        Command::Chat => chat(&config).await,
        Command::Serve { host, port } => {
            let mut gateway = config.gateway.clone();
            if let Some(host) = host {
                gateway.host = host;
            }
            if let Some(port) = port {
                gateway.port = port;
            }
            let factory = Arc::new(AgentFactory::from_config(&config).await?);
            holocron_gateway::start(&gateway, factory).await
        }
        Command::Models => models(&config).await,
        Command::Init { force } => init(force),
    }
}

async fn scrape(config: &HolocronConfig, only: Option<Category>) -> Result<()> {
    let writer = CorpusWriter::new(&config.corpus.dir);
    let scraper = Scraper::new(&config.scraper, writer)?;

    let report: ExportReport = match only {
        None => scraper.export_all().await,
        Some(Category::Planets) => scraper.export_planets().await,
        Some(Category::Series) => scraper.export_series().await,
        Some(Category::Movies) => scraper.export_movies().await,
        Some(Category::Characters) => scraper.export_characters().await,
    };

    println!(
        "📜 {} pages written to {} ({} skipped)",
        report.written, config.corpus.dir, report.skipped
    );
    Ok(())
}

async fn index(config: &HolocronConfig, rebuild: bool) -> Result<()> {
    let persist_dir = Path::new(&config.index.persist_dir);
    if rebuild && persist_dir.exists() {
        std::fs::remove_dir_all(persist_dir)
            .with_context(|| format!("failed to remove {}", persist_dir.display()))?;
        tracing::info!("🗑️ Removed {}", persist_dir.display());
    }

    let embedder = holocron_providers::create_embedder(config)?;
    let index = VectorIndex::build_or_load(config, embedder.as_ref()).await?;
    let meta = index.metadata();
    println!(
        "📚 Index ready at {}: {} documents, {} chunks, {} dims ({})",
        persist_dir.display(),
        meta.document_count,
        meta.chunk_count,
        meta.dimensions,
        meta.embedding_model
    );
    Ok(())
}

async fn chat(config: &HolocronConfig) -> Result<()> {
    let factory = Arc::new(AgentFactory::from_config(config).await?);
    let mut session = ChatSession::new(factory.clone());

    if !factory.provider_online().await {
        tracing::warn!(
            "⚠️ {} is not answering; check [llm] endpoint or OLLAMA_HOST",
            factory.provider_name()
        );
    }

    println!("🔴 Sith Holocron — {} / {}", factory.provider_name(), factory.model());
    println!("   Type 'clear' to forget, 'exit' to leave.\n");
    println!("Holocron: {}\n", factory.greeting());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"Seeker: ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&prompt.to_lowercase().as_str()) {
            break;
        }
        if prompt.eq_ignore_ascii_case("clear") {
            session.clear();
            println!("Holocron: {}\n", factory.greeting());
            continue;
        }

        match session.send(prompt).await {
            Ok(reply) => println!("Holocron: {reply}\n"),
            Err(e) => eprintln!("❌ Error: {e}\n"),
        }
    }

    println!("The Holocron falls silent.");
    Ok(())
}

async fn models(config: &HolocronConfig) -> Result<()> {
    println!(
        "Providers: {}",
        holocron_providers::available_providers().join(", ")
    );

    let provider = holocron_providers::create_provider(config)?;
    let online = provider.health_check().await.unwrap_or(false);
    println!(
        "\n{} ({}):",
        provider.name(),
        if online { "online" } else { "offline" }
    );
    for model in provider.list_models().await? {
        let marker = if model.id == config.llm.model { "*" } else { " " };
        println!("  {marker} {}", model.id);
    }
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path: PathBuf = HolocronConfig::local_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    HolocronConfig::default().save_to(&path)?;
    println!("✅ Config written to {}", path.display());
    Ok(())
}
