//! ragchat: command-line front end for the document assistant backend.
//!
//! Uploads PDFs, asks questions, approves web searches, and browses
//! conversation history against the server named by `RAGCHAT_API_URL`
//! (or `--api-url`).

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragchat_client::{
    ApiClient, ChatApi, ChatResponse, ClientConfig, ConversationHistory, ConversationList,
    HealthStatus, QueryRequest, Route, Source, UploadFile,
};

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(author, version, about = "Chat with your PDF documents")]
#[command(propagate_version = true)]
struct Cli {
    /// Backend base URL (overrides RAGCHAT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF document for ingestion
    Upload {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Ask the assistant a question
    Ask {
        /// The question
        query: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        conversation: Option<String>,

        /// Number of document chunks to retrieve
        #[arg(short = 'k', long, default_value_t = ragchat_client::defaults::TOP_K)]
        top_k: u32,

        /// Run the web search if the assistant asks for one
        #[arg(long)]
        approve_search: bool,
    },

    /// Approve (or decline) a pending web search
    WebSearch {
        /// Conversation that requested the search
        conversation: String,

        /// Decline instead of approving
        #[arg(long)]
        deny: bool,
    },

    /// Show the full history of a conversation
    History {
        /// Conversation id
        conversation: String,
    },

    /// List all conversations
    Conversations,

    /// Delete a conversation
    Delete {
        /// Conversation id
        conversation: String,
    },

    /// Check backend health
    Health,

    /// Resolve a browser path to its view
    Route {
        /// Location path, e.g. /upload
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (default: on for a terminal, off for files)
///   RUST_LOG    - standard env filter (default: "ragchat=warn,ragchat_client=warn")
fn init_logging() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ragchat=warn,ragchat_client=warn".into());

    // Console output goes to stderr so stdout stays clean for --json.
    let (writer, guard, ansi_default) = match log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let file_dir = path.parent().unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("ragchat.log");
            let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(log_ansi.unwrap_or(ansi_default));
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer).init();
    }

    info!(
        subsystem = "cli",
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );

    guard
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    // Built eagerly but only checked by commands that talk to the backend.
    let client = connect(cli.api_url);

    match cli.command {
        Commands::Route { path } => cmd_route(&path, json),
        Commands::Upload { file } => cmd_upload(&client?, &file, json).await,
        Commands::Ask {
            query,
            conversation,
            top_k,
            approve_search,
        } => {
            let mut request = QueryRequest::new(query).top_k(top_k);
            if let Some(id) = conversation {
                request = request.conversation(id);
            }
            cmd_ask(&client?, request, approve_search, json).await
        }
        Commands::WebSearch { conversation, deny } => {
            let response = client?.perform_web_search(&conversation, !deny).await?;
            emit(&response, json, print_chat)
        }
        Commands::History { conversation } => {
            let history = client?.get_conversation_history(&conversation).await?;
            emit(&history, json, print_history)
        }
        Commands::Conversations => {
            let list = client?.get_all_conversations().await?;
            emit(&list, json, print_conversations)
        }
        Commands::Delete { conversation } => {
            let response = client?.delete_conversation(&conversation).await?;
            emit(&response, json, |r| {
                println!(
                    "{}",
                    r.message
                        .clone()
                        .unwrap_or_else(|| format!("Deleted conversation {}", conversation))
                );
            })
        }
        Commands::Health => {
            let health = client?.health_check().await?;
            emit(&health, json, print_health)
        }
    }
}

/// Client for the backend named by `--api-url`, else by the environment.
fn connect(api_url: Option<String>) -> anyhow::Result<ApiClient> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    ApiClient::new(config).context("Failed to configure API client")
}

async fn cmd_upload(api: &impl ChatApi, path: &Path, json: bool) -> anyhow::Result<()> {
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !file.is_pdf() {
        warn!(
            subsystem = "cli",
            file_name = %file.file_name,
            mime_type = %file.mime_type,
            "File does not look like a PDF"
        );
    }

    let response = api.upload_pdf(file).await?;
    emit(&response, json, |r| {
        println!("{}", r.message);
        println!("Document: {} ({} chunks)", r.document_id, r.chunks_count);
    })
}

async fn cmd_ask(
    api: &impl ChatApi,
    request: QueryRequest,
    approve_search: bool,
    json: bool,
) -> anyhow::Result<()> {
    let response = api.send_query(request).await?;

    if !response.wants_web_search() {
        return emit(&response, json, print_chat);
    }

    if !approve_search {
        emit(&response, json, print_chat)?;
        if !json {
            println!();
            println!(
                "The assistant wants to search the web{}. Run `ragchat web-search {}` to allow it.",
                response
                    .search_query
                    .as_deref()
                    .map(|q| format!(" for \"{}\"", q))
                    .unwrap_or_default(),
                response.conversation_id
            );
        }
        return Ok(());
    }

    info!(
        subsystem = "cli",
        conversation_id = %response.conversation_id,
        "Web search requested and pre-approved"
    );
    let searched = api
        .perform_web_search(&response.conversation_id, true)
        .await?;
    emit(&searched, json, print_chat)
}

fn cmd_route(path: &str, json: bool) -> anyhow::Result<()> {
    let route = Route::resolve(path).with_context(|| format!("No view is mounted at {}", path))?;
    emit(&route, json, |r| println!("{} -> {}", r.path(), r.name()))
}

/// Print `value` as pretty JSON, or through `text` otherwise.
fn emit<T: Serialize>(value: &T, json: bool, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for (i, source) in sources.iter().enumerate() {
        match source.page {
            Some(page) => println!(
                "  {}. {} (page {}, score {:.3})",
                i + 1,
                source.source,
                page,
                source.score
            ),
            None => println!("  {}. {} (score {:.3})", i + 1, source.source, source.score),
        }
    }
}

fn print_chat(response: &ChatResponse) {
    println!("{}", response.response);
    print_sources(&response.sources);
    println!();
    println!("Conversation: {}", response.conversation_id);
}

fn print_history(history: &ConversationHistory) {
    println!(
        "Conversation {} ({} messages, {} to {})",
        history.conversation_id,
        history.messages.len(),
        history.created_at.format("%Y-%m-%d %H:%M"),
        history.updated_at.format("%Y-%m-%d %H:%M")
    );
    for message in &history.messages {
        println!();
        println!("[{}] You: {}", message.timestamp.format("%Y-%m-%d %H:%M"), message.query);
        println!("Assistant: {}", message.response);
        print_sources(&message.sources);
    }
}

fn print_conversations(list: &ConversationList) {
    if list.conversations.is_empty() {
        println!("No conversations yet.");
        return;
    }
    for summary in &list.conversations {
        println!(
            "{}  {:>3} msgs  {}  {}",
            summary.conversation_id,
            summary.message_count,
            summary.updated_at.format("%Y-%m-%d %H:%M"),
            summary.first_query
        );
    }
}

fn print_health(health: &HealthStatus) {
    let flag = |b: bool| if b { "yes" } else { "no" };
    println!("Status: {}", health.status);
    println!("  Vector store ready:    {}", flag(health.vector_store_ready));
    println!("  LLM service available: {}", flag(health.llm_service_available));
    println!("  Web search available:  {}", flag(health.web_search_available));
    if let Some(ts) = health.timestamp {
        println!("  Checked at:            {}", ts.format("%Y-%m-%d %H:%M:%S"));
    }
}
