//! PrdKit CLI - read Confluence, Notion and Google Docs documents

mod mcp;

use clap::{Args, Parser, Subcommand, ValueEnum};
use prdkit::{
    read_document_with_options, ConfluenceCredentials, Credentials, NormalizedDocument,
    ReadOptions, Summarizer, SummarizerConfig, TOOL_LLMTXT,
};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Output format for read subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Markdown with title heading and source footer
    #[default]
    Md,
    /// JSON format
    Json,
}

/// PrdKit - read product documents as Markdown
#[derive(Parser, Debug)]
#[command(name = "prdkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Read a document by URL and print it
    Read {
        /// Confluence, Notion or Google Docs URL
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        /// Append a summary generated with the Anthropic API
        #[arg(long)]
        summarize: bool,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

#[derive(Args, Debug, Default)]
struct CredentialArgs {
    /// Confluence username (account email)
    #[arg(long, env = "CONFLUENCE_USERNAME")]
    confluence_username: Option<String>,

    /// Confluence API token
    #[arg(long, env = "CONFLUENCE_TOKEN", hide_env_values = true)]
    confluence_token: Option<String>,

    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: Option<String>,

    /// Google OAuth access token
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    google_access_token: Option<String>,

    /// Anthropic API key, required with --summarize
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,
}

impl CredentialArgs {
    fn to_credentials(&self) -> Credentials {
        let confluence = match (&self.confluence_username, &self.confluence_token) {
            (Some(username), Some(token)) => Some(ConfluenceCredentials {
                username: username.clone(),
                token: token.clone(),
            }),
            _ => None,
        };
        Credentials {
            confluence,
            notion_token: self.notion_token.clone(),
            google_access_token: self.google_access_token.clone(),
        }
    }
}

/// JSON output of the read subcommand
#[derive(Debug, Serialize)]
struct ReadOutput<'a> {
    #[serde(flatten)]
    document: &'a NormalizedDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server().await;
        }
        Some(Commands::Read {
            url,
            output,
            summarize,
            user_agent,
            timeout,
            credentials,
        }) => {
            let mut options = ReadOptions {
                user_agent,
                ..Default::default()
            };
            if let Some(secs) = timeout {
                options.timeout = Duration::from_secs(secs);
            }
            run_read(&url, output, summarize, &credentials, options).await;
        }
        None => {
            eprintln!("Usage: prdkit read <URL>");
            eprintln!("   or: prdkit mcp");
            eprintln!("   or: prdkit --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr; stdout carries documents and JSON-RPC
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run_read(
    url: &str,
    output: OutputFormat,
    summarize: bool,
    args: &CredentialArgs,
    options: ReadOptions,
) {
    let summarizer = if summarize {
        match args.anthropic_api_key {
            Some(ref key) => Some(Summarizer::new(SummarizerConfig::new(key), options.clone())),
            None => {
                eprintln!("Error: --summarize requires ANTHROPIC_API_KEY");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let doc = match read_document_with_options(url, &args.to_credentials(), &options).await {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let summary = match summarizer {
        Some(summarizer) => match summarizer.summarize(&doc.content, Some(&doc.title)).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    match output {
        OutputFormat::Md => writeln_safe(&format_md(&doc, summary.as_deref())),
        OutputFormat::Json => {
            let out = ReadOutput {
                document: &doc,
                summary,
            };
            let json = serde_json::to_string_pretty(&out).unwrap_or_else(|e| {
                eprintln!("Error serializing document: {}", e);
                std::process::exit(1);
            });
            writeln_safe(&json);
        }
    }
}

/// Format a document as Markdown, with an optional summary section
fn format_md(doc: &NormalizedDocument, summary: Option<&str>) -> String {
    let mut output = doc.to_markdown();
    if let Some(summary) = summary {
        output.push_str("\n\n## Summary\n\n");
        output.push_str(summary);
    }
    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
