//! streamline-resolve - resolve a YAML document's includes and print JSON

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use streamline_include::{EmptyDocumentPolicy, Evaluator, ResolvedValue};
use streamline_source::{FileSource, HttpSource, SharedSource};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "streamline-resolve")]
#[command(about = "Resolve !include directives in a YAML document and print the result as JSON")]
#[command(version)]
struct Args {
    /// Document to resolve: a path below --root, a path on --origin, or an
    /// http(s) URL
    #[arg(value_name = "INPUT")]
    input: String,

    /// Resolve the input's own includes against this base instead of its
    /// directory (must end with '/')
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Serve documents from this directory (default: current directory)
    #[arg(long, value_name = "DIR", conflicts_with = "origin")]
    root: Option<PathBuf>,

    /// Fetch documents over HTTP from this origin
    /// (e.g. http://homeassistant.local:8123)
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Fail on empty included documents instead of treating them as {}
    #[arg(long)]
    strict_empty: bool,

    /// Do not check for include cycles
    #[arg(long)]
    no_cycle_check: bool,

    /// Maximum include nesting depth
    #[arg(long, value_name = "N", default_value_t = 64)]
    max_depth: usize,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let (source, url) = select_source(&args);
    info!(source = source.name(), url = %url, "Resolving document");

    let evaluator = Evaluator::builder(source.clone())
        .empty_document(if args.strict_empty {
            EmptyDocumentPolicy::Reject
        } else {
            EmptyDocumentPolicy::EmptyMapping
        })
        .detect_cycles(!args.no_cycle_check)
        .max_include_depth(args.max_depth)
        .build();

    let value = match &args.base_url {
        Some(base_url) => {
            let text = fetch_input(&source, &url).await?;
            evaluator
                .evaluate_document(&text, base_url)
                .await
                .with_context(|| format!("Failed to resolve {}", url))?
        }
        None => evaluator
            .evaluate_url(&url)
            .await
            .with_context(|| format!("Failed to resolve {}", url))?,
    };

    println!("{}", render(&value, args.compact)?);
    Ok(())
}

/// Pick the document source and turn INPUT into the URL it serves.
fn select_source(args: &Args) -> (SharedSource, String) {
    if let Some(origin) = &args.origin {
        return (
            Arc::new(HttpSource::with_origin(origin.as_str())),
            server_relative(&args.input),
        );
    }

    let is_remote = args.input.starts_with("http://") || args.input.starts_with("https://");
    if is_remote && args.root.is_none() {
        return (Arc::new(HttpSource::new()), args.input.clone());
    }

    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    (Arc::new(FileSource::new(root)), server_relative(&args.input))
}

fn server_relative(input: &str) -> String {
    if input.starts_with('/') {
        input.to_string()
    } else {
        format!("/{}", input)
    }
}

async fn fetch_input(source: &SharedSource, url: &str) -> Result<String> {
    let response = source
        .fetch(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;
    if response.is_failure() {
        bail!(
            "Failed to fetch {}: {} {}",
            url,
            response.status,
            response.status_text
        );
    }
    Ok(response.body)
}

fn render(value: &ResolvedValue, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("Failed to serialize resolved document")
}
