//! `svndump-fast-export` — command-line driver for `svndump-core`.
//!
//! Reads an `svnadmin dump` stream from a file or stdin and writes a
//! `git fast-import` stream to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use svndump_core::DumpTranslator;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Translate an `svnadmin dump` stream into a `git fast-import` stream.
#[derive(Parser, Debug)]
#[command(name = "svndump-fast-export")]
#[command(author = "DSvn Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Stream an svnadmin dump to a git fast-import change feed", long_about = None)]
struct Cli {
    /// Path to the dump file, or `-` to read from stdin.
    #[arg(default_value = "-")]
    input: String,

    /// Repository URL recorded in each commit's `# svn` annotation.
    #[arg(short, long, default_value = "")]
    url: String,

    /// Name of the ref commits are written to.
    #[arg(short, long, default_value = "master")]
    branch: String,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();

    let stdout = io::stdout();
    let mut translator = DumpTranslator::new(BufWriter::new(stdout.lock()), cli.branch);

    let stats = if cli.input == "-" {
        info!("reading dump from stdin");
        translator.read(io::stdin().lock(), &cli.url)
    } else {
        info!("reading dump from {}", cli.input);
        let file = File::open(&cli.input).with_context(|| format!("opening {}", cli.input))?;
        translator.read(file, &cli.url)
    }
    .context("translating svn dump stream")?;

    translator
        .into_inner()
        .flush()
        .context("flushing fast-import stream")?;

    info!(
        "translated {} revisions, {} nodes, {} blobs",
        stats.revisions, stats.nodes, stats.blobs
    );

    Ok(())
}
