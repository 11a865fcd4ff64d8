//! Interlinear CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use interlinear_core::Layout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "interlinear")]
#[command(version)]
#[command(about = "Generate interlinear Greek New Testament PDFs", long_about = None)]
struct Cli {
    /// Passage to generate, e.g. "John", "John 1", "Eph 1:3-14" or "John 1:1-2:5"
    #[arg(value_name = "PASSAGE")]
    passage: String,

    /// Page layout (esv-portrait, multi-landscape)
    #[arg(short, long, default_value = "esv-portrait", value_parser = parse_layout)]
    layout: Layout,

    /// Write the .tex file and stop before compiling
    #[arg(long)]
    latex_only: bool,

    /// ESV API key (overrides ESV_API_KEY and the config file)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Leave LaTeX auxiliary files in place
    #[arg(long)]
    keep_aux: bool,

    /// Configuration file (defaults to ./interlinear.yml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write output files to DIR
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory holding the OpenGNT corpus and Strong's dictionary
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Download the OpenGNT corpus again even if it is already present
    #[arg(long)]
    force_download: bool,
}

fn parse_layout(s: &str) -> Result<Layout, String> {
    Layout::try_from(s)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interlinear=info,interlinear_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    commands::generate::execute(commands::generate::GenerateArgs {
        passage: cli.passage,
        layout: cli.layout,
        latex_only: cli.latex_only,
        api_key: cli.api_key,
        keep_aux: cli.keep_aux,
        config: cli.config,
        output_dir: cli.output_dir,
        data_dir: cli.data_dir,
        force_download: cli.force_download,
    })
}
