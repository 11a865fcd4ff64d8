/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generate command implementation
 */

//! Generate command implementation.
//!
//! Loads settings, fetches the OpenGNT corpus if it is missing, loads it and
//! the Strong's dictionary, then hands the passage to
//! [`interlinear_core::generate`]. Missing translations
//! and a missing LaTeX engine degrade the output but do not fail the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use interlinear_core::{
    CompileOptions, CompileOutput, Corpus, CorpusFile, DictionaryIndex, GenerateReport,
    GenerateRequest, LatexEngine, Layout, Overrides, ReqwestTransport, Settings, default_sources,
    ensure_corpus, generate,
};

/// Arguments for the generate command
#[derive(Debug)]
pub struct GenerateArgs {
    pub passage: String,
    pub layout: Layout,
    pub latex_only: bool,
    pub api_key: Option<String>,
    pub keep_aux: bool,
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub force_download: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let settings = Settings::load(&Overrides {
        config: args.config.clone(),
        esv_api_key: args.api_key.clone(),
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
    })
    .context("Failed to load configuration")?;

    if settings.esv_api_key.is_none() {
        warn!("No ESV API key configured; ESV text will be replaced by placeholders");
    }

    if settings.download_corpus || args.force_download {
        let transport = ReqwestTransport::new(settings.http_timeout)
            .context("Failed to set up the HTTP client")?;
        let file = ensure_corpus(
            &transport,
            &settings.corpus_url,
            &settings.data_dir,
            args.force_download,
        )
        .context("Failed to load the OpenGNT corpus")?;
        if let CorpusFile::Downloaded(path) = file {
            info!(path = %path.display(), "Downloaded OpenGNT corpus");
        }
    }

    let corpus = Corpus::load(&settings.data_dir).with_context(|| {
        format!(
            "Failed to load the OpenGNT corpus from {}",
            settings.data_dir.display()
        )
    })?;
    info!(verses = corpus.len(), "Loaded corpus");

    let dictionary = DictionaryIndex::load(&settings.data_dir, &corpus)
        .context("Failed to load the Strong's dictionary")?;

    let sources = default_sources(&settings).context("Failed to set up translation sources")?;

    let engine = if args.latex_only {
        None
    } else {
        LatexEngine::discover(settings.lualatex.as_deref())
    };

    let request = GenerateRequest {
        reference: args.passage.clone(),
        layout: args.layout,
        output_dir: settings.output_dir.clone(),
        latex_only: args.latex_only,
        compile: CompileOptions {
            keep_aux: args.keep_aux,
            ..Default::default()
        },
    };

    let report = generate(&request, &corpus, &dictionary, &sources, engine.as_ref())
        .with_context(|| format!("Failed to generate {}", args.passage))?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &GenerateReport) {
    let summary = &report.summary;
    println!("{}", report.title);
    println!(
        "  {} chapter(s), {} verse(s), {} words, {} appendix entries",
        summary.chapters, summary.verses, summary.words, summary.appendix_entries
    );
    if summary.translation_gaps > 0 {
        println!(
            "  {} translation row(s) replaced by placeholders",
            summary.translation_gaps
        );
    }
    for failure in &report.failed_translations {
        println!("  unavailable: {}", failure);
    }

    match &report.output {
        Some(CompileOutput::Pdf(pdf)) => println!("  PDF: {}", pdf.display()),
        Some(CompileOutput::MarkupOnly(tex)) => {
            println!("  LaTeX: {} (lualatex not found)", tex.display())
        }
        None => println!("  LaTeX: {}", report.tex_path.display()),
    }
}
