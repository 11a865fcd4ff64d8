/*
 * pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end generation of one interlinear document.
 */

//! The generation pipeline.
//!
//! ```text
//! reference ─► resolve ─► fetch translations (concurrently) ─┐
//!                 │                                          ├─► assemble ─► write .tex ─► compile
//!                 └─────► align Greek words ─────────────────┘
//! ```
//!
//! The passage is resolved before anything touches the network or the
//! output directory, so an unknown reference writes no files.

use std::path::PathBuf;
use std::sync::Arc;

use crate::align::{AlignmentEngine, AlignmentStats};
use crate::compile::{CompileOptions, CompileOutput, LatexEngine, compile};
use crate::config::Settings;
use crate::corpus::Corpus;
use crate::dictionary::DictionaryIndex;
use crate::document::{DocumentSummary, FetchOutcome, assemble};
use crate::error::Result;
use crate::latex::write_document;
use crate::layout::Layout;
use crate::passage::{Passage, PassageRequest};
use crate::translation::bible_api::BibleApiSource;
use crate::translation::esv::EsvSource;
use crate::translation::net::NetSource;
use crate::translation::{
    FetchError, HttpTransport, ReqwestTransport, RetryPolicy, Translation, TranslationSource,
};

/// One generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub reference: String,
    pub layout: Layout,
    pub output_dir: PathBuf,
    /// Stop after writing the `.tex` file
    pub latex_only: bool,
    pub compile: CompileOptions,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub title: String,
    pub tex_path: PathBuf,
    /// `None` when compilation was skipped
    pub output: Option<CompileOutput>,
    pub summary: DocumentSummary,
    pub alignment: AlignmentStats,
    /// Translations that were replaced by placeholders
    pub failed_translations: Vec<FetchError>,
}

/// Build the production translation sources from settings.
pub fn default_sources(settings: &Settings) -> Result<Vec<Box<dyn TranslationSource>>> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(settings.http_timeout)?);
    let retry = RetryPolicy {
        delay: settings.retry_delay,
    };
    let sources: Vec<Box<dyn TranslationSource>> = vec![
        Box::new(EsvSource::new(transport.clone(), settings.esv_api_key.clone()).with_retry(retry)),
        Box::new(NetSource::new(transport.clone()).with_retry(retry)),
        Box::new(BibleApiSource::kjv(transport).with_retry(retry)),
    ];
    Ok(sources)
}

/// Fetch every translation the layout needs, concurrently.
///
/// Outcomes come back in layout order. Translations with no matching
/// source are omitted; the assembler turns them into placeholders.
pub fn fetch_translations(
    passage: &Passage,
    layout: Layout,
    sources: &[Box<dyn TranslationSource>],
) -> Vec<(Translation, FetchOutcome)> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = layout
            .translations()
            .iter()
            .filter_map(|&translation| {
                let source = sources.iter().find(|s| s.translation() == translation)?;
                let handle = scope.spawn(move || source.fetch(passage));
                Some((translation, handle))
            })
            .collect();

        handles
            .into_iter()
            .map(|(translation, handle)| {
                let outcome = handle.join().unwrap_or_else(|_| {
                    Err(FetchError::transport(translation, "fetch thread panicked"))
                });
                (translation, outcome)
            })
            .collect()
    })
}

/// Run the whole pipeline for one passage.
pub fn generate(
    request: &GenerateRequest,
    corpus: &Corpus,
    dictionary: &DictionaryIndex,
    sources: &[Box<dyn TranslationSource>],
    engine: Option<&LatexEngine>,
) -> Result<GenerateReport> {
    let passage = corpus.resolve(&PassageRequest::parse(&request.reference)?)?;
    let title = passage.title();
    tracing::info!(passage = %title, layout = %request.layout, "Generating");

    let verses = corpus.verses(&passage);
    let fetched = fetch_translations(&passage, request.layout, sources);
    let mut failed_translations = Vec::new();
    for (translation, outcome) in &fetched {
        match outcome {
            Ok(verses) => tracing::info!(%translation, verses = verses.len(), "Fetched translation"),
            Err(e) => {
                tracing::warn!(error = %e, "Translation unavailable; using placeholders");
                failed_translations.push(e.clone());
            }
        }
    }

    let (aligned, alignment) = AlignmentEngine::new(dictionary).align(&verses);
    if alignment.dictionary_misses > 0 {
        tracing::info!(misses = alignment.dictionary_misses, "Words without a dictionary entry");
    }

    let document = assemble(&passage, request.layout, &aligned, &fetched, dictionary);
    let summary = document.summary();

    let stem = format!("{}{}", passage.file_stem(), request.layout.file_suffix());
    let tex_path = write_document(&document, &request.output_dir, &stem)?;
    tracing::info!(
        path = %tex_path.display(),
        chapters = summary.chapters,
        verses = summary.verses,
        words = summary.words,
        appendix_entries = summary.appendix_entries,
        "Wrote LaTeX"
    );

    let output = if request.latex_only {
        None
    } else {
        Some(compile(engine, &tex_path, &request.compile)?)
    };

    Ok(GenerateReport {
        title,
        tex_path,
        output,
        summary,
        alignment,
        failed_translations,
    })
}
