//! Core library for the interlinear Greek New Testament generator
//!
//! This crate turns a passage reference into a typeset interlinear
//! document: Greek text with word-by-word English glosses, one or three
//! English translations in parallel columns, and a Strong's lexicon
//! appendix.
//!
//! # Architecture
//!
//! - [`Corpus`] - The OpenGNT Greek text, loaded once
//! - [`ensure_corpus`] - Downloads the OpenGNT archive when it is missing
//! - [`DictionaryIndex`] - Strong's number lookups and candidate glosses
//! - [`TranslationSource`] - ESV, NET and KJV fetchers over an [`HttpTransport`]
//! - [`AlignmentEngine`] - Chooses one gloss per Greek word
//! - [`Document`] - Ordered blocks built by [`assemble`]
//! - [`latex`] - Serializes a document for LuaLaTeX
//! - [`compile()`] - Runs the engine
//!
//! # Example
//!
//! ```ignore
//! use interlinear_core::{
//!     CompileOptions, Corpus, DictionaryIndex, GenerateRequest, LatexEngine, Layout, Overrides,
//!     ReqwestTransport, Settings, default_sources, ensure_corpus, generate,
//! };
//!
//! let settings = Settings::load(&Overrides::default())?;
//! let transport = ReqwestTransport::new(settings.http_timeout)?;
//! ensure_corpus(&transport, &settings.corpus_url, &settings.data_dir, false)?;
//! let corpus = Corpus::load(&settings.data_dir)?;
//! let dictionary = DictionaryIndex::load(&settings.data_dir, &corpus)?;
//! let sources = default_sources(&settings)?;
//! let engine = LatexEngine::discover(settings.lualatex.as_deref());
//!
//! let request = GenerateRequest {
//!     reference: "John 1:1-18".to_string(),
//!     layout: Layout::EsvPortrait,
//!     output_dir: settings.output_dir.clone(),
//!     latex_only: false,
//!     compile: CompileOptions::default(),
//! };
//! let report = generate(&request, &corpus, &dictionary, &sources, engine.as_ref())?;
//! ```

pub mod align;
pub mod books;
pub mod compile;
pub mod config;
pub mod corpus;
pub mod data;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod latex;
pub mod layout;
pub mod passage;
pub mod pipeline;
pub mod strongs;
pub mod translation;

// Re-export commonly used types
pub use align::{AlignedVerse, AlignedWord, AlignmentEngine, AlignmentStats, GlossSource, UNKNOWN_GLOSS};
pub use books::Book;
pub use compile::{CompilationError, CompileOptions, CompileOutput, LatexEngine, compile};
pub use config::{Overrides, Settings};
pub use corpus::{Corpus, Verse, Word};
pub use data::{CorpusFile, OPENGNT_URL, ensure_corpus};
pub use dictionary::{DictionaryIndex, DictionaryLookup, GlossEntry};
pub use document::{Block, Document, DocumentSummary, assemble};
pub use error::{InterlinearError, Result};
pub use layout::Layout;
pub use passage::{Passage, PassageKind, PassageRequest, VerseRef};
pub use pipeline::{GenerateReport, GenerateRequest, default_sources, fetch_translations, generate};
pub use strongs::StrongsNumber;
pub use translation::{
    FetchError, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, RetryPolicy,
    Translation, TranslationSource, TranslationVerse, TransportError,
};
