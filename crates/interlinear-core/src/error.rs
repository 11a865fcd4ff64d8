/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for interlinear-core.
 */

//! Error types for interlinear-core

use std::path::PathBuf;

use thiserror::Error;

use crate::compile::CompilationError;

/// Errors that abort a generation run.
///
/// Translation fetch failures and dictionary misses are deliberately absent:
/// they degrade the document instead of failing it.
#[derive(Error, Debug)]
pub enum InterlinearError {
    /// The reference did not parse, or names a book/chapter/verse the corpus
    /// does not contain.
    #[error("Passage not found: {reference} ({reason})")]
    PassageNotFound { reference: String, reason: String },

    #[error("Corpus error in {path}: {message}")]
    Corpus { path: PathBuf, message: String },

    #[error("Dictionary error in {path}: {message}")]
    Dictionary { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl InterlinearError {
    /// Create a passage-not-found error.
    pub fn passage_not_found(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PassageNotFound {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create a corpus load error.
    pub fn corpus(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corpus {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a data download error.
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InterlinearError>;
