/*
 * translation/error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Translation fetch errors.
 */

use thiserror::Error;

use super::Translation;

/// Why a translation could not be fetched.
///
/// A fetch failure never aborts generation; the document carries a
/// placeholder for the missing text instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Missing or rejected credentials (401/403)
    #[error("{translation}: authentication failed: {reason}")]
    Auth {
        translation: Translation,
        reason: String,
    },

    #[error("{translation}: passage not found: {query}")]
    NotFound {
        translation: Translation,
        query: String,
    },

    #[error("{translation}: rate limited by the API")]
    RateLimited { translation: Translation },

    /// Connection failure, timeout or a 5xx response
    #[error("{translation}: transport error: {message}")]
    Transport {
        translation: Translation,
        message: String,
    },

    #[error("{translation}: could not decode response: {message}")]
    Decode {
        translation: Translation,
        message: String,
    },
}

impl FetchError {
    pub fn transport(translation: Translation, message: impl Into<String>) -> Self {
        Self::Transport {
            translation,
            message: message.into(),
        }
    }

    pub fn decode(translation: Translation, message: impl Into<String>) -> Self {
        Self::Decode {
            translation,
            message: message.into(),
        }
    }

    pub fn not_found(translation: Translation, query: impl Into<String>) -> Self {
        Self::NotFound {
            translation,
            query: query.into(),
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_status(translation: Translation, status: u16, query: &str) -> Self {
        match status {
            401 | 403 => Self::Auth {
                translation,
                reason: format!("HTTP {}", status),
            },
            404 => Self::not_found(translation, query),
            429 => Self::RateLimited { translation },
            _ => Self::transport(translation, format!("HTTP {} for {}", status, query)),
        }
    }

    /// Only transport failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn translation(&self) -> Translation {
        match self {
            Self::Auth { translation, .. }
            | Self::NotFound { translation, .. }
            | Self::RateLimited { translation }
            | Self::Transport { translation, .. }
            | Self::Decode { translation, .. } => *translation,
        }
    }
}
