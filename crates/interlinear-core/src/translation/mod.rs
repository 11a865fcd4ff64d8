/*
 * translation/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * English translation fetchers.
 */

//! English translation fetchers.
//!
//! One [`TranslationSource`] per API:
//! - [`esv::EsvSource`]: api.esv.org, needs an API key, carries section headings
//! - [`net::NetSource`]: labs.bible.org
//! - [`bible_api::BibleApiSource`]: bible-api.com, used for the KJV
//!
//! Every source fetches one chapter span at a time, keeps only the verses
//! the span covers, and fails the whole fetch if any span fails. Partial
//! data is never returned.

pub mod bible_api;
pub mod error;
pub mod esv;
pub mod net;
pub mod transport;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

pub use error::FetchError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

use crate::passage::{ChapterSpan, Passage, VerseRef};

/// An English translation shown beside the Greek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Translation {
    Esv,
    Net,
    Kjv,
}

impl Translation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Translation::Esv => "ESV",
            Translation::Net => "NET",
            Translation::Kjv => "KJV",
        }
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One verse of translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationVerse {
    pub reference: VerseRef,
    pub translation: Translation,
    pub text: String,
    /// Section heading preceding this verse (ESV only)
    pub heading: Option<String>,
}

/// A source of translated verses.
pub trait TranslationSource: Send + Sync {
    fn translation(&self) -> Translation;

    /// Fetch every verse of the passage, in order.
    fn fetch(&self, passage: &Passage) -> Result<Vec<TranslationVerse>, FetchError>;
}

/// One retry after a fixed delay, for transport failures only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn run<T>(&self, mut attempt: impl FnMut() -> Result<T, FetchError>) -> Result<T, FetchError> {
        match attempt() {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, delay = ?self.delay, "Retrying after transport error");
                std::thread::sleep(self.delay);
                attempt()
            }
            other => other,
        }
    }
}

/// A verse as parsed from an API response, before filtering to its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedVerse {
    pub verse: u32,
    pub text: String,
    pub heading: Option<String>,
}

/// Fetch each chapter span of a passage and collect the covered verses.
///
/// `fetch_span` receives the span and its query string (e.g. "John 1:1-18").
/// A span that yields no verses inside its range is a `NotFound` error.
pub(crate) fn fetch_spans(
    passage: &Passage,
    translation: Translation,
    pacing: Duration,
    mut fetch_span: impl FnMut(&ChapterSpan, &str) -> Result<Vec<ParsedVerse>, FetchError>,
) -> Result<Vec<TranslationVerse>, FetchError> {
    let mut verses = Vec::new();
    for (i, span) in passage.spans.iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            std::thread::sleep(pacing);
        }
        let query = passage.span_query(span);
        let before = verses.len();
        for parsed in fetch_span(span, &query)? {
            if parsed.verse < span.first_verse || parsed.verse > span.last_verse {
                continue;
            }
            verses.push(TranslationVerse {
                reference: VerseRef::new(span.chapter, parsed.verse),
                translation,
                text: parsed.text,
                heading: parsed.heading,
            });
        }
        if verses.len() == before {
            return Err(FetchError::not_found(translation, query));
        }
        tracing::debug!(%translation, query = %query, verses = verses.len() - before, "Fetched span");
    }
    Ok(verses)
}

/// Send a request through the retry policy and require a 2xx UTF-8 response.
pub(crate) fn get_checked(
    transport: &dyn HttpTransport,
    retry: &RetryPolicy,
    translation: Translation,
    request: &HttpRequest,
    query: &str,
) -> Result<String, FetchError> {
    let response = retry.run(|| {
        let response = transport
            .get(request)
            .map_err(|e| FetchError::transport(translation, e.to_string()))?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(FetchError::from_status(translation, response.status, query))
        }
    })?;
    String::from_utf8(response.body).map_err(|e| FetchError::decode(translation, e.to_string()))
}

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse whitespace runs to single spaces and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Verse/chapter numbers arrive as JSON numbers from some APIs and as
/// strings from others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberField {
    Number(u32),
    Text(String),
}

impl NumberField {
    pub(crate) fn value(&self) -> Option<u32> {
        match self {
            NumberField::Number(n) => Some(*n),
            NumberField::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::transport::tests::ScriptedTransport;
    use super::*;
    use crate::books::Book;
    use crate::passage::PassageKind;

    fn parsed(verse: u32, text: &str) -> ParsedVerse {
        ParsedVerse {
            verse,
            text: text.to_string(),
            heading: None,
        }
    }

    fn two_chapter_passage() -> Passage {
        Passage {
            book: Book::find("John").unwrap(),
            kind: PassageKind::Range,
            start: VerseRef::new(1, 50),
            end: VerseRef::new(2, 1),
            spans: vec![
                ChapterSpan {
                    chapter: 1,
                    first_verse: 50,
                    last_verse: 51,
                    whole_chapter: false,
                },
                ChapterSpan {
                    chapter: 2,
                    first_verse: 1,
                    last_verse: 1,
                    whole_chapter: false,
                },
            ],
        }
    }

    #[test]
    fn test_fetch_spans_filters_and_orders() {
        let passage = two_chapter_passage();
        let mut queries = Vec::new();
        let verses = fetch_spans(&passage, Translation::Net, Duration::ZERO, |span, query| {
            queries.push(query.to_string());
            Ok(if span.chapter == 1 {
                vec![parsed(49, "x"), parsed(50, "a"), parsed(51, "b")]
            } else {
                vec![parsed(1, "c"), parsed(2, "y")]
            })
        })
        .unwrap();

        assert_eq!(queries, ["John 1:50-51", "John 2:1"]);
        let refs: Vec<String> = verses.iter().map(|v| v.reference.to_string()).collect();
        assert_eq!(refs, ["1:50", "1:51", "2:1"]);
        assert!(verses.iter().all(|v| v.translation == Translation::Net));
    }

    #[test]
    fn test_fetch_spans_fails_whole_fetch() {
        let passage = two_chapter_passage();
        let err = fetch_spans(&passage, Translation::Kjv, Duration::ZERO, |span, _| {
            Ok(if span.chapter == 1 {
                vec![parsed(50, "a")]
            } else {
                vec![]
            })
        })
        .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[test]
    fn test_get_checked_retries_transport_failure() {
        let transport = ScriptedTransport::new([
            Err(TransportError::new("connection reset")),
            Ok(HttpResponse::ok("λόγος")),
        ]);
        let retry = RetryPolicy {
            delay: Duration::ZERO,
        };
        let request = HttpRequest::get("https://example.org");

        let body = get_checked(&transport, &retry, Translation::Net, &request, "John 1:1").unwrap();
        assert_eq!(body, "λόγος");
        assert_eq!(transport.requests().len(), 2);
    }

    #[test]
    fn test_get_checked_rejects_invalid_utf8() {
        let transport = ScriptedTransport::new([Ok(HttpResponse::ok(vec![0xff, 0xfe]))]);
        let request = HttpRequest::get("https://example.org");

        let err = get_checked(
            &transport,
            &RetryPolicy::default(),
            Translation::Kjv,
            &request,
            "John 1:1",
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_retry_only_transport_errors() {
        let retry = RetryPolicy {
            delay: Duration::ZERO,
        };

        let calls = Cell::new(0);
        let result: Result<(), _> = retry.run(|| {
            calls.set(calls.get() + 1);
            Err(FetchError::transport(Translation::Esv, "reset"))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);

        calls.set(0);
        let result = retry.run(|| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(FetchError::transport(Translation::Esv, "reset"))
            } else {
                Ok("ok")
            }
        });
        assert_eq!(result, Ok("ok"));

        calls.set(0);
        let result: Result<(), _> = retry.run(|| {
            calls.set(calls.get() + 1);
            Err(FetchError::RateLimited {
                translation: Translation::Esv,
            })
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  In the\n  beginning\twas "), "In the beginning was");
    }

    #[test]
    fn test_number_field() {
        let n: NumberField = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(n.value(), Some(12));
        let n: NumberField = serde_json::from_str("7").unwrap();
        assert_eq!(n.value(), Some(7));
        let n: NumberField = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(n.value(), None);
    }
}
