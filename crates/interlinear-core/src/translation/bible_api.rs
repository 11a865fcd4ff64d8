/*
 * translation/bible_api.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * bible-api.com fetcher (KJV).
 */

//! `bible-api.com` fetcher.
//!
//! The service is rate limited per client, so consecutive chapter requests
//! are spaced by a short pause.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::{
    FetchError, HttpRequest, HttpTransport, NumberField, ParsedVerse, RetryPolicy, Translation,
    TranslationSource, TranslationVerse, collapse_whitespace, fetch_spans, get_checked,
};
use crate::passage::Passage;

pub const BIBLE_API_URL: &str = "https://bible-api.com/";

/// Pause between consecutive chapter requests.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct BibleApiResponse {
    #[serde(default)]
    verses: Vec<BibleApiVerse>,
}

#[derive(Debug, Deserialize)]
struct BibleApiVerse {
    verse: NumberField,
    #[serde(default)]
    text: String,
}

pub struct BibleApiSource {
    transport: Arc<dyn HttpTransport>,
    translation: Translation,
    /// Value of the `translation` query parameter
    code: &'static str,
    retry: RetryPolicy,
    pacing: Duration,
}

impl BibleApiSource {
    /// The King James Version.
    pub fn kjv(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            translation: Translation::Kjv,
            code: "kjv",
            retry: RetryPolicy::default(),
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

impl TranslationSource for BibleApiSource {
    fn translation(&self) -> Translation {
        self.translation
    }

    fn fetch(&self, passage: &Passage) -> Result<Vec<TranslationVerse>, FetchError> {
        fetch_spans(passage, self.translation, self.pacing, |_, query| {
            let url = format!("{}{}", BIBLE_API_URL, query.replace(' ', "+"));
            let request = HttpRequest::get(url).query("translation", self.code);
            let body = get_checked(
                self.transport.as_ref(),
                &self.retry,
                self.translation,
                &request,
                query,
            )?;
            let response: BibleApiResponse = serde_json::from_str(&body)
                .map_err(|e| FetchError::decode(self.translation, e.to_string()))?;
            Ok(response
                .verses
                .into_iter()
                .filter_map(|item| {
                    let verse = item.verse.value().filter(|v| *v > 0)?;
                    let text = collapse_whitespace(&item.text);
                    (!text.is_empty()).then_some(ParsedVerse {
                        verse,
                        text,
                        heading: None,
                    })
                })
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::Book;
    use crate::passage::{ChapterSpan, PassageKind, VerseRef};
    use crate::translation::transport::tests::ScriptedTransport;
    use crate::translation::{HttpResponse, TransportError};

    fn first_john_2() -> Passage {
        Passage {
            book: Book::find("1 John").unwrap(),
            kind: PassageKind::Range,
            start: VerseRef::new(2, 1),
            end: VerseRef::new(2, 2),
            spans: vec![ChapterSpan {
                chapter: 2,
                first_verse: 1,
                last_verse: 2,
                whole_chapter: false,
            }],
        }
    }

    fn source(transport: Arc<ScriptedTransport>) -> BibleApiSource {
        BibleApiSource::kjv(transport)
            .with_pacing(Duration::ZERO)
            .with_retry(RetryPolicy {
                delay: Duration::ZERO,
            })
    }

    #[test]
    fn test_fetch_builds_url_and_parses_verses() {
        let body = r#"{
            "reference": "1 John 2:1-2",
            "verses": [
                {"book_name": "1 John", "chapter": 2, "verse": 1, "text": "My little children,\nthese things write I unto you"},
                {"book_name": "1 John", "chapter": 2, "verse": 2, "text": "And he is the propitiation for our sins\n"}
            ]
        }"#;
        let transport = Arc::new(ScriptedTransport::new([Ok(HttpResponse::ok(body))]));
        let verses = source(transport.clone()).fetch(&first_john_2()).unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://bible-api.com/1+John+2:1-2");
        assert_eq!(request.query_value("translation"), Some("kjv"));

        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0].text, "My little children, these things write I unto you");
        assert_eq!(verses[1].translation, Translation::Kjv);
    }

    #[test]
    fn test_not_found_status() {
        let transport = Arc::new(ScriptedTransport::new([Ok(HttpResponse {
            status: 404,
            body: br#"{"error": "not found"}"#.to_vec(),
        })]));
        assert!(matches!(
            source(transport).fetch(&first_john_2()),
            Err(FetchError::NotFound { .. })
        ));
    }

    #[test]
    fn test_connection_failure_after_retry() {
        let transport = Arc::new(ScriptedTransport::new([
            Err(TransportError::new("connection refused")),
            Err(TransportError::new("connection refused")),
        ]));
        let err = source(transport.clone()).fetch(&first_john_2()).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(transport.requests().len(), 2);
    }
}
