/*
 * translation/esv.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * ESV API fetcher.
 */

//! ESV text from `api.esv.org`.
//!
//! The passage text endpoint returns plain text with `[n]` verse markers.
//! Section headings appear on their own line after a blank line; they are
//! attached to the verse that follows them.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use super::{
    FetchError, HttpRequest, HttpTransport, ParsedVerse, RetryPolicy, Translation,
    TranslationSource, TranslationVerse, collapse_whitespace, fetch_spans, get_checked,
};
use crate::passage::Passage;

pub const ESV_API_URL: &str = "https://api.esv.org/v3/passage/text/";

/// The key shipped in sample configuration files; treated as no key.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

const MAX_HEADING_LEN: usize = 80;

static VERSE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("verse marker pattern is valid"));

/// Fixed request options: verse numbers and headings on, everything else off.
const TEXT_OPTIONS: &[(&str, &str)] = &[
    ("include-verse-numbers", "true"),
    ("include-first-verse-numbers", "true"),
    ("include-footnotes", "false"),
    ("include-footnote-body", "false"),
    ("include-headings", "true"),
    ("include-short-copyright", "false"),
    ("include-passage-references", "false"),
    ("include-selahs", "true"),
    ("indent-paragraphs", "0"),
    ("indent-poetry", "false"),
    ("indent-declares", "0"),
    ("indent-psalm-doxology", "0"),
    ("line-length", "0"),
];

#[derive(Debug, Deserialize)]
struct EsvResponse {
    #[serde(default)]
    passages: Vec<String>,
}

pub struct EsvSource {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl EsvSource {
    /// A blank or placeholder key is treated as no key.
    pub fn new(transport: Arc<dyn HttpTransport>, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY);
        Self {
            transport,
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl TranslationSource for EsvSource {
    fn translation(&self) -> Translation {
        Translation::Esv
    }

    fn fetch(&self, passage: &Passage) -> Result<Vec<TranslationVerse>, FetchError> {
        let Some(api_key) = &self.api_key else {
            return Err(FetchError::Auth {
                translation: Translation::Esv,
                reason: "no ESV API key configured".to_string(),
            });
        };

        fetch_spans(passage, Translation::Esv, std::time::Duration::ZERO, |_, query| {
            let mut request = HttpRequest::get(ESV_API_URL)
                .query("q", query)
                .header("Authorization", format!("Token {}", api_key));
            for (key, value) in TEXT_OPTIONS {
                request = request.query(key, *value);
            }

            let body = get_checked(
                self.transport.as_ref(),
                &self.retry,
                Translation::Esv,
                &request,
                query,
            )?;
            let response: EsvResponse = serde_json::from_str(&body)
                .map_err(|e| FetchError::decode(Translation::Esv, e.to_string()))?;
            let text = response
                .passages
                .first()
                .ok_or_else(|| FetchError::not_found(Translation::Esv, query))?;
            Ok(parse_passage_text(text))
        })
    }
}

/// Short line without sentence punctuation at the end.
fn is_heading(line: &str) -> bool {
    !line.is_empty()
        && line.chars().count() <= MAX_HEADING_LEN
        && !line.ends_with(['.', ',', ':', ';', '!', '?', '"', '\'', '\u{201d}', '\u{2019}'])
}

/// Split ESV passage text into verses, attaching headings.
pub(crate) fn parse_passage_text(text: &str) -> Vec<ParsedVerse> {
    let text = text.trim();
    let markers: Vec<_> = VERSE_MARKER.captures_iter(text).collect();
    let Some(first) = markers.first() else {
        return Vec::new();
    };

    let lead = &text[..first.get(0).map_or(0, |m| m.start())];
    let mut pending_heading = lead
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .filter(|l| is_heading(l))
        .map(str::to_string);

    let mut verses = Vec::new();
    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let segment = &text[whole.end()..end];

        let mut lines = Vec::new();
        let mut trailing_heading = None;
        let mut after_blank = false;
        for line in segment.lines().map(str::trim) {
            if line.is_empty() {
                after_blank = true;
            } else if after_blank && is_heading(line) {
                trailing_heading = Some(line.to_string());
            } else {
                lines.push(line);
                after_blank = false;
            }
        }

        let body = collapse_whitespace(&lines.join(" "));
        if let Ok(verse) = number.as_str().parse()
            && !body.is_empty()
        {
            verses.push(ParsedVerse {
                verse,
                text: body,
                heading: pending_heading.take(),
            });
        }
        pending_heading = trailing_heading;
    }
    verses
}
