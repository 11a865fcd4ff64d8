/*
 * translation/net.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * NET Bible API fetcher.
 */

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use super::{
    FetchError, HttpRequest, HttpTransport, NumberField, ParsedVerse, RetryPolicy, Translation,
    TranslationSource, TranslationVerse, collapse_whitespace, fetch_spans, get_checked,
};
use crate::passage::Passage;

pub const NET_API_URL: &str = "https://labs.bible.org/api/";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

#[derive(Debug, Deserialize)]
struct NetVerse {
    verse: NumberField,
    #[serde(default)]
    text: String,
}

/// NET Bible text from `labs.bible.org`.
pub struct NetSource {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl NetSource {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl TranslationSource for NetSource {
    fn translation(&self) -> Translation {
        Translation::Net
    }

    fn fetch(&self, passage: &Passage) -> Result<Vec<TranslationVerse>, FetchError> {
        fetch_spans(passage, Translation::Net, std::time::Duration::ZERO, |_, query| {
            let request = HttpRequest::get(NET_API_URL)
                .query("passage", query)
                .query("type", "json");
            let body = get_checked(
                self.transport.as_ref(),
                &self.retry,
                Translation::Net,
                &request,
                query,
            )?;
            parse_response(&body)
        })
    }
}

fn parse_response(body: &str) -> Result<Vec<ParsedVerse>, FetchError> {
    let items: Vec<NetVerse> = serde_json::from_str(body)
        .map_err(|e| FetchError::decode(Translation::Net, e.to_string()))?;
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let verse = item.verse.value().filter(|v| *v > 0)?;
            let text = collapse_whitespace(&HTML_TAG.replace_all(&item.text, ""));
            (!text.is_empty()).then_some(ParsedVerse {
                verse,
                text,
                heading: None,
            })
        })
        .collect())
}
