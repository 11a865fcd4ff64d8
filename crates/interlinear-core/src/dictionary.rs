/*
 * dictionary.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Strong's dictionary index.
 */

//! Strong's dictionary index.
//!
//! The index merges two sources:
//! - `strongs-greek.json`, keyed by `G<n>`, for the long-form lexicon text
//!   shown in the appendix
//! - the corpus' per-occurrence glosses, ranked by frequency, which become
//!   the candidate short glosses used by the alignment engine
//!
//! Numbers present in neither source resolve to [`DictionaryLookup::Absent`].
//! Many variant numbers in the corpus are expected to be unmapped, so an
//! absent entry is a normal outcome, not an error.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::corpus::Corpus;
use crate::error::{InterlinearError, Result};
use crate::strongs::StrongsNumber;

/// File name of the dictionary inside the data directory.
pub const DICTIONARY_FILENAME: &str = "strongs-greek.json";

/// Raw record from `strongs-greek.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawEntry {
    lemma: String,
    translit: String,
    strongs_def: String,
    kjv_def: String,
    derivation: String,
}

/// Dictionary data for one Strong's number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossEntry {
    pub strongs: StrongsNumber,
    pub lemma: String,
    pub translit: String,
    /// Candidate short glosses, default sense first
    pub senses: Vec<String>,
    /// Long-form Strong's definition
    pub definition: String,
    /// KJV usage text, e.g. ":--account, cause, X concerning"
    pub kjv_usage: String,
    pub derivation: String,
}

impl GlossEntry {
    /// The default (most frequent) sense.
    pub fn default_sense(&self) -> Option<&str> {
        self.senses.first().map(String::as_str)
    }

    /// The first sense containing `needle` as a whole word.
    pub fn sense_containing(&self, needle: &str) -> Option<&str> {
        self.senses
            .iter()
            .find(|s| s.split_whitespace().any(|w| w.eq_ignore_ascii_case(needle)))
            .map(String::as_str)
    }
}

/// Result of a dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryLookup<'a> {
    Found(&'a GlossEntry),
    /// The number has no entry
    Absent,
}

impl<'a> DictionaryLookup<'a> {
    pub fn entry(self) -> Option<&'a GlossEntry> {
        match self {
            DictionaryLookup::Found(entry) => Some(entry),
            DictionaryLookup::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, DictionaryLookup::Absent)
    }
}

/// Immutable Strong's number → [`GlossEntry`] index.
#[derive(Debug, Default)]
pub struct DictionaryIndex {
    entries: HashMap<StrongsNumber, GlossEntry>,
}

impl DictionaryIndex {
    /// Build the index from `data_dir/strongs-greek.json` and the corpus.
    ///
    /// A missing dictionary file is tolerated: the appendix then carries
    /// corpus glosses only. A present but malformed file is an error.
    pub fn load(data_dir: &Path, corpus: &Corpus) -> Result<Self> {
        let path = data_dir.join(DICTIONARY_FILENAME);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Strong's dictionary not found; appendix entries will have no definitions"
                );
                return Ok(Self::build(HashMap::new(), corpus));
            }
            Err(e) => return Err(e.into()),
        };
        let raw = Self::parse_json(&json).map_err(|message| InterlinearError::Dictionary {
            path: path.clone(),
            message,
        })?;
        let index = Self::build(raw, corpus);
        tracing::debug!(path = %path.display(), entries = index.len(), "Loaded Strong's dictionary");
        Ok(index)
    }

    /// Build the index from dictionary JSON text and the corpus.
    pub fn from_json(json: &str, corpus: &Corpus) -> std::result::Result<Self, String> {
        Ok(Self::build(Self::parse_json(json)?, corpus))
    }

    fn parse_json(json: &str) -> std::result::Result<HashMap<StrongsNumber, RawEntry>, String> {
        let raw: HashMap<String, RawEntry> =
            serde_json::from_str(json).map_err(|e| format!("invalid dictionary JSON: {}", e))?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, entry)| key.parse::<StrongsNumber>().ok().map(|n| (n, entry)))
            .collect())
    }

    fn build(raw: HashMap<StrongsNumber, RawEntry>, corpus: &Corpus) -> Self {
        let frequencies = corpus_gloss_frequencies(corpus);
        let mut entries: HashMap<StrongsNumber, GlossEntry> = HashMap::new();

        for (strongs, raw) in raw {
            entries.insert(
                strongs,
                GlossEntry {
                    strongs,
                    lemma: raw.lemma.trim().to_string(),
                    translit: raw.translit.trim().to_string(),
                    senses: Vec::new(),
                    definition: raw.strongs_def.trim().to_string(),
                    kjv_usage: raw.kjv_def.trim().to_string(),
                    derivation: raw.derivation.trim().to_string(),
                },
            );
        }

        for strongs in frequencies.keys() {
            entries.entry(*strongs).or_insert_with(|| GlossEntry {
                strongs: *strongs,
                ..Default::default()
            });
        }

        for entry in entries.values_mut() {
            let mut senses = frequencies
                .get(&entry.strongs)
                .map(rank_by_frequency)
                .unwrap_or_default();
            for sense in parse_kjv_senses(&entry.kjv_usage) {
                if !senses.iter().any(|s| s.eq_ignore_ascii_case(&sense)) {
                    senses.push(sense);
                }
            }
            entry.senses = senses;
        }

        Self { entries }
    }

    /// Look up a Strong's number.
    pub fn lookup(&self, strongs: StrongsNumber) -> DictionaryLookup<'_> {
        self.entries
            .get(&strongs)
            .map_or(DictionaryLookup::Absent, DictionaryLookup::Found)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Count corpus glosses per Strong's number.
fn corpus_gloss_frequencies(corpus: &Corpus) -> HashMap<StrongsNumber, BTreeMap<String, usize>> {
    let mut counts: HashMap<StrongsNumber, BTreeMap<String, usize>> = HashMap::new();
    for verse in corpus.iter() {
        for word in &verse.words {
            let (Some(strongs), gloss) = (word.strongs, word.corpus_gloss.trim()) else {
                continue;
            };
            if gloss.is_empty() {
                continue;
            }
            *counts
                .entry(strongs)
                .or_default()
                .entry(gloss.to_string())
                .or_default() += 1;
        }
    }
    counts
}

/// Most frequent first; ties alphabetical (the BTreeMap order) for stability.
fn rank_by_frequency(counts: &BTreeMap<String, usize>) -> Vec<String> {
    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1));
    ranked.into_iter().map(|(g, _)| g.clone()).collect()
}

/// Split KJV usage text into senses.
///
/// `":--account, cause, X concerning, (+ at the) end"` yields
/// `["account", "cause", "concerning", "end"]`. `X` and `+` mark words the
/// KJV supplies or merges; parenthesised text is dropped.
fn parse_kjv_senses(kjv: &str) -> Vec<String> {
    let body = kjv.trim().trim_start_matches(":--").trim_end_matches('.');
    let mut unbracketed = String::with_capacity(body.len());
    let mut depth = 0usize;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => unbracketed.push(c),
            _ => {}
        }
    }

    let mut senses = Vec::new();
    for part in unbracketed.split([',', ';']) {
        let cleaned = part
            .split_whitespace()
            .filter(|w| *w != "X" && *w != "+")
            .collect::<Vec<_>>()
            .join(" ");
        if !cleaned.is_empty() && !senses.contains(&cleaned) {
            senses.push(cleaned);
        }
    }
    senses
}
