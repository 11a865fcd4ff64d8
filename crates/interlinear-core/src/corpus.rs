/*
 * corpus.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Greek corpus loading and passage resolution.
 */

//! Greek corpus loading.
//!
//! The corpus is the OpenGNT "keyed features" export: a tab separated file
//! whose cells are wrapped in `〔…〕` and whose multi-valued cells are split
//! with a full-width bar `｜`. Only a handful of columns are needed:
//!
//! | Header                                   | Example cell                        |
//! |------------------------------------------|-------------------------------------|
//! | `〔book｜chapter｜verse〕`               | `〔43｜1｜1〕`                      |
//! | `〔TANTT〕`                               | `〔BIMNRSTWH=Ἐν=G1722=PREP;〕`      |
//! | `〔MounceGloss｜TyndaleHouseGloss｜OpenGNTGloss〕` | `〔in｜In｜In〕`           |
//! | any header with a `lexeme` field (optional) | `〔Ἐν｜εν｜Ἐν｜ἐν｜PREP｜G1722〕` |
//!
//! Columns are located by header name. The whole file is read once into an
//! immutable [`Corpus`], which is then passed by reference through the
//! pipeline.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

use crate::books::Book;
use crate::error::{InterlinearError, Result};
use crate::passage::{ChapterSpan, Passage, PassageKind, PassageRequest, RequestKind, VerseRef};
use crate::strongs::StrongsNumber;

/// File name of the corpus inside the data directory.
pub const CORPUS_FILENAME: &str = "OpenGNT_keyedFeatures.csv";

const REF_COLUMN: &str = "〔book｜chapter｜verse〕";
const TANTT_COLUMN: &str = "〔TANTT〕";
const GLOSS_COLUMN: &str = "〔MounceGloss｜TyndaleHouseGloss｜OpenGNTGloss〕";
const LEXEME_FIELD: &str = "lexeme";

/// A single Greek word of a verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Surface form as printed, e.g. "Λόγος"
    pub surface: String,
    /// Dictionary form used for context matching, e.g. "λόγος"
    pub lemma: String,
    pub strongs: Option<StrongsNumber>,
    /// Robinson morphological code, e.g. "N-NSM"
    pub morph: String,
    /// 0-based position within the verse
    pub position: usize,
    /// Per-occurrence gloss supplied by the corpus (may be empty)
    pub corpus_gloss: String,
}

/// A verse of the Greek text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub book: &'static Book,
    pub chapter: u32,
    pub verse: u32,
    pub words: Vec<Word>,
}

impl Verse {
    pub fn reference(&self) -> VerseRef {
        VerseRef::new(self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct VerseKey {
    book: u8,
    chapter: u32,
    verse: u32,
}

/// The loaded Greek New Testament.
#[derive(Debug, Default)]
pub struct Corpus {
    verses: BTreeMap<VerseKey, Verse>,
}

struct Columns {
    reference: usize,
    tantt: usize,
    gloss: usize,
    /// Column index and field index of the lexeme
    lexeme: Option<(usize, usize)>,
}

impl Columns {
    fn locate(header: &str) -> std::result::Result<Self, String> {
        let names: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| format!("missing column {}", name))
        };
        let lexeme = names.iter().enumerate().find_map(|(col, name)| {
            unwrap_cell(name)
                .split('｜')
                .position(|field| field.eq_ignore_ascii_case(LEXEME_FIELD))
                .map(|field| (col, field))
        });
        Ok(Self {
            reference: find(REF_COLUMN)?,
            tantt: find(TANTT_COLUMN)?,
            gloss: find(GLOSS_COLUMN)?,
            lexeme,
        })
    }
}

impl Corpus {
    /// Load the corpus from `data_dir/OpenGNT_keyedFeatures.csv`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CORPUS_FILENAME);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            InterlinearError::corpus(&path, format!("cannot read corpus ({})", e))
        })?;
        let corpus = Self::parse(&content).map_err(|msg| InterlinearError::corpus(&path, msg))?;
        tracing::debug!(path = %path.display(), verses = corpus.len(), "Loaded Greek corpus");
        Ok(corpus)
    }

    /// Parse corpus text (header row followed by one row per word).
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut lines = content.lines();
        let header = lines.next().ok_or("corpus file is empty")?;
        let columns = Columns::locate(header)?;

        let mut verses: BTreeMap<VerseKey, Verse> = BTreeMap::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split('\t').collect();
            let cell = |i: usize| cells.get(i).copied().unwrap_or_default();

            let Some((book, chapter, verse)) = parse_reference_cell(cell(columns.reference))
            else {
                return Err(format!(
                    "line {}: malformed reference {:?}",
                    line_no + 2,
                    cell(columns.reference)
                ));
            };
            let Some(book) = Book::by_number(book) else {
                continue;
            };

            // `editions=surface=strongs=morph;` repeated once per textual
            // variant; the first variant is the reading we print.
            let tantt = unwrap_cell(cell(columns.tantt));
            let variant = tantt.split(';').next().unwrap_or_default();
            let fields: Vec<&str> = variant.split('=').map(str::trim).collect();
            let surface = fields.get(1).copied().unwrap_or_default();
            if surface.is_empty() {
                continue;
            }
            let morph = fields.get(3).map(|m| m.to_string()).unwrap_or_default();
            let lemma = columns
                .lexeme
                .and_then(|(col, field)| {
                    unwrap_cell(cell(col))
                        .split('｜')
                        .nth(field)
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| normalize_lemma(surface));

            let key = VerseKey {
                book: book.number,
                chapter,
                verse,
            };
            let entry = verses.entry(key).or_insert_with(|| Verse {
                book,
                chapter,
                verse,
                words: Vec::new(),
            });
            entry.words.push(Word {
                surface: surface.to_string(),
                lemma,
                strongs: StrongsNumber::find_in(variant),
                morph,
                position: entry.words.len(),
                corpus_gloss: extract_gloss(cell(columns.gloss)),
            });
        }

        Ok(Self { verses })
    }

    /// All verses in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Verse> {
        self.verses.values()
    }

    /// Number of verses loaded.
    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Resolve a parsed request against the verses actually present.
    ///
    /// Fails with `PassageNotFound` when the chapter is outside the book or
    /// a range endpoint names a verse the corpus does not contain.
    pub fn resolve(&self, request: &PassageRequest) -> Result<Passage> {
        let book = request.book;
        let not_found =
            |reason: String| InterlinearError::passage_not_found(&request.reference, reason);

        let (kind, start, end) = match request.kind {
            RequestKind::Book => {
                let first = self.first_in(book, None);
                let last = self.last_in(book, None);
                match (first, last) {
                    (Some(first), Some(last)) => (PassageKind::Book, first, last),
                    _ => return Err(not_found(format!("{} is not in the corpus", book.name))),
                }
            }
            RequestKind::Chapter(chapter) => {
                if chapter == 0 || chapter > book.chapters {
                    return Err(not_found(format!(
                        "{} has {} chapters",
                        book.name, book.chapters
                    )));
                }
                match (
                    self.first_in(book, Some(chapter)),
                    self.last_in(book, Some(chapter)),
                ) {
                    (Some(first), Some(last)) => (PassageKind::Chapter, first, last),
                    _ => {
                        return Err(not_found(format!(
                            "{} {} is not in the corpus",
                            book.name, chapter
                        )));
                    }
                }
            }
            RequestKind::Range { start, end } => {
                for endpoint in [start, end] {
                    if endpoint.chapter == 0 || endpoint.chapter > book.chapters {
                        return Err(not_found(format!(
                            "{} has {} chapters",
                            book.name, book.chapters
                        )));
                    }
                    if self.get(book, endpoint).is_none() {
                        return Err(not_found(format!(
                            "{} {} is not in the corpus",
                            book.name, endpoint
                        )));
                    }
                }
                (PassageKind::Range, start, end)
            }
        };

        let mut spans: Vec<ChapterSpan> = Vec::new();
        for verse in self.range(book, start, end) {
            match spans.last_mut() {
                Some(span) if span.chapter == verse.chapter => span.last_verse = verse.verse,
                _ => spans.push(ChapterSpan {
                    chapter: verse.chapter,
                    first_verse: verse.verse,
                    last_verse: verse.verse,
                    whole_chapter: false,
                }),
            }
        }
        for span in &mut spans {
            span.whole_chapter = self.first_in(book, Some(span.chapter))
                == Some(VerseRef::new(span.chapter, span.first_verse))
                && self.last_in(book, Some(span.chapter))
                    == Some(VerseRef::new(span.chapter, span.last_verse));
        }

        Ok(Passage {
            book,
            kind,
            start,
            end,
            spans,
        })
    }

    /// Verses of a resolved passage, in canonical order.
    pub fn verses(&self, passage: &Passage) -> Vec<&Verse> {
        self.range(passage.book, passage.start, passage.end).collect()
    }

    /// Look up one verse.
    pub fn get(&self, book: &Book, at: VerseRef) -> Option<&Verse> {
        self.verses.get(&key(book, at))
    }

    fn range(
        &self,
        book: &'static Book,
        start: VerseRef,
        end: VerseRef,
    ) -> impl Iterator<Item = &Verse> {
        self.verses
            .range((
                Bound::Included(key(book, start)),
                Bound::Included(key(book, end)),
            ))
            .map(|(_, v)| v)
    }

    fn first_in(&self, book: &Book, chapter: Option<u32>) -> Option<VerseRef> {
        let (lo, hi) = bounds(book, chapter);
        self.verses.range(lo..=hi).next().map(|(_, v)| v.reference())
    }

    fn last_in(&self, book: &Book, chapter: Option<u32>) -> Option<VerseRef> {
        let (lo, hi) = bounds(book, chapter);
        self.verses
            .range(lo..=hi)
            .next_back()
            .map(|(_, v)| v.reference())
    }
}

fn key(book: &Book, at: VerseRef) -> VerseKey {
    VerseKey {
        book: book.number,
        chapter: at.chapter,
        verse: at.verse,
    }
}

fn bounds(book: &Book, chapter: Option<u32>) -> (VerseKey, VerseKey) {
    let (first_ch, last_ch) = chapter.map_or((0, u32::MAX), |c| (c, c));
    (
        key(book, VerseRef::new(first_ch, 0)),
        key(book, VerseRef::new(last_ch, u32::MAX)),
    )
}

/// Strip the `〔` `〕` wrapping from a cell.
fn unwrap_cell(cell: &str) -> &str {
    cell.trim().trim_start_matches('〔').trim_end_matches('〕')
}

/// Parse `〔43｜1｜1〕` into (book, chapter, verse).
fn parse_reference_cell(cell: &str) -> Option<(u8, u32, u32)> {
    let mut parts = unwrap_cell(cell).split('｜').map(str::trim);
    let book = parts.next()?.parse().ok()?;
    let chapter = parts.next()?.parse().ok()?;
    let verse = parts.next()?.parse().ok()?;
    Some((book, chapter, verse))
}

/// The OpenGNT gloss when present, otherwise the Mounce gloss.
fn extract_gloss(cell: &str) -> String {
    let parts: Vec<&str> = unwrap_cell(cell).split('｜').map(str::trim).collect();
    parts
        .get(2)
        .filter(|g| !g.is_empty())
        .or_else(|| parts.first())
        .map(|g| g.to_string())
        .unwrap_or_default()
}

fn normalize_lemma(surface: &str) -> String {
    surface
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase()
}
