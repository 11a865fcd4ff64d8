/*
 * passage.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Passage references: parsing and resolved ranges.
 */

//! Passage references.
//!
//! A reference string is first parsed into a [`PassageRequest`] (syntax
//! only), then resolved against the corpus into a [`Passage`] with concrete
//! start/end verses and one [`ChapterSpan`] per chapter covered.
//!
//! Supported forms:
//! - Whole book: `"Ephesians"`, `"1 John"`
//! - Single chapter: `"Romans 8"`
//! - Single verse: `"John 1:1"`
//! - Verse range: `"John 1:1-18"`
//! - Cross-chapter range: `"John 1:1-2:11"`

use std::sync::LazyLock;

use regex::Regex;

use crate::books::Book;
use crate::error::{InterlinearError, Result};

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+(\d+)(?::(\d+)(?:\s*-\s*(?:(\d+):)?(\d+))?)?$")
        .expect("reference pattern is valid")
});

/// A chapter:verse position within a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }
}

impl std::fmt::Display for VerseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// What the user asked for, before checking it against the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Book,
    Chapter(u32),
    Range { start: VerseRef, end: VerseRef },
}

/// A syntactically valid passage reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageRequest {
    /// The reference as typed
    pub reference: String,
    pub book: &'static Book,
    pub kind: RequestKind,
}

impl PassageRequest {
    /// Parse a reference string.
    ///
    /// Fails with `PassageNotFound` for unknown books and malformed
    /// references; chapter/verse existence is checked later, at resolution.
    pub fn parse(reference: &str) -> Result<Self> {
        let trimmed = reference.trim();
        let not_found = |reason: String| InterlinearError::passage_not_found(trimmed, reason);

        if let Some(caps) = REFERENCE_PATTERN.captures(trimmed) {
            let book_name = &caps[1];
            let book = Book::find(book_name)
                .ok_or_else(|| not_found(format!("unknown book '{}'", book_name)))?;
            let number = |i: usize| -> Result<Option<u32>> {
                caps.get(i)
                    .map(|m| {
                        m.as_str()
                            .parse::<u32>()
                            .map_err(|_| not_found(format!("number out of range: {}", m.as_str())))
                    })
                    .transpose()
            };

            let chapter = number(2)?.unwrap_or_default();
            let kind = match number(3)? {
                None => RequestKind::Chapter(chapter),
                Some(verse) => {
                    let start = VerseRef::new(chapter, verse);
                    let end_verse = number(5)?.unwrap_or(verse);
                    let end_chapter = number(4)?.unwrap_or(chapter);
                    let end = VerseRef::new(end_chapter, end_verse);
                    if end < start {
                        return Err(not_found(format!("range ends before it starts ({} > {})", start, end)));
                    }
                    RequestKind::Range { start, end }
                }
            };

            return Ok(Self {
                reference: trimmed.to_string(),
                book,
                kind,
            });
        }

        match Book::find(trimmed) {
            Some(book) => Ok(Self {
                reference: trimmed.to_string(),
                book,
                kind: RequestKind::Book,
            }),
            None => Err(not_found("not a recognized reference".to_string())),
        }
    }
}

/// Whether a passage names a book, a chapter, or a verse range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassageKind {
    Book,
    Chapter,
    Range,
}

/// The verses of one chapter covered by a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterSpan {
    pub chapter: u32,
    pub first_verse: u32,
    pub last_verse: u32,
    /// True when the span covers every verse of the chapter
    pub whole_chapter: bool,
}

/// A passage resolved against the corpus: the unit of work for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub book: &'static Book,
    pub kind: PassageKind,
    pub start: VerseRef,
    pub end: VerseRef,
    pub spans: Vec<ChapterSpan>,
}

impl Passage {
    /// Whether a verse of this passage's book falls inside the range.
    pub fn contains(&self, verse: VerseRef) -> bool {
        self.start <= verse && verse <= self.end
    }

    /// Canonical display form, e.g. "John 1:1-18" or "Ephesians".
    pub fn title(&self) -> String {
        match self.kind {
            PassageKind::Book => self.book.name.to_string(),
            PassageKind::Chapter => format!("{} {}", self.book.name, self.start.chapter),
            PassageKind::Range if self.start == self.end => {
                format!("{} {}", self.book.name, self.start)
            }
            PassageKind::Range if self.start.chapter == self.end.chapter => format!(
                "{} {}-{}",
                self.book.name, self.start, self.end.verse
            ),
            PassageKind::Range => format!("{} {}-{}", self.book.name, self.start, self.end),
        }
    }

    /// Query string for fetching one chapter span from a translation API.
    pub fn span_query(&self, span: &ChapterSpan) -> String {
        if span.whole_chapter {
            format!("{} {}", self.book.name, span.chapter)
        } else if span.first_verse == span.last_verse {
            format!("{} {}:{}", self.book.name, span.chapter, span.first_verse)
        } else {
            format!(
                "{} {}:{}-{}",
                self.book.name, span.chapter, span.first_verse, span.last_verse
            )
        }
    }

    /// File stem derived from the canonical title.
    ///
    /// Spaces and colons become underscores; anything else that is not a
    /// word character or hyphen is dropped.
    pub fn file_stem(&self) -> String {
        self.title()
            .replace([' ', ':'], "_")
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect()
    }
}
