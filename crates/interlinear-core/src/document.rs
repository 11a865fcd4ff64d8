/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Layout-independent document model and its assembler.
 */

//! Document assembly.
//!
//! The assembler turns aligned Greek verses and fetched translations into a
//! flat, ordered list of [`Block`]s. The LaTeX writer consumes the list
//! once; nothing here knows about markup.
//!
//! Block order per chapter:
//!
//! ```text
//! TocEntry, RunningHeader, ChapterStart
//!   per verse: [SectionHeading], VerseHeader, InterlinearRow,
//!              one TranslationRow or TranslationGap per layout translation
//! ```
//!
//! followed by an appendix header and one entry per distinct Strong's number.

use std::collections::{BTreeSet, HashMap};

use crate::align::AlignedVerse;
use crate::dictionary::DictionaryIndex;
use crate::layout::Layout;
use crate::passage::{Passage, VerseRef};
use crate::strongs::StrongsNumber;
use crate::translation::{FetchError, Translation, TranslationVerse};

/// Result of fetching one translation.
pub type FetchOutcome = Result<Vec<TranslationVerse>, FetchError>;

/// One Greek word with its gloss, as printed in an interlinear row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterlinearWord {
    pub surface: String,
    pub gloss: String,
    pub strongs: Option<StrongsNumber>,
    pub morph: String,
}

/// One lexicon entry in the appendix.
///
/// Numbers without a dictionary entry keep empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendixEntry {
    pub strongs: StrongsNumber,
    pub lemma: String,
    pub translit: String,
    pub gloss: String,
    pub definition: String,
    pub kjv_usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    RunningHeader {
        text: String,
    },
    TocEntry {
        title: String,
        anchor: String,
    },
    ChapterStart {
        chapter: u32,
        title: String,
        anchor: String,
    },
    SectionHeading {
        text: String,
    },
    VerseHeader {
        reference: VerseRef,
        anchor: String,
    },
    InterlinearRow {
        reference: VerseRef,
        words: Vec<InterlinearWord>,
    },
    TranslationRow {
        reference: VerseRef,
        translation: Translation,
        text: String,
    },
    /// Stands in for a translation row that could not be produced
    TranslationGap {
        reference: VerseRef,
        translation: Translation,
        reason: String,
    },
    AppendixHeader {
        title: String,
    },
    AppendixEntry(AppendixEntry),
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    pub chapters: usize,
    pub verses: usize,
    pub words: usize,
    pub translation_rows: usize,
    pub translation_gaps: usize,
    pub appendix_entries: usize,
}

/// An assembled document, ready for the writer.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub layout: Layout,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        let mut summary = DocumentSummary::default();
        for block in &self.blocks {
            match block {
                Block::ChapterStart { .. } => summary.chapters += 1,
                Block::VerseHeader { .. } => summary.verses += 1,
                Block::InterlinearRow { words, .. } => summary.words += words.len(),
                Block::TranslationRow { .. } => summary.translation_rows += 1,
                Block::TranslationGap { .. } => summary.translation_gaps += 1,
                Block::AppendixEntry(_) => summary.appendix_entries += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Anchor for a chapter start.
pub fn chapter_anchor(chapter: u32) -> String {
    format!("ch:{}", chapter)
}

/// Anchor for a verse header.
pub fn verse_anchor(reference: VerseRef) -> String {
    format!("v:{}:{}", reference.chapter, reference.verse)
}

/// What one translation column holds for the passage.
enum Column<'a> {
    Verses(HashMap<VerseRef, &'a TranslationVerse>),
    Failed(String),
}

/// Build the document for one passage.
///
/// `fetched` holds one outcome per translation; translations the layout
/// needs but `fetched` lacks are treated as failed.
pub fn assemble(
    passage: &Passage,
    layout: Layout,
    aligned: &[AlignedVerse<'_>],
    fetched: &[(Translation, FetchOutcome)],
    dictionary: &DictionaryIndex,
) -> Document {
    let columns: Vec<(Translation, Column<'_>)> = layout
        .translations()
        .iter()
        .map(|&translation| {
            let column = match fetched.iter().find(|(t, _)| *t == translation) {
                Some((_, Ok(verses))) => {
                    Column::Verses(verses.iter().map(|v| (v.reference, v)).collect())
                }
                Some((_, Err(e))) => Column::Failed(e.to_string()),
                None => Column::Failed(format!("{} was not fetched", translation)),
            };
            (translation, column)
        })
        .collect();

    let mut blocks = Vec::new();
    let mut current_chapter = None;
    let mut numbers = BTreeSet::new();

    for verse in aligned {
        let reference = verse.verse.reference();

        if current_chapter != Some(reference.chapter) {
            current_chapter = Some(reference.chapter);
            let title = format!("{} {}", passage.book.name, reference.chapter);
            blocks.push(Block::TocEntry {
                title: title.clone(),
                anchor: chapter_anchor(reference.chapter),
            });
            blocks.push(Block::RunningHeader {
                text: title.clone(),
            });
            blocks.push(Block::ChapterStart {
                chapter: reference.chapter,
                title,
                anchor: chapter_anchor(reference.chapter),
            });
        }

        let heading = columns.iter().find_map(|(_, column)| match column {
            Column::Verses(map) => map.get(&reference).and_then(|v| v.heading.clone()),
            Column::Failed(_) => None,
        });
        if let Some(text) = heading {
            blocks.push(Block::SectionHeading { text });
        }

        blocks.push(Block::VerseHeader {
            reference,
            anchor: verse_anchor(reference),
        });

        let words = verse
            .words
            .iter()
            .map(|aligned| {
                if let Some(n) = aligned.word.strongs {
                    numbers.insert(n);
                }
                InterlinearWord {
                    surface: aligned.word.surface.clone(),
                    gloss: aligned.gloss.clone(),
                    strongs: aligned.word.strongs,
                    morph: aligned.word.morph.clone(),
                }
            })
            .collect();
        blocks.push(Block::InterlinearRow { reference, words });

        for (translation, column) in &columns {
            let translation = *translation;
            blocks.push(match column {
                Column::Verses(map) => match map.get(&reference) {
                    Some(v) => Block::TranslationRow {
                        reference,
                        translation,
                        text: v.text.clone(),
                    },
                    None => Block::TranslationGap {
                        reference,
                        translation,
                        reason: format!("{} did not return {}", translation, reference),
                    },
                },
                Column::Failed(reason) => Block::TranslationGap {
                    reference,
                    translation,
                    reason: reason.clone(),
                },
            });
        }
    }

    if !numbers.is_empty() {
        blocks.push(Block::AppendixHeader {
            title: "Strong's Greek Dictionary".to_string(),
        });
        blocks.extend(numbers.into_iter().map(|strongs| {
            Block::AppendixEntry(match dictionary.lookup(strongs).entry() {
                Some(entry) => AppendixEntry {
                    strongs,
                    lemma: entry.lemma.clone(),
                    translit: entry.translit.clone(),
                    gloss: entry.default_sense().unwrap_or_default().to_string(),
                    definition: entry.definition.clone(),
                    kjv_usage: entry.kjv_usage.clone(),
                },
                None => AppendixEntry {
                    strongs,
                    ..Default::default()
                },
            })
        }));
    }

    Document {
        title: passage.title(),
        layout,
        blocks,
    }
}
