/*
 * latex.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * LaTeX serialization of assembled documents.
 */

//! LaTeX writer.
//!
//! Serializes a [`Document`] into a complete `.tex` file. The preamble for
//! each layout is embedded at compile time; the writer substitutes `$title$`
//! and `$body$` in it.
//!
//! Columns use the `paracol` package. Column 0 holds the Greek, columns
//! 1.. hold the translations in layout order. Every verse header starts with
//! `\switchcolumn[0]*`, which synchronizes all columns so each verse lines
//! up across the page.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::document::{AppendixEntry, Block, Document, InterlinearWord};
use crate::error::Result;
use crate::layout::Layout;
use crate::translation::Translation;

/// Portrait preamble (Greek | ESV).
pub const PORTRAIT_TEMPLATE: &str = include_str!("../resources/portrait.tex");

/// Landscape preamble (Greek | ESV | NET | KJV).
pub const LANDSCAPE_TEMPLATE: &str = include_str!("../resources/landscape.tex");

fn template(layout: Layout) -> &'static str {
    match layout {
        Layout::EsvPortrait => PORTRAIT_TEMPLATE,
        Layout::MultiLandscape => LANDSCAPE_TEMPLATE,
    }
}

/// Escape LaTeX special characters (`& % $ # _ { } ~ ^ \`).
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Streams blocks into LaTeX, tracking whether a `paracol` environment is open.
struct LatexWriter {
    layout: Layout,
    out: String,
    in_columns: bool,
}

impl LatexWriter {
    fn new(layout: Layout) -> Self {
        Self {
            layout,
            out: String::new(),
            in_columns: false,
        }
    }

    fn open_columns(&mut self) {
        if !self.in_columns {
            let _ = writeln!(self.out, "\\begin{{paracol}}{{{}}}", self.layout.columns());
            self.in_columns = true;
        }
    }

    fn close_columns(&mut self) {
        if self.in_columns {
            self.out.push_str("\\end{paracol}\n");
            self.in_columns = false;
        }
    }

    fn column_of(&self, translation: Translation) -> usize {
        self.layout
            .translations()
            .iter()
            .position(|t| *t == translation)
            .map_or(1, |i| i + 1)
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::TocEntry { title, .. } => {
                self.close_columns();
                let _ = writeln!(
                    self.out,
                    "\n\\clearpage\n\\phantomsection\n\\addcontentsline{{toc}}{{section}}{{{}}}",
                    escape_latex(title)
                );
            }
            Block::RunningHeader { text } => {
                let text = escape_latex(text);
                let _ = writeln!(self.out, "\\markboth{{{}}}{{{}}}", text, text);
            }
            Block::ChapterStart { title, anchor, .. } => {
                let _ = writeln!(
                    self.out,
                    "\\section*{{{}}}\\label{{{}}}",
                    escape_latex(title),
                    anchor
                );
                self.open_columns();
            }
            Block::SectionHeading { text } => {
                self.open_columns();
                let _ = writeln!(
                    self.out,
                    "\\switchcolumn[0]*[\\sectionheading{{{}}}]",
                    escape_latex(text)
                );
            }
            Block::VerseHeader { reference, anchor } => {
                self.open_columns();
                let _ = writeln!(
                    self.out,
                    "\\switchcolumn[0]*\n\\versemark{{{}}}{{{}}}{{{}}}",
                    reference.chapter, reference.verse, anchor
                );
            }
            Block::InterlinearRow { words, .. } => {
                for word in words {
                    self.interword(word);
                }
                self.out.push_str("\\par\n");
            }
            Block::TranslationRow {
                reference,
                translation,
                text,
            } => {
                let _ = writeln!(
                    self.out,
                    "\\switchcolumn[{}]\n\\versenum{{{}}}{}\\par",
                    self.column_of(*translation),
                    reference.verse,
                    escape_latex(text)
                );
            }
            Block::TranslationGap {
                reference,
                translation,
                reason,
            } => {
                let _ = writeln!(
                    self.out,
                    "\\switchcolumn[{}]\n\\versenum{{{}}}\\translationgap{{{}}}\\par",
                    self.column_of(*translation),
                    reference.verse,
                    escape_latex(reason)
                );
            }
            Block::AppendixHeader { title } => {
                self.close_columns();
                let title = escape_latex(title);
                let _ = writeln!(
                    self.out,
                    "\n\\clearpage\n\\phantomsection\n\\addcontentsline{{toc}}{{section}}{{{title}}}\n\\markboth{{{title}}}{{{title}}}\n\\section*{{{title}}}"
                );
            }
            Block::AppendixEntry(entry) => self.lexentry(entry),
        }
    }

    fn interword(&mut self, word: &InterlinearWord) {
        let strongs = word.strongs.map(|n| n.to_string()).unwrap_or_default();
        let _ = writeln!(
            self.out,
            "\\interword{{{}}}{{{}}}{{{}}}",
            escape_latex(&word.surface),
            escape_latex(&word.gloss),
            strongs
        );
    }

    fn lexentry(&mut self, entry: &AppendixEntry) {
        let _ = writeln!(
            self.out,
            "\\lexentry{{{}}}{{{}}}{{{}}}{{{}}}{{{}}}{{{}}}",
            entry.strongs,
            escape_latex(&entry.lemma),
            escape_latex(&entry.translit),
            escape_latex(&entry.gloss),
            escape_latex(&entry.definition),
            escape_latex(entry.kjv_usage.trim_start_matches(":--"))
        );
    }

    fn finish(mut self) -> String {
        self.close_columns();
        self.out
    }
}

/// Render a document to a complete LaTeX source.
pub fn render(document: &Document) -> String {
    let mut writer = LatexWriter::new(document.layout);
    for block in &document.blocks {
        writer.block(block);
    }
    let body = writer.finish();
    template(document.layout)
        .replace("$title$", &escape_latex(&document.title))
        .replace("$body$", &body)
}

/// Render a document and write it to `<output_dir>/<stem>.tex`.
pub fn write_document(document: &Document, output_dir: &Path, stem: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}.tex", stem));
    std::fs::write(&path, render(document))?;
    tracing::debug!(path = %path.display(), "Wrote LaTeX source");
    Ok(path)
}
