/*
 * layout.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Page layouts.
 */

//! Page layouts.
//!
//! A layout fixes the page geometry and which translations appear beside
//! the Greek, in column order.

use crate::translation::Translation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Greek | ESV, portrait
    #[default]
    EsvPortrait,
    /// Greek | ESV | NET | KJV, landscape
    MultiLandscape,
}

impl Layout {
    pub const ALL: [Layout; 2] = [Layout::EsvPortrait, Layout::MultiLandscape];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::EsvPortrait => "esv-portrait",
            Layout::MultiLandscape => "multi-landscape",
        }
    }

    /// Translations shown, in column order.
    pub fn translations(&self) -> &'static [Translation] {
        match self {
            Layout::EsvPortrait => &[Translation::Esv],
            Layout::MultiLandscape => &[Translation::Esv, Translation::Net, Translation::Kjv],
        }
    }

    /// Total columns, Greek included.
    pub fn columns(&self) -> usize {
        1 + self.translations().len()
    }

    /// Appended to the passage file stem.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Layout::EsvPortrait => "",
            Layout::MultiLandscape => "_multi",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Layout {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "esv-portrait" | "portrait" => Ok(Layout::EsvPortrait),
            "multi-landscape" | "multi" | "landscape" => Ok(Layout::MultiLandscape),
            _ => Err(format!(
                "Unknown layout: {} (expected one of: esv-portrait, multi-landscape)",
                s
            )),
        }
    }
}
