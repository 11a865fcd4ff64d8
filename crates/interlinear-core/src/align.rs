/*
 * align.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Gloss selection for interlinear rows.
 */

//! Gloss selection.
//!
//! Every Greek word gets exactly one short English gloss, chosen in this
//! order:
//!
//! 1. The first rule in [`RULES`] whose context pattern matches and whose
//!    sense choice yields a gloss
//! 2. The corpus' per-occurrence gloss
//! 3. The dictionary's default (most frequent) sense
//! 4. [`UNKNOWN_GLOSS`]
//!
//! Patterns only look at the word itself and its immediate neighbours, so
//! the same word in the same context always receives the same gloss.

use crate::corpus::{Verse, Word};
use crate::dictionary::{DictionaryIndex, GlossEntry};
use crate::strongs::StrongsNumber;

/// Placeholder gloss for words with no usable sense.
pub const UNKNOWN_GLOSS: &str = "?";

/// Where a chosen gloss came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossSource {
    /// A context rule, by name
    Rule(&'static str),
    Corpus,
    DictionaryDefault,
    Unknown,
}

/// A word together with its neighbours in the verse.
#[derive(Debug, Clone, Copy)]
pub struct WordContext<'a> {
    pub word: &'a Word,
    pub prev: Option<&'a Word>,
    pub next: Option<&'a Word>,
}

impl<'a> WordContext<'a> {
    /// Context for the word at `index` in `words`.
    pub fn at(words: &'a [Word], index: usize) -> Self {
        Self {
            word: &words[index],
            prev: index.checked_sub(1).and_then(|i| words.get(i)),
            next: words.get(index + 1),
        }
    }
}

/// A context pattern over a word and its neighbours.
#[derive(Debug)]
pub enum Pattern {
    /// Morphological tag starts with the prefix
    TagPrefix(&'static str),
    Strongs(u32),
    /// First word of the verse
    AtVerseStart,
    /// Following word's tag starts with the prefix
    NextTagPrefix(&'static str),
    /// Following word is a nominal form in the given case (N, G, D, A, V)
    NextCase(char),
    /// Preceding word has the given lemma
    PrevLemma(&'static str),
    /// Verb in the infinitive mood
    Infinitive,
    All(&'static [Pattern]),
}

impl Pattern {
    pub fn matches(&self, ctx: &WordContext<'_>) -> bool {
        match self {
            Pattern::TagPrefix(prefix) => ctx.word.morph.starts_with(prefix),
            Pattern::Strongs(n) => ctx.word.strongs == Some(StrongsNumber(*n)),
            Pattern::AtVerseStart => ctx.word.position == 0,
            Pattern::NextTagPrefix(prefix) => ctx.next.is_some_and(|w| w.morph.starts_with(prefix)),
            Pattern::NextCase(case) => ctx
                .next
                .and_then(|w| grammatical_case(&w.morph))
                .is_some_and(|c| c == *case),
            Pattern::PrevLemma(lemma) => ctx.prev.is_some_and(|w| w.lemma == *lemma),
            Pattern::Infinitive => is_infinitive(&ctx.word.morph),
            Pattern::All(patterns) => patterns.iter().all(|p| p.matches(ctx)),
        }
    }
}

/// How a matching rule picks its gloss.
#[derive(Debug)]
pub enum SenseChoice {
    Fixed(&'static str),
    /// First dictionary sense containing the word
    SenseContaining(&'static str),
    /// "to " + the corpus gloss or default sense
    Infinitive,
}

impl SenseChoice {
    fn resolve(&self, word: &Word, entry: Option<&GlossEntry>) -> Option<String> {
        match self {
            SenseChoice::Fixed(gloss) => Some(gloss.to_string()),
            SenseChoice::SenseContaining(needle) => {
                entry.and_then(|e| e.sense_containing(needle)).map(str::to_string)
            }
            SenseChoice::Infinitive => {
                let base = Some(word.corpus_gloss.trim())
                    .filter(|g| !g.is_empty())
                    .or_else(|| entry.and_then(GlossEntry::default_sense))?;
                if base.to_lowercase().starts_with("to ") {
                    Some(base.to_string())
                } else {
                    Some(format!("to {}", base))
                }
            }
        }
    }
}

/// One entry of the rule table.
#[derive(Debug)]
pub struct GlossRule {
    pub name: &'static str,
    pub pattern: Pattern,
    pub choice: SenseChoice,
}

/// Context rules, highest priority first.
pub static RULES: &[GlossRule] = &[
    GlossRule {
        name: "kai-verse-initial",
        pattern: Pattern::All(&[Pattern::Strongs(2532), Pattern::AtVerseStart]),
        choice: SenseChoice::Fixed("And"),
    },
    GlossRule {
        name: "kai-after-kai",
        pattern: Pattern::All(&[Pattern::Strongs(2532), Pattern::PrevLemma("καί")]),
        choice: SenseChoice::Fixed("even"),
    },
    GlossRule {
        name: "article",
        pattern: Pattern::TagPrefix("T-"),
        choice: SenseChoice::Fixed("the"),
    },
    GlossRule {
        name: "me-before-verb",
        pattern: Pattern::All(&[Pattern::Strongs(3361), Pattern::NextTagPrefix("V-")]),
        choice: SenseChoice::Fixed("not"),
    },
    GlossRule {
        name: "en-with-dative",
        pattern: Pattern::All(&[Pattern::Strongs(1722), Pattern::NextCase('D')]),
        choice: SenseChoice::Fixed("in"),
    },
    GlossRule {
        name: "de-contrastive",
        pattern: Pattern::All(&[Pattern::Strongs(1161), Pattern::PrevLemma("μέν")]),
        choice: SenseChoice::SenseContaining("but"),
    },
    GlossRule {
        name: "infinitive",
        pattern: Pattern::Infinitive,
        choice: SenseChoice::Infinitive,
    },
];

/// Grammatical case of a nominal Robinson code ("N-DSF" → 'D', "P-1DS" → 'D').
///
/// Verbs (including participles) return `None`.
fn grammatical_case(morph: &str) -> Option<char> {
    let (kind, rest) = morph.split_once('-')?;
    if kind == "V" {
        return None;
    }
    rest.chars()
        .find(|c| !c.is_ascii_digit())
        .filter(|c| matches!(c, 'N' | 'G' | 'D' | 'A' | 'V'))
}

/// "V-PAN", "V-2AAN": tense/voice/mood segment ending in N, no parsing suffix.
fn is_infinitive(morph: &str) -> bool {
    let mut segments = morph.split('-');
    segments.next() == Some("V")
        && segments.next().is_some_and(|tvm| tvm.ends_with('N'))
        && segments.next().is_none()
}

/// A word and its chosen gloss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedWord<'a> {
    pub word: &'a Word,
    pub gloss: String,
    pub source: GlossSource,
}

/// A verse with one gloss per word, in original word order.
#[derive(Debug, Clone)]
pub struct AlignedVerse<'a> {
    pub verse: &'a Verse,
    pub words: Vec<AlignedWord<'a>>,
}

/// Counts collected while aligning a passage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub words: usize,
    pub rule_glosses: usize,
    pub corpus_glosses: usize,
    pub dictionary_glosses: usize,
    pub unknown_glosses: usize,
    /// Words whose Strong's number is missing or has no dictionary entry
    pub dictionary_misses: usize,
}

/// Chooses glosses using a dictionary and the rule table.
pub struct AlignmentEngine<'d> {
    dictionary: &'d DictionaryIndex,
    rules: &'d [GlossRule],
}

impl<'d> AlignmentEngine<'d> {
    pub fn new(dictionary: &'d DictionaryIndex) -> Self {
        Self {
            dictionary,
            rules: RULES,
        }
    }

    /// Use a custom rule table.
    pub fn with_rules(mut self, rules: &'d [GlossRule]) -> Self {
        self.rules = rules;
        self
    }

    /// Choose the gloss for one word in context.
    pub fn choose(&self, ctx: &WordContext<'_>) -> (String, GlossSource) {
        let entry = ctx
            .word
            .strongs
            .and_then(|n| self.dictionary.lookup(n).entry());

        for rule in self.rules {
            if rule.pattern.matches(ctx)
                && let Some(gloss) = rule.choice.resolve(ctx.word, entry)
            {
                return (gloss, GlossSource::Rule(rule.name));
            }
        }

        let corpus = ctx.word.corpus_gloss.trim();
        if !corpus.is_empty() {
            return (corpus.to_string(), GlossSource::Corpus);
        }

        match entry.and_then(GlossEntry::default_sense) {
            Some(sense) => (sense.to_string(), GlossSource::DictionaryDefault),
            None => (UNKNOWN_GLOSS.to_string(), GlossSource::Unknown),
        }
    }

    /// Align every word of a verse.
    pub fn align_verse<'v>(&self, verse: &'v Verse) -> AlignedVerse<'v> {
        let words = (0..verse.words.len())
            .map(|i| {
                let ctx = WordContext::at(&verse.words, i);
                let (gloss, source) = self.choose(&ctx);
                AlignedWord {
                    word: ctx.word,
                    gloss,
                    source,
                }
            })
            .collect();
        AlignedVerse { verse, words }
    }

    /// Align a passage, collecting statistics.
    pub fn align<'v>(&self, verses: &[&'v Verse]) -> (Vec<AlignedVerse<'v>>, AlignmentStats) {
        let mut stats = AlignmentStats::default();
        let aligned: Vec<AlignedVerse<'v>> = verses.iter().map(|&v| self.align_verse(v)).collect();

        for word in aligned.iter().flat_map(|v| &v.words) {
            stats.words += 1;
            match word.source {
                GlossSource::Rule(_) => stats.rule_glosses += 1,
                GlossSource::Corpus => stats.corpus_glosses += 1,
                GlossSource::DictionaryDefault => stats.dictionary_glosses += 1,
                GlossSource::Unknown => stats.unknown_glosses += 1,
            }
            let resolved = word
                .word
                .strongs
                .is_some_and(|n| !self.dictionary.lookup(n).is_absent());
            if !resolved {
                stats.dictionary_misses += 1;
                tracing::debug!(
                    word = %word.word.surface,
                    strongs = ?word.word.strongs,
                    "Dictionary lookup miss"
                );
            }
        }

        (aligned, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::Book;
    use crate::corpus::tests::sample_corpus;
    use crate::passage::VerseRef;

    fn word(position: usize, lemma: &str, strongs: Option<u32>, morph: &str, gloss: &str) -> Word {
        Word {
            surface: lemma.to_string(),
            lemma: lemma.to_string(),
            strongs: strongs.map(StrongsNumber),
            morph: morph.to_string(),
            position,
            corpus_gloss: gloss.to_string(),
        }
    }

    fn dictionary() -> DictionaryIndex {
        let json = r#"{
            "G1161": {"kjv_def": ":--also, and, but, moreover, now"},
            "G3004": {"kjv_def": ":--say, speak, tell"}
        }"#;
        DictionaryIndex::from_json(json, &sample_corpus()).unwrap()
    }

    fn choose(words: &[Word], index: usize) -> (String, GlossSource) {
        let dict = dictionary();
        AlignmentEngine::new(&dict).choose(&WordContext::at(words, index))
    }

    #[test]
    fn test_article_rule() {
        let words = [word(0, "ὁ", Some(3588), "T-NSM", "The")];
        assert_eq!(choose(&words, 0), ("the".to_string(), GlossSource::Rule("article")));
    }

    #[test]
    fn test_kai_depends_on_position() {
        let words = [
            word(0, "καί", Some(2532), "CONJ", "and"),
            word(1, "καί", Some(2532), "CONJ", "and"),
            word(2, "λόγος", Some(3056), "N-NSM", "word"),
            word(3, "καί", Some(2532), "CONJ", "and"),
        ];
        assert_eq!(choose(&words, 0).0, "And");
        assert_eq!(choose(&words, 1).0, "even");
        assert_eq!(choose(&words, 3), ("and".to_string(), GlossSource::Corpus));
    }

    #[test]
    fn test_me_before_verb_only() {
        let words = [
            word(0, "μή", Some(3361), "PRT-N", "lest"),
            word(1, "λέγω", Some(3004), "V-PAS-3S", "says"),
            word(2, "μή", Some(3361), "PRT-N", "lest"),
            word(3, "λόγος", Some(3056), "N-NSM", "word"),
        ];
        assert_eq!(choose(&words, 0).0, "not");
        assert_eq!(choose(&words, 2).0, "lest");
    }

    #[test]
    fn test_en_with_dative() {
        let words = [
            word(0, "ἐν", Some(1722), "PREP", "among"),
            word(1, "ἀρχή", Some(746), "N-DSF", "beginning"),
        ];
        assert_eq!(choose(&words, 0).0, "in");

        let words = [
            word(0, "ἐν", Some(1722), "PREP", "among"),
            word(1, "αὐτός", Some(846), "P-3DPM", "them"),
        ];
        // Pronoun case follows the person digit
        assert_eq!(choose(&words, 0).0, "in");

        let words = [word(0, "ἐν", Some(1722), "PREP", "among")];
        assert_eq!(choose(&words, 0), ("among".to_string(), GlossSource::Corpus));
    }

    #[test]
    fn test_de_after_men_uses_dictionary_sense() {
        let words = [
            word(0, "μέν", Some(3303), "PRT", "indeed"),
            word(1, "δέ", Some(1161), "CONJ", "and"),
        ];
        assert_eq!(
            choose(&words, 1),
            ("but".to_string(), GlossSource::Rule("de-contrastive"))
        );
    }

    #[test]
    fn test_infinitive_prefixes_to() {
        let words = [
            word(0, "λέγω", Some(3004), "V-PAN", "speak"),
            word(1, "λέγω", Some(3004), "V-2AAN", "to say"),
            word(2, "λέγω", Some(3004), "V-PAN", ""),
        ];
        assert_eq!(choose(&words, 0).0, "to speak");
        assert_eq!(choose(&words, 1).0, "to say");
        // Falls back to the dictionary's default sense
        assert_eq!(choose(&words, 2).0, "to say");
    }

    #[test]
    fn test_fallbacks_and_unknown_placeholder() {
        let words = [
            word(0, "λέγω", Some(3004), "V-PAI-3S", ""),
            word(1, "ξένος", Some(9999), "A-NSM", ""),
            word(2, "ξένος", None, "A-NSM", ""),
        ];
        assert_eq!(
            choose(&words, 0),
            ("say".to_string(), GlossSource::DictionaryDefault)
        );
        assert_eq!(
            choose(&words, 1),
            (UNKNOWN_GLOSS.to_string(), GlossSource::Unknown)
        );
        assert_eq!(choose(&words, 2).0, UNKNOWN_GLOSS);
    }

    #[test]
    fn test_choice_is_deterministic() {
        let words = [
            word(0, "καί", Some(2532), "CONJ", "and"),
            word(1, "ἐν", Some(1722), "PREP", "in"),
            word(2, "ἀρχή", Some(746), "N-DSF", ""),
        ];
        let dict = dictionary();
        let engine = AlignmentEngine::new(&dict);
        for i in 0..words.len() {
            let first = engine.choose(&WordContext::at(&words, i));
            for _ in 0..10 {
                assert_eq!(engine.choose(&WordContext::at(&words, i)), first);
            }
        }
    }

    #[test]
    fn test_align_preserves_order_and_counts_misses() {
        let corpus = sample_corpus();
        let dict = DictionaryIndex::from_json("{}", &corpus).unwrap();
        let engine = AlignmentEngine::new(&dict);
        let john = Book::find("John").unwrap();
        let verse = corpus.get(john, VerseRef::new(1, 1)).unwrap();

        let (aligned, stats) = engine.align(&[verse]);
        assert_eq!(aligned.len(), 1);
        let glosses: Vec<&str> = aligned[0].words.iter().map(|w| w.gloss.as_str()).collect();
        assert_eq!(glosses, ["in", "beginning", "was", "the", "Word"]);
        let positions: Vec<usize> = aligned[0].words.iter().map(|w| w.word.position).collect();
        assert_eq!(positions, [0, 1, 2, 3, 4]);
        assert_eq!(stats.words, 5);
        assert_eq!(stats.dictionary_misses, 0);
    }

    #[test]
    fn test_grammatical_case_and_infinitive_parsing() {
        assert_eq!(grammatical_case("N-DSF"), Some('D'));
        assert_eq!(grammatical_case("P-1GS"), Some('G'));
        assert_eq!(grammatical_case("V-PAP-DSM"), None);
        assert_eq!(grammatical_case("PREP"), None);
        assert!(is_infinitive("V-PAN"));
        assert!(is_infinitive("V-2AAN"));
        assert!(!is_infinitive("V-PAP-NSM"));
        assert!(!is_infinitive("N-NSN"));
    }
}
