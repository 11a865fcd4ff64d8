/*
 * tests/pipeline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end generation tests with on-disk data and scripted HTTP.
 */

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use interlinear_core::translation::esv::EsvSource;
use interlinear_core::translation::net::NetSource;
use interlinear_core::{
    CompilationError, CompileOptions, Corpus, DictionaryIndex, FetchError, GenerateRequest,
    HttpRequest, HttpResponse, HttpTransport, InterlinearError, Layout, RetryPolicy, Translation,
    TranslationSource, TransportError, generate,
};

const HEADER: &str = "〔OGNTsort〕\t〔book｜chapter｜verse〕\t〔OGNTk｜OGNTu｜OGNTa｜lexeme｜rmac｜sn〕\t〔TANTT〕\t〔MounceGloss｜TyndaleHouseGloss｜OpenGNTGloss〕";

/// Surface, lexeme, Strong's number, morphology and gloss.
const JOHN_1_1: &[(&str, &str, &str, &str, &str)] = &[
    ("Ἐν", "ἐν", "G1722", "PREP", "In"),
    ("ἀρχῇ", "ἀρχή", "G0746", "N-DSF", "beginning"),
    ("ἦν", "εἰμί", "G1510", "V-IAI-3S", "was"),
    ("ὁ", "ὁ", "G3588", "T-NSM", "the"),
    ("λόγος", "λόγος", "G3056", "N-NSM", "Word"),
];

const DICTIONARY: &str = r#"{
    "G3056": {"lemma": "λόγος", "translit": "lógos", "strongs_def": "something said", "kjv_def": ":--account, word"},
    "G1722": {"lemma": "ἐν", "translit": "en", "strongs_def": "a primary preposition", "kjv_def": ":--in, among"}
}"#;

/// Writes a one-verse corpus and a small dictionary into `dir`.
fn write_data(dir: &Path) {
    let rows: Vec<String> = JOHN_1_1
        .iter()
        .enumerate()
        .map(|(i, (surface, lexeme, strongs, morph, gloss))| {
            format!(
                "〔{i}〕\t〔43｜1｜1〕\t〔{surface}｜x｜{surface}｜{lexeme}｜{morph}｜{strongs}〕\t〔BIMNRSTWH={surface}={strongs}={morph};〕\t〔{gloss}｜{gloss}｜{gloss}〕"
            )
        })
        .collect();
    std::fs::write(
        dir.join("OpenGNT_keyedFeatures.csv"),
        format!("{}\n{}\n", HEADER, rows.join("\n")),
    )
    .unwrap();
    std::fs::write(dir.join("strongs-greek.json"), DICTIONARY).unwrap();
}

struct Scripted {
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl Scripted {
    fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
        })
    }
}

impl HttpTransport for Scripted {
    fn get(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::new("no scripted response"))
    }
}

fn esv(transport: Arc<Scripted>) -> Box<dyn TranslationSource> {
    Box::new(
        EsvSource::new(transport, Some("test-key".to_string())).with_retry(RetryPolicy {
            delay: Duration::ZERO,
        }),
    )
}

fn esv_body() -> HttpResponse {
    HttpResponse::ok(
        serde_json::json!({
            "canonical": "John 1:1",
            "passages": ["The Word Became Flesh\n\n  [1] In the beginning was the Word, and the Word was with God, and the Word was God."]
        })
        .to_string(),
    )
}

struct Fixture {
    _dir: tempfile::TempDir,
    corpus: Corpus,
    dictionary: DictionaryIndex,
    output_dir: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());
    let corpus = Corpus::load(dir.path()).unwrap();
    let dictionary = DictionaryIndex::load(dir.path(), &corpus).unwrap();
    let output_dir = dir.path().join("output");
    Fixture {
        _dir: dir,
        corpus,
        dictionary,
        output_dir,
    }
}

fn request(fx: &Fixture, reference: &str, layout: Layout, latex_only: bool) -> GenerateRequest {
    GenerateRequest {
        reference: reference.to_string(),
        layout,
        output_dir: fx.output_dir.clone(),
        latex_only,
        compile: CompileOptions::default(),
    }
}

#[test]
fn john_1_1_portrait_has_one_row_per_translation() {
    let fx = fixture();
    let sources = vec![esv(Scripted::new([esv_body()]))];

    let report = generate(
        &request(&fx, "John 1:1", Layout::EsvPortrait, true),
        &fx.corpus,
        &fx.dictionary,
        &sources,
        None,
    )
    .unwrap();

    assert_eq!(report.summary.verses, 1);
    assert_eq!(report.summary.words, JOHN_1_1.len());
    assert_eq!(report.summary.translation_rows, 1);
    assert_eq!(report.summary.translation_gaps, 0);
    assert_eq!(report.summary.appendix_entries, 5);
    assert_eq!(report.alignment.dictionary_misses, 0);

    let tex = std::fs::read_to_string(&report.tex_path).unwrap();
    assert_eq!(tex.matches("\\interword{").count(), 5);
    assert_eq!(tex.matches("\\versemark{").count(), 1);
    assert_eq!(tex.matches("\\lexentry{").count(), 5);
    assert!(tex.contains("\\sectionheading{The Word Became Flesh}"));
    assert!(tex.contains("\\lexentry{G3056}{λόγος}{lógos}"));
}

#[test]
fn esv_rate_limit_degrades_to_placeholder() {
    let fx = fixture();
    let net = r#"[{"bookname": "John", "chapter": "1", "verse": "1", "text": "In the beginning was the Word"}]"#;
    let sources: Vec<Box<dyn TranslationSource>> = vec![
        esv(Scripted::new([HttpResponse::status(429)])),
        Box::new(NetSource::new(Scripted::new([HttpResponse::ok(net)]))),
    ];

    let report = generate(
        &request(&fx, "John 1:1", Layout::MultiLandscape, true),
        &fx.corpus,
        &fx.dictionary,
        &sources,
        None,
    )
    .unwrap();

    assert_eq!(report.tex_path.file_name().unwrap(), "John_1_1_multi.tex");
    assert_eq!(
        report.failed_translations,
        [FetchError::RateLimited {
            translation: Translation::Esv
        }]
    );
    // ESV failed, NET succeeded, KJV had no source
    assert_eq!(report.summary.translation_rows, 1);
    assert_eq!(report.summary.translation_gaps, 2);

    let tex = std::fs::read_to_string(&report.tex_path).unwrap();
    assert!(tex.contains("\\translationgap{ESV: rate limited by the API}"));
}

#[test]
fn unknown_passage_writes_nothing() {
    let fx = fixture();
    let sources = vec![esv(Scripted::new([esv_body()]))];

    let err = generate(
        &request(&fx, "Zephaniah 99:99", Layout::EsvPortrait, false),
        &fx.corpus,
        &fx.dictionary,
        &sources,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, InterlinearError::PassageNotFound { .. }));
    assert!(!fx.output_dir.exists());
}

#[test]
fn missing_engine_still_succeeds_with_markup() {
    let fx = fixture();
    let sources = vec![esv(Scripted::new([esv_body()]))];

    let report = generate(
        &request(&fx, "John 1:1", Layout::EsvPortrait, false),
        &fx.corpus,
        &fx.dictionary,
        &sources,
        None,
    )
    .unwrap();

    assert_eq!(
        report.output,
        Some(interlinear_core::CompileOutput::MarkupOnly(report.tex_path.clone()))
    );
    assert!(report.tex_path.exists());
}

#[cfg(unix)]
#[test]
fn engine_failure_keeps_markup_without_pdf() {
    use std::os::unix::fs::PermissionsExt;

    let fx = fixture();
    let sources = vec![esv(Scripted::new([esv_body()]))];

    let engine_path = fx.output_dir.parent().unwrap().join("broken-lualatex");
    std::fs::write(
        &engine_path,
        "#!/bin/sh\necho '! Undefined control sequence.'\necho 'l.7 \\badmacro'\nexit 1\n",
    )
    .unwrap();
    std::fs::set_permissions(&engine_path, std::fs::Permissions::from_mode(0o755)).unwrap();
    let engine = interlinear_core::LatexEngine::at(&engine_path);

    let err = generate(
        &request(&fx, "John 1:1", Layout::EsvPortrait, false),
        &fx.corpus,
        &fx.dictionary,
        &sources,
        Some(&engine),
    )
    .unwrap_err();

    match err {
        InterlinearError::Compilation(CompilationError::EngineFailed { diagnostic, .. }) => {
            assert!(diagnostic.contains("! Undefined control sequence."));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.output_dir.join("John_1_1.tex").exists());
    assert!(!fx.output_dir.join("John_1_1.pdf").exists());
}
