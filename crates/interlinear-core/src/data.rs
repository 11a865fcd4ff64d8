/*
 * data.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Download of the OpenGNT corpus into the data directory.
 */

//! OpenGNT data download.
//!
//! The corpus is published as a zip archive holding a single
//! `OpenGNT_keyedFeatures.csv`. [`ensure_corpus`] leaves an existing file
//! alone unless forced, and otherwise fetches the archive and unpacks the
//! CSV into the data directory.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::corpus::CORPUS_FILENAME;
use crate::error::{InterlinearError, Result};
use crate::translation::{HttpRequest, HttpTransport};

/// Location of the zipped OpenGNT keyed-features table.
pub const OPENGNT_URL: &str =
    "https://raw.githubusercontent.com/eliranwong/OpenGNT/master/OpenGNT_keyedFeatures.csv.zip";

/// Where the corpus file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusFile {
    /// Already in the data directory
    Present(PathBuf),
    /// Fetched and unpacked by this call
    Downloaded(PathBuf),
}

impl CorpusFile {
    pub fn path(&self) -> &Path {
        match self {
            CorpusFile::Present(path) | CorpusFile::Downloaded(path) => path,
        }
    }
}

/// Make sure `data_dir` holds the OpenGNT corpus.
///
/// With `force`, the archive is downloaded even when the CSV exists and
/// replaces it. The CSV is written next to its final name first and renamed
/// into place, so a failed download never leaves a truncated corpus behind.
pub fn ensure_corpus(
    transport: &dyn HttpTransport,
    url: &str,
    data_dir: &Path,
    force: bool,
) -> Result<CorpusFile> {
    let target = data_dir.join(CORPUS_FILENAME);
    if target.is_file() && !force {
        tracing::debug!(path = %target.display(), "Corpus already present");
        return Ok(CorpusFile::Present(target));
    }

    std::fs::create_dir_all(data_dir)?;
    tracing::info!(url, dir = %data_dir.display(), "Downloading OpenGNT corpus");

    let response = transport
        .get(&HttpRequest::get(url))
        .map_err(|e| InterlinearError::download(url, e.to_string()))?;
    if !response.is_success() {
        return Err(InterlinearError::download(
            url,
            format!("HTTP status {}", response.status),
        ));
    }

    let bytes = extract_corpus(&response.body, &target)
        .map_err(|message| InterlinearError::download(url, message))?;
    tracing::info!(path = %target.display(), bytes, "Extracted corpus");
    Ok(CorpusFile::Downloaded(target))
}

/// Unpack the corpus entry of `archive` to `target`, returning its size.
fn extract_corpus(archive: &[u8], target: &Path) -> std::result::Result<u64, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| format!("invalid archive ({})", e))?;

    // Accept the entry at any depth; some mirrors wrap it in a folder.
    let name = archive
        .file_names()
        .find(|name| Path::new(name).file_name().is_some_and(|f| f == CORPUS_FILENAME))
        .map(str::to_string)
        .ok_or_else(|| format!("archive has no {}", CORPUS_FILENAME))?;
    let mut entry = archive
        .by_name(&name)
        .map_err(|e| format!("cannot read {} ({})", name, e))?;

    let partial = target.with_extension("csv.part");
    let written = File::create(&partial).and_then(|mut out| {
        let n = std::io::copy(&mut entry, &mut out)?;
        out.sync_all()?;
        Ok(n)
    });
    let written = match written {
        Ok(n) => n,
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            return Err(format!("cannot extract {} ({})", name, e));
        }
    };
    std::fs::rename(&partial, target)
        .map_err(|e| format!("cannot move {} into place ({})", target.display(), e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use zip::CompressionMethod;
    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::corpus::Corpus;
    use crate::corpus::tests::sample_corpus_text;
    use crate::translation::transport::tests::ScriptedTransport;
    use crate::translation::{HttpResponse, TransportError};

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_existing_corpus_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CORPUS_FILENAME), "existing").unwrap();
        let transport = ScriptedTransport::default();

        let file = ensure_corpus(&transport, OPENGNT_URL, dir.path(), false).unwrap();
        assert_eq!(file, CorpusFile::Present(dir.path().join(CORPUS_FILENAME)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_missing_corpus_is_downloaded_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let transport = ScriptedTransport::new([Ok(HttpResponse::ok(archive(&[(
            CORPUS_FILENAME,
            &sample_corpus_text(),
        )])))]);

        let file = ensure_corpus(&transport, OPENGNT_URL, &data_dir, false).unwrap();
        assert_eq!(file, CorpusFile::Downloaded(data_dir.join(CORPUS_FILENAME)));
        assert_eq!(transport.requests()[0].url, OPENGNT_URL);
        assert!(!data_dir.join("OpenGNT_keyedFeatures.csv.part").exists());

        let corpus = Corpus::load(&data_dir).unwrap();
        assert!(!corpus.is_empty());
    }

    #[test]
    fn test_force_replaces_existing_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CORPUS_FILENAME), "stale").unwrap();
        let transport = ScriptedTransport::new([Ok(HttpResponse::ok(archive(&[
            ("README.md", "OpenGNT"),
            ("OpenGNT/OpenGNT_keyedFeatures.csv", "fresh"),
        ])))]);

        let file = ensure_corpus(&transport, OPENGNT_URL, dir.path(), true).unwrap();
        assert!(matches!(file, CorpusFile::Downloaded(_)));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "fresh");
    }

    #[test]
    fn test_http_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new([Ok(HttpResponse::status(404))]);

        let err = ensure_corpus(&transport, OPENGNT_URL, dir.path(), false).unwrap_err();
        assert!(matches!(err, InterlinearError::Download { .. }));
        assert!(err.to_string().contains("404"));
        assert!(!dir.path().join(CORPUS_FILENAME).exists());
    }

    #[test]
    fn test_transport_failure_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new([Err(TransportError::new("dns error"))]);

        let err = ensure_corpus(&transport, OPENGNT_URL, dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("dns error"));
    }

    #[test]
    fn test_archive_without_corpus_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::new([
            Ok(HttpResponse::ok(archive(&[("README.md", "nothing here")]))),
            Ok(HttpResponse::ok("not a zip")),
        ]);

        let err = ensure_corpus(&transport, OPENGNT_URL, dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("archive has no OpenGNT_keyedFeatures.csv"));

        let err = ensure_corpus(&transport, OPENGNT_URL, dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("invalid archive"));
        assert!(!dir.path().join(CORPUS_FILENAME).exists());
    }
}
