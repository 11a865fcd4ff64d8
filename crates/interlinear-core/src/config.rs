/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Configuration file, environment and command-line settings.
 */

//! Run settings.
//!
//! Settings are merged from three layers, highest precedence first:
//! 1. Command-line overrides
//! 2. Environment (`ESV_API_KEY`)
//! 3. `interlinear.yml`, from `--config` or the working directory
//!
//! ```yaml
//! esv-api-key: abc123
//! data-dir: data
//! output-dir: output
//! lualatex: /usr/local/texlive/2024/bin/x86_64-linux/lualatex
//! retry-delay-ms: 2000
//! http-timeout-secs: 30
//! download-corpus: true
//! corpus-url: https://example.org/OpenGNT_keyedFeatures.csv.zip
//! ```
//!
//! Relative paths in the file are resolved against the file's directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::data::OPENGNT_URL;
use crate::error::{InterlinearError, Result};
use crate::translation::esv::PLACEHOLDER_API_KEY;

pub const CONFIG_FILENAME: &str = "interlinear.yml";

pub const ESV_API_KEY_ENV: &str = "ESV_API_KEY";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Contents of `interlinear.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ConfigFile {
    pub esv_api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub lualatex: Option<PathBuf>,
    pub retry_delay_ms: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub download_corpus: Option<bool>,
    pub corpus_url: Option<String>,
}

impl ConfigFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            InterlinearError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Resolve relative paths against `base`.
    fn rebase(mut self, base: &Path) -> Self {
        let rebase = |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        self.data_dir = rebase(self.data_dir);
        self.output_dir = rebase(self.output_dir);
        self.lualatex = rebase(self.lualatex);
        self
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub esv_api_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub esv_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub lualatex: Option<PathBuf>,
    pub retry_delay: Duration,
    pub http_timeout: Duration,
    /// Fetch the OpenGNT archive when the corpus file is missing
    pub download_corpus: bool,
    pub corpus_url: String,
    /// The configuration file that was read, if any
    pub config_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings against the working directory and process environment.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::resolve(overrides, &cwd, |name| std::env::var(name).ok())
    }

    /// Resolve settings with an explicit working directory and environment.
    pub fn resolve(
        overrides: &Overrides,
        cwd: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let (file, config_path) = match &overrides.config {
            Some(path) => {
                let path = cwd.join(path);
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    InterlinearError::Config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                (ConfigFile::parse(&content, &path)?, Some(path))
            }
            None => {
                let path = cwd.join(CONFIG_FILENAME);
                match std::fs::read_to_string(&path) {
                    Ok(content) => (ConfigFile::parse(&content, &path)?, Some(path)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        (ConfigFile::default(), None)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };
        let file = match config_path.as_deref().and_then(Path::parent) {
            Some(base) => file.rebase(base),
            None => file,
        };
        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let esv_api_key = [
            overrides.esv_api_key.clone(),
            env(ESV_API_KEY_ENV),
            file.esv_api_key.clone(),
        ]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY);

        let data_dir = overrides
            .data_dir
            .as_ref()
            .map(|p| cwd.join(p))
            .or(file.data_dir)
            .unwrap_or_else(|| cwd.join(DEFAULT_DATA_DIR));
        let output_dir = overrides
            .output_dir
            .as_ref()
            .map(|p| cwd.join(p))
            .or(file.output_dir)
            .unwrap_or_else(|| cwd.join(DEFAULT_OUTPUT_DIR));

        let http_timeout_secs = file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(InterlinearError::Config(
                "http-timeout-secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            esv_api_key,
            data_dir,
            output_dir,
            lualatex: file.lualatex,
            retry_delay: Duration::from_millis(file.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
            http_timeout: Duration::from_secs(http_timeout_secs),
            download_corpus: file.download_corpus.unwrap_or(true),
            corpus_url: file.corpus_url.unwrap_or_else(|| OPENGNT_URL.to_string()),
            config_path,
        })
    }
}
