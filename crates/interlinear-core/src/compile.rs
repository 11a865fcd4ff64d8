/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * LuaLaTeX invocation.
 */

//! LuaLaTeX invocation.
//!
//! # Finding the engine
//!
//! [`LatexEngine::discover`] searches in this order:
//! 1. An explicitly configured path
//! 2. `INTERLINEAR_LUALATEX` environment variable
//! 3. `lualatex` on the system PATH via `which`
//!
//! # Running
//!
//! The engine runs twice in the directory of the `.tex` file so the table of
//! contents and cross references resolve. Auxiliary files are removed when
//! [`compile`] returns, on success and on failure, unless
//! [`CompileOptions::keep_aux`] is set.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Environment variable naming the engine binary.
pub const LUALATEX_ENV: &str = "INTERLINEAR_LUALATEX";

/// Extensions of files the engine leaves next to the PDF.
pub const AUX_EXTENSIONS: &[&str] = &["aux", "log", "out", "toc"];

/// Lines of engine output kept when no `!` error line is found.
const OUTPUT_TAIL_LINES: usize = 20;

#[derive(Error, Debug)]
pub enum CompilationError {
    /// The engine exited unsuccessfully.
    #[error("LaTeX compilation of {tex} failed ({status}):\n{diagnostic}")]
    EngineFailed {
        tex: PathBuf,
        status: String,
        diagnostic: String,
    },

    #[error("Failed to run {engine}: {source}")]
    Spawn {
        engine: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine reported success but wrote no PDF.
    #[error("LaTeX engine produced no PDF at {0}")]
    MissingPdf(PathBuf),
}

/// A located LuaLaTeX binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexEngine {
    path: PathBuf,
}

impl LatexEngine {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the engine; `None` when it is not installed.
    pub fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            if path.is_file() {
                return Some(Self::at(path));
            }
            tracing::warn!(path = %path.display(), "Configured lualatex not found, searching PATH");
        }

        if let Ok(env_path) = std::env::var(LUALATEX_ENV) {
            let env_path = PathBuf::from(env_path);
            if env_path.is_file() {
                return Some(Self::at(env_path));
            }
        }

        which::which("lualatex").ok().map(Self::at)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Leave `.aux`, `.log`, `.out` and `.toc` files in place
    pub keep_aux: bool,
    pub passes: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            keep_aux: false,
            passes: 2,
        }
    }
}

/// What a compile step left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutput {
    Pdf(PathBuf),
    /// No engine available; only the markup was written
    MarkupOnly(PathBuf),
}

/// Removes auxiliary files for a stem when dropped.
struct AuxCleanup {
    dir: PathBuf,
    stem: String,
    keep: bool,
}

impl Drop for AuxCleanup {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for ext in AUX_EXTENSIONS {
            let path = self.dir.join(format!("{}.{}", self.stem, ext));
            if path.exists() {
                // Best effort cleanup - ignore errors
                let _ = std::fs::remove_file(&path);
            }
        }
    }
}

/// Compile a `.tex` file to PDF next to it.
///
/// With no engine the markup is left in place and a warning explains how to
/// compile it by hand. On engine failure the `.tex` file is kept and any
/// partial PDF removed.
pub fn compile(
    engine: Option<&LatexEngine>,
    tex: &Path,
    options: &CompileOptions,
) -> Result<CompileOutput, CompilationError> {
    let dir = match tex.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = tex
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pdf = dir.join(format!("{}.pdf", stem));

    let Some(engine) = engine else {
        tracing::warn!(
            tex = %tex.display(),
            "lualatex not found; install TeX Live or set {} and run: cd {} && lualatex {}.tex (twice)",
            LUALATEX_ENV,
            dir.display(),
            stem
        );
        return Ok(CompileOutput::MarkupOnly(tex.to_path_buf()));
    };

    // The engine runs inside `dir`, so it gets the bare file name and an
    // absolute program path.
    let program = program_path(engine.path()).map_err(|source| CompilationError::Spawn {
        engine: engine.path().to_path_buf(),
        source,
    })?;
    let file_name = tex
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| tex.to_path_buf());

    let _cleanup = AuxCleanup {
        dir: dir.clone(),
        stem,
        keep: options.keep_aux,
    };

    for pass in 1..=options.passes.max(1) {
        tracing::info!(pass, engine = %program.display(), "Running lualatex");
        let output = Command::new(&program)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(&file_name)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CompilationError::Spawn {
                engine: engine.path().to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            if pdf.exists() {
                let _ = std::fs::remove_file(&pdf);
            }
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CompilationError::EngineFailed {
                tex: tex.to_path_buf(),
                status: output.status.to_string(),
                diagnostic: extract_diagnostic(&text),
            });
        }
    }

    if !pdf.exists() {
        return Err(CompilationError::MissingPdf(pdf));
    }
    Ok(CompileOutput::Pdf(pdf))
}

/// Bare program names are left for a PATH lookup; anything with a directory
/// part is made absolute against the current working directory.
fn program_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.components().count() > 1 {
        std::path::absolute(path)
    } else {
        Ok(path.to_path_buf())
    }
}

/// `!`-prefixed error lines with their `l.<n>` context lines, or the tail of
/// the output when there are none.
fn extract_diagnostic(output: &str) -> String {
    let errors: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with('!') || l.starts_with("l."))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }
    let lines: Vec<&str> = output.lines().collect();
    lines[lines.len().saturating_sub(OUTPUT_TAIL_LINES)..].join("\n")
}
