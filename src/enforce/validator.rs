//! Safety validator for automatic rewrites.
//!
//! A candidate rewrite is only allowed onto disk when it provably preserves
//! the original file content. The checks run in order and fail closed: any
//! doubt leaves the original untouched.

use std::path::{Path, PathBuf};

use tree_sitter::Parser;

use crate::enforce::header;

/// Why a candidate rewrite was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Content after the header differs from the original body.
    TailMismatch,
    /// The rewrite grew the file beyond the allowed bound.
    SizeDelta,
    /// The candidate no longer parses although the original did.
    ParseError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TailMismatch => "TAIL_MISMATCH",
            FailureKind::SizeDelta => "SIZE_DELTA",
            FailureKind::ParseError => "PARSE_ERROR",
        }
    }
}

/// Pass/fail verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// Outcome of validating one candidate rewrite.
#[derive(Debug, Clone)]
pub struct FileValidationOutcome {
    pub path: PathBuf,
    pub verdict: Verdict,
    pub failure_kind: Option<FailureKind>,
}

impl FileValidationOutcome {
    fn pass(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            verdict: Verdict::Pass,
            failure_kind: None,
        }
    }

    fn fail(path: &Path, kind: FailureKind) -> Self {
        Self {
            path: path.to_path_buf(),
            verdict: Verdict::Fail,
            failure_kind: Some(kind),
        }
    }
}

/// Validate a candidate rewrite against the original file content.
pub fn validate(
    path: &Path,
    original: &str,
    candidate: &str,
    max_header_delta: usize,
) -> FileValidationOutcome {
    // 1. Tail preservation: exactly one closing sentinel, and everything
    // after it must be byte-identical to the original body.
    let Some(tail) = candidate_tail(candidate) else {
        return FileValidationOutcome::fail(path, FailureKind::TailMismatch);
    };
    if tail != header::body_of(original) {
        return FileValidationOutcome::fail(path, FailureKind::TailMismatch);
    }

    // 2. Size bound on header growth.
    let delta = candidate.len() as i64 - original.len() as i64;
    if delta > max_header_delta as i64 {
        return FileValidationOutcome::fail(path, FailureKind::SizeDelta);
    }

    // 3. Structural sanity, best-effort: only for languages we bundle a
    // grammar for, and only when the original itself parsed cleanly.
    if let Some(language) = language_for(path) {
        if parses_cleanly(&language, original) && !parses_cleanly(&language, candidate) {
            return FileValidationOutcome::fail(path, FailureKind::ParseError);
        }
    }

    FileValidationOutcome::pass(path)
}

/// The candidate's tail: bytes after a *unique* closing sentinel line.
///
/// Zero or multiple sentinels make the tail ambiguous, which fails the
/// rewrite rather than guessing.
fn candidate_tail(candidate: &str) -> Option<&str> {
    let sentinel_lines = candidate
        .lines()
        .filter(|line| line.contains(header::HEADER_CLOSE))
        .count();
    if sentinel_lines != 1 {
        return None;
    }
    header::header_end(candidate).map(|end| &candidate[end..])
}

fn language_for(path: &Path) -> Option<tree_sitter::Language> {
    match path.extension()?.to_str()? {
        "rs" => Some(tree_sitter_rust::LANGUAGE.into()),
        "ts" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "py" => Some(tree_sitter_python::LANGUAGE.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        _ => None,
    }
}

fn parses_cleanly(language: &tree_sitter::Language, source: &str) -> bool {
    let mut parser = Parser::new();
    if parser.set_language(language).is_err() {
        // Grammar/runtime mismatch; cannot check, so do not block on it.
        return true;
    }
    match parser.parse(source, None) {
        Some(tree) => !tree.root_node().has_error(),
        None => false,
    }
}
