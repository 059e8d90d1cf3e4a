//! Documentation header grammar and staged-file classification.
//!
//! A header is a comment block at the very top of the file:
//!
//! ```text
//! // --- doc-header ---
//! // Parses hook artifacts and resolves the active mode.
//! // doc-hash: 9a3f61c2b4e8d015
//! // --- end-doc-header ---
//! ```
//!
//! `doc-hash` is the xxh3-64 of the body (everything after the closing
//! sentinel line), so a file whose code changed without a header refresh
//! classifies as stale without consulting any external store.

use std::path::Path;

use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

/// Opening sentinel, embedded in a comment line.
pub const HEADER_OPEN: &str = "--- doc-header ---";

/// Closing sentinel. Everything after this line is the body.
pub const HEADER_CLOSE: &str = "--- end-doc-header ---";

/// Headers longer than this are treated as absent.
const MAX_HEADER_LINES: usize = 64;

/// Classification of one staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// Header present and hash-consistent with the body.
    Ok,
    /// No header.
    Missing,
    /// Header present but the body changed since it was written.
    Stale,
}

/// Line-comment leader for an enforced extension, or `None` when the file
/// type is not enforced.
pub fn comment_leader(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "rs" | "ts" | "tsx" | "js" | "jsx" | "go" => Some("//"),
        "py" => Some("#"),
        _ => None,
    }
}

/// Hash of a file body as recorded in the `doc-hash` field.
pub fn body_hash(body: &str) -> String {
    format!("{:016x}", xxh3_64(body.as_bytes()))
}

/// Byte offset just past the header's closing sentinel line, or `None`
/// when the file has no well-formed header at the top.
pub fn header_end(content: &str) -> Option<usize> {
    let mut offset = 0usize;
    for (i, line) in content.lines().enumerate() {
        if i == 0 && !line.contains(HEADER_OPEN) {
            return None;
        }
        if i >= MAX_HEADER_LINES {
            return None;
        }

        let line_end = offset + line.len();
        let rest = &content.as_bytes()[line_end.min(content.len())..];
        let next = if rest.starts_with(b"\r\n") {
            line_end + 2
        } else if rest.starts_with(b"\n") {
            line_end + 1
        } else {
            line_end
        };

        if i > 0 && line.contains(HEADER_CLOSE) {
            return Some(next);
        }
        offset = next;
    }
    None
}

/// The file body: everything after the header, or the whole content when
/// no header exists.
pub fn body_of(content: &str) -> &str {
    match header_end(content) {
        Some(end) => &content[end..],
        None => content,
    }
}

/// Classify a file's header state.
pub fn classify(content: &str) -> HeaderState {
    let Some(end) = header_end(content) else {
        return HeaderState::Missing;
    };

    let header = &content[..end];
    let body = &content[end..];

    match recorded_hash(header) {
        Some(recorded) if recorded == body_hash(body) => HeaderState::Ok,
        _ => HeaderState::Stale,
    }
}

/// Render a header block for `body`, hashing it into the `doc-hash` field.
pub fn render_header(header_text: &str, body: &str, leader: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", leader, HEADER_OPEN));
    for line in header_text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{}\n", leader));
        } else {
            out.push_str(&format!("{} {}\n", leader, line));
        }
    }
    out.push_str(&format!("{} doc-hash: {}\n", leader, body_hash(body)));
    out.push_str(&format!("{} {}\n", leader, HEADER_CLOSE));
    out
}

fn recorded_hash(header: &str) -> Option<String> {
    let re = Regex::new(r"doc-hash:\s*([0-9a-f]{16})").unwrap();
    Some(re.captures(header)?[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn with_header(body: &str) -> String {
        format!("{}{}", render_header("Does things.", body, "//"), body)
    }

    #[test]
    fn test_comment_leader() {
        assert_eq!(comment_leader(&PathBuf::from("src/lib.rs")), Some("//"));
        assert_eq!(comment_leader(&PathBuf::from("app/main.py")), Some("#"));
        assert_eq!(comment_leader(&PathBuf::from("README.md")), None);
        assert_eq!(comment_leader(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn test_classify_missing() {
        assert_eq!(classify("fn main() {}\n"), HeaderState::Missing);
        assert_eq!(classify(""), HeaderState::Missing);
    }

    #[test]
    fn test_classify_ok() {
        let content = with_header("fn main() {}\n");
        assert_eq!(classify(&content), HeaderState::Ok);
    }

    #[test]
    fn test_classify_stale_after_body_edit() {
        let content = with_header("fn main() {}\n");
        let edited = content.replace("fn main() {}", "fn main() { run(); }");
        assert_eq!(classify(&edited), HeaderState::Stale);
    }

    #[test]
    fn test_classify_stale_without_hash_field() {
        let content = format!(
            "// {}\n// Summary only, no hash.\n// {}\nfn main() {{}}\n",
            HEADER_OPEN, HEADER_CLOSE
        );
        assert_eq!(classify(&content), HeaderState::Stale);
    }

    #[test]
    fn test_header_must_open_on_first_line() {
        let content = format!(
            "fn early() {{}}\n// {}\n// doc-hash: 0000000000000000\n// {}\n",
            HEADER_OPEN, HEADER_CLOSE
        );
        assert_eq!(classify(&content), HeaderState::Missing);
    }

    #[test]
    fn test_unclosed_header_is_missing() {
        let content = format!("// {}\n// still going\n", HEADER_OPEN);
        assert_eq!(classify(&content), HeaderState::Missing);
    }

    #[test]
    fn test_body_of_roundtrip() {
        let body = "fn main() {}\nfn other() {}\n";
        let content = with_header(body);
        assert_eq!(body_of(&content), body);

        // No header means the whole content is the body
        assert_eq!(body_of(body), body);
    }

    #[test]
    fn test_render_header_python_leader() {
        let body = "import os\n";
        let header = render_header("Utility script.\n\nSecond paragraph.", body, "#");
        assert!(header.starts_with(&format!("# {}\n", HEADER_OPEN)));
        assert!(header.contains("# Utility script."));
        assert!(header.contains(&format!("# doc-hash: {}", body_hash(body))));
        assert!(header.ends_with(&format!("# {}\n", HEADER_CLOSE)));
        // Blank header lines keep a bare leader
        assert!(header.contains("\n#\n"));
    }
}
