//! Auto-update engine.
//!
//! Obtains a proposed header for a flagged file from the generation
//! service and assembles the candidate rewrite. The candidate is never
//! written here; the runner hands it to the validator first.

use std::path::Path;
use std::time::Duration;

use crate::enforce::header;
use crate::error::GenerationError;
use crate::ipc::{GenerateDocHeaderRequest, IpcClient};

/// Project identity passed along to the generation service.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub project_id: String,
    pub project_root: String,
}

/// Request a header proposal for one file, with a bounded timeout.
pub async fn propose(
    client: &IpcClient,
    context: &ProjectContext,
    path: &Path,
    content: &str,
    timeout_secs: u64,
) -> Result<String, GenerationError> {
    if !client.is_service_running().await {
        return Err(GenerationError::ServiceUnavailable(
            client.socket_path().to_string(),
        ));
    }

    let request = GenerateDocHeaderRequest {
        project_id: context.project_id.clone(),
        project_root: context.project_root.clone(),
        file_path: path.to_string_lossy().to_string(),
        file_content: content.to_string(),
    };

    let call = client.generate_doc_header(request);
    let response = tokio::time::timeout(Duration::from_secs(timeout_secs), call)
        .await
        .map_err(|_| GenerationError::Timeout(timeout_secs))?
        .map_err(|e| GenerationError::Rpc(e.to_string()))?;

    let trimmed = response.header.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

/// Assemble the candidate: new header block above the unchanged body.
///
/// Any existing (stale) header is replaced; the remainder of the file is
/// carried over byte-for-byte.
pub fn build_candidate(original: &str, header_text: &str, leader: &str) -> String {
    let body = header::body_of(original);
    format!("{}{}", header::render_header(header_text, body, leader), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::header::{classify, HeaderState};
    use crate::enforce::validator::{validate, Verdict};
    use std::path::PathBuf;

    const BODY: &str = "fn run() -> u8 {\n    7\n}\n";

    #[test]
    fn test_build_candidate_fresh_file() {
        let candidate = build_candidate(BODY, "Runs the thing.", "//");

        assert_eq!(classify(&candidate), HeaderState::Ok);
        assert!(candidate.ends_with(BODY));
        assert!(candidate.contains("// Runs the thing."));
    }

    #[test]
    fn test_build_candidate_replaces_stale_header() {
        let stale = build_candidate(BODY, "Old summary.", "//").replace("7", "8");
        assert_eq!(classify(&stale), HeaderState::Stale);

        let refreshed = build_candidate(&stale, "New summary.", "//");
        assert_eq!(classify(&refreshed), HeaderState::Ok);
        assert!(!refreshed.contains("Old summary."));
        assert!(refreshed.contains("New summary."));
    }

    #[test]
    fn test_candidate_validates() {
        let candidate = build_candidate(BODY, "Runs the thing.", "//");
        let outcome = validate(&PathBuf::from("src/run.rs"), BODY, &candidate, 4096);
        assert_eq!(outcome.verdict, Verdict::Pass);
    }
}
