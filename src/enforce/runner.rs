//! Enforcement runner: the pre-commit hook payload.
//!
//! Executed synchronously by git via the installed artifact. Reads the
//! staging area, classifies files, and applies the active mode. All
//! event/health persistence is best-effort: a store failure prints a
//! warning and never changes the commit's fate.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::db::{Database, EnforcementEvent, EventType};
use crate::enforce::engine::{self, ProjectContext};
use crate::enforce::header::{self, HeaderState};
use crate::enforce::validator::{self, Verdict};
use crate::error::Error;
use crate::git;
use crate::health::{self, CommitReport};
use crate::hook::mode::{self, HookMode};
use crate::ipc::IpcClient;

/// Event source recorded for runner-written events.
const SOURCE: &str = "hook-runner";

/// A staged file needing a header, with its loaded content.
struct FlaggedFile {
    path: PathBuf,
    state: HeaderState,
    content: String,
    leader: &'static str,
}

impl FlaggedFile {
    fn state_label(&self) -> &'static str {
        match self.state {
            HeaderState::Missing => "missing",
            HeaderState::Stale => "stale",
            HeaderState::Ok => "ok",
        }
    }
}

/// Run the pre-commit enforcement pass. Returns the exit code for git.
pub async fn run(project_root: &Path) -> Result<i32, Error> {
    let detection = mode::detect(project_root);
    let hook_mode = match detection.mode {
        None | Some(HookMode::Off) | Some(HookMode::External) => return Ok(0),
        Some(m) => m,
    };

    let staged = git::staged_files(project_root)?;
    run_with_staged(project_root, hook_mode, staged).await
}

/// Enforcement pass over an explicit staged-file list.
pub async fn run_with_staged(
    project_root: &Path,
    hook_mode: HookMode,
    staged: Vec<PathBuf>,
) -> Result<i32, Error> {
    let config = Config::load_or_default(project_root);
    let project_id = config.project_id(project_root);

    let flagged = collect_flagged(project_root, &config, &staged);
    debug!(
        staged = staged.len(),
        flagged = flagged.len(),
        mode = %hook_mode,
        "Pre-commit enforcement pass"
    );

    // Store failures must never fail a commit.
    let db = match Database::open_project(project_root) {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("docsentry: warning: state store unavailable: {}", e);
            None
        }
    };

    let mut report = CommitReport::default();
    let exit_code = match hook_mode {
        HookMode::Off | HookMode::External => 0,
        HookMode::Warn => {
            for file in &flagged {
                eprintln!(
                    "docsentry: warning: {} doc header: {}",
                    file.state_label(),
                    file.path.display()
                );
                log_event(
                    &db,
                    EnforcementEvent::new(
                        &project_id,
                        EventType::Warning,
                        SOURCE,
                        format!("Doc header {}", file.state_label()),
                        Some(&file.path.to_string_lossy()),
                    ),
                );
            }
            0
        }
        HookMode::Block => {
            for file in &flagged {
                eprintln!(
                    "docsentry: blocked: {} doc header: {}",
                    file.state_label(),
                    file.path.display()
                );
                log_event(
                    &db,
                    EnforcementEvent::new(
                        &project_id,
                        EventType::Block,
                        SOURCE,
                        format!("Commit blocked: doc header {}", file.state_label()),
                        Some(&file.path.to_string_lossy()),
                    ),
                );
            }
            if flagged.is_empty() {
                0
            } else {
                eprintln!(
                    "docsentry: commit blocked, {} file(s) need doc headers",
                    flagged.len()
                );
                1
            }
        }
        HookMode::AutoUpdate => {
            auto_update(project_root, &config, &project_id, &db, &flagged, &mut report).await?;
            0
        }
    };

    // Exactly one aggregate report to the supervisor per commit.
    if let Some(db) = &db {
        if let Err(e) = health::record_commit(
            db,
            project_root,
            &project_id,
            config.health.downgrade_threshold,
            &report,
        ) {
            eprintln!("docsentry: warning: failed to record hook health: {}", e);
        }
    }

    Ok(exit_code)
}

/// Load and classify staged files; keep only those needing a header.
fn collect_flagged(
    project_root: &Path,
    config: &Config,
    staged: &[PathBuf],
) -> Vec<FlaggedFile> {
    let mut flagged = Vec::new();

    for path in staged {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !config.enforce.extensions.iter().any(|e| e == ext) {
            continue;
        }
        if is_excluded(path, config) {
            continue;
        }
        let Some(leader) = header::comment_leader(path) else {
            continue;
        };

        // Unreadable or non-UTF-8 files are skipped, never enforced.
        let Ok(bytes) = fs::read(project_root.join(path)) else {
            continue;
        };
        let Ok(content) = String::from_utf8(bytes) else {
            continue;
        };

        let state = header::classify(&content);
        if state != HeaderState::Ok {
            flagged.push(FlaggedFile {
                path: path.clone(),
                state,
                content,
                leader,
            });
        }
    }

    flagged
}

fn is_excluded(path: &Path, config: &Config) -> bool {
    let path_str = path.to_string_lossy();
    config
        .enforce
        .exclude_paths
        .iter()
        .any(|prefix| path_str.starts_with(prefix.as_str()))
}

/// Auto-update pass: propose, validate, write, re-stage.
///
/// Per-file generation/validation failures degrade to a recorded warning;
/// they never block the commit and never touch the file.
async fn auto_update(
    project_root: &Path,
    config: &Config,
    project_id: &str,
    db: &Option<Database>,
    flagged: &[FlaggedFile],
    report: &mut CommitReport,
) -> Result<(), Error> {
    if flagged.is_empty() {
        return Ok(());
    }

    let client = IpcClient::new(config.auto_update.socket_path.clone());
    let context = ProjectContext {
        project_id: project_id.to_string(),
        project_root: project_root.to_string_lossy().to_string(),
    };

    for file in flagged {
        let proposal = engine::propose(
            &client,
            &context,
            &file.path,
            &file.content,
            config.auto_update.timeout_secs,
        )
        .await;

        let header_text = match proposal {
            Ok(text) => text,
            Err(e) => {
                record_file_failure(db, project_id, report, file, &e.to_string());
                continue;
            }
        };

        let candidate = engine::build_candidate(&file.content, &header_text, file.leader);
        let outcome = validator::validate(
            &file.path,
            &file.content,
            &candidate,
            config.auto_update.max_header_delta,
        );

        match outcome.verdict {
            Verdict::Pass => {
                let abs = project_root.join(&file.path);
                if let Err(e) = write_file_atomic(&abs, &candidate) {
                    record_file_failure(db, project_id, report, file, &format!("write: {}", e));
                    continue;
                }
                // A git failure here is an environment problem, not a
                // validation one; it surfaces as an error.
                git::stage_file(project_root, &file.path)?;

                eprintln!(
                    "docsentry: auto-updated {} doc header: {}",
                    file.state_label(),
                    file.path.display()
                );
                log_event(
                    db,
                    EnforcementEvent::new(
                        project_id,
                        EventType::AutoFix,
                        SOURCE,
                        format!("Auto-generated doc header ({})", file.state_label()),
                        Some(&file.path.to_string_lossy()),
                    ),
                );
                report.files_rewritten += 1;
            }
            Verdict::Fail => {
                let reason = outcome
                    .failure_kind
                    .map(|k| k.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN".to_string());
                record_file_failure(db, project_id, report, file, &reason);
            }
        }
    }

    Ok(())
}

/// A per-file failure: file stays untouched, warning recorded, commit
/// continues.
fn record_file_failure(
    db: &Option<Database>,
    project_id: &str,
    report: &mut CommitReport,
    file: &FlaggedFile,
    reason: &str,
) {
    eprintln!(
        "docsentry: warning: auto-update failed for {} ({}), file left unchanged",
        file.path.display(),
        reason
    );
    log_event(
        db,
        EnforcementEvent::new(
            project_id,
            EventType::Warning,
            SOURCE,
            format!("Auto-update failed: {}", reason),
            Some(&file.path.to_string_lossy()),
        ),
    );
    report.any_failure = true;
    report.failed_file = Some(file.path.to_string_lossy().to_string());
    report.failure_reason = Some(reason.to_string());
}

fn log_event(db: &Option<Database>, event: EnforcementEvent) {
    if let Some(db) = db {
        if let Err(e) = db.insert_event(&event) {
            eprintln!("docsentry: warning: failed to record event: {}", e);
        }
    }
}

/// Write-to-temp-then-rename so a crash mid-write leaves the original
/// file intact.
fn write_file_atomic(path: &Path, content: &str) -> Result<(), Error> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;

    // Keep the original file's permissions on the replacement.
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::installer;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::UnixListener;

    fn project_with_hook(hook_mode: HookMode) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();
        installer::install(dir.path(), hook_mode, false).unwrap();
        dir
    }

    fn write_project_config(root: &Path, socket_path: &str) {
        std::fs::create_dir_all(Config::dir(root)).unwrap();
        let mut config = Config::new_project();
        config.auto_update.socket_path = socket_path.to_string();
        config.auto_update.timeout_secs = 5;
        config.save(root).unwrap();
    }

    fn stage_fixture(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        PathBuf::from(rel)
    }

    /// Serve one generate_doc_header request, responding with `header`.
    fn spawn_fake_generator(socket_path: &str, header: String) {
        let listener = UnixListener::bind(socket_path).unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let (read_half, mut write_half) = stream.into_split();
                let mut reader = BufReader::new(read_half);
                let mut line = String::new();
                // Liveness probes connect and hang up without sending anything.
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    continue;
                }
                let request: serde_json::Value = serde_json::from_str(&line).unwrap();
                let response = json!({
                    "jsonrpc": "2.0",
                    "result": { "header": header },
                    "error": null,
                    "id": request["id"],
                });
                let _ = write_half
                    .write_all(format!("{}\n", response).as_bytes())
                    .await;
            }
        });
    }

    #[tokio::test]
    async fn test_warn_mode_exits_zero_and_records_warning() {
        let dir = project_with_hook(HookMode::Warn);
        write_project_config(dir.path(), "/tmp/unused.sock");
        let staged = vec![stage_fixture(dir.path(), "src/lib.rs", "pub fn f() {}\n")];

        let code = run_with_staged(dir.path(), HookMode::Warn, staged)
            .await
            .unwrap();
        assert_eq!(code, 0);

        let config = Config::load(dir.path()).unwrap();
        let database = Database::open_project(dir.path()).unwrap();
        let events = database
            .get_events(&config.project_id(dir.path()), 10)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Warning);
        assert_eq!(events[0].file_path.as_deref(), Some("src/lib.rs"));
    }

    #[tokio::test]
    async fn test_block_mode_exits_one_on_missing_header() {
        let dir = project_with_hook(HookMode::Block);
        write_project_config(dir.path(), "/tmp/unused.sock");
        let staged = vec![
            stage_fixture(dir.path(), "src/a.rs", "pub fn a() {}\n"),
            stage_fixture(dir.path(), "src/b.rs", "pub fn b() {}\n"),
        ];

        let code = run_with_staged(dir.path(), HookMode::Block, staged)
            .await
            .unwrap();
        assert_eq!(code, 1);

        let config = Config::load(dir.path()).unwrap();
        let database = Database::open_project(dir.path()).unwrap();
        let events = database
            .get_events(&config.project_id(dir.path()), 10)
            .unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.event_type == EventType::Block));
    }

    #[tokio::test]
    async fn test_block_mode_exits_zero_when_headers_present() {
        let dir = project_with_hook(HookMode::Block);
        write_project_config(dir.path(), "/tmp/unused.sock");
        let body = "pub fn a() {}\n";
        let content = engine::build_candidate(body, "Has a header.", "//");
        let staged = vec![stage_fixture(dir.path(), "src/a.rs", &content)];

        let code = run_with_staged(dir.path(), HookMode::Block, staged)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_off_mode_records_nothing() {
        let dir = project_with_hook(HookMode::Off);
        write_project_config(dir.path(), "/tmp/unused.sock");
        let _staged = stage_fixture(dir.path(), "src/lib.rs", "pub fn f() {}\n");

        let code = run(dir.path()).await.unwrap();
        assert_eq!(code, 0);

        let config = Config::load(dir.path()).unwrap();
        let database = Database::open_project(dir.path()).unwrap();
        assert!(database
            .get_events(&config.project_id(dir.path()), 10)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_auto_update_corrupt_proposal_leaves_file_untouched() {
        let dir = project_with_hook(HookMode::AutoUpdate);
        let socket = dir.path().join("gen.sock");
        let socket = socket.to_string_lossy().to_string();
        write_project_config(dir.path(), &socket);

        // Generated header smuggles a second closing sentinel: the
        // candidate tail becomes ambiguous and validation must fail.
        spawn_fake_generator(
            &socket,
            format!("Nice summary.\n{}", header::HEADER_CLOSE),
        );

        let original = "pub fn f() {}\n";
        let staged = vec![stage_fixture(dir.path(), "src/lib.rs", original)];

        let code = run_with_staged(dir.path(), HookMode::AutoUpdate, staged)
            .await
            .unwrap();
        assert_eq!(code, 0);

        // File untouched
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap(),
            original
        );

        // Failure recorded: warning event + consecutive_failures = 1
        let config = Config::load(dir.path()).unwrap();
        let project_id = config.project_id(dir.path());
        let database = Database::open_project(dir.path()).unwrap();
        let events = database.get_events(&project_id, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Warning);
        assert!(events[0].message.contains("TAIL_MISMATCH"));

        let hook_health = database.get_health(&project_id).unwrap().unwrap();
        assert_eq!(hook_health.consecutive_failures, 1);
        assert!(!hook_health.downgraded);
    }

    #[tokio::test]
    async fn test_auto_update_downgrades_after_third_failing_commit() {
        let dir = project_with_hook(HookMode::AutoUpdate);
        let socket = dir.path().join("gen.sock");
        let socket = socket.to_string_lossy().to_string();
        write_project_config(dir.path(), &socket);
        spawn_fake_generator(
            &socket,
            format!("Nice summary.\n{}", header::HEADER_CLOSE),
        );

        let staged = vec![stage_fixture(dir.path(), "src/lib.rs", "pub fn f() {}\n")];

        for _ in 0..3 {
            let code = run_with_staged(dir.path(), HookMode::AutoUpdate, staged.clone())
                .await
                .unwrap();
            assert_eq!(code, 0);
        }

        assert_eq!(mode::detect(dir.path()).mode, Some(HookMode::Warn));

        let config = Config::load(dir.path()).unwrap();
        let project_id = config.project_id(dir.path());
        let database = Database::open_project(dir.path()).unwrap();
        let hook_health = database.get_health(&project_id).unwrap().unwrap();
        assert!(hook_health.downgraded);
        assert_eq!(hook_health.consecutive_failures, 3);

        let events = database.get_events(&project_id, 10).unwrap();
        assert!(events
            .iter()
            .any(|e| e.message.contains("Auto-Update Disabled (Self-Healed)")));
    }

    #[tokio::test]
    async fn test_auto_update_unreachable_service_degrades_to_warning() {
        let dir = project_with_hook(HookMode::AutoUpdate);
        write_project_config(dir.path(), "/tmp/docsentry_gone.sock");
        let original = "pub fn f() {}\n";
        let staged = vec![stage_fixture(dir.path(), "src/lib.rs", original)];

        let code = run_with_staged(dir.path(), HookMode::AutoUpdate, staged)
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap(),
            original
        );

        let config = Config::load(dir.path()).unwrap();
        let project_id = config.project_id(dir.path());
        let database = Database::open_project(dir.path()).unwrap();
        assert_eq!(
            database
                .get_health(&project_id)
                .unwrap()
                .unwrap()
                .consecutive_failures,
            1
        );
    }

    #[tokio::test]
    async fn test_auto_update_success_rewrites_and_restages() {
        // Full path including `git add`, so this test drives a real repo.
        let dir = TempDir::new().unwrap();
        let init = std::process::Command::new("git")
            .args(["init", "--initial-branch=main"])
            .current_dir(dir.path())
            .output()
            .expect("git init failed");
        assert!(init.status.success());

        installer::install(dir.path(), HookMode::AutoUpdate, false).unwrap();
        let socket = dir.path().join("gen.sock");
        let socket = socket.to_string_lossy().to_string();
        write_project_config(dir.path(), &socket);
        spawn_fake_generator(&socket, "Entry point for the fixture crate.".to_string());

        let original = "pub fn f() {}\n";
        stage_fixture(dir.path(), "src/lib.rs", original);
        let add = std::process::Command::new("git")
            .args(["add", "src/lib.rs"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(add.status.success());

        let code = run(dir.path()).await.unwrap();
        assert_eq!(code, 0);

        let rewritten = std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap();
        assert_eq!(header::classify(&rewritten), HeaderState::Ok);
        assert!(rewritten.ends_with(original));
        assert!(rewritten.contains("Entry point for the fixture crate."));

        let config = Config::load(dir.path()).unwrap();
        let project_id = config.project_id(dir.path());
        let database = Database::open_project(dir.path()).unwrap();
        let events = database.get_events(&project_id, 10).unwrap();
        assert!(events.iter().any(|e| e.event_type == EventType::AutoFix));

        let hook_health = database.get_health(&project_id).unwrap().unwrap();
        assert_eq!(hook_health.consecutive_failures, 0);
        assert_eq!(hook_health.total_successes, 1);

        // The rewritten content is what's staged now
        let staged_content = std::process::Command::new("git")
            .args(["show", ":src/lib.rs"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&staged_content.stdout), rewritten);
    }

    #[test]
    fn test_collect_flagged_filters() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();

        let missing = stage_fixture(dir.path(), "src/a.rs", "pub fn a() {}\n");
        let excluded = stage_fixture(dir.path(), "target/gen.rs", "pub fn g() {}\n");
        let other_ext = stage_fixture(dir.path(), "README.md", "# readme\n");
        let body = "pub fn ok() {}\n";
        let with_header = stage_fixture(
            dir.path(),
            "src/ok.rs",
            &engine::build_candidate(body, "Fine.", "//"),
        );
        let gone = PathBuf::from("src/deleted.rs");

        let staged = vec![missing, excluded, other_ext, with_header, gone];
        let flagged = collect_flagged(dir.path(), &config, &staged);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].path, PathBuf::from("src/a.rs"));
        assert_eq!(flagged[0].state, HeaderState::Missing);
    }

    #[test]
    fn test_write_file_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.rs");
        std::fs::write(&path, "old").unwrap();

        write_file_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        // No stray temp files left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
