//! FFI use-case API for Flutter-facing editor calls.
//!
//! # Responsibility
//! - Expose editor sessions to Dart via FRB as stable, use-case-level calls.
//! - Flatten core errors into response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Sessions live in a process-wide registry keyed by UUID string.
//! - Every mutating call returns the resulting document JSON and markup.

use log::{info, warn};
use richnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, render_html,
    BlockFormat, DialogKind, Document, EditorSession, MarkFormat, Path, Point, Range,
    ToolbarCommand,
};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;

static SESSIONS: OnceLock<Mutex<HashMap<Uuid, EditorSession>>> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Response envelope for every editor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Session the call addressed, when known.
    pub session_id: Option<String>,
    /// Current document in the editor JSON value shape.
    pub document_json: Option<String>,
    /// Current document rendered to HTML.
    pub html: Option<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EditorResponse {
    fn snapshot(session: &EditorSession, message: impl Into<String>) -> Self {
        match session.document().to_json_string() {
            Ok(json) => Self {
                ok: true,
                session_id: Some(session.id().to_string()),
                document_json: Some(json),
                html: Some(render_html(session.document())),
                can_undo: session.can_undo(),
                can_redo: session.can_redo(),
                message: message.into(),
            },
            Err(err) => Self::failure(format!("document encode failed: {err}")),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            session_id: None,
            document_json: None,
            html: None,
            can_undo: false,
            can_redo: false,
            message: message.into(),
        }
    }
}

/// Toolbar button state envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarStateResponse {
    pub ok: bool,
    /// Active mark ids (`bold|italic|underline`).
    pub active_marks: Vec<String>,
    /// Active block format ids (`heading-one`, `bulleted-list`, ...).
    pub active_blocks: Vec<String>,
    pub link_active: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub message: String,
}

/// Opens a session on `initial_value_json`, or on one empty paragraph.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Never panics; invalid JSON or an invalid tree returns `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_open(initial_value_json: Option<String>) -> EditorResponse {
    let document = match initial_value_json.as_deref().map(str::trim) {
        None | Some("") => Document::default(),
        Some(json) => match Document::from_json_str(json) {
            Ok(document) => document,
            Err(err) => return EditorResponse::failure(format!("editor_open failed: {err}")),
        },
    };
    let session = EditorSession::new(document);
    let response = EditorResponse::snapshot(&session, "Session opened.");
    let mut sessions = registry();
    info!(
        "event=ffi_session_open module=ffi status=ok session={} open_sessions={}",
        session.id(),
        sessions.len() + 1
    );
    sessions.insert(session.id(), session);
    response
}

/// Drops a session and its history.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_close(session_id: String) -> EditorResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(message) => return EditorResponse::failure(message),
    };
    match registry().remove(&id) {
        Some(_) => EditorResponse {
            ok: true,
            session_id: Some(id.to_string()),
            message: "Session closed.".to_string(),
            ..EditorResponse::failure("")
        },
        None => EditorResponse::failure(format!("unknown session `{id}`")),
    }
}

/// Returns the current document of a session without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_snapshot(session_id: String) -> EditorResponse {
    run_on_session(&session_id, "editor_snapshot", |_| Ok("Snapshot.".to_string()))
}

/// Moves the selection. Paths are child indexes from the root.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_select(
    session_id: String,
    anchor_path: Vec<u32>,
    anchor_offset: u32,
    focus_path: Vec<u32>,
    focus_offset: u32,
) -> EditorResponse {
    let range = Range::new(
        to_point(&anchor_path, anchor_offset),
        to_point(&focus_path, focus_offset),
    );
    run_on_session(&session_id, "editor_select", move |session| {
        session
            .select(range)
            .map(|()| "Selection updated.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Types `text` at the cursor.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_insert_text(session_id: String, text: String) -> EditorResponse {
    run_on_session(&session_id, "editor_insert_text", move |session| {
        session
            .insert_text(&text)
            .map(|()| "Text inserted.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Runs one toolbar command, e.g. `toggle_block` + `bulleted-list`.
///
/// # FFI contract
/// - Unknown commands, bad arguments and rejected edits return `ok=false`
///   and leave the session unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_toolbar_command(
    session_id: String,
    command: String,
    argument: Option<String>,
) -> EditorResponse {
    let command = match ToolbarCommand::parse(&command, argument.as_deref()) {
        Ok(command) => command,
        Err(err) => return EditorResponse::failure(format!("editor_toolbar_command failed: {err}")),
    };
    let name = command.name();
    run_on_session(&session_id, "editor_toolbar_command", move |session| {
        session
            .dispatch(command)
            .map(|()| format!("{name} applied."))
            .map_err(|err| err.to_string())
    })
}

/// Submits an insertion dialog (`link|image|embed`) with its raw input.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_submit_dialog(session_id: String, kind: String, input: String) -> EditorResponse {
    let kind = match kind.trim() {
        "link" => DialogKind::Link,
        "image" => DialogKind::Image,
        "embed" => DialogKind::Embed,
        other => {
            return EditorResponse::failure(format!("unsupported dialog kind `{other}`"));
        }
    };
    run_on_session(&session_id, "editor_submit_dialog", move |session| {
        let mut dialog = session.open_dialog(kind);
        dialog.set_input(input);
        session
            .submit_dialog(dialog)
            .map(|()| format!("{} inserted.", kind.as_str()))
            .map_err(|err| err.to_string())
    })
}

/// Reports toolbar button state for the current selection.
#[flutter_rust_bridge::frb(sync)]
pub fn editor_toolbar_state(session_id: String) -> ToolbarStateResponse {
    let failure = |message: String| ToolbarStateResponse {
        ok: false,
        active_marks: Vec::new(),
        active_blocks: Vec::new(),
        link_active: false,
        can_undo: false,
        can_redo: false,
        message,
    };
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(message) => return failure(message),
    };
    let sessions = registry();
    let Some(session) = sessions.get(&id) else {
        return failure(format!("unknown session `{id}`"));
    };
    let state = session.toolbar_state();
    ToolbarStateResponse {
        ok: true,
        active_marks: state
            .active_marks
            .iter()
            .map(|format| MarkFormat::as_str(*format).to_string())
            .collect(),
        active_blocks: state
            .active_blocks
            .iter()
            .map(|format| BlockFormat::as_str(*format).to_string())
            .collect(),
        link_active: state.link_active,
        can_undo: state.can_undo,
        can_redo: state.can_redo,
        message: String::new(),
    }
}

fn registry() -> std::sync::MutexGuard<'static, HashMap<Uuid, EditorSession>> {
    SESSIONS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn parse_session_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid session id: {err}"))
}

fn to_point(path: &[u32], offset: u32) -> Point {
    let path: Vec<usize> = path.iter().map(|index| *index as usize).collect();
    Point::new(Path::from(path), offset as usize)
}

fn run_on_session(
    session_id: &str,
    call: &'static str,
    f: impl FnOnce(&mut EditorSession) -> Result<String, String>,
) -> EditorResponse {
    let id = match parse_session_id(session_id) {
        Ok(id) => id,
        Err(message) => return EditorResponse::failure(format!("{call} failed: {message}")),
    };
    let mut sessions = registry();
    let Some(session) = sessions.get_mut(&id) else {
        return EditorResponse::failure(format!("{call} failed: unknown session `{id}`"));
    };
    match f(session) {
        Ok(message) => EditorResponse::snapshot(session, message),
        Err(message) => {
            warn!("event=ffi_call module=ffi status=error call={call} session={id}");
            EditorResponse {
                ok: false,
                message: format!("{call} failed: {message}"),
                ..EditorResponse::snapshot(session, "")
            }
        }
    }
}
