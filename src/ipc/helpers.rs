use rusqlite::Connection;
use serde_json::json;

use crate::context::ContextError;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Map a loader failure onto the response envelope. Not-found stays
/// actionable (prn + hint + suggestions); anything else surfaces only a
/// short description.
pub fn context_err(id: &str, e: ContextError, what: &str) -> serde_json::Value {
    match e {
        ContextError::NotFound { prn, suggestions } => err(
            id,
            "student_not_found",
            "Student not found",
            Some(json!({
                "prn": prn,
                "hint": "Use exact PRN from students table.",
                "suggestions": suggestions,
            })),
        ),
        ContextError::Store(e) => err(
            id,
            "internal",
            format!("Unable to load {what}"),
            Some(json!({ "details": e.to_string() })),
        ),
    }
}
