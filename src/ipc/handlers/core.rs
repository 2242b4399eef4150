use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let database = match state.db.as_ref() {
        Some(conn) => match conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0)) {
            Ok(1) => "connected",
            Ok(_) => "unknown",
            Err(_) => "error",
        },
        None => "disconnected",
    };

    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspace": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "database": database,
            "gemini_configured": state.generator.is_configured(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            ok(&req.id, json!({ "workspace": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
