use crate::analytics;
use crate::context::load_student_context;
use crate::db::SqliteStore;
use crate::ipc::error::ok;
use crate::ipc::helpers::{context_err, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_progress(state: &mut AppState, req: &Request) -> serde_json::Value {
    let prn = match required_str(req, "prn") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let ctx = match load_student_context(&SqliteStore::new(conn), &prn) {
        Ok(ctx) => ctx,
        Err(e) => return context_err(&req.id, e, "progress"),
    };

    let subjects = analytics::subject_progress(ctx.latest_subjects());
    let goals = analytics::goals(&subjects);

    ok(
        &req.id,
        json!({
            "student": { "prn": ctx.student.prn, "name": ctx.student.name },
            "current_semester": ctx.latest().map(|s| s.semester.clone()),
            "subjects": subjects,
            "sgpa_trend": analytics::sgpa_trend(&ctx.semesters),
            "twelfth_radar": analytics::twelfth_radar(&ctx.student),
            "skills": ctx.skills,
            "goals": goals,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.progress" => Some(handle_progress(state, req)),
        _ => None,
    }
}
