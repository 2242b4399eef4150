use crate::analytics;
use crate::context::load_student_context;
use crate::db::SqliteStore;
use crate::ipc::error::ok;
use crate::ipc::helpers::{context_err, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_reports(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        Err(e) => return context_err(&req.id, e, "reports"),
    };

    let reports: Vec<serde_json::Value> = ctx
        .semesters
        .iter()
        .map(|sem| {
            json!({
                "semester": sem.semester,
                "sgpa": sem.sgpa,
                "subjects": sem.subjects,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "student": { "prn": ctx.student.prn, "name": ctx.student.name },
            "summary": {
                "twelfth_percentage": ctx.student.twelfth_percentage,
                "current_sgpa": ctx.latest().and_then(|s| s.sgpa),
                "class_rank": ctx.rank,
                "class_size": ctx.class_size,
                "semesters_completed": ctx.semesters.len(),
                "overall_cgpa": analytics::overall_cgpa(&ctx.semesters),
            },
            "reports": reports,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.reports" => Some(handle_reports(state, req)),
        _ => None,
    }
}
