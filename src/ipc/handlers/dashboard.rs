use crate::analytics;
use crate::context::load_student_context;
use crate::db::SqliteStore;
use crate::ipc::error::ok;
use crate::ipc::helpers::{context_err, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        Err(e) => return context_err(&req.id, e, "dashboard"),
    };

    let latest_subjects = ctx.latest_subjects();
    let average_subject_score = analytics::subject_average(latest_subjects);
    let current_sgpa = ctx.latest().and_then(|s| s.sgpa);
    let previous_sgpa = ctx.previous().and_then(|s| s.sgpa);
    let sgpa_change = analytics::sgpa_change(current_sgpa, previous_sgpa);
    let recent_grades = analytics::recent_grades(latest_subjects);
    let insights = analytics::insights(sgpa_change, average_subject_score, &ctx.skills);

    ok(
        &req.id,
        json!({
            "student": { "prn": ctx.student.prn, "name": ctx.student.name },
            "metrics": {
                "current_sgpa": current_sgpa,
                "sgpa_change": sgpa_change,
                "twelfth_percentage": ctx.student.twelfth_percentage,
                "average_subject_score": average_subject_score,
                "class_rank": ctx.rank,
                "class_size": ctx.class_size,
                "skills_count": ctx.skills.len(),
            },
            "progress": analytics::sgpa_trend(&ctx.semesters),
            "recent_grades": recent_grades,
            "skills": ctx.skills,
            "insights": insights,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.dashboard" => Some(handle_dashboard(state, req)),
        _ => None,
    }
}
