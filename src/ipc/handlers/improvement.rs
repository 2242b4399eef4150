use crate::analytics;
use crate::context::load_student_context;
use crate::db::SqliteStore;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{context_err, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::info;

fn handle_improvement(state: &mut AppState, req: &Request) -> serde_json::Value {
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
        Err(e) => return context_err(&req.id, e, "improvement plan"),
    };

    let focus_areas = analytics::derive_focus_areas(ctx.latest_subjects());
    let prompt = crate::plan::build_prompt(&ctx.student, &ctx.semesters, &ctx.skills, &focus_areas);
    let outcome = crate::plan::synthesize(state.generator.as_ref(), &prompt);

    let resolved = match crate::plan::resolve_plan(
        outcome,
        state.cfg.gemini.required,
        &ctx.student.name,
        &focus_areas,
        &ctx.skills,
    ) {
        Ok(resolved) => resolved,
        Err(e) => {
            return err(
                &req.id,
                "generation_required_failed",
                e.to_string(),
                Some(json!({ "details": e.details })),
            );
        }
    };
    info!(prn = %ctx.student.prn, ai_status = resolved.ai_status, "improvement plan resolved");

    let mut payload = match serde_json::to_value(&resolved.plan) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "internal",
                "Unable to load improvement plan",
                Some(json!({ "details": e.to_string() })),
            );
        }
    };
    payload["student"] = json!({ "prn": ctx.student.prn, "name": ctx.student.name });
    payload["ai_status"] = json!(resolved.ai_status);
    payload["gemini_configured"] = json!(state.generator.is_configured());
    if let Some(ai_error) = resolved.ai_error {
        payload["ai_error"] = json!(ai_error);
    }
    payload["sgpa_trend"] = json!(analytics::sgpa_trend(&ctx.semesters));
    payload["recommendations_started"] = json!(resolved.plan.recommendations.len());
    payload["skills_count"] = json!(ctx.skills.len());
    payload["generated_at"] = json!(chrono::Utc::now().to_rfc3339());

    ok(&req.id, payload)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.improvement" => Some(handle_improvement(state, req)),
        _ => None,
    }
}
