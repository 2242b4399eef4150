use crate::db::SqliteStore;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::db_conn;
use crate::ipc::types::{AppState, Request};
use crate::store::StudentStore;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn);

    match store.list_students(state.cfg.student_list_limit) {
        Ok(students) => {
            let count = students.len();
            ok(&req.id, json!({ "students": students, "count": count }))
        }
        Err(e) => err(
            &req.id,
            "internal",
            "Unable to load student list",
            Some(json!({ "details": e.to_string() })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        _ => None,
    }
}
