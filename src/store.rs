use serde::Serialize;
use std::collections::HashMap;

/// Base profile plus the optional 12th-grade marks joined onto it.
/// Absent marks stay absent; they are never zero-filled.
#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub prn: String,
    pub name: String,
    pub physics: Option<i64>,
    pub chemistry: Option<i64>,
    pub mathematics: Option<i64>,
    pub english: Option<i64>,
    pub computer_science: Option<i64>,
    pub twelfth_percentage: Option<f64>,
}

impl StudentProfile {
    pub fn twelfth_pairs(&self) -> Vec<(&'static str, i64)> {
        [
            ("Physics", self.physics),
            ("Chemistry", self.chemistry),
            ("Mathematics", self.mathematics),
            ("English", self.english),
            ("Computer Science", self.computer_science),
        ]
        .into_iter()
        .filter_map(|(label, score)| score.map(|s| (label, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRef {
    pub prn: String,
    pub name: String,
}

/// One row of a semester table, column-sparse: only columns that exist
/// in the table and hold a non-NULL value appear in `scores`.
#[derive(Debug, Clone, Default)]
pub struct SemesterRow {
    pub sgpa: Option<f64>,
    pub scores: HashMap<String, i64>,
}

/// Query-only capability contract onto the relational store. One trait
/// so the loaders can be exercised against any backing implementation.
pub trait StudentStore {
    fn table_exists(&self, table: &str) -> anyhow::Result<bool>;
    fn fetch_profile(&self, prn: &str) -> anyhow::Result<Option<StudentProfile>>;
    fn fetch_suggestions(&self, prefix: &str, limit: i64) -> anyhow::Result<Vec<StudentRef>>;
    fn list_students(&self, limit: i64) -> anyhow::Result<Vec<StudentRef>>;
    fn fetch_skills(&self, prn: &str) -> anyhow::Result<Vec<String>>;
    fn fetch_semester_row(&self, table: &str, prn: &str) -> anyhow::Result<Option<SemesterRow>>;
    fn count_sgpa_above(&self, table: &str, sgpa: f64) -> anyhow::Result<i64>;
    fn count_rows(&self, table: &str) -> anyhow::Result<i64>;
}
