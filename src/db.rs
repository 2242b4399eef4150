use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use crate::store::{SemesterRow, StudentProfile, StudentRef, StudentStore};

/// Open the workspace database. Student data is provisioned by the
/// institution's import tooling; this daemon only reads it, so a
/// missing workspace is a selection error, not a fresh store.
pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    let db_path = workspace.join("eduvision.sqlite3");
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

/// `StudentStore` over a live SQLite connection.
///
/// The dynamic table names fed into `format!` below come exclusively
/// from the fixed period catalog, never from request input.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore { conn }
    }
}

impl StudentStore for SqliteStore<'_> {
    fn table_exists(&self, table: &str) -> anyhow::Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    fn fetch_profile(&self, prn: &str) -> anyhow::Result<Option<StudentProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT
                    s.prn,
                    s.name,
                    m.physics,
                    m.chemistry,
                    m.mathematics,
                    m.english,
                    m.computer_science,
                    m.percentage
                 FROM students s
                 LEFT JOIN marks_12th m ON s.prn = m.prn
                 WHERE s.prn = ?",
                [prn],
                |r| {
                    Ok(StudentProfile {
                        prn: r.get(0)?,
                        name: r.get(1)?,
                        physics: r.get(2)?,
                        chemistry: r.get(3)?,
                        mathematics: r.get(4)?,
                        english: r.get(5)?,
                        computer_science: r.get(6)?,
                        twelfth_percentage: r.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn fetch_suggestions(&self, prefix: &str, limit: i64) -> anyhow::Result<Vec<StudentRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT prn, name FROM students WHERE prn LIKE ? ORDER BY prn LIMIT ?")?;
        let rows = stmt
            .query_map((format!("{prefix}%"), limit), |r| {
                Ok(StudentRef {
                    prn: r.get(0)?,
                    name: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list_students(&self, limit: i64) -> anyhow::Result<Vec<StudentRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT prn, name FROM students ORDER BY prn LIMIT ?")?;
        let rows = stmt
            .query_map([limit], |r| {
                Ok(StudentRef {
                    prn: r.get(0)?,
                    name: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn fetch_skills(&self, prn: &str) -> anyhow::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT skill_name FROM student_skills WHERE prn = ? ORDER BY skill_name ASC",
        )?;
        let rows = stmt
            .query_map([prn], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn fetch_semester_row(&self, table: &str, prn: &str) -> anyhow::Result<Option<SemesterRow>> {
        let sql = format!("SELECT * FROM {table} WHERE prn = ?");
        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query([prn])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut out = SemesterRow::default();
        for (idx, column) in columns.iter().enumerate() {
            match row.get_ref(idx)? {
                ValueRef::Null => {}
                value if column == "sgpa" => {
                    out.sgpa = match value {
                        ValueRef::Integer(v) => Some(v as f64),
                        ValueRef::Real(v) => Some(v),
                        _ => None,
                    };
                }
                ValueRef::Integer(v) => {
                    out.scores.insert(column.clone(), v);
                }
                ValueRef::Real(v) => {
                    out.scores.insert(column.clone(), v as i64);
                }
                // prn and any other text columns are not scores.
                _ => {}
            }
        }
        Ok(Some(out))
    }

    fn count_sgpa_above(&self, table: &str, sgpa: f64) -> anyhow::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE sgpa > ?");
        let count: i64 = self.conn.query_row(&sql, [sgpa], |r| r.get(0))?;
        Ok(count)
    }

    fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(count)
    }
}
