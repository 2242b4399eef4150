use serde::Serialize;
use thiserror::Error;

use crate::catalog;
use crate::grade::{format_subject_name, normalize_prn, score_to_grade};
use crate::store::{StudentProfile, StudentRef, StudentStore};

#[derive(Debug, Clone, Serialize)]
pub struct SubjectScore {
    pub key: String,
    pub subject: String,
    pub score: i64,
    pub grade: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterRecord {
    pub table: String,
    pub semester: String,
    pub sgpa: Option<f64>,
    pub subjects: Vec<SubjectScore>,
}

/// Everything a single view needs about one student, loaded in one pass.
#[derive(Debug)]
pub struct StudentContext {
    pub student: StudentProfile,
    pub semesters: Vec<SemesterRecord>,
    pub skills: Vec<String>,
    pub rank: Option<i64>,
    pub class_size: Option<i64>,
}

impl StudentContext {
    pub fn latest(&self) -> Option<&SemesterRecord> {
        self.semesters.last()
    }

    pub fn previous(&self) -> Option<&SemesterRecord> {
        if self.semesters.len() > 1 {
            self.semesters.get(self.semesters.len() - 2)
        } else {
            None
        }
    }

    pub fn latest_subjects(&self) -> &[SubjectScore] {
        self.latest().map(|s| s.subjects.as_slice()).unwrap_or(&[])
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Student not found")]
    NotFound {
        prn: String,
        suggestions: Vec<StudentRef>,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

const SUGGESTION_LIMIT: i64 = 5;

/// Prefix used for lookup hints: all but the last character, never
/// shorter than 3, clamped to the id itself. Counted in characters;
/// normalization can produce multi-byte uppercase forms.
fn suggestion_prefix(prn: &str) -> &str {
    let chars = prn.chars().count();
    let take = chars.saturating_sub(1).max(3).min(chars);
    match prn.char_indices().nth(take) {
        Some((offset, _)) => &prn[..offset],
        None => prn,
    }
}

fn suggestions_for(store: &dyn StudentStore, prn: &str) -> Vec<StudentRef> {
    let by_prefix = store
        .fetch_suggestions(suggestion_prefix(prn), SUGGESTION_LIMIT)
        .unwrap_or_default();
    if !by_prefix.is_empty() {
        return by_prefix;
    }
    // No shared prefix: any known students still beat an empty hint.
    store.list_students(SUGGESTION_LIMIT).unwrap_or_default()
}

fn load_semesters(
    store: &dyn StudentStore,
    prn: &str,
) -> anyhow::Result<Vec<SemesterRecord>> {
    let mut semesters = Vec::new();
    for period in catalog::SEMESTERS {
        if !store.table_exists(period.table)? {
            continue;
        }
        let Some(row) = store.fetch_semester_row(period.table, prn)? else {
            continue;
        };

        let subjects = period
            .subjects
            .iter()
            .filter_map(|&column| {
                row.scores.get(column).map(|&score| SubjectScore {
                    key: column.to_string(),
                    subject: format_subject_name(column),
                    score,
                    grade: score_to_grade(Some(score)),
                })
            })
            .collect();

        semesters.push(SemesterRecord {
            table: period.table.to_string(),
            semester: period.label.to_string(),
            sgpa: row.sgpa,
            subjects,
        });
    }
    Ok(semesters)
}

fn rank_for_semester(
    store: &dyn StudentStore,
    table: Option<&str>,
    sgpa: Option<f64>,
) -> anyhow::Result<(Option<i64>, Option<i64>)> {
    let (Some(table), Some(sgpa)) = (table, sgpa) else {
        return Ok((None, None));
    };
    if !store.table_exists(table)? {
        return Ok((None, None));
    }
    // Strictly-greater count + 1: ties share a rank.
    let higher = store.count_sgpa_above(table, sgpa)?;
    let total = store.count_rows(table)?;
    Ok((Some(higher + 1), Some(total)))
}

pub fn load_student_context(
    store: &dyn StudentStore,
    prn: &str,
) -> Result<StudentContext, ContextError> {
    let prn = normalize_prn(prn);
    let Some(student) = store.fetch_profile(&prn)? else {
        return Err(ContextError::NotFound {
            suggestions: suggestions_for(store, &prn),
            prn,
        });
    };

    let semesters = load_semesters(store, &prn)?;
    let skills = if store.table_exists("student_skills")? {
        store.fetch_skills(&prn)?
    } else {
        Vec::new()
    };

    let latest = semesters.last();
    let (rank, class_size) = rank_for_semester(
        store,
        latest.map(|s| s.table.as_str()),
        latest.and_then(|s| s.sgpa),
    )?;

    Ok(StudentContext {
        student,
        semesters,
        skills,
        rank,
        class_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_prefix_drops_last_char_min_three() {
        assert_eq!(suggestion_prefix("PRN2023001"), "PRN202300");
        assert_eq!(suggestion_prefix("PRNX"), "PRN");
        assert_eq!(suggestion_prefix("PRN"), "PRN");
        assert_eq!(suggestion_prefix("PR"), "PR");
        assert_eq!(suggestion_prefix(""), "");
    }

    #[test]
    fn suggestion_prefix_handles_multibyte_identifiers() {
        // "åå" uppercases to "ÅÅ": 2 chars, 4 bytes. Byte slicing here
        // would panic mid-character.
        assert_eq!(suggestion_prefix(&normalize_prn(" åå ")), "ÅÅ");
        assert_eq!(suggestion_prefix("ÅÅÅÅ"), "ÅÅÅ");
        assert_eq!(suggestion_prefix("ÅÅÅ"), "ÅÅÅ");
    }
}
