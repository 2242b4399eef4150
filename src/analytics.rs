//! Pure derivations over a loaded student context. Every function here
//! tolerates zero, one, or many contributing records.

use serde::{Deserialize, Serialize};

use crate::context::{SemesterRecord, SubjectScore};
use crate::store::StudentProfile;

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Mean of the present subject scores, or absent when there are none.
pub fn subject_average(subjects: &[SubjectScore]) -> Option<f64> {
    if subjects.is_empty() {
        return None;
    }
    let sum: i64 = subjects.iter().map(|s| s.score).sum();
    Some(round2(sum as f64 / subjects.len() as f64))
}

pub fn sgpa_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(cur), Some(prev)) => Some(round2(cur - prev)),
        _ => None,
    }
}

/// Latest-semester subjects, best first. Stable on tied scores.
pub fn recent_grades(subjects: &[SubjectScore]) -> Vec<SubjectScore> {
    let mut sorted = subjects.to_vec();
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted
}

pub fn overall_cgpa(semesters: &[SemesterRecord]) -> Option<f64> {
    let sgpas: Vec<f64> = semesters.iter().filter_map(|s| s.sgpa).collect();
    if sgpas.is_empty() {
        return None;
    }
    Some(round2(sgpas.iter().sum::<f64>() / sgpas.len() as f64))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusArea {
    pub subject: String,
    pub current_score: i64,
    pub target_score: i64,
    pub gap: i64,
    pub priority: String,
    pub reason: String,
}

/// The two weakest subjects of the latest semester, turned into
/// improvement targets.
pub fn derive_focus_areas(subjects: &[SubjectScore]) -> Vec<FocusArea> {
    let mut weakest = subjects.to_vec();
    weakest.sort_by_key(|s| s.score);
    weakest
        .iter()
        .take(2)
        .map(|item| {
            let current = item.score;
            let target = (current + 8).min(95);
            FocusArea {
                subject: item.subject.clone(),
                current_score: current,
                target_score: target,
                gap: target - current,
                priority: if current < 75 { "high" } else { "medium" }.to_string(),
                reason: "Low recent semester score compared to peer benchmark.".to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectProgress {
    pub key: String,
    pub subject: String,
    pub score: i64,
    pub grade: &'static str,
    pub status: &'static str,
    pub target_score: i64,
    pub delta_to_target: i64,
}

pub fn subject_progress(subjects: &[SubjectScore]) -> Vec<SubjectProgress> {
    subjects
        .iter()
        .map(|item| {
            let status = if item.score >= 85 {
                "strong"
            } else if item.score >= 70 {
                "stable"
            } else {
                "needs_focus"
            };
            let target = (item.score + 5).min(95);
            SubjectProgress {
                key: item.key.clone(),
                subject: item.subject.clone(),
                score: item.score,
                grade: item.grade,
                status,
                target_score: target,
                delta_to_target: target - item.score,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Goal {
    pub title: String,
    pub current_score: i64,
    pub target_score: i64,
    pub status: &'static str,
}

/// Up to three lowest-scoring subjects as trackable goals.
pub fn goals(subjects: &[SubjectProgress]) -> Vec<Goal> {
    let mut sorted: Vec<&SubjectProgress> = subjects.iter().collect();
    sorted.sort_by_key(|s| s.score);
    sorted
        .into_iter()
        .take(3)
        .map(|item| Goal {
            title: format!("Improve {}", item.subject),
            current_score: item.score,
            target_score: item.target_score,
            status: if item.score >= 80 {
                "on_track"
            } else {
                "needs_focus"
            },
        })
        .collect()
}

/// At most one sentence per signal; silent signals produce nothing.
pub fn insights(
    sgpa_change: Option<f64>,
    average_subject_score: Option<f64>,
    skills: &[String],
) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(change) = sgpa_change {
        if change > 0.0 {
            out.push("SGPA trend is improving compared to previous semester.".to_string());
        } else if change < 0.0 {
            out.push("SGPA dipped from previous semester; focus on weak subjects.".to_string());
        } else {
            out.push("SGPA is stable across the last two semesters.".to_string());
        }
    }
    if let Some(avg) = average_subject_score {
        out.push(format!("Current semester subject average is {avg}%."));
    }
    if !skills.is_empty() {
        let listed: Vec<&str> = skills.iter().take(6).map(String::as_str).collect();
        out.push(format!("Recorded technical skills: {}.", listed.join(", ")));
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub semester: String,
    pub sgpa: Option<f64>,
}

pub fn sgpa_trend(semesters: &[SemesterRecord]) -> Vec<TrendPoint> {
    semesters
        .iter()
        .map(|s| TrendPoint {
            semester: s.semester.clone(),
            sgpa: s.sgpa,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TwelfthRadar {
    pub labels: Vec<&'static str>,
    pub scores: Vec<i64>,
}

pub fn twelfth_radar(student: &StudentProfile) -> TwelfthRadar {
    let pairs = student.twelfth_pairs();
    TwelfthRadar {
        labels: pairs.iter().map(|(label, _)| *label).collect(),
        scores: pairs.iter().map(|(_, score)| *score).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(key: &str, score: i64) -> SubjectScore {
        SubjectScore {
            key: key.to_string(),
            subject: crate::grade::format_subject_name(key),
            score,
            grade: crate::grade::score_to_grade(Some(score)),
        }
    }

    #[test]
    fn subject_average_rounds_and_handles_empty() {
        assert_eq!(subject_average(&[]), None);
        let subs = [subject("a", 80), subject("b", 85), subject("c", 84)];
        assert_eq!(subject_average(&subs), Some(83.0));
        let subs = [subject("a", 80), subject("b", 81), subject("c", 81)];
        assert_eq!(subject_average(&subs), Some(80.67));
    }

    #[test]
    fn sgpa_change_requires_both_values() {
        assert_eq!(sgpa_change(Some(8.5), Some(8.0)), Some(0.5));
        assert_eq!(sgpa_change(Some(7.9), Some(8.0)), Some(-0.1));
        assert_eq!(sgpa_change(Some(8.5), None), None);
        assert_eq!(sgpa_change(None, Some(8.0)), None);
    }

    #[test]
    fn recent_grades_sorts_descending_stable() {
        let subs = [
            subject("a", 70),
            subject("b", 90),
            subject("c", 70),
            subject("d", 85),
        ];
        let sorted = recent_grades(&subs);
        let keys: Vec<&str> = sorted.iter().map(|s| s.key.as_str()).collect();
        // Tied 70s keep their original relative order.
        assert_eq!(keys, ["b", "d", "a", "c"]);
    }

    #[test]
    fn focus_areas_take_two_weakest_with_targets() {
        let subs = [subject("a", 60), subject("b", 70), subject("c", 90)];
        let areas = derive_focus_areas(&subs);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].subject, "A");
        assert_eq!(areas[0].target_score, 68);
        assert_eq!(areas[0].gap, 8);
        assert_eq!(areas[0].priority, "high");
        assert_eq!(areas[1].subject, "B");
        assert_eq!(areas[1].priority, "high");
    }

    #[test]
    fn focus_area_priority_boundary_at_75() {
        let subs = [subject("a", 75), subject("b", 74)];
        let areas = derive_focus_areas(&subs);
        assert_eq!(areas[0].subject, "B");
        assert_eq!(areas[0].priority, "high");
        assert_eq!(areas[1].subject, "A");
        assert_eq!(areas[1].priority, "medium");
    }

    #[test]
    fn focus_areas_target_caps_at_95() {
        let subs = [subject("a", 93)];
        let areas = derive_focus_areas(&subs);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].target_score, 95);
        assert_eq!(areas[0].gap, 2);
    }

    #[test]
    fn focus_areas_empty_without_subjects() {
        assert!(derive_focus_areas(&[]).is_empty());
    }

    #[test]
    fn progress_status_thresholds() {
        let subs = [subject("a", 85), subject("b", 70), subject("c", 69)];
        let progress = subject_progress(&subs);
        assert_eq!(progress[0].status, "strong");
        assert_eq!(progress[1].status, "stable");
        assert_eq!(progress[2].status, "needs_focus");
        assert_eq!(progress[0].target_score, 90);
        assert_eq!(progress[0].delta_to_target, 5);
    }

    #[test]
    fn goals_tag_on_track_at_80() {
        let subs = [
            subject("a", 95),
            subject("b", 80),
            subject("c", 79),
            subject("d", 60),
        ];
        let listed = goals(&subject_progress(&subs));
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "Improve D");
        assert_eq!(listed[0].status, "needs_focus");
        assert_eq!(listed[1].status, "needs_focus");
        assert_eq!(listed[2].title, "Improve B");
        assert_eq!(listed[2].status, "on_track");
    }

    #[test]
    fn insights_emit_one_sentence_per_signal() {
        assert!(insights(None, None, &[]).is_empty());
        let all = insights(Some(-0.3), Some(72.5), &["Rust".to_string()]);
        assert_eq!(all.len(), 3);
        assert!(all[0].contains("dipped"));
        assert!(all[1].contains("72.5"));
        assert!(all[2].contains("Rust"));
        let stable = insights(Some(0.0), None, &[]);
        assert_eq!(stable.len(), 1);
        assert!(stable[0].contains("stable"));
    }

    #[test]
    fn overall_cgpa_skips_missing_sgpa() {
        let semesters = vec![
            SemesterRecord {
                table: "sem1".to_string(),
                semester: "Semester 1".to_string(),
                sgpa: Some(8.0),
                subjects: vec![],
            },
            SemesterRecord {
                table: "sem2".to_string(),
                semester: "Semester 2".to_string(),
                sgpa: None,
                subjects: vec![],
            },
            SemesterRecord {
                table: "sem3".to_string(),
                semester: "Semester 3".to_string(),
                sgpa: Some(9.0),
                subjects: vec![],
            },
        ];
        assert_eq!(overall_cgpa(&semesters), Some(8.5));
        assert_eq!(overall_cgpa(&[]), None);
    }
}
