//! Improvement-plan synthesis: prompt building, response parsing, the
//! required-vs-fallback policy merge, and the deterministic fallback
//! generator used when the generative collaborator yields nothing.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::analytics::FocusArea;
use crate::context::SemesterRecord;
use crate::store::StudentProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub action: String,
    pub duration: String,
    pub difficulty: String,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPhase {
    pub week_range: String,
    pub goal: String,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementPlan {
    pub summary: String,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub six_week_plan: Vec<PlanPhase>,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY is not configured.")]
    Unconfigured,
    #[error("{0}")]
    Failed(String),
}

/// Prompt-in, free-text-out seam onto the generative collaborator.
pub trait TextGenerator {
    fn is_configured(&self) -> bool;
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug)]
pub enum GenerationOutcome {
    Success(ImprovementPlan),
    RecoverableFailure(String),
    Unconfigured,
}

pub fn build_prompt(
    student: &StudentProfile,
    semesters: &[SemesterRecord],
    skills: &[String],
    focus_areas: &[FocusArea],
) -> String {
    let snapshot: Vec<serde_json::Value> = semesters
        .iter()
        .map(|sem| {
            json!({
                "semester": sem.semester,
                "sgpa": sem.sgpa,
                "subjects": sem.subjects.iter().map(|s| {
                    json!({ "subject": s.subject, "score": s.score })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    format!(
        r#"You are an academic mentor assistant for EduVision.
Use only the student data below and create a realistic improvement plan.

Student name: {name}
PRN: {prn}
12th percentage: {twelfth}
Semesters: {semesters}
Skills: {skills}
Focus areas: {focus_areas}

Respond strictly in JSON with this schema:
{{
  "summary": "string",
  "focus_areas": [
    {{
      "subject": "string",
      "current_score": number,
      "target_score": number,
      "gap": number,
      "priority": "high|medium|low",
      "reason": "string"
    }}
  ],
  "recommendations": [
    {{
      "title": "string",
      "action": "string",
      "duration": "string",
      "difficulty": "easy|medium|hard",
      "priority": "high|medium|low"
    }}
  ],
  "six_week_plan": [
    {{
      "week_range": "Week 1-2",
      "goal": "string",
      "tasks": ["string", "string"]
    }}
  ]
}}
"#,
        name = student.name,
        prn = student.prn,
        twelfth = student
            .twelfth_percentage
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        semesters = json!(snapshot),
        skills = json!(skills),
        focus_areas = json!(focus_areas),
    )
}

/// Greedy brace match: everything from the first `{` to the last `}`.
/// Models routinely wrap their JSON in prose even when asked not to.
pub fn extract_json_block(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// One generation attempt, no retries. Every failure mode collapses to
/// a recoverable variant; nothing here is fatal to the request.
pub fn synthesize(generator: &dyn TextGenerator, prompt: &str) -> GenerationOutcome {
    let text = match generator.generate(prompt) {
        Ok(text) => text,
        Err(GenerationError::Unconfigured) => return GenerationOutcome::Unconfigured,
        Err(GenerationError::Failed(reason)) => {
            warn!(error = %reason, "generation attempt failed");
            return GenerationOutcome::RecoverableFailure(reason);
        }
    };

    let Some(value) = extract_json_block(&text) else {
        return GenerationOutcome::RecoverableFailure(
            "Gemini response could not be parsed as JSON.".to_string(),
        );
    };
    match serde_json::from_value::<ImprovementPlan>(value) {
        Ok(mut plan) => {
            plan.source = "gemini".to_string();
            GenerationOutcome::Success(plan)
        }
        Err(e) => {
            GenerationOutcome::RecoverableFailure(format!("Gemini plan has unexpected shape: {e}"))
        }
    }
}

pub fn fallback_plan(
    student_name: &str,
    focus_areas: &[FocusArea],
    skills: &[String],
) -> ImprovementPlan {
    if focus_areas.is_empty() {
        return ImprovementPlan {
            summary: format!(
                "{student_name} is currently performing consistently across available records."
            ),
            focus_areas: Vec::new(),
            recommendations: vec![Recommendation {
                title: "Weekly Revision Loop".to_string(),
                action: "Review one completed topic every weekend and solve 10 mixed questions."
                    .to_string(),
                duration: "1.5 hours/week".to_string(),
                difficulty: "easy".to_string(),
                priority: "medium".to_string(),
            }],
            six_week_plan: vec![PlanPhase {
                week_range: "Week 1-2".to_string(),
                goal: "Establish revision routine".to_string(),
                tasks: vec![
                    "Create a topic tracker".to_string(),
                    "Schedule fixed revision slots".to_string(),
                    "Submit one mock test".to_string(),
                ],
            }],
            source: "fallback".to_string(),
        };
    }

    let primary = &focus_areas[0];
    let secondary = focus_areas.get(1).unwrap_or(primary);
    let skill_list = if skills.is_empty() {
        "No skills listed".to_string()
    } else {
        skills
            .iter()
            .take(5)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    ImprovementPlan {
        summary: format!(
            "Focus on {} first, then reinforce {} to improve SGPA momentum.",
            primary.subject, secondary.subject
        ),
        focus_areas: focus_areas.to_vec(),
        recommendations: vec![
            Recommendation {
                title: format!("Targeted Practice: {}", primary.subject),
                action: format!(
                    "Solve at least 20 high-weight questions in {} every week.",
                    primary.subject
                ),
                duration: "2 hours/week".to_string(),
                difficulty: "medium".to_string(),
                priority: "high".to_string(),
            },
            Recommendation {
                title: format!("Peer Session: {}", secondary.subject),
                action: format!(
                    "Join a study session for {} and review errors after each test.",
                    secondary.subject
                ),
                duration: "1.5 hours/week".to_string(),
                difficulty: "easy".to_string(),
                priority: "medium".to_string(),
            },
            Recommendation {
                title: "Skill Alignment".to_string(),
                action: format!(
                    "Use existing strengths to support weak subjects. Current skills: {skill_list}."
                ),
                duration: "45 minutes/week".to_string(),
                difficulty: "easy".to_string(),
                priority: "medium".to_string(),
            },
        ],
        six_week_plan: vec![
            PlanPhase {
                week_range: "Week 1-2".to_string(),
                goal: format!("Stabilize {} foundation", primary.subject),
                tasks: vec![
                    "Identify weak units from recent assessments".to_string(),
                    "Finish one concept recap notebook".to_string(),
                    "Attempt one timed quiz set".to_string(),
                ],
            },
            PlanPhase {
                week_range: "Week 3-4".to_string(),
                goal: format!("Strengthen {}", secondary.subject),
                tasks: vec![
                    "Practice mixed-difficulty questions".to_string(),
                    "Track mistakes and recurring concepts".to_string(),
                    "Review progress with mentor/faculty".to_string(),
                ],
            },
            PlanPhase {
                week_range: "Week 5-6".to_string(),
                goal: "Consolidate both focus subjects".to_string(),
                tasks: vec![
                    "Take one full mock assessment".to_string(),
                    "Revise all weak topics".to_string(),
                    "Set next-cycle score targets".to_string(),
                ],
            },
        ],
        source: "fallback".to_string(),
    }
}

#[derive(Debug)]
pub struct ResolvedPlan {
    pub plan: ImprovementPlan,
    pub ai_status: &'static str,
    pub ai_error: Option<String>,
}

#[derive(Debug, Error)]
#[error("Gemini response is required but generation failed.")]
pub struct RequiredGenerationError {
    pub details: String,
}

/// The single policy merge: one outcome variant in, one plan out.
/// Only the "generation required" policy can turn a failed generation
/// into a request failure.
pub fn resolve_plan(
    outcome: GenerationOutcome,
    required: bool,
    student_name: &str,
    focus_areas: &[FocusArea],
    skills: &[String],
) -> Result<ResolvedPlan, RequiredGenerationError> {
    let ai_error = match outcome {
        GenerationOutcome::Success(plan) => {
            return Ok(ResolvedPlan {
                plan,
                ai_status: "gemini_success",
                ai_error: None,
            });
        }
        GenerationOutcome::RecoverableFailure(reason) => reason,
        GenerationOutcome::Unconfigured => GenerationError::Unconfigured.to_string(),
    };

    if required {
        return Err(RequiredGenerationError { details: ai_error });
    }

    Ok(ResolvedPlan {
        plan: fallback_plan(student_name, focus_areas, skills),
        ai_status: "gemini_fallback",
        ai_error: Some(ai_error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubGenerator {
        response: Result<&'static str, &'static str>,
        configured: bool,
    }

    impl TextGenerator for StubGenerator {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            if !self.configured {
                return Err(GenerationError::Unconfigured);
            }
            self.response
                .map(|s| s.to_string())
                .map_err(|e| GenerationError::Failed(e.to_string()))
        }
    }

    fn focus(subject: &str, score: i64) -> FocusArea {
        FocusArea {
            subject: subject.to_string(),
            current_score: score,
            target_score: (score + 8).min(95),
            gap: (score + 8).min(95) - score,
            priority: "high".to_string(),
            reason: "Low recent semester score compared to peer benchmark.".to_string(),
        }
    }

    #[test]
    fn extract_json_block_ignores_surrounding_prose() {
        let text = "Sure, here is your plan:\n{\"summary\": \"ok\"}\nHope it helps!";
        let value = extract_json_block(text).expect("json block");
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn extract_json_block_requires_braces() {
        assert!(extract_json_block("no json here").is_none());
        assert!(extract_json_block("} backwards {").is_none());
    }

    #[test]
    fn synthesize_parses_valid_plan_and_tags_source() {
        let generator = StubGenerator {
            response: Ok("Here you go: {\"summary\":\"Push Maths first.\",\"recommendations\":[],\"six_week_plan\":[]} done"),
            configured: true,
        };
        match synthesize(&generator, "prompt") {
            GenerationOutcome::Success(plan) => {
                assert_eq!(plan.summary, "Push Maths first.");
                assert_eq!(plan.source, "gemini");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn synthesize_reports_unparsable_response() {
        let generator = StubGenerator {
            response: Ok("The student should simply study more."),
            configured: true,
        };
        match synthesize(&generator, "prompt") {
            GenerationOutcome::RecoverableFailure(reason) => {
                assert!(reason.contains("could not be parsed"));
            }
            other => panic!("expected recoverable failure, got {other:?}"),
        }
    }

    #[test]
    fn synthesize_maps_transport_failure() {
        let generator = StubGenerator {
            response: Err("connection refused"),
            configured: true,
        };
        assert!(matches!(
            synthesize(&generator, "prompt"),
            GenerationOutcome::RecoverableFailure(reason) if reason == "connection refused"
        ));
    }

    #[test]
    fn synthesize_passes_unconfigured_through() {
        let generator = StubGenerator {
            response: Ok("{}"),
            configured: false,
        };
        assert!(matches!(
            synthesize(&generator, "prompt"),
            GenerationOutcome::Unconfigured
        ));
    }

    #[test]
    fn fallback_with_no_focus_areas_is_minimal() {
        let plan = fallback_plan("Asha", &[], &[]);
        assert!(plan.summary.contains("Asha"));
        assert_eq!(plan.recommendations.len(), 1);
        assert_eq!(plan.six_week_plan.len(), 1);
        assert_eq!(plan.source, "fallback");
    }

    #[test]
    fn fallback_names_primary_and_secondary_verbatim() {
        let areas = [focus("Data Structures", 58), focus("Statistics", 66)];
        let plan = fallback_plan("Asha", &areas, &["SQL".to_string()]);
        assert!(plan.summary.contains("Data Structures"));
        assert!(plan.summary.contains("Statistics"));
        assert_eq!(plan.recommendations.len(), 3);
        assert_eq!(plan.six_week_plan.len(), 3);
        assert!(plan.recommendations[0].title.contains("Data Structures"));
        assert!(plan.recommendations[1].title.contains("Statistics"));
        assert!(plan.recommendations[2].action.contains("SQL"));
        assert!(plan.six_week_plan[0].goal.contains("Data Structures"));
        assert!(plan.six_week_plan[1].goal.contains("Statistics"));
        assert_eq!(plan.source, "fallback");
    }

    #[test]
    fn fallback_single_focus_area_doubles_as_secondary() {
        let areas = [focus("Statistics", 66)];
        let plan = fallback_plan("Asha", &areas, &[]);
        assert_eq!(plan.recommendations.len(), 3);
        assert!(plan.recommendations[1].title.contains("Statistics"));
        assert!(plan.recommendations[2].action.contains("No skills listed"));
    }

    #[test]
    fn resolve_plan_required_policy_escalates_failures() {
        let err = resolve_plan(
            GenerationOutcome::RecoverableFailure("boom".to_string()),
            true,
            "Asha",
            &[],
            &[],
        )
        .expect_err("required failure");
        assert_eq!(err.details, "boom");

        let err = resolve_plan(GenerationOutcome::Unconfigured, true, "Asha", &[], &[])
            .expect_err("required failure");
        assert!(err.details.contains("not configured"));
    }

    #[test]
    fn resolve_plan_falls_back_and_carries_error() {
        let resolved = resolve_plan(
            GenerationOutcome::RecoverableFailure("timeout".to_string()),
            false,
            "Asha",
            &[focus("Statistics", 66)],
            &[],
        )
        .expect("fallback");
        assert_eq!(resolved.ai_status, "gemini_fallback");
        assert_eq!(resolved.ai_error.as_deref(), Some("timeout"));
        assert_eq!(resolved.plan.source, "fallback");
    }

    #[test]
    fn resolve_plan_success_passes_through() {
        let plan = ImprovementPlan {
            summary: "ok".to_string(),
            focus_areas: vec![],
            recommendations: vec![],
            six_week_plan: vec![],
            source: "gemini".to_string(),
        };
        let resolved =
            resolve_plan(GenerationOutcome::Success(plan), true, "Asha", &[], &[]).expect("pass");
        assert_eq!(resolved.ai_status, "gemini_success");
        assert!(resolved.ai_error.is_none());
    }
}
