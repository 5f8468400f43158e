use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::ReportFlow;
use crate::flows::{has_heading, tidy};
use crate::template::{normalize_lines, present, Prompt};

pub const PLAN_HEADING: &str = "## Sprint Plan";
pub const DEFERRED_HEADING: &str = "## Deferred Tasks";

/// Sprint planner form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintPlanInput {
    /// One task per line, `Title – Priority – Points`.
    pub tasks_text: String,
    #[serde(default)]
    pub sprint_duration: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    /// Story points the team can absorb this sprint.
    #[serde(default)]
    pub team_capacity: Option<f64>,
    #[serde(default)]
    pub sprint_goal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSprintPlan {
    /// Deduplicated task lines in first-seen order.
    pub tasks: Vec<String>,
    pub sprint_duration: Option<String>,
    pub team_size: Option<String>,
    pub team_capacity: Option<f64>,
    pub sprint_goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SprintPlan {
    /// Markdown with the `## Sprint Plan` and `## Deferred Tasks` sections.
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
}

pub struct SprintPlanFlow;

impl ReportFlow for SprintPlanFlow {
    const NAME: &'static str = "sprint_plan";
    const DESCRIPTION: &'static str = "Record the sprint plan and any planning warnings.";

    type Input = SprintPlanInput;
    type Validated = ValidatedSprintPlan;
    type Output = SprintPlan;

    fn validate(input: &SprintPlanInput) -> Result<ValidatedSprintPlan, FlowError> {
        let tasks = normalize_lines(&input.tasks_text);
        if tasks.is_empty() {
            return Err(FlowError::invalid_input(
                "tasks_text",
                "task list must not be empty",
            ));
        }
        if let Some(capacity) = input.team_capacity {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(FlowError::invalid_input(
                    "team_capacity",
                    "capacity must be non-negative",
                ));
            }
        }
        Ok(ValidatedSprintPlan {
            tasks,
            sprint_duration: present(input.sprint_duration.as_deref()).map(str::to_string),
            team_size: present(input.team_size.as_deref()).map(str::to_string),
            team_capacity: input.team_capacity,
            sprint_goal: present(input.sprint_goal.as_deref()).map(str::to_string),
        })
    }

    fn render(v: &ValidatedSprintPlan) -> String {
        let capacity = v
            .team_capacity
            .map(|c| format!("{} story points", format_points(c)));

        Prompt::new()
            .text(
                "You are planning the next sprint for a software team. Choose the tasks that \
                 fit the sprint, ordered by priority, and defer the rest.",
            )
            .lines(
                "Tasks (one per line, formatted as \"Title – Priority – Points\"; \"?\" means unestimated)",
                &v.tasks,
            )
            .field("Sprint Duration", v.sprint_duration.as_deref())
            .field("Team Size", v.team_size.as_deref())
            .field("Team Capacity", capacity.as_deref())
            .field("Sprint Goal", v.sprint_goal.as_deref())
            .when(v.team_capacity.is_some(), |p| {
                p.text("Do not plan more story points than the stated team capacity.")
            })
            .text(format!(
                "Write the `plan` field in Markdown with exactly these two sections, in this order:\n\n\
                 {PLAN_HEADING}\n\
                 One bullet per selected task with a one-line rationale.\n\n\
                 {DEFERRED_HEADING}\n\
                 One bullet per task left out, with the reason. Write \"None\" if nothing is deferred."
            ))
            .text(
                "Use the optional `warnings` field for capacity, dependency or estimation \
                 concerns; omit it if there are none.",
            )
            .render()
    }

    fn output_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "plan": {
                    "type": "string",
                    "description": format!("Markdown containing the '{PLAN_HEADING}' and '{DEFERRED_HEADING}' sections")
                },
                "warnings": {
                    "type": "string",
                    "description": "Capacity, dependency or estimation concerns"
                }
            },
            "required": ["plan"],
            "additionalProperties": false
        })
    }

    fn finalize(_v: &ValidatedSprintPlan, output: SprintPlan) -> Result<SprintPlan, FlowError> {
        for heading in [PLAN_HEADING, DEFERRED_HEADING] {
            if !has_heading(&output.plan, heading) {
                return Err(FlowError::format(
                    Self::NAME,
                    format!("plan is missing the '{heading}' heading"),
                ));
            }
        }
        Ok(SprintPlan {
            plan: output.plan,
            warnings: tidy(output.warnings),
        })
    }
}

/// `20` rather than `20.0`; fractional capacities keep their decimals.
fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{points}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tasks: &str) -> SprintPlanInput {
        SprintPlanInput {
            tasks_text: tasks.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_task_list_is_rejected() {
        let err = SprintPlanFlow::validate(&input("\n  \n")).unwrap_err();
        assert_eq!(err.field(), Some("tasks_text"));
        assert!(err.to_string().contains("task list must not be empty"));
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let mut i = input("A – Low – 1");
        i.team_capacity = Some(-1.0);
        let err = SprintPlanFlow::validate(&i).unwrap_err();
        assert_eq!(err.field(), Some("team_capacity"));
        assert!(err.to_string().contains("capacity must be non-negative"));
    }

    #[test]
    fn zero_capacity_is_allowed() {
        let mut i = input("A – Low – 1");
        i.team_capacity = Some(0.0);
        let v = SprintPlanFlow::validate(&i).unwrap();
        assert!(SprintPlanFlow::render(&v).contains("Team Capacity: 0 story points"));
    }

    #[test]
    fn duplicate_lines_are_collapsed_before_prompting() {
        let v = SprintPlanFlow::validate(&input(
            "Fix bug – High – 3\n\nFix bug – High – 3\nWrite docs – Low – 1\n",
        ))
        .unwrap();
        assert_eq!(v.tasks, vec!["Fix bug – High – 3", "Write docs – Low – 1"]);
        let prompt = SprintPlanFlow::render(&v);
        assert_eq!(prompt.matches("Fix bug – High – 3").count(), 1);
    }

    #[test]
    fn optional_sections_follow_presence() {
        let bare = SprintPlanFlow::render(&SprintPlanFlow::validate(&input("A – Low – 1")).unwrap());
        for label in ["Sprint Duration:", "Team Size:", "Team Capacity:", "Sprint Goal:"] {
            assert!(!bare.contains(label), "unexpected {label}");
        }
        assert!(!bare.contains("stated team capacity"));

        let full = SprintPlanFlow::render(
            &SprintPlanFlow::validate(&SprintPlanInput {
                tasks_text: "A – Low – 1".into(),
                sprint_duration: Some("2 weeks".into()),
                team_size: Some("4".into()),
                team_capacity: Some(21.5),
                sprint_goal: Some("Ship onboarding".into()),
            })
            .unwrap(),
        );
        assert!(full.contains("Sprint Duration: 2 weeks"));
        assert!(full.contains("Team Size: 4"));
        assert!(full.contains("Team Capacity: 21.5 story points"));
        assert!(full.contains("Sprint Goal: Ship onboarding"));
    }

    #[test]
    fn prompt_spells_out_required_headings() {
        let prompt = SprintPlanFlow::render(&SprintPlanFlow::validate(&input("A – Low – 1")).unwrap());
        assert!(prompt.contains(PLAN_HEADING));
        assert!(prompt.contains(DEFERRED_HEADING));
    }

    #[test]
    fn finalize_requires_both_headings() {
        let v = SprintPlanFlow::validate(&input("A – Low – 1")).unwrap();
        let missing_deferred = SprintPlan {
            plan: "## Sprint Plan\n- A".into(),
            warnings: None,
        };
        let err = SprintPlanFlow::finalize(&v, missing_deferred).unwrap_err();
        assert!(err.to_string().contains(DEFERRED_HEADING));

        let ok = SprintPlan {
            plan: "## Sprint Plan\n- A\n\n## Deferred Tasks\nNone".into(),
            warnings: Some("   ".into()),
        };
        let out = SprintPlanFlow::finalize(&v, ok).unwrap();
        assert_eq!(out.warnings, None);
    }

    #[test]
    fn finalize_rejects_drifted_headings() {
        let v = SprintPlanFlow::validate(&input("A – Low – 1")).unwrap();
        let drifted = SprintPlan {
            plan: "## Sprint Planning Notes\n- A\n\n## Deferred Tasks Overview\nNone".into(),
            warnings: None,
        };
        let err = SprintPlanFlow::finalize(&v, drifted).unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::FormatError);
        assert!(err.to_string().contains(PLAN_HEADING));
    }

    #[test]
    fn output_rejects_unknown_fields() {
        let value = serde_json::json!({"plan": "x", "confidence": 0.9});
        assert!(serde_json::from_value::<SprintPlan>(value).is_err());
    }
}
