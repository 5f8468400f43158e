use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::ReportFlow;
use crate::flows::{is_done, parse_task_array};
use crate::template::{present, Prompt};

/// Four-point ordinal classification of overload/failure risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Input ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskInput {
    /// JSON array of task records.
    pub tasks_json: String,
    #[serde(default)]
    pub team_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTask {
    pub id: String,
    pub title: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
}

impl RiskTask {
    fn is_unassigned(&self) -> bool {
        self.assignee.as_deref().map_or(true, |a| a.trim().is_empty())
    }

    fn is_urgent(&self) -> bool {
        matches!(
            self.priority.as_deref().map(|p| p.trim().to_lowercase()).as_deref(),
            Some("high" | "critical")
        )
    }

    /// Open, urgent and owned by nobody.
    fn is_orphaned(&self) -> bool {
        !is_done(&self.status) && self.is_urgent() && self.is_unassigned()
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedRisk {
    pub tasks: Vec<RiskTask>,
    pub team_context: Option<String>,
}

// ─── Output ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberRisk {
    pub member_id: String,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    /// Short summaries of the tasks driving this member's risk.
    pub related_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskRisk {
    pub task_id: String,
    pub title: String,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskReport {
    pub member_risks: Vec<MemberRisk>,
    pub task_risks: Vec<TaskRisk>,
    pub overall_assessment: String,
    pub recommendations: Vec<String>,
}

// ─── Flow ─────────────────────────────────────────────────────────────────

pub struct RiskFlow;

impl ReportFlow for RiskFlow {
    const NAME: &'static str = "risk_analysis";
    const DESCRIPTION: &'static str = "Record per-member and per-task delivery risk.";

    type Input = RiskInput;
    type Validated = ValidatedRisk;
    type Output = RiskReport;

    fn validate(input: &RiskInput) -> Result<ValidatedRisk, FlowError> {
        let tasks: Vec<RiskTask> = parse_task_array("tasks_json", &input.tasks_json)?;
        Ok(ValidatedRisk {
            tasks,
            team_context: present(input.team_context.as_deref()).map(str::to_string),
        })
    }

    fn render(v: &ValidatedRisk) -> String {
        let tasks = serde_json::to_string_pretty(&v.tasks).unwrap_or_default();
        let orphaned: Vec<String> = v
            .tasks
            .iter()
            .filter(|t| t.is_orphaned())
            .map(|t| format!("{} ({})", t.title, t.id))
            .collect();

        Prompt::new()
            .text(
                "Analyse delivery risk for this sprint. Look for overloaded team members, \
                 unowned urgent work, oversized tasks and blocked progress.",
            )
            .block("Tasks (JSON)", Some(&tasks))
            .block("Team Context", v.team_context.as_deref())
            .lines("Unassigned high-priority tasks", &orphaned)
            .text(
                "Return `member_risks` (one entry per assignee with `member_id`, `risk_level`, \
                 `risk_factors` and `related_tasks`), `task_risks` (one entry per risky task with \
                 `task_id`, `title`, `risk_level` and `risk_factors`), an `overall_assessment` \
                 paragraph and a list of `recommendations`. Every `risk_level` must be exactly \
                 one of Low, Medium, High, Critical.",
            )
            .render()
    }

    fn output_schema() -> serde_json::Value {
        let level = serde_json::json!({"type": "string", "enum": ["Low", "Medium", "High", "Critical"]});
        let strings = serde_json::json!({"type": "array", "items": {"type": "string"}});
        serde_json::json!({
            "type": "object",
            "properties": {
                "member_risks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "member_id": {"type": "string"},
                            "risk_level": level,
                            "risk_factors": strings,
                            "related_tasks": strings
                        },
                        "required": ["member_id", "risk_level", "risk_factors", "related_tasks"],
                        "additionalProperties": false
                    }
                },
                "task_risks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "task_id": {"type": "string"},
                            "title": {"type": "string"},
                            "risk_level": level,
                            "risk_factors": strings
                        },
                        "required": ["task_id", "title", "risk_level", "risk_factors"],
                        "additionalProperties": false
                    }
                },
                "overall_assessment": {"type": "string"},
                "recommendations": strings
            },
            "required": ["member_risks", "task_risks", "overall_assessment", "recommendations"],
            "additionalProperties": false
        })
    }

    fn finalize(v: &ValidatedRisk, output: RiskReport) -> Result<RiskReport, FlowError> {
        if output.overall_assessment.trim().is_empty() {
            return Err(FlowError::format(Self::NAME, "overall assessment is blank"));
        }
        let mut output = output;
        flag_orphaned_tasks(&v.tasks, &mut output.task_risks);
        Ok(output)
    }
}

/// Ensure every open, unassigned High/Critical task is reported at High risk
/// or above, adding an entry when the model left it out.
fn flag_orphaned_tasks(tasks: &[RiskTask], task_risks: &mut Vec<TaskRisk>) {
    for task in tasks.iter().filter(|t| t.is_orphaned()) {
        let priority = task.priority.as_deref().unwrap_or_default().trim();
        let factor = format!("Unassigned {priority}-priority task");
        match task_risks.iter_mut().find(|r| r.task_id == task.id) {
            Some(risk) => {
                risk.risk_level = risk.risk_level.max(RiskLevel::High);
                if !risk.risk_factors.iter().any(|f| f.eq_ignore_ascii_case(&factor)) {
                    risk.risk_factors.push(factor);
                }
            }
            None => task_risks.push(TaskRisk {
                task_id: task.id.clone(),
                title: task.title.clone(),
                risk_level: RiskLevel::High,
                risk_factors: vec![factor],
            }),
        }
    }
}
