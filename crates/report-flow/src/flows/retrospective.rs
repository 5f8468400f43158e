use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::ReportFlow;
use crate::flows::{is_done, parse_task_array};
use crate::template::{present, Prompt};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrospectiveInput {
    /// JSON array of the sprint's tasks.
    pub tasks_json: String,
    #[serde(default)]
    pub sprint_goal: Option<String>,
    #[serde(default)]
    pub team_sentiment: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetroTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRetrospective {
    pub tasks: Vec<RetroTask>,
    pub completed: usize,
    pub sprint_goal: Option<String>,
    pub team_sentiment: Option<String>,
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Retrospective {
    pub sprint_summary: String,
    pub went_well: Vec<String>,
    pub could_improve: Vec<String>,
    pub action_items: Vec<String>,
}

pub struct RetrospectiveFlow;

impl ReportFlow for RetrospectiveFlow {
    const NAME: &'static str = "retrospective";
    const DESCRIPTION: &'static str = "Record the sprint retrospective.";

    type Input = RetrospectiveInput;
    type Validated = ValidatedRetrospective;
    type Output = Retrospective;

    fn validate(input: &RetrospectiveInput) -> Result<ValidatedRetrospective, FlowError> {
        let tasks: Vec<RetroTask> = parse_task_array("tasks_json", &input.tasks_json)?;
        let completed = tasks.iter().filter(|t| is_done(&t.status)).count();
        Ok(ValidatedRetrospective {
            tasks,
            completed,
            sprint_goal: present(input.sprint_goal.as_deref()).map(str::to_string),
            team_sentiment: present(input.team_sentiment.as_deref()).map(str::to_string),
            additional_notes: present(input.additional_notes.as_deref()).map(str::to_string),
        })
    }

    fn render(v: &ValidatedRetrospective) -> String {
        let tasks = serde_json::to_string_pretty(&v.tasks).unwrap_or_default();
        let open = v.tasks.len() - v.completed;

        Prompt::new()
            .text(
                "Facilitate a retrospective for the sprint that just ended. Be specific and \
                 refer to the tasks by title.",
            )
            .text(format!(
                "Completion: {} of {} tasks done ({open} not finished)",
                v.completed,
                v.tasks.len()
            ))
            .block("Tasks (JSON)", Some(&tasks))
            .field("Sprint Goal", v.sprint_goal.as_deref())
            .block("Team Sentiment", v.team_sentiment.as_deref())
            .block("Additional Notes", v.additional_notes.as_deref())
            .when(v.sprint_goal.is_some(), |p| {
                p.text("Say in the summary whether the sprint goal was met.")
            })
            .text(
                "Return a `sprint_summary` paragraph and the lists `went_well`, \
                 `could_improve` and `action_items`. Action items must be concrete and \
                 assignable.",
            )
            .render()
    }

    fn output_schema() -> serde_json::Value {
        let strings = serde_json::json!({"type": "array", "items": {"type": "string"}});
        serde_json::json!({
            "type": "object",
            "properties": {
                "sprint_summary": {"type": "string"},
                "went_well": strings,
                "could_improve": strings,
                "action_items": strings
            },
            "required": ["sprint_summary", "went_well", "could_improve", "action_items"],
            "additionalProperties": false
        })
    }

    fn finalize(
        _v: &ValidatedRetrospective,
        output: Retrospective,
    ) -> Result<Retrospective, FlowError> {
        if output.sprint_summary.trim().is_empty() {
            return Err(FlowError::format(Self::NAME, "sprint summary is blank"));
        }
        Ok(output)
    }
}
