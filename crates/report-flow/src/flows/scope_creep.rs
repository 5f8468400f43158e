use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::flow::ReportFlow;
use crate::flows::tidy;
use crate::template::{normalize_lines, present, Prompt};

/// Four-point ordinal classification of sprint scope expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreepLevel {
    None,
    Low,
    Moderate,
    High,
}

impl CreepLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CreepLevel::None => "None",
            CreepLevel::Low => "Low",
            CreepLevel::Moderate => "Moderate",
            CreepLevel::High => "High",
        }
    }
}

impl fmt::Display for CreepLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeCreepInput {
    pub current_tasks: String,
    /// The committed task list at sprint start.
    #[serde(default)]
    pub original_tasks: Option<String>,
    #[serde(default)]
    pub sprint_goal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedScopeCreep {
    pub current: Vec<String>,
    pub original: Option<Vec<String>>,
    /// Current lines absent from the original list; empty without a baseline.
    pub added: Vec<String>,
    pub sprint_goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeCreepReport {
    pub analysis: String,
    pub creep_level: CreepLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

pub struct ScopeCreepFlow;

impl ReportFlow for ScopeCreepFlow {
    const NAME: &'static str = "scope_creep";
    const DESCRIPTION: &'static str = "Record the scope-creep analysis and its classification.";

    type Input = ScopeCreepInput;
    type Validated = ValidatedScopeCreep;
    type Output = ScopeCreepReport;

    fn validate(input: &ScopeCreepInput) -> Result<ValidatedScopeCreep, FlowError> {
        let current = normalize_lines(&input.current_tasks);
        if current.is_empty() {
            return Err(FlowError::invalid_input(
                "current_tasks",
                "task list must not be empty",
            ));
        }

        let original = present(input.original_tasks.as_deref())
            .map(normalize_lines)
            .filter(|lines| !lines.is_empty());

        let added = match &original {
            Some(original) => {
                let baseline: HashSet<&str> = original.iter().map(String::as_str).collect();
                current
                    .iter()
                    .filter(|l| !baseline.contains(l.as_str()))
                    .cloned()
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(ValidatedScopeCreep {
            current,
            original,
            added,
            sprint_goal: present(input.sprint_goal.as_deref()).map(str::to_string),
        })
    }

    fn render(v: &ValidatedScopeCreep) -> String {
        let mut prompt = Prompt::new()
            .text(
                "Assess scope creep in the current sprint: work added after the sprint was \
                 committed that threatens its goal or timeline.",
            )
            .lines("Current Tasks", &v.current);

        if let Some(original) = &v.original {
            prompt = prompt
                .lines("Original Tasks", original)
                .lines("New Since Baseline", &v.added);
        }

        prompt
            .field("Sprint Goal", v.sprint_goal.as_deref())
            .when(v.original.is_none(), |p| {
                p.text(
                    "No original task list was provided; judge creep from how well the \
                     current tasks fit a single coherent sprint.",
                )
            })
            .text(
                "Write `analysis` as a short Markdown report. Set `creep_level` to exactly one \
                 of None, Low, Moderate, High. Use None only when no work was added. Put \
                 concrete advice in the optional `recommendations` field.",
            )
            .render()
    }

    fn output_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "analysis": {"type": "string", "description": "Markdown scope-creep report"},
                "creep_level": {"type": "string", "enum": ["None", "Low", "Moderate", "High"]},
                "recommendations": {"type": "string"}
            },
            "required": ["analysis", "creep_level"],
            "additionalProperties": false
        })
    }

    fn finalize(
        v: &ValidatedScopeCreep,
        output: ScopeCreepReport,
    ) -> Result<ScopeCreepReport, FlowError> {
        if output.analysis.trim().is_empty() {
            return Err(FlowError::format(Self::NAME, "analysis report is blank"));
        }

        let mut creep_level = output.creep_level;
        if !v.added.is_empty() && creep_level == CreepLevel::None {
            tracing::debug!(
                added = v.added.len(),
                "raising creep level from None: tasks were added after the baseline"
            );
            creep_level = CreepLevel::Low;
        }

        Ok(ScopeCreepReport {
            analysis: output.analysis,
            creep_level,
            recommendations: tidy(output.recommendations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(level: CreepLevel) -> ScopeCreepReport {
        ScopeCreepReport {
            analysis: "Scope grew.".into(),
            creep_level: level,
            recommendations: None,
        }
    }

    #[test]
    fn current_tasks_are_required() {
        let err = ScopeCreepFlow::validate(&ScopeCreepInput::default()).unwrap_err();
        assert_eq!(err.field(), Some("current_tasks"));
    }

    #[test]
    fn added_lines_are_detected_against_baseline() {
        let v = ScopeCreepFlow::validate(&ScopeCreepInput {
            current_tasks: "Login page\nSignup page\nDark mode".into(),
            original_tasks: Some("Login page\nSignup page".into()),
            sprint_goal: None,
        })
        .unwrap();
        assert_eq!(v.added, vec!["Dark mode"]);
        let prompt = ScopeCreepFlow::render(&v);
        assert!(prompt.contains("Original Tasks:\nLogin page\nSignup page"));
        assert!(prompt.contains("New Since Baseline:\nDark mode"));
    }

    #[test]
    fn new_items_never_classify_as_none() {
        let v = ScopeCreepFlow::validate(&ScopeCreepInput {
            current_tasks: "A\nB\nC".into(),
            original_tasks: Some("A\nB".into()),
            sprint_goal: None,
        })
        .unwrap();
        let out = ScopeCreepFlow::finalize(&v, report(CreepLevel::None)).unwrap();
        assert_eq!(out.creep_level, CreepLevel::Low);

        let out = ScopeCreepFlow::finalize(&v, report(CreepLevel::High)).unwrap();
        assert_eq!(out.creep_level, CreepLevel::High);
    }

    #[test]
    fn unchanged_scope_may_be_none() {
        let v = ScopeCreepFlow::validate(&ScopeCreepInput {
            current_tasks: "A\nB".into(),
            original_tasks: Some("B\nA".into()),
            sprint_goal: None,
        })
        .unwrap();
        assert!(v.added.is_empty());
        let out = ScopeCreepFlow::finalize(&v, report(CreepLevel::None)).unwrap();
        assert_eq!(out.creep_level, CreepLevel::None);
    }

    #[test]
    fn blank_original_is_treated_as_absent() {
        let v = ScopeCreepFlow::validate(&ScopeCreepInput {
            current_tasks: "A".into(),
            original_tasks: Some("  \n ".into()),
            sprint_goal: Some("".into()),
        })
        .unwrap();
        assert!(v.original.is_none());
        let prompt = ScopeCreepFlow::render(&v);
        assert!(!prompt.contains("Original Tasks:"));
        assert!(!prompt.contains("New Since Baseline:"));
        assert!(!prompt.contains("Sprint Goal:"));
    }

    #[test]
    fn unknown_creep_level_fails_deserialization() {
        let value = serde_json::json!({"analysis": "x", "creep_level": "Extreme"});
        assert!(serde_json::from_value::<ScopeCreepReport>(value).is_err());
    }

    #[test]
    fn blank_analysis_is_a_format_error() {
        let v = ScopeCreepFlow::validate(&ScopeCreepInput {
            current_tasks: "A".into(),
            ..Default::default()
        })
        .unwrap();
        let err = ScopeCreepFlow::finalize(
            &v,
            ScopeCreepReport {
                analysis: " ".into(),
                creep_level: CreepLevel::Low,
                recommendations: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::FailureKind::FormatError);
    }
}
