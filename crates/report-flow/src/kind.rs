use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four report generators, as addressed from routes and commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    SprintPlan,
    ScopeCreep,
    Risk,
    Retrospective,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::SprintPlan => "sprint-plan",
            ReportKind::ScopeCreep => "scope-creep",
            ReportKind::Risk => "risk",
            ReportKind::Retrospective => "retrospective",
        }
    }

    pub fn all() -> &'static [ReportKind] {
        &[
            ReportKind::SprintPlan,
            ReportKind::ScopeCreep,
            ReportKind::Risk,
            ReportKind::Retrospective,
        ]
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = ReportKind::all().iter().map(|k| k.as_str()).collect();
                format!("unknown report kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_from_its_name() {
        for kind in ReportKind::all() {
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_kind_lists_alternatives() {
        let err = "velocity".parse::<ReportKind>().unwrap_err();
        assert!(err.contains("sprint-plan"));
    }
}
