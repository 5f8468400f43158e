use crate::cmd::project::resolve;
use crate::output::{print_json, print_list, print_table};
use anyhow::Context;
use board_core::{config::Config, import};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use report_flow::{
    FailureKind, FlowError, FlowOptions, FlowRunner, HttpModelClient, ReportFlow, Retrospective,
    RetrospectiveFlow, RetrospectiveInput, RiskFlow, RiskInput, RiskReport, ScopeCreepFlow,
    ScopeCreepInput, ScopeCreepReport, SprintPlan, SprintPlanFlow, SprintPlanInput,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SourceArgs {
    /// Load tasks from a project instead of a file (defaults to the active project)
    #[arg(long)]
    from_project: bool,

    /// Project slug used with --from-project
    #[arg(long, requires = "from_project")]
    project: Option<String>,

    /// Print the rendered prompt without calling the model
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// Plan the next sprint from a task list
    SprintPlan {
        /// File with one "Title – Priority – Points" line per task ("-" for stdin)
        #[arg(long, conflicts_with = "from_project")]
        tasks_file: Option<PathBuf>,
        /// e.g. "2 weeks"
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        team_size: Option<String>,
        /// Story points the team can absorb
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long)]
        goal: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Detect scope creep against the committed task list
    ScopeCreep {
        /// File with the current task lines ("-" for stdin)
        #[arg(long, conflicts_with = "from_project")]
        current_file: Option<PathBuf>,
        /// File with the task lines committed at sprint start
        #[arg(long, conflicts_with = "baseline")]
        original_file: Option<PathBuf>,
        /// With --from-project: tasks created at or before this RFC 3339 instant form the original list
        #[arg(long, requires = "from_project")]
        baseline: Option<DateTime<Utc>>,
        #[arg(long)]
        goal: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Analyse per-member and per-task delivery risk
    Risk {
        /// JSON array of task records ("-" for stdin)
        #[arg(long, conflicts_with = "from_project")]
        tasks_file: Option<PathBuf>,
        #[arg(long)]
        team_context: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run a sprint retrospective
    Retrospective {
        /// JSON array of task records ("-" for stdin)
        #[arg(long, conflicts_with = "from_project")]
        tasks_file: Option<PathBuf>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        sentiment: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ReportSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ReportSubcommand::SprintPlan {
            tasks_file,
            duration,
            team_size,
            capacity,
            goal,
            source,
        } => {
            let tasks_text = if source.from_project {
                import::sprint_plan_tasks(&resolve(root, source.project.as_deref())?.tasks)
            } else {
                read_required(tasks_file.as_deref(), "--tasks-file")?
            };
            let input = SprintPlanInput {
                tasks_text,
                sprint_duration: duration,
                team_size,
                team_capacity: capacity,
                sprint_goal: goal,
            };
            execute::<SprintPlanFlow>(root, &input, &source, json, render_sprint_plan)
        }
        ReportSubcommand::ScopeCreep {
            current_file,
            original_file,
            baseline,
            goal,
            source,
        } => {
            let (current_tasks, imported_original) = if source.from_project {
                let project = resolve(root, source.project.as_deref())?;
                let import = import::scope_creep_tasks(&project.tasks, baseline);
                (import.current_tasks, import.original_tasks)
            } else {
                (read_required(current_file.as_deref(), "--current-file")?, None)
            };
            let original_tasks = match original_file {
                Some(path) => Some(read_source(&path)?),
                None => imported_original,
            };
            let input = ScopeCreepInput {
                current_tasks,
                original_tasks,
                sprint_goal: goal,
            };
            execute::<ScopeCreepFlow>(root, &input, &source, json, render_scope_creep)
        }
        ReportSubcommand::Risk {
            tasks_file,
            team_context,
            source,
        } => {
            let tasks_json = if source.from_project {
                import::risk_tasks_json(&resolve(root, source.project.as_deref())?.tasks)?
            } else {
                read_required(tasks_file.as_deref(), "--tasks-file")?
            };
            let input = RiskInput {
                tasks_json,
                team_context,
            };
            execute::<RiskFlow>(root, &input, &source, json, render_risk)
        }
        ReportSubcommand::Retrospective {
            tasks_file,
            goal,
            sentiment,
            notes,
            source,
        } => {
            let tasks_json = if source.from_project {
                import::retrospective_tasks_json(&resolve(root, source.project.as_deref())?.tasks)?
            } else {
                read_required(tasks_file.as_deref(), "--tasks-file")?
            };
            let input = RetrospectiveInput {
                tasks_json,
                sprint_goal: goal,
                team_sentiment: sentiment,
                additional_notes: notes,
            };
            execute::<RetrospectiveFlow>(root, &input, &source, json, render_retrospective)
        }
    }
}

// ---------------------------------------------------------------------------
// Input sources
// ---------------------------------------------------------------------------

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_required(path: Option<&Path>, flag: &str) -> anyhow::Result<String> {
    match path {
        Some(p) => read_source(p),
        None => anyhow::bail!("provide {flag} or --from-project"),
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn flow_failure(e: FlowError) -> anyhow::Error {
    match e.kind() {
        FailureKind::InvalidInput => anyhow::anyhow!("invalid input: {e}"),
        kind => anyhow::Error::new(e).context(kind.user_message()),
    }
}

/// Validate locally, then build the model client and run `F` once.
fn execute<F: ReportFlow>(
    root: &Path,
    input: &F::Input,
    source: &SourceArgs,
    json: bool,
    render: fn(&F::Output),
) -> anyhow::Result<()> {
    let validated = F::validate(input).map_err(flow_failure)?;
    if source.dry_run {
        println!("{}", F::render(&validated));
        return Ok(());
    }

    let config = Config::load(root).context("failed to load config")?;
    let client = HttpModelClient::from_config(&config.model)?;
    let runner = FlowRunner::new(Arc::new(client), FlowOptions::from(&config.model));

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt
        .block_on(runner.run::<F>(input))
        .map_err(flow_failure)?;

    if json {
        print_json(&report)?;
    } else {
        render(&report.output);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_sprint_plan(out: &SprintPlan) {
    println!("{}", out.plan.trim_end());
    if let Some(w) = &out.warnings {
        println!("\nWarnings:\n{w}");
    }
}

fn render_scope_creep(out: &ScopeCreepReport) {
    println!("Creep level: {}\n", out.creep_level);
    println!("{}", out.analysis.trim_end());
    if let Some(r) = &out.recommendations {
        println!("\nRecommendations:\n{r}");
    }
}

fn render_risk(out: &RiskReport) {
    println!("{}\n", out.overall_assessment.trim_end());

    if !out.task_risks.is_empty() {
        let mut risks: Vec<_> = out.task_risks.iter().collect();
        risks.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));
        let rows = risks
            .iter()
            .map(|r| {
                vec![
                    r.task_id.clone(),
                    r.risk_level.to_string(),
                    r.title.clone(),
                    r.risk_factors.join("; "),
                ]
            })
            .collect();
        print_table(&["TASK", "RISK", "TITLE", "FACTORS"], rows);
        println!();
    }

    if !out.member_risks.is_empty() {
        let rows = out
            .member_risks
            .iter()
            .map(|m| {
                vec![
                    m.member_id.clone(),
                    m.risk_level.to_string(),
                    m.risk_factors.join("; "),
                ]
            })
            .collect();
        print_table(&["MEMBER", "RISK", "FACTORS"], rows);
        println!();
    }

    print_list("Recommendations", &out.recommendations);
}

fn render_retrospective(out: &Retrospective) {
    println!("{}\n", out.sprint_summary.trim_end());
    print_list("Went well", &out.went_well);
    print_list("Could improve", &out.could_improve);
    print_list("Action items", &out.action_items);
}
