use crate::cmd::project::{print_task_rows, resolve};
use crate::output::print_json;
use anyhow::Context;
use board_core::{
    project::Project,
    task::{self as task_ops, TaskPatch},
    types::{Priority, TaskStatus},
};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Story points
        #[arg(long)]
        effort: Option<u32>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Project slug (defaults to the active project)
        #[arg(long)]
        project: Option<String>,
    },
    /// Move a task to another column (todo, in-progress, done)
    Move {
        task_id: String,
        status: TaskStatus,
        #[arg(long)]
        project: Option<String>,
    },
    /// Assign a task; omit the user to unassign
    Assign {
        task_id: String,
        user: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Edit task fields
    Edit {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        effort: Option<u32>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Remove a task
    Remove {
        task_id: String,
        #[arg(long)]
        project: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks in this column
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        project: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            title,
            priority,
            effort,
            assignee,
            description,
            project,
        } => {
            let patch = TaskPatch {
                description,
                priority,
                effort,
                assignee,
                ..Default::default()
            };
            add(root, project.as_deref(), &title.join(" "), patch, json)
        }
        TaskSubcommand::Move {
            task_id,
            status,
            project,
        } => update(root, project.as_deref(), &task_id, json, |tasks| {
            task_ops::move_task(tasks, &task_id, status)
        }),
        TaskSubcommand::Assign {
            task_id,
            user,
            project,
        } => update(root, project.as_deref(), &task_id, json, |tasks| {
            task_ops::assign_task(tasks, &task_id, user.as_deref())
        }),
        TaskSubcommand::Edit {
            task_id,
            title,
            description,
            priority,
            effort,
            project,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority,
                effort,
                ..Default::default()
            };
            update(root, project.as_deref(), &task_id, json, |tasks| {
                task_ops::apply_patch(tasks, &task_id, patch)
            })
        }
        TaskSubcommand::Remove { task_id, project } => {
            remove(root, project.as_deref(), &task_id, json)
        }
        TaskSubcommand::List { status, project } => list(root, project.as_deref(), status, json),
    }
}

fn save(root: &Path, project: &Project) -> anyhow::Result<()> {
    project
        .save(root)
        .with_context(|| format!("failed to save project '{}'", project.slug))
}

fn add(
    root: &Path,
    slug: Option<&str>,
    title: &str,
    patch: TaskPatch,
    json: bool,
) -> anyhow::Result<()> {
    let mut project = resolve(root, slug)?;
    let id = project.add_task(title)?;
    task_ops::apply_patch(&mut project.tasks, &id, patch)?;
    save(root, &project)?;

    if json {
        print_json(task_ops::find(&project.tasks, &id)?)?;
    } else {
        println!("Added task [{id}] to '{}': {}", project.slug, title.trim());
    }
    Ok(())
}

/// Load the project, apply `op`, save and print the updated task.
fn update(
    root: &Path,
    slug: Option<&str>,
    task_id: &str,
    json: bool,
    op: impl FnOnce(&mut Vec<board_core::task::Task>) -> board_core::Result<()>,
) -> anyhow::Result<()> {
    let mut project = resolve(root, slug)?;
    op(&mut project.tasks)?;
    save(root, &project)?;

    let task = task_ops::find(&project.tasks, task_id)?;
    if json {
        print_json(task)?;
    } else {
        let owner = task.assignee.as_deref().unwrap_or("unassigned");
        println!(
            "[{}] {} — {} / {} / {owner}",
            task.id, task.title, task.status, task.priority
        );
    }
    Ok(())
}

fn remove(root: &Path, slug: Option<&str>, task_id: &str, json: bool) -> anyhow::Result<()> {
    let mut project = resolve(root, slug)?;
    let removed = task_ops::remove_task(&mut project.tasks, task_id)?;
    save(root, &project)?;

    if json {
        print_json(&serde_json::json!({ "task_id": removed.id, "removed": true }))?;
    } else {
        println!("Removed task [{}]: {}", removed.id, removed.title);
    }
    Ok(())
}

fn list(
    root: &Path,
    slug: Option<&str>,
    status: Option<TaskStatus>,
    json: bool,
) -> anyhow::Result<()> {
    let project = resolve(root, slug)?;
    let tasks: Vec<_> = project
        .tasks
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .collect();

    if json {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_task_rows(&tasks);
    Ok(())
}
