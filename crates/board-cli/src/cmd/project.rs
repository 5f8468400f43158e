use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use board_core::{project::Project, session::Session, task};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// Create a project
    Create {
        slug: String,
        /// Display name (defaults to the slug)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Make the new project the active one
        #[arg(long = "use")]
        activate: bool,
    },
    /// List projects
    List,
    /// Show a project and its tasks (defaults to the active project)
    Show { slug: Option<String> },
    /// Delete a project and all its tasks
    Delete { slug: String },
}

pub fn run(root: &Path, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::Create {
            slug,
            name,
            description,
            activate,
        } => create(root, &slug, name, description, activate, json),
        ProjectSubcommand::List => list(root, json),
        ProjectSubcommand::Show { slug } => show(root, slug.as_deref(), json),
        ProjectSubcommand::Delete { slug } => delete(root, &slug, json),
    }
}

/// Load `slug`, or the active project when `slug` is `None`.
pub fn resolve(root: &Path, slug: Option<&str>) -> anyhow::Result<Project> {
    match slug {
        Some(slug) => Ok(Project::load(root, slug)?),
        None => {
            let session = Session::load(root).context("failed to read session")?;
            Ok(session.active(root)?)
        }
    }
}

fn create(
    root: &Path,
    slug: &str,
    name: Option<String>,
    description: Option<String>,
    activate: bool,
    json: bool,
) -> anyhow::Result<()> {
    let name = name.unwrap_or_else(|| slug.to_string());
    let project = Project::create(root, slug, name, description)?;

    if activate {
        let mut session = Session::load(root)?;
        session.set_active_project(root, slug)?;
        session.save(root).context("failed to save session")?;
    }

    if json {
        print_json(&project)?;
    } else {
        println!("Created project '{}' ({})", project.slug, project.name);
        if activate {
            println!("Active project: {}", project.slug);
        }
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let projects = Project::list(root)?;
    let active = Session::load(root)?.active_project;

    if json {
        let list: Vec<_> = projects
            .iter()
            .map(|p| {
                serde_json::json!({
                    "slug": p.slug,
                    "name": p.name,
                    "tasks": p.tasks.len(),
                    "active": active.as_deref() == Some(p.slug.as_str()),
                })
            })
            .collect();
        return print_json(&list);
    }

    if projects.is_empty() {
        println!("No projects. Create one with: board project create <slug>");
        return Ok(());
    }

    let rows = projects
        .iter()
        .map(|p| {
            let marker = if active.as_deref() == Some(p.slug.as_str()) {
                "*"
            } else {
                ""
            };
            vec![
                marker.to_string(),
                p.slug.clone(),
                p.name.clone(),
                task::summarize(&p.tasks),
            ]
        })
        .collect();
    print_table(&["", "SLUG", "NAME", "PROGRESS"], rows);
    Ok(())
}

fn show(root: &Path, slug: Option<&str>, json: bool) -> anyhow::Result<()> {
    let project = resolve(root, slug)?;

    if json {
        return print_json(&project);
    }

    println!("{} ({})", project.name, project.slug);
    if let Some(d) = &project.description {
        println!("{d}");
    }
    println!("{}\n", task::summarize(&project.tasks));

    if project.tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_task_rows(&project.tasks);
    Ok(())
}

pub fn print_task_rows(tasks: &[board_core::task::Task]) {
    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.status.to_string(),
                t.priority.to_string(),
                t.effort.map(|e| e.to_string()).unwrap_or_else(|| "?".into()),
                or_dash(t.assignee.as_deref()),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "PRIORITY", "POINTS", "ASSIGNEE", "TITLE"], rows);
}

fn delete(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    Project::delete(root, slug)?;

    let mut session = Session::load(root)?;
    if session.active_project.as_deref() == Some(slug) {
        session.clear_active_project();
        session.save(root).context("failed to save session")?;
    }

    if json {
        print_json(&serde_json::json!({ "slug": slug, "deleted": true }))?;
    } else {
        println!("Deleted project '{slug}'");
    }
    Ok(())
}
