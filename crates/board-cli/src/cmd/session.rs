use crate::output::print_json;
use anyhow::Context;
use board_core::session::Session;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum SessionSubcommand {
    /// Sign in as a user (no credentials are checked)
    Login { user: String },
    /// Sign out; the active project is kept
    Logout,
    /// Show the current session
    Show,
    /// Select the active project; omit the slug to clear it
    Use { slug: Option<String> },
}

pub fn run(root: &Path, subcmd: SessionSubcommand, json: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root).context("failed to read session")?;

    match subcmd {
        SessionSubcommand::Show => return show(&session, json),
        SessionSubcommand::Login { user } => {
            if user.trim().is_empty() {
                anyhow::bail!("user must not be empty");
            }
            session.login(&user);
        }
        SessionSubcommand::Logout => session.logout(),
        SessionSubcommand::Use { slug: Some(slug) } => session.set_active_project(root, &slug)?,
        SessionSubcommand::Use { slug: None } => session.clear_active_project(),
    }

    session.save(root).context("failed to save session")?;
    show(&session, json)
}

fn show(session: &Session, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(session);
    }
    println!("User:           {}", session.user.as_deref().unwrap_or("(signed out)"));
    println!(
        "Active project: {}",
        session.active_project.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
