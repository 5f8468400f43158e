use crate::error::{BoardError, Result};
use crate::paths;
use crate::project::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The local, non-cryptographic session: who is signed in and which project
/// is active.
///
/// Stored at `.board/session.yaml`. There is no locking; two processes
/// writing at once race and the last atomic rename wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Load the session, or an empty one if none has been written yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::session_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&mut self, root: &Path) -> Result<()> {
        self.updated_at = Some(Utc::now());
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::session_path(root), data.as_bytes())
    }

    pub fn login(&mut self, user: &str) {
        let user = user.trim();
        self.user = Some(user.to_string()).filter(|u| !u.is_empty());
    }

    /// Sign out. The active project selection is kept, matching a browser
    /// where the project key outlives the auth key.
    pub fn logout(&mut self) {
        self.user = None;
    }

    /// Select `slug` as the active project. The project must exist.
    pub fn set_active_project(&mut self, root: &Path, slug: &str) -> Result<()> {
        paths::validate_slug(slug)?;
        if !Project::exists(root, slug) {
            return Err(BoardError::ProjectNotFound(slug.to_string()));
        }
        self.active_project = Some(slug.to_string());
        Ok(())
    }

    pub fn clear_active_project(&mut self) {
        self.active_project = None;
    }

    /// Load the active project, failing with [`BoardError::NoActiveProject`]
    /// when none is selected.
    pub fn active(&self, root: &Path) -> Result<Project> {
        let slug = self
            .active_project
            .as_deref()
            .ok_or(BoardError::NoActiveProject)?;
        Project::load(root, slug)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_returns_empty_when_no_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Session::load(dir.path()).unwrap(), Session::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "alpha", "Alpha", None).unwrap();

        let mut session = Session::default();
        session.login("ada");
        session.set_active_project(dir.path(), "alpha").unwrap();
        session.save(dir.path()).unwrap();

        let loaded = Session::load(dir.path()).unwrap();
        assert_eq!(loaded.user.as_deref(), Some("ada"));
        assert_eq!(loaded.active_project.as_deref(), Some("alpha"));
        assert!(loaded.updated_at.is_some());
    }

    #[test]
    fn cannot_activate_missing_project() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::default();
        assert!(matches!(
            session.set_active_project(dir.path(), "ghost"),
            Err(BoardError::ProjectNotFound(_))
        ));
        assert_eq!(session.active_project, None);
    }

    #[test]
    fn active_without_selection_errors() {
        let dir = TempDir::new().unwrap();
        let session = Session::default();
        assert!(matches!(
            session.active(dir.path()),
            Err(BoardError::NoActiveProject)
        ));
    }

    #[test]
    fn logout_keeps_active_project() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "alpha", "Alpha", None).unwrap();
        let mut session = Session::default();
        session.login("ada");
        session.set_active_project(dir.path(), "alpha").unwrap();
        session.logout();
        assert_eq!(session.user, None);
        assert_eq!(session.active_project.as_deref(), Some("alpha"));
    }

    #[test]
    fn last_writer_wins() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "alpha", "Alpha", None).unwrap();
        Project::create(dir.path(), "beta", "Beta", None).unwrap();

        let mut tab_a = Session::load(dir.path()).unwrap();
        let mut tab_b = Session::load(dir.path()).unwrap();
        tab_a.set_active_project(dir.path(), "alpha").unwrap();
        tab_b.set_active_project(dir.path(), "beta").unwrap();
        tab_a.save(dir.path()).unwrap();
        tab_b.save(dir.path()).unwrap();

        let loaded = Session::load(dir.path()).unwrap();
        assert_eq!(loaded.active_project.as_deref(), Some("beta"));
    }
}
