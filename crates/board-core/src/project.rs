use crate::error::{BoardError, Result};
use crate::paths;
use crate::task::{self, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A board project: a named, ordered list of tasks persisted as one YAML
/// manifest under `.board/projects/<slug>/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Number of the next task id. Never decremented.
    #[serde(default)]
    pub next_task_seq: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            next_task_seq: 1,
            tasks: Vec::new(),
        }
    }

    /// Append a task with a fresh id; see [`task::add_task`].
    pub fn add_task(&mut self, title: impl Into<String>) -> Result<String> {
        task::add_task(&mut self.tasks, &mut self.next_task_seq, title)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;

        if paths::project_dir(root, &slug).exists() {
            return Err(BoardError::ProjectExists(slug));
        }

        let mut project = Self::new(slug, name);
        project.description = description.filter(|d| !d.trim().is_empty());
        project.save(root)?;
        tracing::debug!(slug = %project.slug, "project created");
        Ok(project)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        paths::validate_slug(slug)?;
        let manifest = paths::project_manifest(root, slug);
        if !manifest.exists() {
            return Err(BoardError::ProjectNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&manifest)?;
        let project: Project = serde_yaml::from_str(&data)?;
        Ok(project)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_slug(&self.slug)?;
        let manifest = paths::project_manifest(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&manifest, data.as_bytes())
    }

    pub fn exists(root: &Path, slug: &str) -> bool {
        paths::validate_slug(slug).is_ok() && paths::project_manifest(root, slug).exists()
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let projects_dir = paths::projects_dir(root);
        if !projects_dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects = Vec::new();
        for entry in std::fs::read_dir(&projects_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let slug = entry.file_name().to_string_lossy().into_owned();
                match Self::load(root, &slug) {
                    Ok(p) => projects.push(p),
                    Err(BoardError::ProjectNotFound(_) | BoardError::InvalidSlug(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }

    pub fn delete(root: &Path, slug: &str) -> Result<()> {
        paths::validate_slug(slug)?;
        let dir = paths::project_dir(root, slug);
        if !dir.exists() {
            return Err(BoardError::ProjectNotFound(slug.to_string()));
        }
        std::fs::remove_dir_all(&dir)?;
        tracing::debug!(slug, "project deleted");
        Ok(())
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
    fn create_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut project =
            Project::create(dir.path(), "relaunch", "Website Relaunch", None).unwrap();
        project.add_task("Draft copy").unwrap();
        project.save(dir.path()).unwrap();

        let loaded = Project::load(dir.path(), "relaunch").unwrap();
        assert_eq!(loaded.name, "Website Relaunch");
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].title, "Draft copy");
    }

    #[test]
    fn create_rejects_duplicates_and_bad_slugs() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "alpha", "Alpha", None).unwrap();
        assert!(matches!(
            Project::create(dir.path(), "alpha", "Alpha again", None),
            Err(BoardError::ProjectExists(_))
        ));
        assert!(matches!(
            Project::create(dir.path(), "Not Valid", "x", None),
            Err(BoardError::InvalidSlug(_))
        ));
    }

    #[test]
    fn load_missing_project_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Project::load(dir.path(), "ghost"),
            Err(BoardError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn list_is_ordered_by_creation() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "first", "First", None).unwrap();
        Project::create(dir.path(), "second", "Second", None).unwrap();
        let slugs: Vec<_> = Project::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["first", "second"]);
    }

    #[test]
    fn list_without_projects_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(Project::list(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_manifest() {
        let dir = TempDir::new().unwrap();
        Project::create(dir.path(), "doomed", "Doomed", None).unwrap();
        Project::delete(dir.path(), "doomed").unwrap();
        assert!(!Project::exists(dir.path(), "doomed"));
        assert!(Project::delete(dir.path(), "doomed").is_err());
    }

    #[test]
    fn task_ids_survive_removal_across_saves() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::create(dir.path(), "ids", "Ids", None).unwrap();
        project.add_task("First").unwrap();
        let second = project.add_task("Second").unwrap();
        crate::task::remove_task(&mut project.tasks, &second).unwrap();
        project.save(dir.path()).unwrap();

        let mut loaded = Project::load(dir.path(), "ids").unwrap();
        assert_eq!(loaded.add_task("Third").unwrap(), "T3");
    }

    #[test]
    fn manifest_without_counter_continues_after_highest_id() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::create(dir.path(), "legacy", "Legacy", None).unwrap();
        project.tasks.push(Task::new("T4", "Old"));
        project.next_task_seq = 0;
        project.save(dir.path()).unwrap();

        let mut loaded = Project::load(dir.path(), "legacy").unwrap();
        assert_eq!(loaded.add_task("New").unwrap(), "T5");
    }

    #[test]
    fn traversal_slugs_never_reach_the_filesystem() {
        let dir = TempDir::new().unwrap();
        let board = dir.path().join("board");
        let victim = board.join("victim");
        std::fs::create_dir_all(&victim).unwrap();
        std::fs::write(victim.join(crate::paths::MANIFEST_FILE), "slug: victim\n").unwrap();

        for slug in ["../../victim", "..", "a/b"] {
            assert!(matches!(
                Project::delete(&board, slug),
                Err(BoardError::InvalidSlug(_))
            ));
            assert!(matches!(
                Project::load(&board, slug),
                Err(BoardError::InvalidSlug(_))
            ));
            assert!(!Project::exists(&board, slug));
        }
        assert!(victim.is_dir());
    }
}
