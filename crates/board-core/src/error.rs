use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("not initialized: run 'board init'")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    ProjectExists(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid task status '{0}': expected one of To Do, In Progress, Done")]
    InvalidStatus(String),

    #[error("invalid priority '{0}': expected one of Low, Medium, High, Critical")]
    InvalidPriority(String),

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("no active project: select one with 'board session use <slug>'")]
    NoActiveProject,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// True for failures of the underlying task store rather than of the
    /// caller's request. These surface to users as a generic backend error.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            BoardError::Io(_) | BoardError::Yaml(_) | BoardError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
