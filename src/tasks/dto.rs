use serde::{Deserialize, Serialize};

use super::repo::Task;
use crate::error::AppError;

/// Create/update payload. There is no `owner_id` field; ownership is
/// assigned server-side from the authenticated identity.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.is_empty() || self.title.chars().count() > 100 {
            return Err(AppError::Validation("title must be 1-100 characters".into()));
        }
        if let Some(d) = &self.description {
            if d.chars().count() > 500 {
                return Err(AppError::Validation(
                    "description must be at most 500 characters".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Wire shape for a task; owner reference stays internal.
#[derive(Debug, Serialize)]
pub struct TaskOut {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl From<Task> for TaskOut {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            completed: t.completed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
