//! Goal use-case service.
//!
//! Plain owner-scoped CRUD. Missing and foreign goals are both `NotFound`.

use crate::model::goal::{Goal, GoalDraft, GoalId, GoalValidationError};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GoalServiceError {
    InvalidGoal(GoalValidationError),
    NotFound(GoalId),
    StoreUnavailable(RepoError),
}

impl Display for GoalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGoal(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "goal not found: {id}"),
            Self::StoreUnavailable(err) => write!(f, "goal store unavailable: {err}"),
        }
    }
}

impl Error for GoalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidGoal(err) => Some(err),
            Self::NotFound(_) => None,
            Self::StoreUnavailable(err) => Some(err),
        }
    }
}

impl From<GoalValidationError> for GoalServiceError {
    fn from(value: GoalValidationError) -> Self {
        Self::InvalidGoal(value)
    }
}

impl From<RepoError> for GoalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => {
                error!("event=goal_store module=goal_service status=error error={other}");
                Self::StoreUnavailable(other)
            }
        }
    }
}

/// Goal service facade over repository implementations.
pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, owner: &str, draft: GoalDraft) -> Result<Goal, GoalServiceError> {
        let draft = draft.normalized()?;
        Ok(self.repo.create_goal(owner, &draft)?)
    }

    /// Lists `owner`'s goals in creation order.
    pub fn list(&self, owner: &str) -> Result<Vec<Goal>, GoalServiceError> {
        Ok(self.repo.list_goals(owner)?)
    }

    /// Loads one goal of `owner`.
    pub fn get(&self, owner: &str, id: GoalId) -> Result<Goal, GoalServiceError> {
        self.repo
            .get_goal(owner, id)?
            .ok_or(GoalServiceError::NotFound(id))
    }

    pub fn update(
        &self,
        owner: &str,
        id: GoalId,
        draft: GoalDraft,
    ) -> Result<Goal, GoalServiceError> {
        let draft = draft.normalized()?;
        Ok(self.repo.update_goal(owner, id, &draft)?)
    }

    pub fn delete(&self, owner: &str, id: GoalId) -> Result<(), GoalServiceError> {
        Ok(self.repo.delete_goal(owner, id)?)
    }
}
