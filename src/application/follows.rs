//! The follow graph: directed edges from follower to followed author.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::identity::Identity;
use crate::application::repos::{FollowsRepo, RepoError, UsersRepo};
use crate::domain::entities::FollowRecord;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("unknown user")]
    UnknownUser,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UsersRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UsersRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { users, follows }
    }

    /// Create the edge follower -> author. Self-follow and an already
    /// existing edge are silent no-ops; a given pair exists at most once.
    pub async fn follow(&self, follower: &Identity, username: &str) -> Result<(), FollowError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::UnknownUser)?;

        if author.id == follower.user_id {
            debug!(target = "piazza::follows", username, "ignoring self-follow");
            return Ok(());
        }

        let created = self
            .follows
            .create(FollowRecord {
                follower_id: follower.user_id,
                followed_id: author.id,
            })
            .await?;
        if !created {
            debug!(target = "piazza::follows", username, "edge already present");
        }
        Ok(())
    }

    /// Remove the edge follower -> author. A missing edge is a no-op.
    pub async fn unfollow(&self, follower: &Identity, username: &str) -> Result<(), FollowError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(FollowError::UnknownUser)?;

        self.follows
            .delete(FollowRecord {
                follower_id: follower.user_id,
                followed_id: author.id,
            })
            .await?;
        Ok(())
    }
}
