use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{FollowsRepo, RepoError};
use crate::domain::entities::FollowRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl FollowsRepo for PostgresRepositories {
    async fn list_followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar("SELECT followed_id FROM follows WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn exists(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(edge.follower_id)
        .bind(edge.followed_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        // The unique index makes duplicate edges impossible; conflicts are
        // reported as "not created" rather than an error.
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id, created_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (follower_id, followed_id) DO NOTHING",
        )
        .bind(edge.follower_id)
        .bind(edge.followed_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, edge: FollowRecord) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(edge.follower_id)
            .bind(edge.followed_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
