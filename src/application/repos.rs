//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, FollowRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Offset window a list query must satisfy. Produced by the pagination
/// layer; repositories never see raw page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;
}

/// Read side of the post store. Every listing is newest-first with a stable
/// id tie-break, so identical windows return identical slices.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_all(&self, window: PageWindow) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_all(&self) -> Result<u64, RepoError>;

    async fn list_by_group(
        &self,
        group_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_by_group(&self, group_id: Uuid) -> Result<u64, RepoError>;

    async fn list_by_author(
        &self,
        author_id: Uuid,
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        window: PageWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_by_authors(&self, author_ids: &[Uuid]) -> Result<u64, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_upload_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image_upload_id: Option<Uuid>,
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Comments for a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;
}

#[async_trait]
pub trait FollowsRepo: Send + Sync {
    async fn list_followed_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn exists(&self, edge: FollowRecord) -> Result<bool, RepoError>;

    /// Insert the edge. Returns `false` when it already existed; the
    /// storage layer enforces (follower, followed) uniqueness.
    async fn create(&self, edge: FollowRecord) -> Result<bool, RepoError>;

    /// Remove the edge. Returns `false` when there was nothing to remove.
    async fn delete(&self, edge: FollowRecord) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
