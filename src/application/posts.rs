//! Post and comment write operations, plus the detail read.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::forms::{CreateCommentInput, CreatePostInput, EditPostInput};
use crate::application::identity::Identity;
use crate::application::repos::{
    CommentsRepo, CreateCommentParams, CreatePostParams, GroupsRepo, PostsRepo, PostsWriteRepo,
    RepoError, UpdatePostParams,
};
use crate::domain::entities::{CommentRecord, PostRecord};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post not found")]
    NotFound,
    #[error("unknown group")]
    UnknownGroup,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result of an ownership-gated edit. A non-owner attempt is not an error
/// surface; the caller redirects without mutating anything.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Updated(PostRecord),
    NotOwner(PostRecord),
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            groups,
            comments,
        }
    }

    pub async fn create(
        &self,
        author: &Identity,
        input: CreatePostInput,
    ) -> Result<PostRecord, PostError> {
        let group_id = self.resolve_group(input.group_slug.as_deref()).await?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                author_id: author.user_id,
                text: input.text,
                group_id,
                image_upload_id: input.image_upload_id,
            })
            .await?;
        Ok(post)
    }

    /// Fetch a post for editing. Non-owners get [`EditOutcome::NotOwner`]
    /// with the untouched record.
    pub async fn for_edit(&self, editor: &Identity, post_id: Uuid) -> Result<EditOutcome, PostError> {
        let post = self
            .reader
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        if post.author_id != editor.user_id {
            return Ok(EditOutcome::NotOwner(post));
        }
        Ok(EditOutcome::Updated(post))
    }

    /// Apply an edit. The author never changes; a non-owner attempt leaves
    /// the post untouched.
    pub async fn edit(
        &self,
        editor: &Identity,
        post_id: Uuid,
        input: EditPostInput,
    ) -> Result<EditOutcome, PostError> {
        let post = self
            .reader
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        if post.author_id != editor.user_id {
            return Ok(EditOutcome::NotOwner(post));
        }

        let group_id = self.resolve_group(input.group_slug.as_deref()).await?;

        let updated = self
            .writer
            .update_post(UpdatePostParams {
                id: post.id,
                text: input.text,
                group_id,
                image_upload_id: input.image_upload_id,
            })
            .await?;
        Ok(EditOutcome::Updated(updated))
    }

    pub async fn detail(
        &self,
        post_id: Uuid,
    ) -> Result<(PostRecord, Vec<CommentRecord>), PostError> {
        let post = self
            .reader
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)?;
        let comments = self.comments.list_for_post(post.id).await?;
        Ok((post, comments))
    }

    pub async fn add_comment(
        &self,
        author: &Identity,
        post_id: Uuid,
        input: CreateCommentInput,
    ) -> Result<CommentRecord, PostError> {
        let post = self
            .reader
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id: post.id,
                author_id: author.user_id,
                text: input.text,
            })
            .await?;
        Ok(comment)
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<Uuid>, PostError> {
        match slug {
            None => Ok(None),
            Some(slug) => {
                let group = self
                    .groups
                    .find_by_slug(slug)
                    .await?
                    .ok_or(PostError::UnknownGroup)?;
                Ok(Some(group.id))
            }
        }
    }
}
