//! Response payloads for the page handlers.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord, UserRecord};

#[derive(Debug, Clone, Serialize)]
pub struct PostPayload {
    pub id: Uuid,
    pub text: String,
    pub preview: String,
    pub author: String,
    pub group: Option<String>,
    pub image: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<PostRecord> for PostPayload {
    fn from(post: PostRecord) -> Self {
        let preview = post.preview().to_string();
        Self {
            id: post.id,
            preview,
            text: post.text,
            author: post.author_username,
            group: post.group_slug,
            image: post.image_upload_id,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPayload {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<CommentRecord> for CommentPayload {
    fn from(comment: CommentRecord) -> Self {
        Self {
            id: comment.id,
            author: comment.author_username,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupPayload {
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl From<GroupRecord> for GroupPayload {
    fn from(group: GroupRecord) -> Self {
        Self {
            slug: group.slug,
            title: group.title,
            description: group.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorPayload {
    pub username: String,
    pub display_name: Option<String>,
}

impl From<UserRecord> for AuthorPayload {
    fn from(user: UserRecord) -> Self {
        Self {
            username: user.username,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupFeedPayload {
    pub group: GroupPayload,
    pub posts: crate::application::pagination::Page<PostPayload>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub author: AuthorPayload,
    pub following: bool,
    pub posts: crate::application::pagination::Page<PostPayload>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailPayload {
    pub post: PostPayload,
    pub comments: Vec<CommentPayload>,
}

/// Blank or prefilled form state for the create/edit pages.
#[derive(Debug, Default, Serialize)]
pub struct PostFormPayload {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<Uuid>,
}

impl From<PostRecord> for PostFormPayload {
    fn from(post: PostRecord) -> Self {
        Self {
            text: post.text,
            group: post.group_slug,
            image: post.image_upload_id,
        }
    }
}
