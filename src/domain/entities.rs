//! Domain entities mirrored from persistent storage.
//!
//! Post and comment records carry the author's username (and the group slug,
//! where present) denormalized from their join targets, so read paths never
//! chase references.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Number of characters shown when a post is referred to by name.
const PREVIEW_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub group_id: Option<Uuid>,
    pub group_slug: Option<String>,
    /// Reference into the external blob store; never dereferenced here.
    pub image_upload_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    /// Short display form of the post text.
    pub fn preview(&self) -> &str {
        match self.text.char_indices().nth(PREVIEW_CHARS) {
            Some((offset, _)) => &self.text[..offset],
            None => &self.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowRecord {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
}
