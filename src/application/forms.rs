//! Explicit validation schemas for write operations.
//!
//! Each submitted form has a raw deserialized shape and a validated shape;
//! validation is a pure function returning either the validated input or a
//! structured list of field errors. Nothing here touches storage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw post submission as it arrives off the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostInput {
    pub text: String,
    pub group_slug: Option<String>,
    pub image_upload_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPostInput {
    pub text: String,
    pub group_slug: Option<String>,
    pub image_upload_id: Option<Uuid>,
}

/// Raw comment submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentInput {
    pub text: String,
}

pub fn validate_create_post(form: PostForm) -> Result<CreatePostInput, Vec<FieldError>> {
    let (text, group_slug, image_upload_id) = validate_post_fields(form)?;
    Ok(CreatePostInput {
        text,
        group_slug,
        image_upload_id,
    })
}

pub fn validate_edit_post(form: PostForm) -> Result<EditPostInput, Vec<FieldError>> {
    let (text, group_slug, image_upload_id) = validate_post_fields(form)?;
    Ok(EditPostInput {
        text,
        group_slug,
        image_upload_id,
    })
}

pub fn validate_comment(form: CommentForm) -> Result<CreateCommentInput, Vec<FieldError>> {
    match non_empty(form.text) {
        Some(text) => Ok(CreateCommentInput { text }),
        None => Err(vec![FieldError::new("text", "comment text is required")]),
    }
}

fn validate_post_fields(
    form: PostForm,
) -> Result<(String, Option<String>, Option<Uuid>), Vec<FieldError>> {
    let mut errors = Vec::new();

    let text = non_empty(form.text);
    if text.is_none() {
        errors.push(FieldError::new("text", "post text is required"));
    }

    let group_slug = non_empty(form.group);

    let image_upload_id = match non_empty(form.image) {
        None => None,
        Some(raw) => match raw.parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("image", "image reference is not a valid id"));
                None
            }
        },
    };

    if errors.is_empty() {
        // text presence was checked above
        Ok((text.unwrap_or_default(), group_slug, image_upload_id))
    } else {
        Err(errors)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
