//! One handler per route. Each handler is a pure transformation of
//! (request, identity, params) into a payload or redirect; every side
//! effect is one of the documented entity writes.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::forms::{
    CommentForm, PostForm, validate_comment, validate_create_post, validate_edit_post,
};
use crate::application::pagination::Page;
use crate::application::posts::EditOutcome;
use crate::domain::entities::PostRecord;

use super::RouterState;
use super::auth::{CurrentUser, require_identity};
use super::error::{NOT_FOUND_BODY, PageError};
use super::models::{
    CommentPayload, GroupFeedPayload, PostDetailPayload, PostFormPayload, PostPayload,
    ProfilePayload,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

fn post_page(page: Page<PostRecord>) -> Page<PostPayload> {
    page.map(PostPayload::from)
}

fn detail_path(post_id: Uuid) -> String {
    format!("/posts/{post_id}")
}

/// `GET /` lists every post, newest first. Sits behind the response cache.
pub async fn index(
    State(state): State<RouterState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, PageError> {
    let page = state.feed.all_posts(query.page.as_deref()).await?;
    Ok(Json(post_page(page)))
}

/// `GET /group/{slug}` lists a group's posts, or 404 for an unknown slug.
pub async fn group_posts(
    State(state): State<RouterState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, PageError> {
    let (group, posts) = state
        .feed
        .group_posts(&slug, query.page.as_deref())
        .await?;
    Ok(Json(GroupFeedPayload {
        group: group.into(),
        posts: post_page(posts),
    }))
}

/// `GET /profile/{username}` lists an author's posts plus whether the
/// viewer follows them.
pub async fn profile(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, PageError> {
    let feed = state
        .feed
        .profile(&username, current.0.as_ref(), query.page.as_deref())
        .await?;
    Ok(Json(ProfilePayload {
        author: feed.author.into(),
        following: feed.following,
        posts: post_page(feed.posts),
    }))
}

/// `GET /posts/{id}` returns one post with its comments.
pub async fn post_detail(
    State(state): State<RouterState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, PageError> {
    let (post, comments) = state.posts.detail(id).await?;
    Ok(Json(PostDetailPayload {
        post: post.into(),
        comments: comments.into_iter().map(CommentPayload::from).collect(),
    }))
}

/// `GET /create` returns the blank form.
pub async fn create_form(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    uri: Uri,
) -> Result<impl IntoResponse, PageError> {
    require_identity(&current, &state.login_url, &uri)?;
    Ok(Json(PostFormPayload::default()))
}

/// `POST /create` persists a new post authored by the current identity
/// and lands on their profile.
pub async fn create_post(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    uri: Uri,
    axum::Form(form): axum::Form<PostForm>,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;
    let input = validate_create_post(form).map_err(PageError::Validation)?;

    state.posts.create(&identity, input).await?;
    Ok(Redirect::to(&format!("/profile/{}", identity.username)).into_response())
}

/// `GET /posts/{id}/edit` returns the prefilled form for the owner;
/// everyone else is bounced to the detail view.
pub async fn edit_form(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;

    match state.posts.for_edit(&identity, id).await? {
        EditOutcome::Updated(post) => Ok(Json(PostFormPayload::from(post)).into_response()),
        EditOutcome::NotOwner(post) => Ok(Redirect::to(&detail_path(post.id)).into_response()),
    }
}

/// `POST /posts/{id}/edit` is the owner-gated update. A non-owner attempt
/// mutates nothing and redirects to the detail view.
pub async fn edit_post(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    uri: Uri,
    axum::Form(form): axum::Form<PostForm>,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;

    // ownership is decided first: a non-owner is bounced to the detail
    // view before their input is even validated
    if let EditOutcome::NotOwner(post) = state.posts.for_edit(&identity, id).await? {
        return Ok(Redirect::to(&detail_path(post.id)).into_response());
    }

    let input = validate_edit_post(form).map_err(PageError::Validation)?;
    let (EditOutcome::Updated(post) | EditOutcome::NotOwner(post)) =
        state.posts.edit(&identity, id, input).await?;
    Ok(Redirect::to(&detail_path(post.id)).into_response())
}

/// `POST /posts/{id}/comment` attaches a comment and returns to the
/// detail view. An empty submission persists nothing and redirects the
/// same way.
pub async fn add_comment(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    uri: Uri,
    axum::Form(form): axum::Form<CommentForm>,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;

    if let Ok(input) = validate_comment(form) {
        state.posts.add_comment(&identity, id, input).await?;
    }
    Ok(Redirect::to(&detail_path(id)).into_response())
}

/// `GET /follow` lists posts from every followed author.
pub async fn follow_feed(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
    uri: Uri,
) -> Result<impl IntoResponse, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;
    let page = state
        .feed
        .follow_feed(&identity, query.page.as_deref())
        .await?;
    Ok(Json(post_page(page)))
}

/// `GET /profile/{username}/follow` creates the follow edge (self and
/// duplicate are no-ops) and lands on the follow feed.
pub async fn profile_follow(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;
    state.follows.follow(&identity, &username).await?;
    Ok(Redirect::to("/follow").into_response())
}

/// `GET /profile/{username}/unfollow` removes the edge if present.
pub async fn profile_unfollow(
    State(state): State<RouterState>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, PageError> {
    let identity = require_identity(&current, &state.login_url, &uri)?;
    state.follows.unfollow(&identity, &username).await?;
    Ok(Redirect::to("/follow").into_response())
}

/// `GET /healthz` reports storage reachability.
pub async fn healthz(State(state): State<RouterState>) -> Result<impl IntoResponse, PageError> {
    state
        .health
        .ping()
        .await
        .map_err(|err| PageError::internal("infra::http::healthz", &err))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
