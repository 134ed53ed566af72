//! HTTP error surface for the page handlers.
//!
//! Everything a handler can fail with collapses into one of four visible
//! outcomes: a 404 page, a redirect to the login provider, a 422 listing
//! field errors, or a generic 5xx. Diagnostics travel separately via
//! [`ErrorReport`] so the logging middleware sees the full chain while the
//! client sees only the public message.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::feed::FeedError;
use crate::application::follows::FollowError;
use crate::application::forms::FieldError;
use crate::application::identity::IdentityError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;

pub const NOT_FOUND_BODY: &str = "Page not found";

#[derive(Debug, Serialize)]
struct ValidationBody {
    errors: Vec<FieldError>,
}

#[derive(Debug)]
pub enum PageError {
    NotFound,
    /// Identity required; send the caller to the login provider with the
    /// originally requested path as the return target.
    LoginRedirect {
        location: String,
    },
    Validation(Vec<FieldError>),
    Unavailable(ErrorReport),
    Internal(ErrorReport),
}

impl PageError {
    pub fn login_redirect(login_url: &str, next: &str) -> Self {
        let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        Self::LoginRedirect {
            location: format!("{login_url}?next={encoded}"),
        }
    }

    pub fn internal(source: &'static str, error: &dyn std::error::Error) -> Self {
        Self::Internal(ErrorReport::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            error,
        ))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound => {
                let mut response = (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response();
                ErrorReport::from_message(
                    "infra::http::error",
                    StatusCode::NOT_FOUND,
                    "resource not found",
                )
                .attach(&mut response);
                response
            }
            PageError::LoginRedirect { location } => (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, location)],
            )
                .into_response(),
            PageError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationBody { errors }),
            )
                .into_response(),
            PageError::Unavailable(report) => {
                let mut response =
                    (StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable")
                        .into_response();
                report.attach(&mut response);
                response
            }
            PageError::Internal(report) => {
                let mut response =
                    (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response();
                report.attach(&mut response);
                response
            }
        }
    }
}

impl From<FeedError> for PageError {
    fn from(error: FeedError) -> Self {
        match error {
            FeedError::UnknownGroup | FeedError::UnknownUser => PageError::NotFound,
            FeedError::Repo(err) => repo_to_page(err),
        }
    }
}

impl From<PostError> for PageError {
    fn from(error: PostError) -> Self {
        match error {
            PostError::NotFound => PageError::NotFound,
            // A submitted group slug that matches nothing is a field
            // error, not a missing page.
            PostError::UnknownGroup => {
                PageError::Validation(vec![FieldError::new("group", "unknown group")])
            }
            PostError::Repo(err) => repo_to_page(err),
        }
    }
}

impl From<FollowError> for PageError {
    fn from(error: FollowError) -> Self {
        match error {
            FollowError::UnknownUser => PageError::NotFound,
            FollowError::Repo(err) => repo_to_page(err),
        }
    }
}

impl From<IdentityError> for PageError {
    fn from(error: IdentityError) -> Self {
        PageError::Unavailable(ErrorReport::from_error(
            "infra::http::identity",
            StatusCode::SERVICE_UNAVAILABLE,
            &error,
        ))
    }
}

fn repo_to_page(error: RepoError) -> PageError {
    match error {
        RepoError::NotFound => PageError::NotFound,
        RepoError::Timeout => PageError::Unavailable(ErrorReport::from_error(
            "infra::http::repo",
            StatusCode::SERVICE_UNAVAILABLE,
            &error,
        )),
        other => PageError::internal("infra::http::repo", &other),
    }
}
