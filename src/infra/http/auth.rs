//! Identity resolution middleware.
//!
//! Runs before every handler, turns the session token (bearer header or
//! cookie) into a [`CurrentUser`] extension, and leaves authorization
//! decisions to the handlers. Handlers never reach into ambient session
//! state; they receive the identity, or its absence, explicitly.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::identity::Identity;

use super::RouterState;
use super::error::PageError;

pub const SESSION_COOKIE: &str = "piazza_session";

/// The resolved principal for this request; `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Identity>);

pub async fn resolve_identity(
    State(state): State<RouterState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = bearer_token(&request).or_else(|| cookie_token(&request));

    let current = match token {
        None => CurrentUser(None),
        Some(token) => match state.identity.resolve(&token).await {
            Ok(identity) => CurrentUser(identity),
            Err(err) => return PageError::from(err).into_response(),
        },
    };

    request.extensions_mut().insert(current);
    next.run(request).await
}

/// Extract the identity or produce the login redirect carrying the
/// requested path as the return target.
pub fn require_identity(
    current: &CurrentUser,
    login_url: &str,
    requested: &Uri,
) -> Result<Identity, PageError> {
    match &current.0 {
        Some(identity) => Ok(identity.clone()),
        None => Err(PageError::login_redirect(login_url, requested.path())),
    }
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    let raw = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::to_string)
}

fn cookie_token(request: &Request<Body>) -> Option<String> {
    let raw = request.headers().get(header::COOKIE)?.to_str().ok()?;
    parse_cookie(raw, SESSION_COOKIE)
}

fn parse_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}
