pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::feed::FeedService;
use crate::application::follows::FollowService;
use crate::application::identity::IdentityProvider;
use crate::application::posts::PostService;
use crate::application::repos::HealthRepo;
use crate::cache::{CacheState, feed_cache_layer};

#[derive(Clone)]
pub struct RouterState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub follows: Arc<FollowService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub health: Arc<dyn HealthRepo>,
    /// Where unauthenticated writers are sent; the requested path rides
    /// along in a `next` query parameter.
    pub login_url: String,
}

pub fn build_router(state: RouterState, cache: CacheState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/follow", get(handlers::follow_feed))
        .route("/group/{slug}", get(handlers::group_posts))
        .route("/profile/{username}", get(handlers::profile))
        .route("/profile/{username}/follow", get(handlers::profile_follow))
        .route(
            "/profile/{username}/unfollow",
            get(handlers::profile_unfollow),
        )
        .route(
            "/create",
            get(handlers::create_form).post(handlers::create_post),
        )
        .route("/posts/{id}", get(handlers::post_detail))
        .route(
            "/posts/{id}/edit",
            get(handlers::edit_form).post(handlers::edit_post),
        )
        .route("/posts/{id}/comment", post(handlers::add_comment))
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_identity,
        ))
        .layer(axum_middleware::from_fn_with_state(cache, feed_cache_layer))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
        .with_state(state)
}
