//! Response cache middleware for the all-posts feed.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::debug;

use super::keys::FeedKey;
use super::store::{CachedResponse, ResponseCache};

/// Responses larger than this are served uncached rather than buffered.
const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct CacheState {
    pub cache: Arc<ResponseCache>,
    pub enabled: bool,
}

/// Serve `GET /` from the response cache when a live entry exists, and
/// store successful responses on the way out. Every other route passes
/// through untouched.
pub async fn feed_cache_layer(
    State(state): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.enabled || request.method() != Method::GET || !cacheable(request.uri().path()) {
        return next.run(request).await;
    }

    let key = FeedKey::new(
        request.uri().path(),
        request.uri().query().unwrap_or_default(),
    );

    if let Some(cached) = state.cache.get(&key) {
        counter!("piazza_feed_cache_hit_total").increment(1);
        debug!(target = "piazza::cache", outcome = "hit", "serving cached feed");
        return build_response(cached);
    }

    counter!("piazza_feed_cache_miss_total").increment(1);
    let response = next.run(request).await;

    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedResponse {
        status: parts.status.as_u16(),
        headers: parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect(),
        body: bytes.clone(),
    };
    state.cache.set(key, cached);

    Response::from_parts(parts, Body::from(bytes))
}

/// Only the all-posts feed is cached; it is anonymous and idempotent.
fn cacheable(path: &str) -> bool {
    path == "/"
}

fn build_response(cached: CachedResponse) -> Response {
    use axum::http::HeaderValue;

    let mut builder = Response::builder().status(cached.status);
    for (name, value) in cached.headers {
        if let Ok(header_value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, header_value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
