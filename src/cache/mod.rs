//! Whole-response cache for the public feed.
//!
//! The all-posts listing is the one hot, anonymous, idempotent route; its
//! rendered response is kept for a short fixed interval keyed by path and
//! query string. Invalidation is global (`clear`); there is nothing finer
//! worth tracking for a single cached route.

mod config;
mod keys;
mod lock;
mod middleware;
mod store;

pub use config::CacheConfig;
pub use keys::FeedKey;
pub use middleware::{CacheState, feed_cache_layer};
pub use store::{CachedResponse, ResponseCache};
