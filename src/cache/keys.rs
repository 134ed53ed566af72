//! Cache key definitions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identifies one cached feed response: the route path plus a hash of the
/// raw query string, so `?page=1` and `?page=2` live in separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub path: String,
    pub query_hash: u64,
}

impl FeedKey {
    pub fn new(path: &str, query: &str) -> Self {
        Self {
            path: path.to_string(),
            query_hash: hash_query(query),
        }
    }
}

fn hash_query(query: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}
