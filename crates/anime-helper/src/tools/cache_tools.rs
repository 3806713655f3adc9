//! Query cache introspection.

use super::AnimeTools;
use crate::envelope::respond;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct CacheClearResponse {
    cleared: usize,
}

impl AnimeTools {
    /// Hits, misses, stored entries and TTL of the AniList query cache
    pub fn cache_info(&self) -> Value {
        respond("cache", Ok(self.cache.info()))
    }

    /// Drop every cached query; counters survive
    pub fn cache_clear(&self) -> Value {
        let cleared = self.cache.clear();
        respond("cache", Ok(CacheClearResponse { cleared }))
    }
}
