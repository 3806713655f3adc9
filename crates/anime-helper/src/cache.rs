//! Time-bounded cache for AniList GraphQL queries.
//!
//! Identical query+variables pairs are served from memory for five minutes.
//! The cache owns its entry map and hit/miss counters behind a mutex; two
//! concurrent misses on the same key may both fetch, and the later write
//! wins.

use crate::api::HttpClient;
use crate::error::ToolError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Lifetime of every cache entry
pub const CACHE_TTL: Duration = Duration::from_secs(300);

const KEY_PREFIX: &str = "GQL";

/// Build the cache key for a query and its variables.
///
/// Variables are hashed in canonical form (object keys sorted recursively),
/// so the same set of variables always yields the same key.
pub fn cache_key(query: &str, variables: &Value) -> String {
    let query_hash = Sha256::digest(query.as_bytes());
    let vars_hash = Sha256::digest(canonical_json(variables).as_bytes());
    format!("{}|{:x}|{:x}", KEY_PREFIX, query_hash, vars_hash)
}

fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    sorted.insert(key.clone(), sort(&map[key]));
                }
                Value::Object(sorted)
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}

struct CacheEntry {
    expires_at: Instant,
    value: Value,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    /// Stored entries, expired or not
    pub size: usize,
    pub ttl_sec: u64,
}

/// GraphQL executor with a TTL cache in front of the transport
pub struct QueryCache {
    http: HttpClient,
    endpoint: String,
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a GraphQL query, returning its `data` object.
    ///
    /// Responses carrying an `errors` list fail with [`ToolError::GraphQl`]
    /// and are not cached.
    pub async fn execute_query(&self, query: &str, variables: Value) -> Result<Value, ToolError> {
        let key = cache_key(query, &variables);

        if let Some(cached) = self.lookup(&key, Instant::now()) {
            return Ok(cached);
        }

        let response = self
            .http
            .post_json(
                &self.endpoint,
                json!({ "query": query, "variables": variables }),
                vec![("Content-Type".to_string(), "application/json".to_string())],
            )
            .await?;

        let body: Value = match response.json() {
            Ok(body) => body,
            Err(_) if !response.is_success() => {
                return Err(ToolError::upstream(response.status, &self.endpoint))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(ToolError::GraphQl(errors.to_string()));
        }
        if !response.is_success() {
            return Err(ToolError::upstream(response.status, &self.endpoint));
        }

        let data = match body.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => {
                return Err(ToolError::Unexpected(
                    "GraphQL response carried no data".to_string(),
                ))
            }
        };
        self.store(key, data.clone(), Instant::now());
        Ok(data)
    }

    /// Hit/miss counters, entry count and TTL
    pub fn info(&self) -> CacheInfo {
        let state = self.state();
        CacheInfo {
            hits: state.hits,
            misses: state.misses,
            size: state.entries.len(),
            ttl_sec: CACHE_TTL.as_secs(),
        }
    }

    /// Drop every entry, returning how many were removed.
    /// Counters are left untouched.
    pub fn clear(&self) -> usize {
        let mut state = self.state();
        let cleared = state.entries.len();
        state.entries.clear();
        info!(cleared, "Query cache cleared");
        cleared
    }

    fn lookup(&self, key: &str, now: Instant) -> Option<Value> {
        let mut state = self.state();

        match state.entries.get(key).map(|entry| now >= entry.expires_at) {
            None => {
                state.misses += 1;
                debug!(key, "Cache miss");
                None
            }
            Some(true) => {
                state.entries.remove(key);
                state.misses += 1;
                debug!(key, "Cache entry expired");
                None
            }
            Some(false) => {
                state.hits += 1;
                debug!(key, "Cache hit");
                state.entries.get(key).map(|entry| entry.value.clone())
            }
        }
    }

    fn store(&self, key: String, value: Value, now: Instant) {
        let entry = CacheEntry {
            expires_at: now + CACHE_TTL,
            value,
        };
        self.state().entries.insert(key, entry);
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
