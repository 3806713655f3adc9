//! Tool operations.
//!
//! Each tool validates and clamps its arguments, queries AniList, falls back
//! to Jikan where that is allowed, normalizes the records and renders the
//! outcome as a JSON envelope. Tools never fail: every error is reported
//! inside the returned value.

mod airing;
mod cache_tools;
mod details;
mod meta;
mod resolve;
mod search;
mod trending;
pub mod types;

pub use meta::help_text;
pub use trending::Season;
pub use types::*;

use crate::api::{AnilistClient, HttpClient, JikanClient};
use crate::cache::QueryCache;
use crate::error::ToolError;
use shared::config::UpstreamConfig;
use shared::{Config, MediaKind, Source};
use std::sync::Arc;
use tracing::info;

/// Largest page any listing tool will request
pub const MAX_PER_PAGE: u32 = 25;

/// The tool set, sharing one query cache and one HTTP client
#[derive(Clone)]
pub struct AnimeTools {
    anilist: AnilistClient,
    jikan: JikanClient,
    cache: Arc<QueryCache>,
}

impl AnimeTools {
    /// Build the tools over a real HTTP client from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = HttpClient::new(config.upstream.user_agent.clone())?;
        Ok(Self::with_http(http, &config.upstream))
    }

    pub fn with_http(http: HttpClient, upstream: &UpstreamConfig) -> Self {
        let cache = Arc::new(QueryCache::new(http.clone(), upstream.anilist_url.clone()));
        info!(
            anilist = %upstream.anilist_url,
            jikan = %upstream.jikan_url,
            "Tool set ready"
        );
        Self {
            anilist: AnilistClient::new(cache.clone()),
            jikan: JikanClient::new(http, upstream.jikan_url.clone()),
            cache,
        }
    }

    pub fn anilist_endpoint(&self) -> &str {
        self.cache.endpoint()
    }

    pub fn jikan_endpoint(&self) -> &str {
        self.jikan.base_url()
    }
}

/// Clamp an optional caller limit into `[1, max]`
pub(crate) fn clamp_limit(value: Option<i64>, default: u32, max: u32) -> u32 {
    value
        .unwrap_or(i64::from(default))
        .clamp(1, i64::from(max)) as u32
}

/// Parse a kind argument; absent means ANIME, unknown is a bad request
pub(crate) fn parse_kind(value: Option<&str>) -> Result<MediaKind, ToolError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(MediaKind::Anime),
        Some(v) => v.parse().map_err(|_| {
            ToolError::BadRequest(format!("Invalid kind '{}': expected ANIME or MANGA", v))
        }),
    }
}

/// Parse a source argument; absent means AniList, unknown is a bad request
pub(crate) fn parse_source(value: Option<&str>) -> Result<Source, ToolError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Source::Anilist),
        Some(v) => v.parse().map_err(|_| {
            ToolError::BadRequest(format!("Invalid source '{}': expected anilist or jikan", v))
        }),
    }
}

/// Upper-case a format filter, dropping blanks; an empty filter is no filter
pub(crate) fn normalize_formats(formats: Option<&[String]>) -> Option<Vec<String>> {
    let formats: Vec<String> = formats?
        .iter()
        .map(|f| f.trim().to_ascii_uppercase())
        .filter(|f| !f.is_empty())
        .collect();
    (!formats.is_empty()).then_some(formats)
}
