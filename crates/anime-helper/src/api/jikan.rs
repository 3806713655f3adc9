//! Jikan API v4 client (MyAnimeList mirror), used as the fallback catalog.

use super::client::HttpClient;
use super::types::*;
use crate::error::ToolError;
use shared::MediaKind;
use tracing::{debug, info};

/// Jikan REST client
#[derive(Clone)]
pub struct JikanClient {
    http: HttpClient,
    base_url: String,
}

impl JikanClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET an endpoint, failing on any non-success status
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ToolError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http.get(&url, query).await?;

        if !response.is_success() {
            return Err(ToolError::upstream(response.status, &url));
        }

        debug!(url = %url, "Jikan request successful");
        Ok(response.json()?)
    }

    async fn list(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<JikanItem>, ToolError> {
        let list: JikanList = self.get(endpoint, query).await?;
        Ok(list.data.unwrap_or_default())
    }

    /// Title search
    pub async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<JikanItem>, ToolError> {
        info!(kind = %kind, query, limit, "Searching Jikan");
        let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
        params.extend(type_param(formats));
        self.list(&format!("/{}", kind.jikan_segment()), &params).await
    }

    /// Most popular titles overall
    pub async fn top_by_popularity(
        &self,
        kind: MediaKind,
        limit: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<JikanItem>, ToolError> {
        info!(kind = %kind, limit, "Fetching Jikan top by popularity");
        let mut params = vec![
            ("filter", "bypopularity".to_string()),
            ("limit", limit.to_string()),
        ];
        params.extend(type_param(formats));
        self.list(&format!("/top/{}", kind.jikan_segment()), &params)
            .await
    }

    /// Most popular titles that started within one calendar year
    pub async fn popular_in_year(
        &self,
        kind: MediaKind,
        year: i32,
        limit: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<JikanItem>, ToolError> {
        info!(kind = %kind, year, limit, "Fetching Jikan popular titles for year");
        let mut params = vec![
            ("order_by", "popularity".to_string()),
            ("sort", "asc".to_string()),
            ("start_date", format!("{}-01-01", year)),
            ("end_date", format!("{}-12-31", year)),
            ("limit", limit.to_string()),
        ];
        params.extend(type_param(formats));
        self.list(&format!("/{}", kind.jikan_segment()), &params).await
    }

    /// Full record by MAL id
    pub async fn details(&self, kind: MediaKind, mal_id: i64) -> Result<JikanItem, ToolError> {
        debug!(kind = %kind, mal_id, "Fetching Jikan details");
        let single: JikanSingle = self
            .get(&format!("/{}/{}", kind.jikan_segment(), mal_id), &[])
            .await?;
        single
            .data
            .ok_or_else(|| ToolError::Unexpected(format!("Jikan returned no data for id {}", mal_id)))
    }
}

/// Jikan filters by a single `type`; with several formats requested the
/// results are filtered after normalization instead.
fn type_param(formats: Option<&[String]>) -> Option<(&'static str, String)> {
    match formats {
        Some([single]) => Some(("type", single.to_ascii_lowercase())),
        _ => None,
    }
}
