//! AniList GraphQL queries.
//!
//! All AniList traffic goes through the shared [`QueryCache`], so repeated
//! identical lookups within the TTL never reach the network.

use super::types::*;
use crate::cache::QueryCache;
use crate::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::MediaKind;
use std::sync::Arc;
use tracing::debug;

const SEARCH_QUERY: &str = r#"
query ($q: String, $type: MediaType, $per: Int, $formats: [MediaFormat]) {
  Page(perPage: $per) {
    media(search: $q, type: $type, sort: [SEARCH_MATCH, POPULARITY_DESC], format_in: $formats) {
      id idMal siteUrl format episodes chapters averageScore seasonYear
      startDate { year } title { romaji english native }
    }
  }
}"#;

const DETAILS_QUERY: &str = r#"
query ($id: Int, $type: MediaType) {
  Media(id: $id, type: $type) {
    id idMal siteUrl format status episodes chapters averageScore
    genres description(asHtml: false) title { romaji english native }
    tags { name } externalLinks { site url }
    recommendations(sort: RATING_DESC, perPage: 10) {
      nodes { mediaRecommendation {
        id idMal siteUrl format episodes chapters averageScore seasonYear
        startDate { year } title { romaji english native }
      }}
    }
  }
}"#;

const TRENDING_QUERY: &str = r#"
query ($type: MediaType, $per: Int, $formats: [MediaFormat]) {
  Page(perPage: $per) {
    media(type: $type, sort: TRENDING_DESC, format_in: $formats) {
      id idMal siteUrl format episodes chapters averageScore seasonYear
      startDate { year } title { romaji english native }
    }
  }
}"#;

const SEASON_QUERY: &str = r#"
query ($type: MediaType!, $season: MediaSeason!, $year: Int!, $per: Int!, $sort: [MediaSort!]!, $formats: [MediaFormat]) {
  Page(perPage: $per) {
    media(type: $type, season: $season, seasonYear: $year, sort: $sort, format_in: $formats) {
      id idMal siteUrl format episodes averageScore seasonYear
      startDate { year } title { romaji english native }
    }
  }
}"#;

const BEST_MATCH_QUERY: &str = r#"
query ($q: String) {
  Page(perPage: 1) {
    media(search: $q, type: ANIME, sort: [SEARCH_MATCH, POPULARITY_DESC]) { id }
  }
}"#;

const AIRING_STATUS_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id siteUrl title { romaji english native }
    nextAiringEpisode { episode airingAt }
    airingSchedule(notYetAired: false, perPage: 1, sort: TIME_DESC) {
      nodes { episode airingAt }
    }
  }
}"#;

const CALENDAR_QUERY: &str = r#"
query ($from: Int!, $to: Int!, $per: Int!) {
  Page(perPage: $per) {
    airingSchedules(airingAt_greater: $from, airingAt_lesser: $to, sort: TIME) {
      episode airingAt
      media { id idMal siteUrl format title { romaji english native } }
    }
  }
}"#;

/// Typed AniList queries over the shared query cache
#[derive(Clone)]
pub struct AnilistClient {
    cache: Arc<QueryCache>,
}

impl AnilistClient {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self { cache }
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ToolError> {
        let data = self.cache.execute_query(query, variables).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn page_media(&self, query: &str, variables: Value) -> Result<Vec<AnilistMedia>, ToolError> {
        let data: PageData = self.query(query, variables).await?;
        Ok(data.page.and_then(|p| p.media).unwrap_or_default())
    }

    /// Title search, best match first, then by popularity
    pub async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        per_page: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<AnilistMedia>, ToolError> {
        debug!(kind = %kind, query, per_page, "AniList search");
        self.page_media(
            SEARCH_QUERY,
            json!({ "q": query, "type": kind.as_str(), "per": per_page, "formats": formats }),
        )
        .await
    }

    /// Full record with up to ten recommendations
    pub async fn details(&self, kind: MediaKind, id: i64) -> Result<Option<AnilistMedia>, ToolError> {
        let data: MediaData = self
            .query(DETAILS_QUERY, json!({ "id": id, "type": kind.as_str() }))
            .await?;
        Ok(data.media)
    }

    /// Currently trending titles
    pub async fn trending(
        &self,
        kind: MediaKind,
        per_page: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<AnilistMedia>, ToolError> {
        self.page_media(
            TRENDING_QUERY,
            json!({ "type": kind.as_str(), "per": per_page, "formats": formats }),
        )
        .await
    }

    /// Anime of one season, in the given sort order
    pub async fn season(
        &self,
        season: &str,
        year: i32,
        sort: &str,
        per_page: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<AnilistMedia>, ToolError> {
        self.page_media(
            SEASON_QUERY,
            json!({
                "type": MediaKind::Anime.as_str(),
                "season": season,
                "year": year,
                "per": per_page,
                "sort": [sort],
                "formats": formats,
            }),
        )
        .await
    }

    /// Id of the best-matching anime for free text, if any
    pub async fn best_match_id(&self, query: &str) -> Result<Option<i64>, ToolError> {
        let media = self.page_media(BEST_MATCH_QUERY, json!({ "q": query })).await?;
        Ok(media.into_iter().next().and_then(|m| m.id))
    }

    /// Last aired and next scheduled episode of an anime
    pub async fn airing_status(&self, id: i64) -> Result<Option<AnilistMedia>, ToolError> {
        let data: MediaData = self.query(AIRING_STATUS_QUERY, json!({ "id": id })).await?;
        Ok(data.media)
    }

    /// Episodes airing strictly between two epoch timestamps, ascending
    pub async fn airing_schedules(
        &self,
        from: i64,
        to: i64,
        per_page: u32,
    ) -> Result<Vec<AiringSchedule>, ToolError> {
        let data: PageData = self
            .query(CALENDAR_QUERY, json!({ "from": from, "to": to, "per": per_page }))
            .await?;
        Ok(data.page.and_then(|p| p.airing_schedules).unwrap_or_default())
    }
}
