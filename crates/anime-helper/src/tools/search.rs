//! Title search with automatic Jikan fallback.

use super::{
    clamp_limit, normalize_formats, parse_kind, parse_source, AnimeTools, SearchRequest,
    MAX_PER_PAGE,
};
use crate::envelope::respond;
use crate::error::ToolError;
use crate::normalize::{hit_from_anilist, hit_from_jikan, retain_formats};
use serde::Serialize;
use serde_json::Value;
use shared::{MediaHit, MediaKind, Source};
use tracing::{info, warn};

const DEFAULT_LIMIT: u32 = 5;

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    kind: MediaKind,
    source: Source,
    results: Vec<MediaHit>,
}

impl AnimeTools {
    /// Search ANIME or MANGA by title.
    ///
    /// AniList failures are retried against Jikan; an error envelope is
    /// returned only when Jikan fails too.
    pub async fn search_media(&self, request: SearchRequest) -> Value {
        let requested = request
            .source
            .clone()
            .unwrap_or_else(|| Source::Anilist.to_string());

        let (kind, source) = match (
            parse_kind(request.kind.as_deref()),
            parse_source(request.source.as_deref()),
        ) {
            (Ok(kind), Ok(source)) => (kind, source),
            (Err(e), _) | (_, Err(e)) => return respond::<()>(&requested, Err(e)),
        };

        let query = request.query.trim().to_string();
        if query.is_empty() {
            return respond::<()>(
                source.as_str(),
                Err(ToolError::BadRequest("Provide a query".to_string())),
            );
        }

        let limit = clamp_limit(request.limit, DEFAULT_LIMIT, MAX_PER_PAGE);
        let formats = normalize_formats(request.format_in.as_deref());

        let (source, outcome) = match source {
            Source::Anilist => match self
                .search_anilist(kind, &query, limit, formats.as_deref())
                .await
            {
                Ok(hits) => (Source::Anilist, Ok(hits)),
                Err(e) => {
                    warn!(
                        query = %query,
                        error = %e,
                        "AniList search failed, falling back to Jikan"
                    );
                    (
                        Source::Jikan,
                        self.search_jikan(kind, &query, limit, formats.as_deref()).await,
                    )
                }
            },
            Source::Jikan => (
                Source::Jikan,
                self.search_jikan(kind, &query, limit, formats.as_deref()).await,
            ),
        };

        respond(
            source.as_str(),
            outcome.map(|results| SearchResponse {
                query,
                kind,
                source,
                results,
            }),
        )
    }

    pub(crate) async fn search_anilist(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<MediaHit>, ToolError> {
        let media = self.anilist.search(kind, query, limit, formats).await?;
        let mut hits: Vec<MediaHit> = media.iter().map(hit_from_anilist).collect();
        hits.truncate(limit as usize);
        info!(query, results = hits.len(), "AniList search complete");
        Ok(hits)
    }

    pub(crate) async fn search_jikan(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
        formats: Option<&[String]>,
    ) -> Result<Vec<MediaHit>, ToolError> {
        let items = self.jikan.search(kind, query, limit, formats).await?;
        let mut hits: Vec<MediaHit> = items.iter().map(|item| hit_from_jikan(item, kind)).collect();
        retain_formats(&mut hits, formats);
        hits.truncate(limit as usize);
        info!(query, results = hits.len(), "Jikan search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::api::TransportError;
    use crate::tools::fixtures::*;
    use serde_json::json;
    use std::sync::Arc;

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            ..Default::default()
        }
    }

    fn anilist_page(ids: &[i64]) -> Value {
        let media: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({"id": id, "format": "TV", "title": {"romaji": format!("Show {}", id)}})
            })
            .collect();
        json!({"data": {"Page": {"media": media}}})
    }

    #[tokio::test]
    async fn test_search_anilist() {
        let backend = Arc::new(
            RoutedBackend::new().route(ANILIST, vec![ok_json(anilist_page(&[21, 22]))]),
        );
        let tools = tools_over(backend.clone());

        let value = tools.search_media(request("one piece")).await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["source"], "anilist");
        assert_eq!(value["query"], "one piece");
        assert_eq!(value["kind"], "ANIME");
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["results"][0]["id"], 21);
        assert_eq!(backend.calls_to(JIKAN), 0);

        let body = backend.requests()[0].body.clone().unwrap();
        assert_eq!(body["variables"]["per"], 5);
        assert_eq!(body["variables"]["type"], "ANIME");
    }

    #[tokio::test]
    async fn test_repeated_search_hits_cache() {
        let backend =
            Arc::new(RoutedBackend::new().route(ANILIST, vec![ok_json(anilist_page(&[1]))]));
        let tools = tools_over(backend.clone());

        let first = tools.search_media(request("frieren")).await;
        let second = tools.search_media(request("frieren")).await;

        assert_eq!(first, second);
        assert_eq!(backend.calls_to(ANILIST), 1);
    }

    #[tokio::test]
    async fn test_search_falls_back_to_jikan() {
        let backend = Arc::new(
            RoutedBackend::new()
                .route(ANILIST, vec![status(503)])
                .route(
                    JIKAN,
                    vec![ok_json(json!({"data": [{
                        "mal_id": 21, "title": "One Piece", "type": "TV",
                        "episodes": 1100, "score": 8.7, "url": "https://myanimelist.net/anime/21"
                    }]}))],
                ),
        );
        let tools = tools_over(backend.clone());

        let value = tools.search_media(request("one piece")).await;

        assert_eq!(value["source"], "jikan");
        assert_eq!(value["results"][0]["source"], "jikan");
        assert_eq!(value["results"][0]["score"], 87);
        assert_eq!(value["results"][0]["idMal"], 21);
        assert_eq!(backend.calls_to(ANILIST), 3);
        assert_eq!(backend.calls_to(JIKAN), 1);
    }

    #[tokio::test]
    async fn test_empty_results_from_both_catalogs() {
        let backend = Arc::new(
            RoutedBackend::new()
                .route(ANILIST, vec![ok_json(anilist_page(&[]))])
                .route(JIKAN, vec![ok_json(json!({"data": []}))]),
        );
        let tools = tools_over(backend.clone());

        let value = tools.search_media(request("zzzz")).await;
        assert_eq!(value["source"], "anilist");
        assert_eq!(value["results"], json!([]));

        let value = tools
            .search_media(SearchRequest {
                source: Some("jikan".into()),
                ..request("zzzz")
            })
            .await;
        assert_eq!(value["source"], "jikan");
        assert_eq!(value["results"], json!([]));
    }

    #[tokio::test]
    async fn test_both_catalogs_failing_returns_envelope() {
        let backend = Arc::new(
            RoutedBackend::new()
                .route(ANILIST, vec![Err(TransportError::Timeout)])
                .route(JIKAN, vec![status(404)]),
        );
        let tools = tools_over(backend);

        let value = tools.search_media(request("naruto")).await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["error"]["code"], "UPSTREAM_404");
        assert_eq!(value["error"]["source"], "jikan");
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let backend =
            Arc::new(RoutedBackend::new().route(ANILIST, vec![ok_json(anilist_page(&[]))]));
        let tools = tools_over(backend.clone());

        tools
            .search_media(SearchRequest {
                limit: Some(100),
                ..request("a")
            })
            .await;
        tools
            .search_media(SearchRequest {
                limit: Some(0),
                ..request("b")
            })
            .await;

        let requests = backend.requests();
        assert_eq!(requests[0].body.as_ref().unwrap()["variables"]["per"], 25);
        assert_eq!(requests[1].body.as_ref().unwrap()["variables"]["per"], 1);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_bad_requests() {
        let tools = tools_over(Arc::new(RoutedBackend::new()));

        let value = tools.search_media(request("   ")).await;
        assert_eq!(value["error"]["code"], "BAD_REQUEST");

        let value = tools
            .search_media(SearchRequest {
                kind: Some("novel".into()),
                ..request("x")
            })
            .await;
        assert_eq!(value["error"]["code"], "BAD_REQUEST");
        assert_eq!(value["schemaVersion"], "1.0.0");
    }
}
