//! Airing schedule tools (AniList only).

use super::{clamp_limit, AiringCalendarRequest, AiringStatusRequest, AnimeTools};
use crate::envelope::respond;
use crate::error::ToolError;
use crate::normalize::{airing_episodes, airing_item_from_anilist, normalize_title};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use shared::{AiringItem, EpisodeAiring, Source, Title};
use tracing::info;

const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 30;
const DEFAULT_PER_PAGE: u32 = 50;
const MAX_CALENDAR_PAGE: u32 = 50;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AiringStatusResponse {
    Found {
        id: Option<i64>,
        titles: Title,
        url: Option<String>,
        last: Option<EpisodeAiring>,
        next: Option<EpisodeAiring>,
    },
    NotFound {
        query: String,
        status: &'static str,
    },
}

#[derive(Debug, Serialize)]
struct AiringCalendarResponse {
    days: u32,
    results: Vec<AiringItem>,
}

impl AnimeTools {
    /// Last aired and next scheduled episode of an anime, by AniList id or
    /// by the best match for a title. The id wins when both are given.
    pub async fn airing_status(&self, request: AiringStatusRequest) -> Value {
        respond(Source::Anilist.as_str(), self.airing_status_inner(request).await)
    }

    async fn airing_status_inner(
        &self,
        request: AiringStatusRequest,
    ) -> Result<AiringStatusResponse, ToolError> {
        let id = match (request.id, request.query.as_deref().map(str::trim)) {
            (Some(id), _) => id,
            (None, Some(query)) if !query.is_empty() => {
                match self.anilist.best_match_id(query).await? {
                    Some(id) => id,
                    None => {
                        info!(query, "No anime matches airing status query");
                        return Ok(AiringStatusResponse::NotFound {
                            query: query.to_string(),
                            status: "NOT_FOUND",
                        });
                    }
                }
            }
            _ => {
                return Err(ToolError::BadRequest(
                    "Provide id or query".to_string(),
                ))
            }
        };

        let media = self
            .anilist
            .airing_status(id)
            .await?
            .ok_or_else(|| ToolError::Unexpected(format!("AniList returned no media for id {}", id)))?;
        let (last, next) = airing_episodes(&media);

        Ok(AiringStatusResponse::Found {
            id: media.id,
            titles: normalize_title(media.title.as_ref()),
            url: media.site_url.clone(),
            last,
            next,
        })
    }

    /// Episodes airing in the next `days` days, soonest first
    pub async fn airing_calendar(&self, request: AiringCalendarRequest) -> Value {
        self.airing_calendar_at(request, Utc::now().timestamp()).await
    }

    pub(crate) async fn airing_calendar_at(&self, request: AiringCalendarRequest, now: i64) -> Value {
        let days = clamp_limit(request.days, DEFAULT_DAYS, MAX_DAYS);
        let per_page = clamp_limit(request.per_page, DEFAULT_PER_PAGE, MAX_CALENDAR_PAGE);
        let until = now + i64::from(days) * SECONDS_PER_DAY;

        let outcome = self
            .anilist
            .airing_schedules(now, until, per_page)
            .await
            .map(|schedules| AiringCalendarResponse {
                days,
                results: schedules.iter().map(airing_item_from_anilist).collect(),
            });

        respond(Source::Anilist.as_str(), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::tools::fixtures::*;
    use serde_json::json;
    use std::sync::Arc;

    fn status_media() -> Value {
        json!({"data": {"Media": {
            "id": 21,
            "siteUrl": "https://anilist.co/anime/21",
            "title": {"romaji": "ONE PIECE", "english": "ONE PIECE"},
            "nextAiringEpisode": {"episode": 1123, "airingAt": 1_731_200_000},
            "airingSchedule": {"nodes": [{"episode": 1122, "airingAt": 1_730_600_000}]}
        }}})
    }

    #[tokio::test]
    async fn test_status_by_query_resolves_best_match() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![
                ok_json(json!({"data": {"Page": {"media": [{"id": 21}]}}})),
                ok_json(status_media()),
            ],
        ));
        let tools = tools_over(backend.clone());

        let value = tools
            .airing_status(AiringStatusRequest {
                id: None,
                query: Some("One Piece".into()),
            })
            .await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["id"], 21);
        assert_eq!(value["titles"]["romaji"], "ONE PIECE");
        assert_eq!(value["last"], json!({"episode": 1122, "when": 1_730_600_000}));
        assert_eq!(value["next"], json!({"episode": 1123, "when": 1_731_200_000}));

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body.as_ref().unwrap()["variables"], json!({"id": 21}));
    }

    #[tokio::test]
    async fn test_status_prefers_id_over_query() {
        let backend = Arc::new(RoutedBackend::new().route(ANILIST, vec![ok_json(status_media())]));
        let tools = tools_over(backend.clone());

        let value = tools
            .airing_status(AiringStatusRequest {
                id: Some(21),
                query: Some("Naruto".into()),
            })
            .await;

        assert_eq!(value["id"], 21);
        assert_eq!(backend.calls_to(ANILIST), 1);
    }

    #[tokio::test]
    async fn test_status_finished_show_has_no_next() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Media": {
                "id": 1,
                "nextAiringEpisode": null,
                "airingSchedule": {"nodes": []}
            }}}))],
        ));
        let tools = tools_over(backend);

        let value = tools
            .airing_status(AiringStatusRequest { id: Some(1), query: None })
            .await;

        assert!(value["last"].is_null());
        assert!(value["next"].is_null());
    }

    #[tokio::test]
    async fn test_status_not_found() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Page": {"media": []}}}))],
        ));
        let tools = tools_over(backend);

        let value = tools
            .airing_status(AiringStatusRequest {
                id: None,
                query: Some("no such show".into()),
            })
            .await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["status"], "NOT_FOUND");
        assert_eq!(value["query"], "no such show");
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn test_status_requires_id_or_query() {
        let backend = Arc::new(RoutedBackend::new());
        let tools = tools_over(backend.clone());

        for query in [None, Some(String::new()), Some("   ".to_string())] {
            let value = tools
                .airing_status(AiringStatusRequest { id: None, query })
                .await;
            assert_eq!(value["schemaVersion"], "1.0.0");
            assert_eq!(value["error"]["code"], "BAD_REQUEST");
            assert_eq!(value["error"]["source"], "anilist");
        }
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_calendar_window_and_items() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Page": {"airingSchedules": [
                {"episode": 3, "airingAt": 1_000_100, "media": {"id": 5, "idMal": 50, "format": "TV", "title": {"romaji": "A"}}},
                {"episode": 8, "airingAt": 1_000_200, "media": null}
            ]}}}))],
        ));
        let tools = tools_over(backend.clone());

        let value = tools
            .airing_calendar_at(AiringCalendarRequest { days: Some(2), per_page: None }, 1_000_000)
            .await;

        assert_eq!(value["days"], 2);
        assert_eq!(value["results"][0]["when"], 1_000_100);
        assert_eq!(value["results"][0]["media"]["idMal"], 50);
        assert!(value["results"][0]["media"]["score"].is_null());
        assert_eq!(value["results"][1]["episode"], 8);
        assert!(value["results"][1]["media"]["id"].is_null());

        let variables = backend.requests()[0].body.clone().unwrap()["variables"].clone();
        assert_eq!(variables, json!({"from": 1_000_000, "to": 1_172_800, "per": 50}));
    }

    #[tokio::test]
    async fn test_calendar_clamps_arguments() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Page": {"airingSchedules": []}}}))],
        ));
        let tools = tools_over(backend.clone());

        let value = tools
            .airing_calendar_at(
                AiringCalendarRequest { days: Some(90), per_page: Some(0) },
                0,
            )
            .await;

        assert_eq!(value["days"], 30);
        assert_eq!(value["results"], json!([]));
        let variables = backend.requests()[0].body.clone().unwrap()["variables"].clone();
        assert_eq!(variables["to"], 30 * 86_400);
        assert_eq!(variables["per"], 1);
    }
}
