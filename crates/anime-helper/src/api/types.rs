//! Upstream response types for AniList (GraphQL) and Jikan (REST).
//!
//! Upstream payloads are partial: any field may be missing or null. Every
//! field is therefore optional and defaulted so decoding never fails on a
//! missing key; normalization decides what an absent value means.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// AniList
// ---------------------------------------------------------------------------

/// `data` of a `Page { ... }` query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: Option<AnilistPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnilistPage {
    pub media: Option<Vec<AnilistMedia>>,
    pub airing_schedules: Option<Vec<AiringSchedule>>,
}

/// `data` of a `Media(id: ...) { ... }` query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<AnilistMedia>,
}

/// AniList `Media` object; only the selected fields are ever present
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnilistMedia {
    pub id: Option<i64>,
    pub id_mal: Option<i64>,
    pub site_url: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    pub average_score: Option<i32>,
    pub season_year: Option<i32>,
    pub start_date: Option<FuzzyDate>,
    pub title: Option<AnilistTitle>,
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<AnilistTag>>,
    pub external_links: Option<Vec<AnilistExternalLink>>,
    pub recommendations: Option<RecommendationConnection>,
    pub next_airing_episode: Option<AiringEpisode>,
    pub airing_schedule: Option<AiringScheduleConnection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnilistTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnilistTag {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnilistExternalLink {
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationConnection {
    pub nodes: Option<Vec<RecommendationNode>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendationNode {
    pub media_recommendation: Option<AnilistMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiringEpisode {
    pub episode: Option<i32>,
    pub airing_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiringScheduleConnection {
    pub nodes: Option<Vec<AiringEpisode>>,
}

/// Entry of `Page { airingSchedules { ... } }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiringSchedule {
    pub episode: Option<i32>,
    pub airing_at: Option<i64>,
    pub media: Option<AnilistMedia>,
}

// ---------------------------------------------------------------------------
// Jikan
// ---------------------------------------------------------------------------

/// List response (`/anime`, `/top/manga`, ...)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanList {
    pub data: Option<Vec<JikanItem>>,
}

/// Single-item response (`/anime/{id}`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanSingle {
    pub data: Option<JikanItem>,
}

/// Anime or manga entry; manga use `published` where anime use `aired`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanItem {
    pub mal_id: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    /// 0-10 scale with one decimal
    pub score: Option<f64>,
    pub year: Option<i32>,
    pub synopsis: Option<String>,
    pub genres: Option<Vec<JikanEntity>>,
    pub aired: Option<JikanDateRange>,
    pub published: Option<JikanDateRange>,
}

/// Genre, studio, producer ...
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanEntity {
    pub mal_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanDateRange {
    pub from: Option<String>,
    pub to: Option<String>,
    pub prop: Option<JikanDateProp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JikanDateProp {
    pub from: Option<FuzzyDate>,
    pub to: Option<FuzzyDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_decodes_with_nulls_and_missing_fields() {
        let media: AnilistMedia = serde_json::from_value(json!({
            "id": 21,
            "idMal": null,
            "title": {"romaji": "One Piece"},
            "recommendations": {"nodes": [{"mediaRecommendation": null}]}
        }))
        .unwrap();

        assert_eq!(media.id, Some(21));
        assert_eq!(media.id_mal, None);
        assert!(media.external_links.is_none());
        let nodes = media.recommendations.unwrap().nodes.unwrap();
        assert!(nodes[0].media_recommendation.is_none());
    }

    #[test]
    fn test_page_decodes_missing_page() {
        let data: PageData = serde_json::from_value(json!({})).unwrap();
        assert!(data.page.is_none());
    }

    #[test]
    fn test_jikan_item_decodes() {
        let list: JikanList = serde_json::from_value(json!({
            "data": [{
                "mal_id": 5114,
                "title": "Fullmetal Alchemist: Brotherhood",
                "type": "TV",
                "score": 9.1,
                "genres": [{"mal_id": 1, "name": "Action", "type": "anime", "url": "u"}],
                "aired": {"prop": {"from": {"year": 2009, "month": 4, "day": 5}}}
            }],
            "pagination": {"has_next_page": true}
        }))
        .unwrap();

        let item = &list.data.unwrap()[0];
        assert_eq!(item.mal_id, Some(5114));
        assert_eq!(item.media_type.as_deref(), Some("TV"));
        assert_eq!(item.score, Some(9.1));
        assert!(item.year.is_none());
    }
}
