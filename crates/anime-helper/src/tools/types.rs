//! Request parameters for every tool.
//!
//! Optional fields fall back to the tool's documented default; numeric
//! limits are clamped rather than rejected.

use schemars::JsonSchema;
use serde::Deserialize;

// ============================================================================
// Catalog lookups
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchRequest {
    #[schemars(description = "Title to search for")]
    pub query: String,
    #[schemars(description = "ANIME or MANGA (default: ANIME)")]
    pub kind: Option<String>,
    #[schemars(description = "'anilist' (default) or 'jikan'")]
    pub source: Option<String>,
    #[schemars(description = "Maximum results, 1-25 (default: 5)")]
    pub limit: Option<i64>,
    #[schemars(description = "Restrict to formats, e.g. ['TV', 'MOVIE']")]
    pub format_in: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DetailsRequest {
    #[schemars(description = "'anilist' (AniList id) or 'jikan' (MAL id)")]
    pub source: String,
    #[schemars(description = "Catalog id of the title")]
    pub id: i64,
    #[schemars(description = "ANIME or MANGA (default: ANIME)")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ResolveRequest {
    #[schemars(description = "Title to resolve to canonical AniList/MAL ids")]
    pub title: String,
    #[schemars(description = "ANIME or MANGA (default: ANIME)")]
    pub kind: Option<String>,
    #[schemars(description = "Prefer a candidate of this format, e.g. 'TV'")]
    pub preferred_format: Option<String>,
    #[schemars(description = "Maximum candidates, 1-10 (default: 10)")]
    pub limit: Option<i64>,
}

// ============================================================================
// Rankings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TrendingRequest {
    #[schemars(description = "ANIME or MANGA (default: ANIME)")]
    pub kind: Option<String>,
    #[schemars(description = "Maximum results, 1-25 (default: 10)")]
    pub limit: Option<i64>,
    #[schemars(description = "Restrict to formats: MOVIE, TV, OVA, ONA, SPECIAL")]
    pub format_in: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SeasonTopRequest {
    #[schemars(description = "ANIME or MANGA (default: ANIME); MANGA returns trending")]
    pub kind: Option<String>,
    #[schemars(description = "WINTER, SPRING, SUMMER or FALL (default: current season)")]
    pub season: Option<String>,
    #[schemars(description = "Season year (default: current year)")]
    pub year: Option<i32>,
    #[schemars(description = "AniList sort, e.g. TRENDING_DESC (default), POPULARITY_DESC, SCORE_DESC")]
    pub sort: Option<String>,
    #[schemars(description = "Maximum results, 1-25 (default: 10)")]
    pub limit: Option<i64>,
    #[schemars(description = "Restrict to formats, e.g. ['MOVIE'] for the season's films")]
    pub format_in: Option<Vec<String>>,
}

// ============================================================================
// Airing
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AiringStatusRequest {
    #[schemars(description = "AniList anime id")]
    pub id: Option<i64>,
    #[schemars(description = "Title to resolve when no id is given")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AiringCalendarRequest {
    #[schemars(description = "Days ahead to include, 1-30 (default: 7)")]
    pub days: Option<i64>,
    #[schemars(description = "Maximum episodes, 1-50 (default: 50)")]
    pub per_page: Option<i64>,
}

// ============================================================================
// Natural language
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AskRequest {
    #[schemars(description = "Question in Spanish or English, e.g. '¿En qué capítulo va One Piece?'")]
    pub text: String,
    #[schemars(description = "Kind used when the text names none (default: ANIME)")]
    pub default_kind: Option<String>,
    #[schemars(description = "Limit used when the text names none (default: 5)")]
    pub default_limit: Option<i64>,
}
