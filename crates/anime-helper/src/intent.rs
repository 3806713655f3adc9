//! Natural-language router for the `ask` tool.
//!
//! A question (Spanish or English) is matched against an ordered list of
//! rules; the first rule that matches picks the intent, and the intent is
//! answered by calling the regular tools. Matching is plain keyword and
//! regex work over the lower-cased text.

use crate::envelope::respond;
use crate::error::ToolError;
use crate::tools::{
    AiringStatusRequest, AnimeTools, AskRequest, DetailsRequest, SearchRequest, SeasonTopRequest,
    TrendingRequest, MAX_PER_PAGE,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use shared::{MediaHit, MediaKind, Source};
use tracing::{debug, info};

const ROUTER_SOURCE: &str = "router";
const DEFAULT_LIMIT: i64 = 5;
const LOOKUP_LIMIT: i64 = 3;

static RE_AIRING_WHICH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(en\s+qué|en que).*(cap[ií]tulo|episodio)").expect("valid regex")
});
static RE_AIRING_CURRENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(cap[ií]tulo|episodio).*\b(va|actual|último|ultimo)\b").expect("valid regex")
});
static RE_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(cu[aá]nt[oa]s?).*(episodios|cap[ií]tulos)").expect("valid regex")
});
static RE_THIS_SEASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(this|current)\s+season\b").expect("valid regex"));
static RE_LIMIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\b").expect("valid regex"));

static RE_LEADING_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[¿?\s]+").expect("valid regex"));
static RE_TRAILING_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[?¿.!,;:]+\s*$").expect("valid regex"));
static RE_COUNT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(cu[aá]nt[oa]s?\s+(episodios|cap[ií]tulos)\s+(tiene|de)\s+|(tiene|hay)\s+cu[aá]nt[oa]s?\s+(episodios|cap[ií]tulos)\s+de\s+)",
    )
    .expect("valid regex")
});
static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const AIRING_WORDS: &[&str] = &[
    "en qué", "en que", "capítulo", "capitulo", "episodio", "va", "actual", "último", "ultimo",
    "de", "del", "la", "el",
];
const WHAT_IS_WORDS: &[&str] = &[
    "qué es", "que es", "de qué trata", "de que trata", "what is", "de", "del", "la", "el",
];
const DETAILS_WORDS: &[&str] = &[
    "detalles", "detalle", "ficha", "info de", "información de", "informacion de", "about", "de",
    "del", "la", "el",
];
const TRENDING_WORDS: &[&str] = &[
    "tendencia", "tendencias", "trending", "populares", "más llamativos", "mas llamativos",
];
const MOVIE_WORDS: &[&str] = &[
    "película", "películas", "pelicula", "peliculas", "movie", "movies", "film", "films",
];

/// What a question is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AiringStatus,
    Count,
    WhatIs,
    SeasonTop,
    Trending,
    SearchThenDetails,
    Search,
}

/// Ordered rules over the lower-cased question; first match wins
const RULES: &[(Intent, fn(&str) -> bool)] = &[
    (Intent::AiringStatus, asks_airing),
    (Intent::Count, asks_count),
    (Intent::WhatIs, asks_what_is),
    (Intent::SeasonTop, asks_season),
    (Intent::Trending, asks_trending),
    (Intent::SearchThenDetails, asks_details),
];

fn asks_airing(low: &str) -> bool {
    RE_AIRING_WHICH.is_match(low) || RE_AIRING_CURRENT.is_match(low)
}

fn asks_count(low: &str) -> bool {
    RE_COUNT.is_match(low)
}

fn asks_what_is(low: &str) -> bool {
    ["qué es", "que es", "de qué trata", "de que trata", "what is"]
        .iter()
        .any(|w| low.contains(w))
}

fn asks_season(low: &str) -> bool {
    (low.contains("temporada") && (low.contains("actual") || low.contains("esta")))
        || RE_THIS_SEASON.is_match(low)
}

fn asks_trending(low: &str) -> bool {
    TRENDING_WORDS.iter().any(|w| low.contains(w))
}

fn asks_details(low: &str) -> bool {
    ["detalles", "detalle", "ficha", "info de", "información de", "informacion de", "about"]
        .iter()
        .any(|w| low.contains(w))
}

/// Intent of a lower-cased question
pub fn classify(low: &str) -> Intent {
    RULES
        .iter()
        .find(|(_, matches)| matches(low))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Search)
}

fn parse_kind(low: &str, default: MediaKind) -> MediaKind {
    if low.contains("manga") {
        MediaKind::Manga
    } else if low.contains("anime") {
        MediaKind::Anime
    } else {
        default
    }
}

fn parse_limit(low: &str, default: i64) -> i64 {
    RE_LIMIT
        .captures(low)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or(default)
        .clamp(1, i64::from(MAX_PER_PAGE))
}

/// Remove whole-word keywords, collapse whitespace and trim punctuation
fn strip_keywords(text: &str, words: &[&str]) -> String {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let stripped = match Regex::new(&format!(r"(?i)\b({})\b", alternation)) {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(_) => text.to_string(),
    };
    RE_SPACES
        .replace_all(&stripped, " ")
        .trim_matches(|c: char| c.is_whitespace() || "¿?¡!.,".contains(c))
        .to_string()
}

/// Title out of "¿cuántos episodios tiene X?"
fn extract_count_title(text: &str) -> String {
    let t = RE_LEADING_MARKS.replace(text.trim(), "");
    let t = RE_COUNT_PREFIX.replace_all(&t, "");
    RE_TRAILING_MARKS.replace(&t, "").trim().to_string()
}

fn or_original(title: String, text: &str) -> String {
    if title.is_empty() {
        text.trim().to_string()
    } else {
        title
    }
}

#[derive(Debug, Serialize)]
struct AskResponse {
    intent: Intent,
    args: Value,
    result: Value,
}

impl AnimeTools {
    /// Answer a natural-language question by routing it to a tool
    pub async fn ask(&self, request: AskRequest) -> Value {
        let text = request.text.trim();
        if text.is_empty() {
            return respond::<()>(
                ROUTER_SOURCE,
                Err(ToolError::BadRequest("Empty text".to_string())),
            );
        }

        let low = text.to_lowercase();
        let default_kind = MediaKind::parse_lenient(request.default_kind.as_deref());
        let kind = parse_kind(&low, default_kind);
        let limit = parse_limit(&low, request.default_limit.unwrap_or(DEFAULT_LIMIT));
        let wants_movies = MOVIE_WORDS.iter().any(|w| low.contains(w));
        let formats = wants_movies.then(|| vec!["MOVIE".to_string()]);

        let intent = classify(&low);
        info!(intent = ?intent, kind = %kind, limit, "Routing question");

        let (args, result) = match intent {
            Intent::AiringStatus => {
                let query = or_original(strip_keywords(text, AIRING_WORDS), text);
                let result = self
                    .airing_status(AiringStatusRequest {
                        id: None,
                        query: Some(query.clone()),
                    })
                    .await;
                (json!({ "query": query }), result)
            }
            Intent::Count => {
                let query = or_original(extract_count_title(text), text);
                let result = self.answer_count(&query, kind).await;
                (json!({ "query": query, "kind": kind }), result)
            }
            Intent::WhatIs | Intent::SearchThenDetails => {
                let words = if intent == Intent::WhatIs {
                    WHAT_IS_WORDS
                } else {
                    DETAILS_WORDS
                };
                let query = or_original(strip_keywords(text, words), text);
                let result = self.search_then_details(&query, kind).await;
                (json!({ "query": query, "kind": kind }), result)
            }
            Intent::SeasonTop => {
                let result = self
                    .season_top(SeasonTopRequest {
                        kind: Some(MediaKind::Anime.to_string()),
                        limit: Some(limit),
                        format_in: formats.clone(),
                        ..Default::default()
                    })
                    .await;
                (
                    json!({ "kind": MediaKind::Anime, "limit": limit, "format_in": formats }),
                    result,
                )
            }
            Intent::Trending => {
                let result = self
                    .trending(TrendingRequest {
                        kind: Some(kind.to_string()),
                        limit: Some(limit),
                        format_in: formats.clone(),
                    })
                    .await;
                (
                    json!({ "kind": kind, "limit": limit, "format_in": formats }),
                    result,
                )
            }
            Intent::Search => {
                let result = self
                    .search_media(SearchRequest {
                        query: text.to_string(),
                        kind: Some(kind.to_string()),
                        limit: Some(limit),
                        ..Default::default()
                    })
                    .await;
                (
                    json!({ "query": text, "kind": kind, "limit": limit }),
                    result,
                )
            }
        };

        respond(ROUTER_SOURCE, Ok(AskResponse { intent, args, result }))
    }

    /// Episode or chapter count: resolve the canonical series, then fetch
    /// its record. Falls back to a plain search when nothing resolves.
    async fn answer_count(&self, query: &str, kind: MediaKind) -> Value {
        let preferred = match kind {
            MediaKind::Manga => "MANGA",
            MediaKind::Anime => "TV",
        };

        let best = match self.resolve_best(query, kind, Some(preferred)).await {
            Ok(best) => best,
            Err(e) => {
                debug!(query, error = %e, "Resolution failed, searching instead");
                None
            }
        };

        match best.as_ref().and_then(details_target) {
            Some((source, id)) => self.details_value(source, id, kind).await,
            None => self.search_value(query, kind).await,
        }
    }

    /// Search, then the record of the first AniList hit (or first hit)
    async fn search_then_details(&self, query: &str, kind: MediaKind) -> Value {
        let search = self.search_value(query, kind).await;
        let hits: Vec<MediaHit> =
            serde_json::from_value(search["results"].clone()).unwrap_or_default();

        let best = hits
            .iter()
            .find(|hit| hit.source == Source::Anilist)
            .or_else(|| hits.first());

        match best.and_then(details_target) {
            Some((source, id)) => self.details_value(source, id, kind).await,
            None => search,
        }
    }

    async fn search_value(&self, query: &str, kind: MediaKind) -> Value {
        self.search_media(SearchRequest {
            query: query.to_string(),
            kind: Some(kind.to_string()),
            limit: Some(LOOKUP_LIMIT),
            ..Default::default()
        })
        .await
    }

    async fn details_value(&self, source: Source, id: i64, kind: MediaKind) -> Value {
        self.media_details(DetailsRequest {
            source: source.to_string(),
            id,
            kind: Some(kind.to_string()),
        })
        .await
    }
}

/// Catalog and id to fetch details for: AniList ids for AniList hits, MAL
/// ids otherwise
fn details_target(hit: &MediaHit) -> Option<(Source, i64)> {
    match hit.source {
        Source::Anilist => hit.id.map(|id| (Source::Anilist, id)),
        Source::Jikan => hit.id_mal.or(hit.id).map(|id| (Source::Jikan, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::tools::fixtures::*;
    use std::sync::Arc;

    fn ask(text: &str) -> AskRequest {
        AskRequest {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        let cases = [
            ("¿en qué capítulo va one piece?", Intent::AiringStatus),
            ("episodio actual de frieren", Intent::AiringStatus),
            ("¿cuántos episodios tiene frieren?", Intent::Count),
            ("cuántos capítulos tiene evangelion", Intent::Count),
            ("¿qué es vinland saga?", Intent::WhatIs),
            ("what is monster", Intent::WhatIs),
            ("los animes más llamativos de esta temporada", Intent::SeasonTop),
            ("best movies this season", Intent::SeasonTop),
            ("manga en tendencia", Intent::Trending),
            ("trending anime", Intent::Trending),
            ("dame la ficha de vinland saga", Intent::SearchThenDetails),
            ("one piece", Intent::Search),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "{}", text);
        }
    }

    #[test]
    fn test_parse_kind_and_limit() {
        assert_eq!(parse_kind("top manga", MediaKind::Anime), MediaKind::Manga);
        assert_eq!(parse_kind("top", MediaKind::Manga), MediaKind::Manga);
        assert_eq!(parse_limit("top 3 trending", 5), 3);
        assert_eq!(parse_limit("top 99 trending", 5), 25);
        assert_eq!(parse_limit("top trending", 5), 5);
        assert_eq!(parse_limit("año 2024", 5), 5);
    }

    #[test]
    fn test_strip_keywords_respects_word_boundaries() {
        assert_eq!(
            strip_keywords("¿En qué capítulo va One Piece?", AIRING_WORDS),
            "One Piece"
        );
        assert_eq!(
            strip_keywords("En qué episodio va Evangelion", AIRING_WORDS),
            "Evangelion"
        );
        assert_eq!(
            strip_keywords("Dame la ficha de Delicious in Dungeon", DETAILS_WORDS),
            "Dame Delicious in Dungeon"
        );
    }

    #[test]
    fn test_extract_count_title() {
        assert_eq!(extract_count_title("¿Cuántos episodios tiene Frieren?"), "Frieren");
        assert_eq!(extract_count_title("cuantos capítulos de Berserk."), "Berserk");
        assert_eq!(
            extract_count_title("¿Tiene cuántos episodios de Monster?"),
            "Monster"
        );
    }

    #[tokio::test]
    async fn test_empty_text_is_bad_request() {
        let tools = tools_over(Arc::new(RoutedBackend::new()));

        let value = tools.ask(ask("   ")).await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["error"]["code"], "BAD_REQUEST");
        assert_eq!(value["error"]["source"], "router");
    }

    #[tokio::test]
    async fn test_airing_question() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![
                ok_json(json!({"data": {"Page": {"media": [{"id": 21}]}}})),
                ok_json(json!({"data": {"Media": {
                    "id": 21,
                    "nextAiringEpisode": {"episode": 1123, "airingAt": 1_731_200_000}
                }}})),
            ],
        ));
        let tools = tools_over(backend.clone());

        let value = tools.ask(ask("¿En qué capítulo va One Piece?")).await;

        assert_eq!(value["intent"], "airing_status");
        assert_eq!(value["args"]["query"], "One Piece");
        assert_eq!(value["result"]["next"]["episode"], 1123);
        let first = backend.requests()[0].body.clone().unwrap();
        assert_eq!(first["variables"]["q"], "One Piece");
    }

    #[tokio::test]
    async fn test_count_question_prefers_tv() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![
                ok_json(json!({"data": {"Page": {"media": [
                    {"id": 170068, "format": "SPECIAL"},
                    {"id": 154587, "format": "TV"}
                ]}}})),
                ok_json(json!({"data": {"Media": {"id": 154587, "format": "TV", "episodes": 28}}})),
            ],
        ));
        let tools = tools_over(backend.clone());

        let value = tools.ask(ask("¿Cuántos episodios tiene Frieren?")).await;

        assert_eq!(value["intent"], "count");
        assert_eq!(value["args"], json!({"query": "Frieren", "kind": "ANIME"}));
        assert_eq!(value["result"]["episodes"], 28);
        let details = backend.requests()[1].body.clone().unwrap();
        assert_eq!(details["variables"]["id"], 154587);
    }

    #[tokio::test]
    async fn test_season_question_with_movies() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Page": {"media": []}}}))],
        ));
        let tools = tools_over(backend.clone());

        let value = tools
            .ask(ask("¿Qué películas hay de esta temporada? top 4"))
            .await;

        assert_eq!(value["intent"], "season_top");
        assert_eq!(value["args"]["format_in"], json!(["MOVIE"]));
        assert_eq!(value["args"]["limit"], 4);
        assert_eq!(value["result"]["schemaVersion"], "1.0.0");
        let variables = backend.requests()[0].body.clone().unwrap()["variables"].clone();
        assert_eq!(variables["formats"], json!(["MOVIE"]));
    }

    #[tokio::test]
    async fn test_trending_manga_question() {
        let backend = Arc::new(RoutedBackend::new().route(
            ANILIST,
            vec![ok_json(json!({"data": {"Page": {"media": [{"id": 1, "format": "MANGA"}]}}}))],
        ));
        let tools = tools_over(backend.clone());

        let value = tools.ask(ask("manga en tendencia")).await;

        assert_eq!(value["intent"], "trending");
        assert_eq!(value["args"]["kind"], "MANGA");
        assert_eq!(value["args"]["limit"], 5);
        assert_eq!(value["result"]["results"][0]["format"], "MANGA");
    }

    #[tokio::test]
    async fn test_default_search_and_nested_error() {
        let backend = Arc::new(
            RoutedBackend::new()
                .route(ANILIST, vec![status(503)])
                .route(JIKAN, vec![status(503)]),
        );
        let tools = tools_over(backend);

        let value = tools.ask(ask("Cowboy Bebop")).await;

        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["intent"], "search");
        assert_eq!(value["args"]["query"], "Cowboy Bebop");
        assert_eq!(value["result"]["error"]["code"], "UPSTREAM_503");
    }
}
