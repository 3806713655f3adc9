//! Health, about and help tools.

use super::{AnimeTools, MAX_PER_PAGE};
use crate::api::client::DEFAULT_TIMEOUT;
use crate::envelope::Envelope;
use serde_json::{json, Value};

const NAME: &str = "anime-helper";
const VERSION: &str = env!("CARGO_PKG_VERSION");

const FEATURES: &[&str] = &[
    "ask: natural language (ES/EN) -> season_top / trending / search / details / airing_status / count / what_is",
    "search_media: search by title (ANIME/MANGA), Jikan fallback",
    "media_details: normalized record plus recommendations",
    "trending(format_in): currently trending (MOVIE/TV/OVA/ONA/SPECIAL)",
    "season_top(format_in): top of the current season (ANIME); supports MOVIE",
    "airing_status: last and next episode (ANIME)",
    "airing_calendar: upcoming episodes",
    "resolve_title: canonical AniList/MAL ids",
    "cache_info / cache_clear: AniList query cache",
];

const EXAMPLES: &[(&str, &str)] = &[
    ("Natural language", "¿En qué capítulo va One Piece?"),
    ("Current season", "What are the most popular anime this season?"),
    ("Movies this season", r#"season_top {"kind":"ANIME","format_in":["MOVIE"],"limit":5}"#),
    ("Trending manga", r#"trending {"kind":"MANGA","limit":5}"#),
    ("Seven-day calendar", r#"airing_calendar {"days":7}"#),
    ("Resolve a title", r#"resolve_title {"title":"Vinland Saga"}"#),
    ("Details", "Dame la ficha de Vinland Saga"),
    ("Direct search", r#"search_media {"query":"one piece","kind":"ANIME","limit":3}"#),
];

const NOTES: &[&str] = &[
    "No API keys needed for AniList or Jikan; respect their rate limits.",
    "Every response carries schemaVersion, on success and on error.",
    "media_details and airing_status take AniList ids; use source='jikan' for MAL ids.",
];

/// Plain-text help for hosts that cannot render JSON
pub fn help_text() -> String {
    [
        "anime-helper · what I can do:",
        "- ask(text): natural language (ES/EN). E.g. '¿En qué capítulo va One Piece?'",
        "- season_top(kind='ANIME', limit=10, format_in=['MOVIE']): top of the season.",
        "- trending(kind, limit, format_in): currently trending.",
        "- search_media(query, kind): search by title.",
        "- media_details(source, id, kind): full record.",
        "- airing_status(query|id): last and next episode.",
        "- airing_calendar(days): upcoming episodes.",
        "- resolve_title(title): canonical AniList/MAL ids.",
        "- cache_info / cache_clear: AniList query cache.",
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

impl AnimeTools {
    pub fn health(&self) -> Value {
        stamped(json!({ "ok": true, "sources": ["anilist", "jikan"] }))
    }

    pub fn about(&self) -> Value {
        stamped(json!({
            "name": NAME,
            "version": VERSION,
            "endpoints": {
                "anilist": self.anilist_endpoint(),
                "jikan": self.jikan_endpoint(),
            },
            "limits": {
                "maxPerPage": MAX_PER_PAGE,
                "timeoutSec": DEFAULT_TIMEOUT.as_secs(),
            },
        }))
    }

    /// Feature list and example invocations
    pub fn help(&self) -> Value {
        let examples: Vec<Value> = EXAMPLES
            .iter()
            .map(|(title, prompt)| json!({ "title": title, "prompt": prompt }))
            .collect();

        stamped(json!({
            "name": NAME,
            "version": VERSION,
            "summary": "Anime & manga lookups via AniList (no key) with Jikan fallback.",
            "features": FEATURES,
            "examples": examples,
            "notes": NOTES,
        }))
    }
}

fn stamped(body: Value) -> Value {
    serde_json::to_value(Envelope::new(body)).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}
