//! Canonical data models returned by the anime-helper tools.
//!
//! Every upstream catalog is normalized into these shapes, so callers see
//! one stable schema regardless of which catalog answered. Field names are
//! serialized in camelCase to match the tool protocol.

use serde::{Deserialize, Serialize};

/// Version marker stamped on every tool response
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Catalog a record was sourced from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// AniList GraphQL catalog (primary)
    Anilist,
    /// Jikan REST catalog (MyAnimeList mirror, fallback)
    Jikan,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Anilist => "anilist",
            Source::Jikan => "jikan",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anilist" => Ok(Source::Anilist),
            "jikan" | "mal" => Ok(Source::Jikan),
            _ => Err(anyhow::anyhow!("Invalid source: {}", s)),
        }
    }
}

/// Media kind (AniList `MediaType`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    #[default]
    Anime,
    Manga,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Anime => "ANIME",
            MediaKind::Manga => "MANGA",
        }
    }

    /// Path segment used by the Jikan REST catalog
    pub fn jikan_segment(&self) -> &'static str {
        match self {
            MediaKind::Anime => "anime",
            MediaKind::Manga => "manga",
        }
    }

    /// Parse a kind case-insensitively, defaulting to ANIME for anything
    /// that is not recognizably manga.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ANIME" => Ok(MediaKind::Anime),
            "MANGA" => Ok(MediaKind::Manga),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Title in its three common renderings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Title {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// Compact search-result record for one title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaHit {
    pub source: Source,
    pub id: Option<i64>,
    pub id_mal: Option<i64>,
    pub titles: Title,
    pub year: Option<i32>,
    /// TV / MOVIE / OVA / ONA / SPECIAL / MANGA / ONE_SHOT ...
    pub format: Option<String>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    /// Always on the 0-100 scale
    pub score: Option<i32>,
    pub url: Option<String>,
}

/// Scores from each catalog, both on the 0-100 scale
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    pub anilist: Option<i32>,
    pub mal: Option<i32>,
}

/// Link to an external site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalLink {
    pub site: String,
    pub url: String,
}

/// Full record for one title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub source: Source,
    pub id: Option<i64>,
    pub id_mal: Option<i64>,
    pub titles: Title,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub score: Scores,
    pub synopsis: String,
    pub url: Option<String>,
    pub external: Vec<ExternalLink>,
    pub recommendations: Vec<MediaHit>,
}

/// One scheduled episode in the airing calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiringItem {
    /// Unix epoch seconds
    pub when: Option<i64>,
    pub episode: Option<i32>,
    pub media: MediaHit,
}

/// Episode reference used by the airing status tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeAiring {
    pub episode: Option<i32>,
    /// Unix epoch seconds
    pub when: Option<i64>,
}
