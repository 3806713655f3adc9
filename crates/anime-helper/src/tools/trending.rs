//! Trending and seasonal rankings.
//!
//! Both tools fall back to Jikan's popularity ordering when AniList fails.
//! AniList has no seasons for manga, so a MANGA `season_top` is answered by
//! the trending query.

use super::{
    clamp_limit, normalize_formats, parse_kind, AnimeTools, SeasonTopRequest, TrendingRequest,
    MAX_PER_PAGE,
};
use crate::api::JikanItem;
use crate::envelope::respond;
use crate::error::ToolError;
use crate::normalize::{hit_from_anilist, hit_from_jikan, retain_formats};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::{MediaHit, MediaKind, Source};
use tracing::{info, warn};

const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_SORT: &str = "TRENDING_DESC";

/// AniList `MediaSeason`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season containing a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl std::str::FromStr for Season {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WINTER" => Ok(Season::Winter),
            "SPRING" => Ok(Season::Spring),
            "SUMMER" => Ok(Season::Summer),
            "FALL" => Ok(Season::Fall),
            _ => Err(ToolError::BadRequest(format!(
                "Invalid season '{}': expected WINTER, SPRING, SUMMER or FALL",
                s
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct TrendingResponse {
    kind: MediaKind,
    format_in: Option<Vec<String>>,
    source: Source,
    results: Vec<MediaHit>,
}

#[derive(Debug, Serialize)]
struct SeasonTopResponse {
    kind: MediaKind,
    season: Option<Season>,
    year: Option<i32>,
    sort: String,
    format_in: Option<Vec<String>>,
    source: Source,
    results: Vec<MediaHit>,
}

impl AnimeTools {
    /// Currently trending titles
    pub async fn trending(&self, request: TrendingRequest) -> Value {
        let kind = match parse_kind(request.kind.as_deref()) {
            Ok(kind) => kind,
            Err(e) => return respond::<()>(Source::Anilist.as_str(), Err(e)),
        };
        let limit = clamp_limit(request.limit, DEFAULT_LIMIT, MAX_PER_PAGE);
        let formats = normalize_formats(request.format_in.as_deref());

        let (source, outcome) = self.trending_with_fallback(kind, limit, formats.as_deref()).await;

        respond(
            source.as_str(),
            outcome.map(|results| TrendingResponse {
                kind,
                format_in: formats,
                source,
                results,
            }),
        )
    }

    /// Top titles of a season, by default the current one
    pub async fn season_top(&self, request: SeasonTopRequest) -> Value {
        self.season_top_at(request, Utc::now().date_naive()).await
    }

    pub(crate) async fn season_top_at(&self, request: SeasonTopRequest, today: NaiveDate) -> Value {
        let kind = match parse_kind(request.kind.as_deref()) {
            Ok(kind) => kind,
            Err(e) => return respond::<()>(Source::Anilist.as_str(), Err(e)),
        };
        let limit = clamp_limit(request.limit, DEFAULT_LIMIT, MAX_PER_PAGE);
        let formats = normalize_formats(request.format_in.as_deref());

        if kind == MediaKind::Manga {
            let (source, outcome) = self.trending_with_fallback(kind, limit, formats.as_deref()).await;
            return respond(
                source.as_str(),
                outcome.map(|results| SeasonTopResponse {
                    kind,
                    season: None,
                    year: None,
                    sort: DEFAULT_SORT.to_string(),
                    format_in: formats,
                    source,
                    results,
                }),
            );
        }

        let season = match request
            .season
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(s) => match s.parse::<Season>() {
                Ok(season) => season,
                Err(e) => return respond::<()>(Source::Anilist.as_str(), Err(e)),
            },
            None => Season::from_month(today.month()),
        };
        let year = request.year.unwrap_or_else(|| today.year());
        let sort = request
            .sort
            .as_deref()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT.to_string());

        let primary = self
            .anilist
            .season(season.as_str(), year, &sort, limit, formats.as_deref())
            .await
            .map(|media| {
                let mut hits: Vec<MediaHit> = media.iter().map(hit_from_anilist).collect();
                hits.truncate(limit as usize);
                hits
            });

        let (source, outcome) = match primary {
            Ok(hits) => {
                info!(
                    season = season.as_str(),
                    year,
                    results = hits.len(),
                    "Season ranking complete"
                );
                (Source::Anilist, Ok(hits))
            }
            Err(e) => {
                warn!(
                    season = season.as_str(),
                    year,
                    error = %e,
                    "AniList season query failed, falling back to Jikan"
                );
                let fallback = self
                    .jikan
                    .popular_in_year(kind, year, limit, formats.as_deref())
                    .await
                    .map(|items| jikan_hits(&items, kind, limit, formats.as_deref()));
                (Source::Jikan, fallback)
            }
        };

        respond(
            source.as_str(),
            outcome.map(|results| SeasonTopResponse {
                kind,
                season: Some(season),
                year: Some(year),
                sort,
                format_in: formats,
                source,
                results,
            }),
        )
    }

    async fn trending_with_fallback(
        &self,
        kind: MediaKind,
        limit: u32,
        formats: Option<&[String]>,
    ) -> (Source, Result<Vec<MediaHit>, ToolError>) {
        match self.anilist.trending(kind, limit, formats).await {
            Ok(media) => {
                let mut hits: Vec<MediaHit> = media.iter().map(hit_from_anilist).collect();
                hits.truncate(limit as usize);
                info!(kind = %kind, results = hits.len(), "Trending ranking complete");
                (Source::Anilist, Ok(hits))
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "AniList trending failed, falling back to Jikan");
                let fallback = self
                    .jikan
                    .top_by_popularity(kind, limit, formats)
                    .await
                    .map(|items| jikan_hits(&items, kind, limit, formats));
                (Source::Jikan, fallback)
            }
        }
    }
}

fn jikan_hits(
    items: &[JikanItem],
    kind: MediaKind,
    limit: u32,
    formats: Option<&[String]>,
) -> Vec<MediaHit> {
    let mut hits: Vec<MediaHit> = items.iter().map(|item| hit_from_jikan(item, kind)).collect();
    retain_formats(&mut hits, formats);
    hits.truncate(limit as usize);
    hits
}
