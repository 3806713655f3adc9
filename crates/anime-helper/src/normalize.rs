//! Normalization of upstream records into the canonical models.
//!
//! All functions are pure and total: absent upstream fields become `None`
//! or empty collections, never an error.

use crate::api::types::{AiringEpisode, AiringSchedule, AnilistMedia, AnilistTitle, JikanItem};
use shared::{
    AiringItem, Details, EpisodeAiring, ExternalLink, MediaHit, MediaKind, Scores, Source, Title,
};

pub fn normalize_title(title: Option<&AnilistTitle>) -> Title {
    match title {
        Some(t) => Title {
            romaji: t.romaji.clone(),
            english: t.english.clone(),
            native: t.native.clone(),
        },
        None => Title::default(),
    }
}

/// Compact hit from an AniList `Media`.
/// `year` prefers `seasonYear`, then `startDate.year`.
pub fn hit_from_anilist(media: &AnilistMedia) -> MediaHit {
    MediaHit {
        source: Source::Anilist,
        id: media.id,
        id_mal: media.id_mal,
        titles: normalize_title(media.title.as_ref()),
        year: media
            .season_year
            .or_else(|| media.start_date.as_ref().and_then(|d| d.year)),
        format: media.format.clone(),
        episodes: media.episodes,
        chapters: media.chapters,
        score: media.average_score,
        url: media.site_url.clone(),
    }
}

/// Bare identity hit used by the airing calendar: no year, counts or score.
pub fn minimal_hit_from_anilist(media: &AnilistMedia) -> MediaHit {
    MediaHit {
        year: None,
        episodes: None,
        chapters: None,
        score: None,
        ..hit_from_anilist(media)
    }
}

pub fn details_from_anilist(media: &AnilistMedia) -> Details {
    let recommendations = media
        .recommendations
        .as_ref()
        .and_then(|r| r.nodes.as_ref())
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|node| node.media_recommendation.as_ref())
                .map(hit_from_anilist)
                .collect()
        })
        .unwrap_or_default();

    let external = media
        .external_links
        .iter()
        .flatten()
        .map(|link| ExternalLink {
            site: link
                .site
                .clone()
                .or_else(|| link.link_type.clone())
                .unwrap_or_default(),
            url: link.url.clone().unwrap_or_default(),
        })
        .collect();

    Details {
        source: Source::Anilist,
        id: media.id,
        id_mal: media.id_mal,
        titles: normalize_title(media.title.as_ref()),
        format: media.format.clone(),
        status: media.status.clone(),
        episodes: media.episodes,
        chapters: media.chapters,
        genres: media.genres.clone().unwrap_or_default(),
        tags: media
            .tags
            .iter()
            .flatten()
            .filter_map(|t| t.name.clone())
            .collect(),
        score: Scores {
            anilist: media.average_score,
            mal: None,
        },
        synopsis: media
            .description
            .as_deref()
            .unwrap_or_default()
            .replace("<br>", "\n"),
        url: media.site_url.clone(),
        external,
        recommendations,
    }
}

pub fn airing_item_from_anilist(entry: &AiringSchedule) -> AiringItem {
    AiringItem {
        when: entry.airing_at,
        episode: entry.episode,
        media: minimal_hit_from_anilist(&entry.media.clone().unwrap_or_default()),
    }
}

pub fn episode_from_anilist(episode: &AiringEpisode) -> EpisodeAiring {
    EpisodeAiring {
        episode: episode.episode,
        when: episode.airing_at,
    }
}

/// Last aired and next scheduled episode of an airing-status record
pub fn airing_episodes(media: &AnilistMedia) -> (Option<EpisodeAiring>, Option<EpisodeAiring>) {
    let last = media
        .airing_schedule
        .as_ref()
        .and_then(|schedule| schedule.nodes.as_ref())
        .and_then(|nodes| nodes.first())
        .map(episode_from_anilist);
    let next = media.next_airing_episode.as_ref().map(episode_from_anilist);
    (last, next)
}

/// Convert a 0-10 score with one decimal to the 0-100 scale, truncating.
pub fn score_from_jikan(score: Option<f64>) -> Option<i32> {
    score.map(|s| (s * 10.0 + 1e-9) as i32)
}

fn title_from_jikan(item: &JikanItem) -> Title {
    Title {
        romaji: item.title.clone(),
        english: item.title_english.clone(),
        native: None,
    }
}

fn upper_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_ascii_uppercase()
}

/// Start year: `year` when present, else the start of the aired/published range.
fn year_from_jikan(item: &JikanItem) -> Option<i32> {
    item.year.or_else(|| {
        item.aired
            .as_ref()
            .or(item.published.as_ref())
            .and_then(|range| range.prop.as_ref())
            .and_then(|prop| prop.from.as_ref())
            .and_then(|from| from.year)
    })
}

pub fn hit_from_jikan(item: &JikanItem, kind: MediaKind) -> MediaHit {
    MediaHit {
        source: Source::Jikan,
        id: item.mal_id,
        id_mal: item.mal_id,
        titles: title_from_jikan(item),
        year: year_from_jikan(item),
        format: Some(upper_or_empty(item.media_type.as_deref())),
        episodes: item.episodes.filter(|_| kind == MediaKind::Anime),
        chapters: item.chapters.filter(|_| kind == MediaKind::Manga),
        score: score_from_jikan(item.score),
        url: item.url.clone(),
    }
}

/// Details from a Jikan record. Jikan has no tags or recommendations;
/// the only external link is the MAL page itself.
pub fn details_from_jikan(item: &JikanItem, kind: MediaKind) -> Details {
    Details {
        source: Source::Jikan,
        id: item.mal_id,
        id_mal: item.mal_id,
        titles: title_from_jikan(item),
        format: Some(upper_or_empty(item.media_type.as_deref())),
        status: Some(upper_or_empty(item.status.as_deref())),
        episodes: item.episodes.filter(|_| kind == MediaKind::Anime),
        chapters: item.chapters.filter(|_| kind == MediaKind::Manga),
        genres: item
            .genres
            .iter()
            .flatten()
            .filter_map(|g| g.name.clone())
            .collect(),
        tags: Vec::new(),
        score: Scores {
            anilist: None,
            mal: score_from_jikan(item.score),
        },
        synopsis: item.synopsis.clone().unwrap_or_default(),
        url: item.url.clone(),
        external: vec![ExternalLink {
            site: "MAL".to_string(),
            url: item.url.clone().unwrap_or_default(),
        }],
        recommendations: Vec::new(),
    }
}

/// Keep only hits whose format is in `formats` (already upper-cased).
pub fn retain_formats(hits: &mut Vec<MediaHit>, formats: Option<&[String]>) {
    if let Some(formats) = formats {
        hits.retain(|hit| {
            hit.format
                .as_deref()
                .is_some_and(|f| formats.iter().any(|wanted| wanted == f))
        });
    }
}
