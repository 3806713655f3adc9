//! Title resolution to canonical AniList/MAL ids.

use super::{clamp_limit, parse_kind, AnimeTools, ResolveRequest};
use crate::envelope::respond;
use crate::error::ToolError;
use serde::Serialize;
use serde_json::Value;
use shared::{MediaHit, MediaKind, Source};

const DEFAULT_CANDIDATES: u32 = 10;
const MAX_CANDIDATES: u32 = 10;

#[derive(Debug, Serialize)]
struct ResolveResponse {
    title: String,
    kind: MediaKind,
    best: Option<MediaHit>,
    candidates: Vec<MediaHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
}

/// First hit whose format equals `preferred` (case-insensitive), else the
/// first hit.
pub(crate) fn best_by_format<'a>(hits: &'a [MediaHit], preferred: Option<&str>) -> Option<&'a MediaHit> {
    let preferred = preferred.map(str::trim).filter(|p| !p.is_empty());
    preferred
        .and_then(|wanted| {
            hits.iter().find(|hit| {
                hit.format
                    .as_deref()
                    .is_some_and(|f| f.eq_ignore_ascii_case(wanted))
            })
        })
        .or_else(|| hits.first())
}

impl AnimeTools {
    /// Best match for a title plus every candidate considered
    pub async fn resolve_title(&self, request: ResolveRequest) -> Value {
        respond(Source::Anilist.as_str(), self.resolve_inner(request).await)
    }

    async fn resolve_inner(&self, request: ResolveRequest) -> Result<ResolveResponse, ToolError> {
        let kind = parse_kind(request.kind.as_deref())?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ToolError::BadRequest("Provide a title".to_string()));
        }
        let limit = clamp_limit(request.limit, DEFAULT_CANDIDATES, MAX_CANDIDATES);

        let candidates = self.search_anilist(kind, &title, limit, None).await?;
        let best = best_by_format(&candidates, request.preferred_format.as_deref()).cloned();
        let status = best.is_none().then_some("NOT_FOUND");

        Ok(ResolveResponse {
            title,
            kind,
            best,
            candidates,
            status,
        })
    }

    /// Best AniList match for a title, preferring a format
    pub(crate) async fn resolve_best(
        &self,
        title: &str,
        kind: MediaKind,
        preferred_format: Option<&str>,
    ) -> Result<Option<MediaHit>, ToolError> {
        let candidates = self
            .search_anilist(kind, title, DEFAULT_CANDIDATES, None)
            .await?;
        Ok(best_by_format(&candidates, preferred_format).cloned())
    }
}
