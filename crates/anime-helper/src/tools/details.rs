//! Full record for one title.

use super::{parse_kind, parse_source, AnimeTools, DetailsRequest};
use crate::envelope::respond;
use crate::error::ToolError;
use crate::normalize::{details_from_anilist, details_from_jikan};
use serde_json::Value;
use shared::{Details, MediaKind, Source};
use tracing::debug;

impl AnimeTools {
    /// Normalized record by catalog id: AniList ids for `anilist`, MAL ids
    /// for `jikan`. No fallback: the caller picked the catalog.
    pub async fn media_details(&self, request: DetailsRequest) -> Value {
        let source = match parse_source(Some(&request.source)) {
            Ok(source) => source,
            Err(e) => return respond::<()>(&request.source, Err(e)),
        };
        let kind = match parse_kind(request.kind.as_deref()) {
            Ok(kind) => kind,
            Err(e) => return respond::<()>(source.as_str(), Err(e)),
        };

        respond(source.as_str(), self.details(source, request.id, kind).await)
    }

    pub(crate) async fn details(
        &self,
        source: Source,
        id: i64,
        kind: MediaKind,
    ) -> Result<Details, ToolError> {
        debug!(source = %source, id, kind = %kind, "Fetching details");
        match source {
            Source::Anilist => {
                let media = self.anilist.details(kind, id).await?.ok_or_else(|| {
                    ToolError::Unexpected(format!("AniList returned no media for id {}", id))
                })?;
                Ok(details_from_anilist(&media))
            }
            Source::Jikan => {
                let item = self.jikan.details(kind, id).await?;
                Ok(details_from_jikan(&item, kind))
            }
        }
    }
}
