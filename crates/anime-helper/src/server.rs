//! MCP server exposing the tool set over stdio.
//!
//! Every tool answers with one text content item holding its JSON envelope;
//! failures are reported inside that envelope, never as protocol errors.

use crate::tools::*;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde_json::Value;
use tracing::debug;

/// MCP server state
#[derive(Clone)]
pub struct AnimeHelperServer {
    tools: AnimeTools,
    tool_router: ToolRouter<Self>,
}

impl AnimeHelperServer {
    pub fn new(tools: AnimeTools) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }
}

/// Wrap a JSON envelope as a successful tool result
fn json_response(tool: &str, value: Value) -> Result<CallToolResult, McpError> {
    debug!(tool, failed = value.get("error").is_some(), "Tool call finished");
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_router]
impl AnimeHelperServer {
    #[tool(description = "Search ANIME or MANGA by title. source: 'anilist' (default) or 'jikan'. Falls back to Jikan when AniList fails.")]
    async fn search_media(
        &self,
        Parameters(req): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("search_media", self.tools.search_media(req).await)
    }

    #[tool(description = "Full normalized record with up to 10 recommendations. source: 'anilist' (AniList id) or 'jikan' (MAL id).")]
    async fn media_details(
        &self,
        Parameters(req): Parameters<DetailsRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("media_details", self.tools.media_details(req).await)
    }

    #[tool(description = "Currently trending titles. Optional format_in, e.g. ['MOVIE','TV','OVA','ONA','SPECIAL'].")]
    async fn trending(
        &self,
        Parameters(req): Parameters<TrendingRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("trending", self.tools.trending(req).await)
    }

    #[tool(description = "Top titles of a season (default: current season and year). MANGA has no seasons and returns trending. format_in=['MOVIE'] for the season's films.")]
    async fn season_top(
        &self,
        Parameters(req): Parameters<SeasonTopRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("season_top", self.tools.season_top(req).await)
    }

    #[tool(description = "Last aired and next scheduled episode of an anime, by AniList id or by title query.")]
    async fn airing_status(
        &self,
        Parameters(req): Parameters<AiringStatusRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("airing_status", self.tools.airing_status(req).await)
    }

    #[tool(description = "Episodes airing in the next 'days' days (default 7), soonest first.")]
    async fn airing_calendar(
        &self,
        Parameters(req): Parameters<AiringCalendarRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("airing_calendar", self.tools.airing_calendar(req).await)
    }

    #[tool(description = "Resolve a title to canonical AniList and MAL ids: best match plus all candidates.")]
    async fn resolve_title(
        &self,
        Parameters(req): Parameters<ResolveRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_response("resolve_title", self.tools.resolve_title(req).await)
    }

    #[tool(description = "Ask in natural language (Spanish or English), e.g. '¿En qué capítulo va One Piece?'.")]
    async fn ask(&self, Parameters(req): Parameters<AskRequest>) -> Result<CallToolResult, McpError> {
        json_response("ask", self.tools.ask(req).await)
    }

    #[tool(description = "AniList query cache statistics.")]
    async fn cache_info(&self) -> Result<CallToolResult, McpError> {
        json_response("cache_info", self.tools.cache_info())
    }

    #[tool(description = "Clear the AniList query cache.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        json_response("cache_clear", self.tools.cache_clear())
    }

    #[tool(description = "Health check.")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        json_response("health", self.tools.health())
    }

    #[tool(description = "Service name, version, upstream endpoints and limits.")]
    async fn about(&self) -> Result<CallToolResult, McpError> {
        json_response("about", self.tools.about())
    }

    #[tool(description = "Use cases and example invocations.")]
    async fn help(&self) -> Result<CallToolResult, McpError> {
        json_response("help", self.tools.help())
    }

    #[tool(description = "Plain-text version of help.")]
    async fn help_text(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(help_text())]))
    }
}

#[tool_handler]
impl ServerHandler for AnimeHelperServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "anime-helper".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Anime and manga metadata from AniList with Jikan (MyAnimeList) fallback. \
                 Every tool returns a JSON object carrying schemaVersion; failures carry an \
                 'error' object with code, message and source."
                    .to_string(),
            ),
        }
    }
}
