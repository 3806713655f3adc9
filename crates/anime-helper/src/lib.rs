//! Anime and manga metadata tools.
//!
//! This library answers catalog questions from AniList (GraphQL, primary)
//! with Jikan (MyAnimeList REST mirror) as fallback, behind a retrying
//! HTTP transport and a five-minute query cache. Results are normalized
//! into the models of [`shared::models`] and served as MCP tools.

pub mod api;
pub mod cache;
pub mod envelope;
pub mod error;
pub mod intent;
pub mod normalize;
pub mod server;
pub mod tools;

pub use cache::{CacheInfo, QueryCache};
pub use error::ToolError;
pub use server::AnimeHelperServer;
pub use tools::AnimeTools;
