//! Upstream catalog clients.
//!
//! This module provides a retry-enabled HTTP transport plus typed clients
//! for the AniList GraphQL API (primary) and the Jikan API (fallback).

pub mod anilist;
pub mod client;
pub mod jikan;
pub mod types;

pub use anilist::AnilistClient;
pub use client::{
    HttpBackend, HttpClient, HttpRequest, HttpResponse, Method, RequestOptions, ReqwestBackend,
    RetryPolicy, TransportError,
};
pub use jikan::JikanClient;
pub use types::*;

#[cfg(test)]
pub(crate) use client::testing;
