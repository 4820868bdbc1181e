//! Music catalog integration - search and playlist management.
//!
//! # Architecture
//!
//! Same separation as every external API in this crate:
//! - **Domain models** (`domain.rs`) - our types, stable across API changes
//! - **DTOs** (`dto.rs`) - exact Web API response shapes
//! - **Adapter** (`adapter.rs`) - DTO to domain conversion
//! - **Client** (`client.rs`) - HTTP client for the Web API
//! - **Auth** (`auth.rs`) - OAuth code flow, token refresh and token cache
//! - **Traits** (`traits.rs`) - [`CatalogApi`] seam used by the builder
//!
//! API docs: https://developer.spotify.com/documentation/web-api

mod adapter;
pub mod auth;
mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use auth::{AuthClient, OAuthCredentials, TokenCache, TokenGrant};
pub use client::{MAX_BATCH_SIZE, SpotifyClient};
pub use domain::{CatalogError, CatalogUser, PlaylistSummary, SearchPage, TrackMatch};
pub use traits::CatalogApi;
