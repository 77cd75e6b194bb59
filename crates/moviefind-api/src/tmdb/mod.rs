//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 `discover/movie` and
//! `search/movie` endpoints.

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi, fetch_movies};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use types::{
    Movie, MovieListResponse, MovieRequest, NO_POSTER_PLACEHOLDER, POSTER_BASE_URL,
    TmdbErrorResponse,
};
