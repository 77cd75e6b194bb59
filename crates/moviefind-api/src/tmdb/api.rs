//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{Movie, MovieRequest};

/// Movie catalog API trait.
///
/// Abstracts catalog reads for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait;
/// implement `CatalogApi` to get both variants.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Lists movies sorted by popularity (descending).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the status is not a
    /// success, or JSON parsing fails.
    async fn list_popular(&self) -> Result<Vec<Movie>>;

    /// Searches movies by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the status is not a
    /// success, or JSON parsing fails.
    async fn search(&self, query: &str) -> Result<Vec<Movie>>;
}

/// Runs one catalog request against `api`.
///
/// The returned future is `Send` so it can be moved onto a spawned task.
///
/// # Errors
///
/// Propagates the error of the underlying catalog call.
pub async fn fetch_movies<C>(api: &C, request: &MovieRequest) -> Result<Vec<Movie>>
where
    C: CatalogApi + Sync,
{
    match request {
        MovieRequest::Popular => CatalogApi::list_popular(api).await,
        MovieRequest::Search(query) => CatalogApi::search(api, query).await,
    }
}
