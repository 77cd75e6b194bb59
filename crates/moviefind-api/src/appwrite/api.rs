//! `AnalyticsStore` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::TrendingEntry;
use crate::tmdb::Movie;

/// Search analytics store trait.
///
/// Abstracts counter writes and trending reads for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait;
/// implement `AnalyticsStore` to get both variants.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(AnalyticsStore: Send)]
pub trait LocalAnalyticsStore {
    /// Increments the counter for `query`, creating it with `movie` as the
    /// representative result when absent. Every call increments.
    ///
    /// # Errors
    ///
    /// Returns an error if any lookup, create, or update request fails.
    async fn record_search(&self, query: &str, movie: &Movie) -> Result<()>;

    /// Returns the top `limit` counters ordered by count, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingEntry>>;
}
