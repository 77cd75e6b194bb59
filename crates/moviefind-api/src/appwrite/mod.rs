//! Appwrite analytics store client module.
//!
//! Keeps one document per normalized search query in an Appwrite
//! collection, counting how often the query was searched.

mod api;
mod client;
mod query;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{AnalyticsStore, LocalAnalyticsStore};
#[allow(clippy::module_name_repetitions)]
pub use client::{AppwriteClient, AppwriteClientBuilder};
pub use query::Query;
pub use types::{AppwriteErrorResponse, SearchCountRecord, TrendingEntry, normalize_query};
