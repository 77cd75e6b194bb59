//! API client library for moviefind.
//!
//! Provides a client for the TMDB movie catalog and a client for the
//! Appwrite document store that keeps search popularity counters.

/// Appwrite search analytics store client.
pub mod appwrite;

/// TMDB catalog API client.
pub mod tmdb;
