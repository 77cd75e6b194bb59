//! Appwrite document types for search popularity counters.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::tmdb::Movie;

/// A stored search counter document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCountRecord {
    /// Appwrite document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Normalized search query (record key).
    pub query: String,
    /// Number of recorded searches.
    pub count: u64,
    /// TMDB ID of the representative movie.
    pub movie_id: u64,
    /// Title of the representative movie.
    pub title: String,
    /// Poster path of the representative movie.
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Read projection of a search counter for the trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingEntry {
    /// Normalized search query.
    pub query: String,
    /// Number of recorded searches.
    pub count: u64,
    /// TMDB ID of the representative movie.
    pub movie_id: u64,
    /// Title of the representative movie.
    pub title: String,
    /// Poster path of the representative movie.
    pub poster_path: Option<String>,
}

impl From<SearchCountRecord> for TrendingEntry {
    fn from(record: SearchCountRecord) -> Self {
        Self {
            query: record.query,
            count: record.count,
            movie_id: record.movie_id,
            title: record.title,
            poster_path: record.poster_path,
        }
    }
}

/// Document payload for a new search counter.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewSearchCount<'a> {
    pub query: &'a str,
    pub count: u64,
    pub movie_id: u64,
    pub title: &'a str,
    pub poster_path: Option<&'a str>,
}

impl<'a> NewSearchCount<'a> {
    /// First occurrence of `query`, pointing at `movie`.
    pub(crate) fn first(query: &'a str, movie: &'a Movie) -> Self {
        Self {
            query,
            count: 1,
            movie_id: movie.id,
            title: &movie.title,
            poster_path: movie.poster_path.as_deref(),
        }
    }
}

/// `documents` list response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DocumentList<T> {
    /// Documents on this page.
    #[serde(default = "Vec::new")]
    pub documents: Vec<T>,
}

/// Error body returned by Appwrite on non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// HTTP status code echoed by the server.
    #[serde(default)]
    pub code: u16,
    /// Error type identifier (e.g. `document_not_found`).
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Normalizes a search query into its record key (NFKC, trimmed).
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.nfkc().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_normalize_query_trims_and_folds_width() {
        // Arrange & Act & Assert
        assert_eq!(normalize_query("  bat "), "bat");
        assert_eq!(normalize_query("ＢＡＴ"), "BAT");
        assert_eq!(normalize_query("Batman"), "Batman");
    }

    #[test]
    fn test_parse_document_list() {
        // Arrange
        let json = r#"{"total":1,"documents":[{"$id":"doc1","$collectionId":"c","query":"bat","count":3,"movie_id":1,"title":"Batman","poster_path":"/x.jpg"}]}"#;

        // Act
        let list: DocumentList<SearchCountRecord> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(list.documents.len(), 1);
        let record = &list.documents[0];
        assert_eq!(record.id, "doc1");
        assert_eq!(record.count, 3);
        assert_eq!(record.poster_path.as_deref(), Some("/x.jpg"));
    }

    #[test]
    fn test_trending_entry_from_record() {
        // Arrange
        let record = SearchCountRecord {
            id: String::from("doc1"),
            query: String::from("bat"),
            count: 4,
            movie_id: 1,
            title: String::from("Batman"),
            poster_path: None,
        };

        // Act
        let entry = TrendingEntry::from(record);

        // Assert
        assert_eq!(entry.query, "bat");
        assert_eq!(entry.count, 4);
        assert_eq!(entry.movie_id, 1);
    }

    #[test]
    fn test_new_search_count_serializes_fields() {
        // Arrange
        let movie = Movie {
            id: 1,
            title: String::from("Batman"),
            poster_path: Some(String::from("/x.jpg")),
            release_date: None,
            original_language: None,
            vote_average: None,
        };

        // Act
        let value = serde_json::to_value(NewSearchCount::first("bat", &movie)).unwrap();

        // Assert
        assert_eq!(
            value,
            serde_json::json!({
                "query": "bat",
                "count": 1,
                "movie_id": 1,
                "title": "Batman",
                "poster_path": "/x.jpg",
            })
        );
    }
}
