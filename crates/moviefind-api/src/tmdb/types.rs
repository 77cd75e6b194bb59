//! TMDB API response types and request descriptors.

use serde::{Deserialize, Deserializer, Serialize};

/// Base URL for w500 poster images.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Image shown when a movie has no poster.
pub const NO_POSTER_PLACEHOLDER: &str = "no-movie.png";

/// Base URL for movie pages on the TMDB website.
const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

// --- Movie ---

/// A single movie as returned by `discover/movie` and `search/movie`.
///
/// Only `id` and `title` are required; everything else is optional
/// on the wire and defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path relative to the image CDN (e.g. `/abc.jpg`).
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD), may be empty or null.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Movie {
    /// Returns the full poster URL, or the placeholder image when no poster exists.
    #[must_use]
    pub fn poster_url(&self) -> String {
        match self.poster_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                format!("{POSTER_BASE_URL}/{}", path.trim_start_matches('/'))
            }
            _ => String::from(NO_POSTER_PLACEHOLDER),
        }
    }

    /// Returns the TMDB website URL for this movie.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{MOVIE_PAGE_BASE_URL}/{}", self.id)
    }

    /// Returns the release year (first four characters of `release_date`).
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

// --- Movie list ---

/// Response body shared by `discover/movie` and `search/movie`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Movies on this page. An absent or `null` field means no results.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<Movie>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// Decodes `null` as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Movie>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Movie>>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Request ---

/// Which catalog listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieRequest {
    /// `discover/movie` sorted by popularity.
    Popular,
    /// `search/movie` with the given text.
    Search(String),
}

impl MovieRequest {
    /// Builds the request for a settled query: search for non-empty text,
    /// popularity listing otherwise.
    #[must_use]
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            Self::Popular
        } else {
            Self::Search(String::from(query))
        }
    }

    /// Returns the search text, or `None` for the popularity listing.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Popular => None,
            Self::Search(q) => Some(q),
        }
    }
}

// --- Error ---

/// Error body returned by TMDB on non-success responses.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB-specific status code (e.g. 7 for an invalid API key).
    pub status_code: u32,
    /// Human-readable message.
    pub status_message: String,
    /// Always `false` for errors.
    #[serde(default)]
    pub success: bool,
}
