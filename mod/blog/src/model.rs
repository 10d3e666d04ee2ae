use serde::{Deserialize, Serialize};

/// Author used when a create request omits one.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Read time (minutes) used when a create request omits one.
pub const DEFAULT_READ_TIME: i64 = 5;

/// How many characters of content the default excerpt keeps.
const EXCERPT_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Article — the stored record, one JSON blob per KV key
// ---------------------------------------------------------------------------

/// A single blog article.
///
/// Stored as one JSON-encoded value under `article:{id}`; the same shape
/// goes over the wire. `id` and `created_at` are set once at creation and
/// never change; `updated_at` is refreshed on every update; `views` only
/// grows (one per single-article fetch).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_read_time")]
    pub read_time: i64,
    #[serde(default)]
    pub views: i64,
}

fn default_read_time() -> i64 {
    DEFAULT_READ_TIME
}

/// Default excerpt: first 200 characters of content plus an ellipsis.
/// The ellipsis is always appended, even for short content.
pub fn default_excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_LEN).collect();
    excerpt.push_str("...");
    excerpt
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Body for `POST /articles` — create an article.
///
/// All fields are optional at the serde level so that missing required
/// fields surface as a 400 with the standard envelope instead of a
/// deserialization rejection; `title` and `content` are validated in the
/// store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub read_time: Option<i64>,
}

/// Body for `PUT /articles/{id}` — partial update.
///
/// Only the fields present here can be changed; `id`, `createdAt` and
/// `views` have no corresponding field and are therefore immutable on
/// update. Unknown keys in the body are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub read_time: Option<i64>,
}

/// Body for `DELETE /articles` — batch delete.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Aggregate statistics
// ---------------------------------------------------------------------------

/// Aggregates computed by a full scan over all stored articles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_articles: usize,
    pub total_views: i64,
    /// Mean read time in minutes, rounded half-up to one decimal place.
    pub avg_read_time: f64,
    pub unique_authors: usize,
}
