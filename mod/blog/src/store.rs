use std::collections::BTreeSet;
use std::sync::Arc;

use quill_core::{now_rfc3339, ServiceError};
use quill_core::types::now_millis;
use quill_kv::KVStore;

use crate::model::{
    default_excerpt, Article, CreateArticleRequest, Stats, UpdateArticleRequest, DEFAULT_AUTHOR,
    DEFAULT_READ_TIME,
};

/// KV key prefix for article records.
const KEY_PREFIX: &str = "article:";

fn article_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Serialization boundary: articles are validated here once, not trusted
/// implicitly throughout handler logic.
fn encode(article: &Article) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec(article).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn decode(data: &[u8]) -> Result<Article, ServiceError> {
    serde_json::from_slice(data)
        .map_err(|e| ServiceError::Internal(format!("bad article json: {e}")))
}

/// Persistent storage and business rules for articles, backed by a KVStore.
///
/// One key per article (`article:{id}`), value = the full JSON-encoded
/// record. List, search, and stats are full scans; every mutation is a
/// read-modify-write with last-write-wins semantics.
pub struct ArticleStore {
    kv: Arc<dyn KVStore>,
}

impl ArticleStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Validate the request, apply defaults, and persist a new article.
    pub fn create(&self, req: CreateArticleRequest) -> Result<Article, ServiceError> {
        let title = req
            .title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Validation("title and content are required".into()))?;
        let content = req
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ServiceError::Validation("title and content are required".into()))?;

        let id = self.allocate_id()?;
        let now = now_rfc3339();

        let article = Article {
            // An empty excerpt counts as absent, same as title/content's
            // empty check.
            excerpt: req
                .excerpt
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| default_excerpt(&content)),
            author: req.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            created_at: now.clone(),
            updated_at: now,
            tags: req.tags.unwrap_or_default(),
            read_time: req.read_time.unwrap_or(DEFAULT_READ_TIME),
            views: 0,
            id,
            title,
            content,
        };

        self.put(&article)?;
        Ok(article)
    }

    /// Fetch one article and bump its view counter.
    ///
    /// This is a deliberately non-idempotent read: the incremented record
    /// is persisted before being returned, so N sequential fetches yield
    /// views == N. A record that no longer decodes is a hard 500 here,
    /// unlike in scans.
    pub fn get(&self, id: &str) -> Result<Article, ServiceError> {
        let mut article = self.fetch(id)?;
        article.views += 1;
        self.put(&article)?;
        Ok(article)
    }

    /// Merge the supplied fields over an existing article.
    ///
    /// `id`, `createdAt`, and `views` are immutable; `updatedAt` is always
    /// refreshed. A patch carrying an empty title or content is rejected,
    /// preserving the stored-record invariant.
    pub fn update(&self, id: &str, req: UpdateArticleRequest) -> Result<Article, ServiceError> {
        let mut article = self.fetch(id)?;

        if let Some(title) = req.title {
            if title.is_empty() {
                return Err(ServiceError::Validation("title must not be empty".into()));
            }
            article.title = title;
        }
        if let Some(content) = req.content {
            if content.is_empty() {
                return Err(ServiceError::Validation("content must not be empty".into()));
            }
            article.content = content;
        }
        if let Some(excerpt) = req.excerpt {
            article.excerpt = excerpt;
        }
        if let Some(author) = req.author {
            article.author = author;
        }
        if let Some(tags) = req.tags {
            article.tags = tags;
        }
        if let Some(read_time) = req.read_time {
            article.read_time = read_time;
        }
        article.updated_at = now_rfc3339();

        self.put(&article)?;
        Ok(article)
    }

    /// Delete one article. Fails with NotFound if the id is absent.
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.fetch_raw(id)?;
        self.kv
            .delete(&article_key(id))
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    /// Delete several articles unconditionally — absent ids are a silent
    /// no-op. Returns the number of ids attempted.
    pub fn batch_delete(&self, ids: &[String]) -> Result<usize, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Validation(
                "ids list must not be empty".into(),
            ));
        }
        let keys: Vec<String> = ids.iter().map(|id| article_key(id)).collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.kv
            .batch_delete(&key_refs)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(ids.len())
    }

    // -----------------------------------------------------------------------
    // Scans
    // -----------------------------------------------------------------------

    /// All articles, newest first by creation time. Records that fail to
    /// decode are skipped silently so one drifted blob cannot break the
    /// whole listing.
    pub fn list(&self) -> Result<Vec<Article>, ServiceError> {
        let mut articles = self.scan_all()?;
        // Timestamps share one RFC 3339 format, so lexicographic order is
        // chronological order.
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }

    /// Case-insensitive substring search over title, content, excerpt, and
    /// tags. Results come back in scan order; no ranking.
    pub fn search(&self, query: &str) -> Result<Vec<Article>, ServiceError> {
        let query = query.to_lowercase();
        let articles = self.scan_all()?;
        Ok(articles
            .into_iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&query)
                    || a.content.to_lowercase().contains(&query)
                    || a.excerpt.to_lowercase().contains(&query)
                    || a.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect())
    }

    /// Aggregate statistics over every decodable record.
    pub fn stats(&self) -> Result<Stats, ServiceError> {
        let articles = self.scan_all()?;

        let mut total_views = 0i64;
        let mut total_read_time = 0i64;
        let mut authors = BTreeSet::new();
        for article in &articles {
            total_views += article.views;
            total_read_time += article.read_time;
            authors.insert(article.author.clone());
        }

        let total_articles = articles.len();
        let avg_read_time = if total_articles > 0 {
            // Round half-up at the tenths digit.
            (total_read_time as f64 / total_articles as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        Ok(Stats {
            total_articles,
            total_views,
            avg_read_time,
            unique_authors: authors.len(),
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Millisecond-timestamp id. If two creations land in the same
    /// millisecond, probe forward until an unused key is found so ids stay
    /// unique and roughly time-ordered.
    fn allocate_id(&self) -> Result<String, ServiceError> {
        let mut ms = now_millis();
        loop {
            let id = ms.to_string();
            let taken = self
                .kv
                .get(&article_key(&id))
                .map_err(|e| ServiceError::Storage(e.to_string()))?
                .is_some();
            if !taken {
                return Ok(id);
            }
            ms += 1;
        }
    }

    fn fetch_raw(&self, id: &str) -> Result<Vec<u8>, ServiceError> {
        self.kv
            .get(&article_key(id))
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound(format!("article {id} not found")))
    }

    fn fetch(&self, id: &str) -> Result<Article, ServiceError> {
        let data = self.fetch_raw(id)?;
        decode(&data)
    }

    fn put(&self, article: &Article) -> Result<(), ServiceError> {
        let data = encode(article)?;
        self.kv
            .set(&article_key(&article.id), &data)
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    fn scan_all(&self) -> Result<Vec<Article>, ServiceError> {
        let entries = self
            .kv
            .scan(KEY_PREFIX)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut articles = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match decode(&value) {
                Ok(article) => articles.push(article),
                Err(_) => {
                    tracing::warn!(key = %key, "skipping undecodable article record");
                }
            }
        }
        Ok(articles)
    }
}
