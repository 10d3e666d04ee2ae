use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use quill_core::{ApiJson, Envelope, ServiceError};

use crate::model::{
    Article, BatchDeleteRequest, CreateArticleRequest, Stats, UpdateArticleRequest,
};
use crate::store::ArticleStore;

type StoreState = Arc<ArticleStore>;

pub fn router(store: Arc<ArticleStore>) -> Router {
    Router::new()
        .route(
            "/articles",
            get(list_articles)
                .post(create_article)
                .delete(batch_delete_articles),
        )
        .route(
            "/articles/{id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/articles/search/{query}", get(search_articles))
        .route("/stats", get(get_stats))
        .with_state(store)
}

// ---------------------------------------------------------------------------
// GET /articles
// ---------------------------------------------------------------------------

async fn list_articles(
    State(store): State<StoreState>,
) -> Result<Json<Envelope<Vec<Article>>>, ServiceError> {
    let articles = store.list()?;
    let count = articles.len();
    Ok(Json(Envelope::ok(articles).with_count(count)))
}

// ---------------------------------------------------------------------------
// GET /articles/{id}
// ---------------------------------------------------------------------------

async fn get_article(
    State(store): State<StoreState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Article>>, ServiceError> {
    let article = store.get(&id)?;
    Ok(Json(Envelope::ok(article)))
}

// ---------------------------------------------------------------------------
// POST /articles
// ---------------------------------------------------------------------------

async fn create_article(
    State(store): State<StoreState>,
    ApiJson(req): ApiJson<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Envelope<Article>>), ServiceError> {
    let article = store.create(req)?;
    info!(id = %article.id, "article created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(article).with_message("article created")),
    ))
}

// ---------------------------------------------------------------------------
// PUT /articles/{id}
// ---------------------------------------------------------------------------

async fn update_article(
    State(store): State<StoreState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateArticleRequest>,
) -> Result<Json<Envelope<Article>>, ServiceError> {
    let article = store.update(&id, req)?;
    info!(id = %article.id, "article updated");
    Ok(Json(Envelope::ok(article).with_message("article updated")))
}

// ---------------------------------------------------------------------------
// DELETE /articles/{id}
// ---------------------------------------------------------------------------

async fn delete_article(
    State(store): State<StoreState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ServiceError> {
    store.delete(&id)?;
    info!(id = %id, "article deleted");
    Ok(Json(Envelope::message("article deleted")))
}

// ---------------------------------------------------------------------------
// DELETE /articles  (body: {"ids": [...]})
// ---------------------------------------------------------------------------

async fn batch_delete_articles(
    State(store): State<StoreState>,
    ApiJson(req): ApiJson<BatchDeleteRequest>,
) -> Result<Json<Envelope<()>>, ServiceError> {
    let ids = req.ids.unwrap_or_default();
    let count = store.batch_delete(&ids)?;
    info!(count, "articles batch-deleted");
    Ok(Json(
        Envelope::message(format!("deleted {count} articles")).with_count(count),
    ))
}

// ---------------------------------------------------------------------------
// GET /articles/search/{query}
// ---------------------------------------------------------------------------

async fn search_articles(
    State(store): State<StoreState>,
    Path(query): Path<String>,
) -> Result<Json<Envelope<Vec<Article>>>, ServiceError> {
    let results = store.search(&query)?;
    let count = results.len();
    Ok(Json(Envelope::ok(results).with_count(count)))
}

// ---------------------------------------------------------------------------
// GET /stats
// ---------------------------------------------------------------------------

async fn get_stats(
    State(store): State<StoreState>,
) -> Result<Json<Envelope<Stats>>, ServiceError> {
    let stats = store.stats()?;
    Ok(Json(Envelope::ok(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use quill_kv::MemoryKV;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let kv = Arc::new(MemoryKV::new());
        router(Arc::new(ArticleStore::new(kv)))
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    async fn create(router: &Router, title: &str, content: &str) -> serde_json::Value {
        let (status, body) = send(
            router,
            "POST",
            "/articles",
            Some(serde_json::json!({"title": title, "content": content})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    #[tokio::test]
    async fn create_returns_201_envelope() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/articles",
            Some(serde_json::json!({"title": "Hi", "content": "Body text"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "article created");
        assert_eq!(body["data"]["title"], "Hi");
        assert_eq!(body["data"]["views"], 0);
        assert_eq!(body["data"]["author"], "Anonymous");
        assert_eq!(body["data"]["createdAt"], body["data"]["updatedAt"]);
    }

    #[tokio::test]
    async fn create_missing_fields_is_400() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/articles",
            Some(serde_json::json!({"title": "only a title"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn get_increments_views() {
        let router = test_router();
        let created = create(&router, "t", "c").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&router, "GET", &format!("/articles/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["views"], 1);

        let (_, body) = send(&router, "GET", &format!("/articles/{id}"), None).await;
        assert_eq!(body["data"]["views"], 2);
    }

    #[tokio::test]
    async fn get_missing_is_404_envelope() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/articles/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn list_returns_count() {
        let router = test_router();
        create(&router, "a", "a").await;
        create(&router, "b", "b").await;

        let (status, body) = send(&router, "GET", "/articles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_forces_id() {
        let router = test_router();
        let created = create(&router, "old", "content").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(
            &router,
            "PUT",
            &format!("/articles/{id}"),
            Some(serde_json::json!({"id": "hijacked", "title": "new"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"].as_str(), Some(id));
        assert_eq!(body["data"]["title"], "new");
        assert_eq!(body["data"]["content"], "content");
    }

    #[tokio::test]
    async fn update_missing_is_404() {
        let router = test_router();
        let (status, _) = send(
            &router,
            "PUT",
            "/articles/12345",
            Some(serde_json::json!({"title": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let router = test_router();
        let created = create(&router, "t", "c").await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&router, "DELETE", &format!("/articles/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "article deleted");

        let (status, _) = send(&router, "GET", &format!("/articles/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn batch_delete_reports_count() {
        let router = test_router();
        let a = create(&router, "a", "a").await;
        let b = create(&router, "b", "b").await;

        let (status, body) = send(
            &router,
            "DELETE",
            "/articles",
            Some(serde_json::json!({
                "ids": [a["id"], b["id"], "missing"]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 3);

        let (_, body) = send(&router, "GET", "/articles", None).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn batch_delete_empty_is_400() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "DELETE",
            "/articles",
            Some(serde_json::json!({"ids": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&router, "DELETE", "/articles", Some(serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrongly_typed_body_is_400_envelope() {
        let router = test_router();
        // `ids` must be an array of strings.
        let (status, body) = send(
            &router,
            "DELETE",
            "/articles",
            Some(serde_json::json!({"ids": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_body_is_400_envelope() {
        let router = test_router();
        // No body, no content-type.
        let (status, body) = send(&router, "DELETE", "/articles", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_json_body_is_400_envelope() {
        let router = test_router();
        let request = Request::builder()
            .method("POST")
            .uri("/articles")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = router.clone().oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn search_by_tag() {
        let router = test_router();
        let (status, _) = send(
            &router,
            "POST",
            "/articles",
            Some(serde_json::json!({
                "title": "tagged", "content": "c", "tags": ["Rustlang"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        create(&router, "untagged", "c").await;

        let (status, body) = send(&router, "GET", "/articles/search/rustlang", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["title"], "tagged");
    }

    #[tokio::test]
    async fn stats_shape() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalArticles"], 0);
        assert_eq!(body["data"]["totalViews"], 0);
        assert_eq!(body["data"]["avgReadTime"], 0.0);
        assert_eq!(body["data"]["uniqueAuthors"], 0);
    }
}
