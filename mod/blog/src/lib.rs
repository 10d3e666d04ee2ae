pub mod api;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::Router;
use quill_core::Module;
use quill_kv::KVStore;

use store::ArticleStore;

/// The blog module — article CRUD, search, and view-count statistics over
/// a key-value namespace.
pub struct BlogModule {
    store: Arc<ArticleStore>,
}

impl BlogModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            store: Arc::new(ArticleStore::new(kv)),
        }
    }
}

impl Module for BlogModule {
    fn name(&self) -> &str {
        "blog"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.store))
    }
}
