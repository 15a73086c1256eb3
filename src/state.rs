use crate::auth::repo::Users;
use crate::config::AppConfig;
use crate::recipes::repo::Recipes;
use crate::storage::{Collection, Document, DocumentStore, JsonFileStore, MemoryStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Users,
    pub recipes: Recipes,
}

impl AppState {
    pub fn init(config: AppConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.data_dir)) as Arc<dyn DocumentStore>;
        tracing::info!(data_dir = %config.data_dir.display(), "using json file store");
        Self::from_parts(Arc::new(config), store)
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            users: Collection::new(Arc::clone(&store), Document::Users),
            recipes: Collection::new(store, Document::Recipes),
        }
    }

    /// State backed by a fresh `MemoryStore`.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(Arc::new(config), Arc::new(MemoryStore::new()))
    }
}
