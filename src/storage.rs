use std::{
    collections::HashMap,
    io::ErrorKind,
    marker::PhantomData,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::error::AppError;

/// The JSON documents the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Users,
    Recipes,
}

impl Document {
    pub fn file_name(self) -> &'static str {
        match self {
            Document::Users => "users.json",
            Document::Recipes => "recipes.json",
        }
    }
}

/// Whole-document persistence. `load` returns `None` when the document has
/// never been written.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self, doc: Document) -> anyhow::Result<Option<Vec<u8>>>;
    async fn save(&self, doc: Document, body: Vec<u8>) -> anyhow::Result<()>;
}

/// One JSON file per document inside a single data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, doc: Document) -> PathBuf {
        self.dir.join(doc.file_name())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self, doc: Document) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.path_of(doc);
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn save(&self, doc: Document, body: Vec<u8>) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create data dir {}", self.dir.display()))?;

        let path = self.path_of(doc);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replace {}", path.display()))?;

        debug!(path = %path.display(), bytes = body.len(), "document saved");
        Ok(())
    }
}

/// Keeps documents in process memory.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<Document, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, doc: Document, body: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut docs) = self.docs.write() {
            docs.insert(doc, body.into());
        }
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, doc: Document) -> anyhow::Result<Option<Vec<u8>>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(docs.get(&doc).cloned())
    }

    async fn save(&self, doc: Document, body: Vec<u8>) -> anyhow::Result<()> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        docs.insert(doc, body);
        Ok(())
    }
}

/// Typed access to one document. Cloning shares the store and the write lock.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    doc: Document,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            doc: self.doc,
            write_lock: Arc::clone(&self.write_lock),
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    pub fn new(store: Arc<dyn DocumentStore>, doc: Document) -> Self {
        Self {
            store,
            doc,
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    /// Never fails: a missing, unreadable or malformed document reads as
    /// `T::default()`.
    pub async fn read(&self) -> T {
        match self.load().await {
            Ok(value) => value,
            Err(e) => {
                warn!(doc = ?self.doc, error = %format!("{e:#}"), "using empty default");
                T::default()
            }
        }
    }

    /// Read-modify-write under the collection lock. The document is saved
    /// only when `f` returns `Ok`. A document that exists but cannot be
    /// loaded or decoded is left untouched and the call fails.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut T) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut value = self.load().await.map_err(|e| {
            error!(
                doc = ?self.doc,
                error = %format!("{e:#}"),
                "refusing to overwrite unreadable document"
            );
            AppError::Storage(e)
        })?;
        let out = f(&mut value)?;

        let body = serde_json::to_vec_pretty(&value).context("serialize document")?;
        self.store.save(self.doc, body).await?;
        Ok(out)
    }

    async fn load(&self) -> anyhow::Result<T> {
        match self.store.load(self.doc).await? {
            Some(body) => serde_json::from_slice(&body)
                .with_context(|| format!("decode {}", self.doc.file_name())),
            None => Ok(T::default()),
        }
    }
}
