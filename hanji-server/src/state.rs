//! Application state

use chrono::{DateTime, Utc};
use hanji_core::DocumentHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One open document in the registry
#[derive(Clone)]
pub struct OpenDocument {
    pub handle: DocumentHandle,
    pub name: String,
    pub opened_at: DateTime<Utc>,
}

/// Shared application state
///
/// The registry maps document ids to handles; each handle carries its own
/// exclusive-access guard, so the server serializes operations per document
/// while distinct documents proceed independently.
#[derive(Clone, Default)]
pub struct AppState {
    documents: Arc<RwLock<HashMap<Uuid, OpenDocument>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, returning its document id
    pub async fn insert(&self, handle: DocumentHandle, name: String) -> Uuid {
        let id = handle.id();
        let entry = OpenDocument {
            handle,
            name,
            opened_at: Utc::now(),
        };
        self.documents.write().await.insert(id, entry);
        id
    }

    /// Clone out the handle for a document id
    pub async fn get(&self, id: Uuid) -> Option<OpenDocument> {
        self.documents.read().await.get(&id).cloned()
    }

    /// Close a document, dropping its handle
    pub async fn remove(&self, id: Uuid) -> Option<OpenDocument> {
        self.documents.write().await.remove(&id)
    }

    /// Snapshot of all open documents
    pub async fn list(&self) -> Vec<(Uuid, OpenDocument)> {
        self.documents
            .read()
            .await
            .iter()
            .map(|(&id, entry)| (id, entry.clone()))
            .collect()
    }
}
