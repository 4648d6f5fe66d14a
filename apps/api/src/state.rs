use std::sync::Arc;

use crate::auth::session::{MemorySessionStore, SessionStore};
use crate::config::Config;
use crate::storage::{BlobStore, MemoryBlobStore};
use crate::store::{MemoryStore, Store};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users, jobs, applications and saved jobs.
    pub store: Arc<dyn Store>,
    /// Bearer tokens. Redis in production.
    pub sessions: Arc<dyn SessionStore>,
    /// Uploaded resumes. S3 / MinIO in production.
    pub blobs: Arc<dyn BlobStore>,
    pub config: Config,
}

impl AppState {
    /// Everything in process; used for `STORAGE_BACKEND=memory` and in tests.
    pub fn in_memory(config: Config) -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
            config,
        }
    }
}
