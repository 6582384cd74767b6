use std::sync::Arc;

use crate::ai::provider::CompletionProvider;
use crate::ai::query::QueryService;
use crate::config::Config;
use crate::job_controller::state::JobsState;
use crate::storage::db::{DocumentStore, StoreError};
use crate::storage::files::{FileStoreError, UploadStore};

/// Everything a handler needs, shared through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    pub uploads: UploadStore,
    pub query: QueryService,
    pub jobs: JobsState,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Could not open the document database: {0}")]
    Store(#[from] StoreError),

    #[error("Could not prepare the upload directory: {0}")]
    Uploads(#[from] FileStoreError),
}

impl AppState {
    /// Opens the database and upload directory and starts the job updater.
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: Config,
        provider: Option<Arc<dyn CompletionProvider>>,
    ) -> Result<Self, StartupError> {
        let store = DocumentStore::open(&config.database_path)?;
        let uploads = UploadStore::open(&config.upload_dir)?;
        let query = QueryService::new(provider, &config.ai);
        Ok(Self {
            config,
            store,
            uploads,
            query,
            jobs: JobsState::start(),
        })
    }
}
