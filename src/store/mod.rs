//! Item store module
//!
//! Defines the storage contract the handler relies on and the backends that
//! implement it:
//! - `DynamoTodoStore`: DynamoDB table keyed by `pk`/`sk`
//! - `MemoryTodoStore`: in-process map for local runs and tests
//!
//! Every call is a single round-trip with no retries.

mod dynamo;
mod memory;

pub use dynamo::DynamoTodoStore;
pub use memory::MemoryTodoStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::{StoreBackend, StoreConfig};
use crate::logger;
use crate::todo::{TodoKey, TodoPatch, TodoRecord};

/// Store-level failure not covered by a precondition result
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
    #[error("stored item is malformed: {0}")]
    MalformedItem(String),
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// Storage contract for todo items
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All items in `partition` whose sort key starts with `prefix`
    async fn query_prefix(
        &self,
        partition: &str,
        prefix: &str,
    ) -> Result<Vec<TodoRecord>, StoreError>;

    /// Unconditional write
    async fn put(&self, record: &TodoRecord) -> Result<(), StoreError>;

    /// Update an existing item and return its new state.
    ///
    /// Returns `None` when the key does not exist; nothing is written then.
    async fn update_existing(
        &self,
        key: &TodoKey,
        patch: &TodoPatch,
    ) -> Result<Option<TodoRecord>, StoreError>;

    /// Delete an existing item. Returns `false` when the key does not exist.
    async fn delete_existing(&self, key: &TodoKey) -> Result<bool, StoreError>;
}

static SHARED: OnceCell<Arc<dyn TodoStore>> = OnceCell::const_new();

/// Process-wide store client, built on first use and reused afterwards
pub async fn shared(config: &StoreConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    SHARED
        .get_or_try_init(|| connect(config))
        .await
        .map(Arc::clone)
}

/// Build a store client for the configured backend
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    let store: Arc<dyn TodoStore> = match config.backend {
        StoreBackend::DynamoDb => Arc::new(DynamoTodoStore::connect(config).await?),
        StoreBackend::Memory => Arc::new(MemoryTodoStore::new()),
    };
    logger::log_store_ready(config.backend, &config.table_name);
    Ok(store)
}
