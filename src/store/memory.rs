// In-memory store backend
// Ordered map keyed by (partition, sort key); counts every store call

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{StoreError, TodoStore};
use crate::todo::{TodoKey, TodoPatch, TodoRecord};

type ItemMap = BTreeMap<(String, String), TodoRecord>;

/// In-process todo store
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    items: RwLock<ItemMap>,
    operations: AtomicUsize,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far
    #[cfg(test)]
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Number of items currently stored
    #[cfg(test)]
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

fn map_key(key: &TodoKey) -> (String, String) {
    (key.partition.clone(), key.sort_key.clone())
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn query_prefix(
        &self,
        partition: &str,
        prefix: &str,
    ) -> Result<Vec<TodoRecord>, StoreError> {
        self.record_operation();
        let items = self.items.read().await;
        Ok(items
            .range((partition.to_string(), prefix.to_string())..)
            .take_while(|((pk, sk), _)| pk == partition && sk.starts_with(prefix))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn put(&self, record: &TodoRecord) -> Result<(), StoreError> {
        self.record_operation();
        self.items
            .write()
            .await
            .insert(map_key(&record.key()), record.clone());
        Ok(())
    }

    async fn update_existing(
        &self,
        key: &TodoKey,
        patch: &TodoPatch,
    ) -> Result<Option<TodoRecord>, StoreError> {
        self.record_operation();
        let mut items = self.items.write().await;
        Ok(items.get_mut(&map_key(key)).map(|record| {
            record.apply(patch);
            record.clone()
        }))
    }

    async fn delete_existing(&self, key: &TodoKey) -> Result<bool, StoreError> {
        self.record_operation();
        Ok(self.items.write().await.remove(&map_key(key)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::{PARTITION, SORT_KEY_PREFIX};

    fn record(partition: &str, sort_key: &str) -> TodoRecord {
        TodoRecord {
            partition: partition.to_string(),
            sort_key: sort_key.to_string(),
            title: "t".to_string(),
            done: false,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_query_filters_partition_and_prefix() {
        let store = MemoryTodoStore::new();
        store.put(&record(PARTITION, "todo#a")).await.unwrap();
        store.put(&record(PARTITION, "todo#b")).await.unwrap();
        store.put(&record(PARTITION, "note#c")).await.unwrap();
        store.put(&record("other", "todo#d")).await.unwrap();

        let found = store.query_prefix(PARTITION, SORT_KEY_PREFIX).await.unwrap();
        let ids: Vec<&str> = found.iter().map(TodoRecord::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_update_missing_key_writes_nothing() {
        let store = MemoryTodoStore::new();
        let patch = TodoPatch {
            title: Some("x".to_string()),
            done: None,
            updated_at: "2024-01-02T00:00:00.000Z".to_string(),
        };
        let result = store.update_existing(&TodoKey::for_id("nope"), &patch).await;
        assert_eq!(result.unwrap(), None);
        assert_eq!(store.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_existing_only_once() {
        let store = MemoryTodoStore::new();
        store.put(&record(PARTITION, "todo#a")).await.unwrap();
        let key = TodoKey::for_id("a");
        assert!(store.delete_existing(&key).await.unwrap());
        assert!(!store.delete_existing(&key).await.unwrap());
        assert_eq!(store.operation_count(), 3);
    }
}
