//! In-process task store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{StoreError, TaskStore};
use crate::model::{NewTask, RawTask, RawTimestamp, TaskId};

#[derive(Debug, Clone)]
struct StoredTask {
    id: TaskId,
    task: String,
    is_complete: bool,
    owner_id: String,
    inserted_at: DateTime<Utc>,
}

impl StoredTask {
    fn to_raw(&self) -> RawTask {
        RawTask {
            id: self.id,
            task: self.task.clone(),
            is_complete: self.is_complete,
            owner_id: self.owner_id.clone(),
            inserted_at: RawTimestamp::DateTime(self.inserted_at),
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredTask>,
    last_id: TaskId,
    last_inserted_at: Option<DateTime<Utc>>,
    offline: Option<String>,
}

impl Table {
    fn ensure_online(&self) -> Result<(), StoreError> {
        match &self.offline {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn push(&mut self, task: String, owner_id: String, inserted_at: DateTime<Utc>) -> TaskId {
        self.last_id += 1;
        self.rows.push(StoredTask {
            id: self.last_id,
            task,
            is_complete: false,
            owner_id,
            inserted_at,
        });
        self.last_id
    }
}

/// Task table kept in memory with the same ownership and ordering rules as
/// the relational one: serial ids are never reused and `inserted_at` never
/// goes backwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row with an explicit creation time, returning its id
    pub async fn seed(&self, owner_id: &str, task: &str, inserted_at: DateTime<Utc>) -> TaskId {
        let mut table = self.table.lock().await;
        table.push(task.to_string(), owner_id.to_string(), inserted_at)
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub async fn take_offline(&self, reason: &str) {
        self.table.lock().await.offline = Some(reason.to_string());
    }

    pub async fn bring_online(&self) {
        self.table.lock().await.offline = None;
    }

    /// Total number of rows across all owners
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        table.ensure_online()?;

        let now = Utc::now();
        let inserted_at = match table.last_inserted_at {
            Some(last) if last > now => last,
            _ => now,
        };
        table.last_inserted_at = Some(inserted_at);
        let id = table.push(task.task, task.owner_id, inserted_at);
        tracing::debug!(id, "inserted task in memory");
        Ok(())
    }

    async fn select_owned(&self, owner_id: &str) -> Result<Vec<RawTask>, StoreError> {
        let table = self.table.lock().await;
        table.ensure_online()?;

        let mut owned: Vec<&StoredTask> = table
            .rows
            .iter()
            .filter(|row| row.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at));
        Ok(owned.into_iter().map(StoredTask::to_raw).collect())
    }

    async fn update_completion(
        &self,
        id: TaskId,
        owner_id: &str,
        is_complete: bool,
    ) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        table.ensure_online()?;

        if let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| row.id == id && row.owner_id == owner_id)
        {
            row.is_complete = is_complete;
        }
        Ok(())
    }

    async fn delete_owned(&self, id: TaskId, owner_id: &str) -> Result<(), StoreError> {
        let mut table = self.table.lock().await;
        table.ensure_online()?;

        table
            .rows
            .retain(|row| !(row.id == id && row.owner_id == owner_id));
        Ok(())
    }

    fn with_access_token(self: Arc<Self>, _token: &str) -> Arc<dyn TaskStore> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_task(owner: &str, text: &str) -> NewTask {
        NewTask {
            task: text.to_string(),
            owner_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryTaskStore::new();
        store.insert(new_task("u1", "a")).await.unwrap();
        store.insert(new_task("u1", "b")).await.unwrap();
        let b = store.select_owned("u1").await.unwrap()[0].id;
        store.delete_owned(b, "u1").await.unwrap();
        store.insert(new_task("u1", "c")).await.unwrap();

        let ids: Vec<TaskId> = store
            .select_owned("u1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert!(!ids.contains(&b));
        assert_eq!(ids.iter().max(), Some(&3));
    }

    #[tokio::test]
    async fn select_orders_newest_first_and_scopes_by_owner() {
        let store = MemoryTaskStore::new();
        let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap();
        store.seed("u1", "old", day(1)).await;
        store.seed("u2", "other", day(2)).await;
        store.seed("u1", "new", day(3)).await;

        let rows = store.select_owned("u1").await.unwrap();
        let tasks: Vec<&str> = rows.iter().map(|r| r.task.as_str()).collect();
        assert_eq!(tasks, vec!["new", "old"]);
        assert!(matches!(rows[0].inserted_at, RawTimestamp::DateTime(_)));
    }

    #[tokio::test]
    async fn writes_require_matching_owner() {
        let store = MemoryTaskStore::new();
        let id = store.seed("u1", "mine", Utc::now()).await;

        store.update_completion(id, "u2", true).await.unwrap();
        store.delete_owned(id, "u2").await.unwrap();
        let rows = store.select_owned("u1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_complete);

        store.update_completion(id, "u1", true).await.unwrap();
        assert!(store.select_owned("u1").await.unwrap()[0].is_complete);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryTaskStore::new();
        store.take_offline("connection refused").await;
        let err = store.select_owned("u1").await.unwrap_err();
        assert_eq!(err.to_string(), "Store unavailable: connection refused");
        assert!(store.insert(new_task("u1", "x")).await.is_err());

        store.bring_online().await;
        assert!(store.select_owned("u1").await.unwrap().is_empty());
        assert!(store.is_empty().await);
    }
}
