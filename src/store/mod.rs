//! The Task Record Store: the only persisted state.
//!
//! Every write is filtered by `id` AND `owner_id`, so a row owned by someone
//! else looks exactly like a row that does not exist.

mod error;
mod filter;
mod memory;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{NewTask, RawTask, TaskId};

pub use error::*;
pub use filter::*;
pub use memory::MemoryTaskStore;
pub use rest::RestTaskStore;

/// Filtered select/insert/update/delete statements against the task table
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a row; the store assigns `id`, `is_complete = false` and
    /// `inserted_at = now`.
    async fn insert(&self, task: NewTask) -> Result<(), StoreError>;

    /// All rows owned by `owner_id`, newest `inserted_at` first
    async fn select_owned(&self, owner_id: &str) -> Result<Vec<RawTask>, StoreError>;

    /// Set the completion flag of the row matching both `id` and `owner_id`.
    /// No matching row is not an error.
    async fn update_completion(
        &self,
        id: TaskId,
        owner_id: &str,
        is_complete: bool,
    ) -> Result<(), StoreError>;

    /// Hard-delete the row matching both `id` and `owner_id`, if any
    async fn delete_owned(&self, id: TaskId, owner_id: &str) -> Result<(), StoreError>;

    /// A handle that performs requests on behalf of the holder of `token`
    fn with_access_token(self: Arc<Self>, token: &str) -> Arc<dyn TaskStore>;
}
