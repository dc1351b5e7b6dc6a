//! Client state container for the current user's task list.
//!
//! Every write is followed by a full refetch; the refreshed list replaces
//! `items` wholesale. Each operation kind has its own status field, and one
//! shared error slot clears itself after a delay unless a newer error
//! replaced it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::access::TodoApi;
use crate::config::{ClientOptions, SyncMode};
use crate::error::Result;
use crate::model::{TaskId, TaskView};
use crate::normalize::normalize_tasks;

/// Lifecycle of one operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodosState {
    pub items: Vec<TaskView>,
    pub fetch_status: Status,
    pub add_status: Status,
    pub update_status: Status,
    pub delete_status: Status,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Fetch,
    Add,
    Update,
    Delete,
}

impl Operation {
    fn status_mut(self, state: &mut TodosState) -> &mut Status {
        match self {
            Operation::Fetch => &mut state.fetch_status,
            Operation::Add => &mut state.add_status,
            Operation::Update => &mut state.update_status,
            Operation::Delete => &mut state.delete_status,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch todos",
            Operation::Add => "Failed to add todo",
            Operation::Update => "Failed to update todo",
            Operation::Delete => "Failed to delete todo",
        }
    }

    fn failure_message(self, message: String) -> String {
        if message.trim().is_empty() {
            self.default_message().to_string()
        } else {
            message
        }
    }
}

struct Inner {
    api: Arc<dyn TodoApi>,
    state: watch::Sender<TodosState>,
    sync_mode: SyncMode,
    gate: Mutex<()>,
    error_clear_delay: Duration,
    error_generation: AtomicU64,
    mounted: AtomicBool,
}

/// Handle to a task list; clones share the same state
#[derive(Clone)]
pub struct TodoList {
    inner: Arc<Inner>,
}

impl TodoList {
    pub fn new(api: Arc<dyn TodoApi>, options: &ClientOptions) -> Self {
        let (state, _) = watch::channel(TodosState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                sync_mode: options.sync_mode,
                gate: Mutex::new(()),
                error_clear_delay: options.error_clear_delay,
                error_generation: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
        }
    }

    /// The current state
    pub fn snapshot(&self) -> TodosState {
        self.inner.state.borrow().clone()
    }

    /// A receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<TodosState> {
        self.inner.state.subscribe()
    }

    /// Stop applying results. Actions still in flight resolve normally for
    /// their callers but leave the state untouched.
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    fn update(&self, f: impl FnOnce(&mut TodosState)) {
        if self.is_mounted() {
            self.inner.state.send_modify(f);
        }
    }

    /// Populate `items` with already-fetched data, no round trip
    pub fn seed(&self, items: Vec<TaskView>) {
        self.update(|state| {
            state.items = items;
            state.fetch_status = Status::Succeeded;
        });
    }

    pub fn clear_error(&self) {
        self.update(|state| state.error = None);
    }

    pub fn reset_add_status(&self) {
        self.update(|state| state.add_status = Status::Idle);
    }

    pub fn reset_update_status(&self) {
        self.update(|state| state.update_status = Status::Idle);
    }

    pub fn reset_delete_status(&self) {
        self.update(|state| state.delete_status = Status::Idle);
    }

    /// Load the list
    pub async fn fetch(&self) -> Result<Vec<TaskView>> {
        self.begin(Operation::Fetch);
        let _gate = self.gate().await;
        let result = self.load().await;
        self.finish(Operation::Fetch, result)
    }

    /// Add a task, then reload the list. Callers guard against issuing a
    /// second add while one is pending; the container itself does not.
    pub async fn add(&self, text: &str) -> Result<Vec<TaskView>> {
        self.begin(Operation::Add);
        let _gate = self.gate().await;
        let result = match self.inner.api.add_task(text).await {
            Ok(()) => self.load().await,
            Err(err) => Err(err),
        };
        self.finish(Operation::Add, result)
    }

    /// Set a task's completion flag to `is_complete`, then reload the list
    pub async fn toggle(&self, id: TaskId, is_complete: bool) -> Result<Vec<TaskView>> {
        self.begin(Operation::Update);
        let _gate = self.gate().await;
        let result = match self.inner.api.set_completion(id, is_complete).await {
            Ok(()) => self.load().await,
            Err(err) => Err(err),
        };
        self.finish(Operation::Update, result)
    }

    /// Delete a task, then reload the list
    pub async fn remove(&self, id: TaskId) -> Result<Vec<TaskView>> {
        self.begin(Operation::Delete);
        let _gate = self.gate().await;
        let result = match self.inner.api.delete_task(id).await {
            Ok(()) => self.load().await,
            Err(err) => Err(err),
        };
        self.finish(Operation::Delete, result)
    }

    async fn load(&self) -> Result<Vec<TaskView>> {
        let rows = self.inner.api.list_tasks().await?;
        normalize_tasks(&rows)
    }

    async fn gate(&self) -> Option<MutexGuard<'_, ()>> {
        match self.inner.sync_mode {
            SyncMode::Serialized => Some(self.inner.gate.lock().await),
            SyncMode::Concurrent => None,
        }
    }

    fn begin(&self, operation: Operation) {
        self.update(|state| {
            *operation.status_mut(state) = Status::Pending;
            state.error = None;
        });
    }

    fn finish(&self, operation: Operation, result: Result<Vec<TaskView>>) -> Result<Vec<TaskView>> {
        if !self.is_mounted() {
            return result;
        }

        match &result {
            Ok(items) => {
                let items = items.clone();
                self.update(|state| {
                    state.items = items;
                    *operation.status_mut(state) = Status::Succeeded;
                });
            }
            Err(err) => {
                tracing::warn!(?operation, error = %err, "todo action failed");
                let message = operation.failure_message(err.to_string());
                self.update(|state| {
                    *operation.status_mut(state) = Status::Failed;
                    state.error = Some(message);
                });
                self.schedule_error_clear();
            }
        }
        result
    }

    /// Clear the error after the configured delay unless a newer error has
    /// been recorded by then.
    fn schedule_error_clear(&self) {
        let generation = self.inner.error_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.inner.error_clear_delay;
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if inner.error_generation.load(Ordering::SeqCst) == generation
                && inner.mounted.load(Ordering::SeqCst)
            {
                inner.state.send_modify(|state| state.error = None);
            }
        });
    }
}
