//! The access layer: the four task operations, each scoped to the caller.
//!
//! Writes require an identity and filter by `id` AND `owner_id`, so another
//! owner's task behaves exactly like a missing one. Listing without an
//! identity returns an empty list.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model::{NewTask, RawTask, TaskId};
use crate::session::{Identity, SessionProvider};
use crate::store::TaskStore;

/// Everything one operation needs: the resolved caller and a store handle
/// authorized for them.
#[derive(Clone)]
pub struct RequestContext {
    identity: Option<Identity>,
    store: Arc<dyn TaskStore>,
}

impl RequestContext {
    /// Context for a signed-in caller. When the identity carries an access
    /// token the store handle forwards it.
    pub fn new(identity: Identity, store: Arc<dyn TaskStore>) -> Self {
        let store = match identity.access_token.as_deref() {
            Some(token) => store.with_access_token(token),
            None => store,
        };
        Self {
            identity: Some(identity),
            store,
        }
    }

    /// Context with no signed-in caller
    pub fn anonymous(store: Arc<dyn TaskStore>) -> Self {
        Self {
            identity: None,
            store,
        }
    }

    /// Ask `sessions` who is calling and build the matching context
    pub async fn resolve(
        sessions: &dyn SessionProvider,
        store: Arc<dyn TaskStore>,
    ) -> Result<Self> {
        Ok(match sessions.current_identity().await? {
            Some(identity) => Self::new(identity, store),
            None => Self::anonymous(store),
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn owner_id(&self) -> Result<&str> {
        self.identity
            .as_ref()
            .map(|identity| identity.user_id.as_str())
            .ok_or(Error::Unauthenticated)
    }
}

/// Insert a task owned by the caller. The text is stored exactly as given,
/// whitespace included; only the empty string is rejected.
pub async fn add_task(ctx: &RequestContext, text: &str) -> Result<()> {
    let owner_id = ctx.owner_id()?;
    if text.is_empty() {
        return Err(Error::invalid_input("task text cannot be empty"));
    }

    tracing::debug!(owner_id, "adding task");
    ctx.store
        .insert(NewTask {
            task: text.to_string(),
            owner_id: owner_id.to_string(),
        })
        .await?;
    Ok(())
}

/// The caller's tasks, newest first; empty when nobody is signed in
pub async fn list_tasks(ctx: &RequestContext) -> Result<Vec<RawTask>> {
    let Some(identity) = ctx.identity() else {
        return Ok(Vec::new());
    };
    Ok(ctx.store.select_owned(&identity.user_id).await?)
}

/// Set the completion flag of one of the caller's tasks; a no-op when the
/// task is missing or belongs to someone else.
pub async fn set_completion(ctx: &RequestContext, id: TaskId, is_complete: bool) -> Result<()> {
    let owner_id = ctx.owner_id()?;
    tracing::debug!(owner_id, id, is_complete, "setting completion");
    ctx.store.update_completion(id, owner_id, is_complete).await?;
    Ok(())
}

/// Delete one of the caller's tasks; a no-op when there is no such task
pub async fn delete_task(ctx: &RequestContext, id: TaskId) -> Result<()> {
    let owner_id = ctx.owner_id()?;
    tracing::debug!(owner_id, id, "deleting task");
    ctx.store.delete_owned(id, owner_id).await?;
    Ok(())
}

/// The operations the client state container calls
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn add_task(&self, text: &str) -> Result<()>;

    async fn list_tasks(&self) -> Result<Vec<RawTask>>;

    async fn set_completion(&self, id: TaskId, is_complete: bool) -> Result<()>;

    async fn delete_task(&self, id: TaskId) -> Result<()>;
}

/// A context bound to one caller serves every call as that caller
#[async_trait]
impl TodoApi for RequestContext {
    async fn add_task(&self, text: &str) -> Result<()> {
        add_task(self, text).await
    }

    async fn list_tasks(&self) -> Result<Vec<RawTask>> {
        list_tasks(self).await
    }

    async fn set_completion(&self, id: TaskId, is_complete: bool) -> Result<()> {
        set_completion(self, id, is_complete).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        delete_task(self, id).await
    }
}

/// Server-side entry points: every call resolves the caller afresh
#[derive(Clone)]
pub struct ServerActions {
    sessions: Arc<dyn SessionProvider>,
    store: Arc<dyn TaskStore>,
}

impl ServerActions {
    pub fn new(sessions: Arc<dyn SessionProvider>, store: Arc<dyn TaskStore>) -> Self {
        Self { sessions, store }
    }

    async fn context(&self) -> Result<RequestContext> {
        RequestContext::resolve(self.sessions.as_ref(), self.store.clone()).await
    }
}

#[async_trait]
impl TodoApi for ServerActions {
    async fn add_task(&self, text: &str) -> Result<()> {
        add_task(&self.context().await?, text).await
    }

    async fn list_tasks(&self) -> Result<Vec<RawTask>> {
        list_tasks(&self.context().await?).await
    }

    async fn set_completion(&self, id: TaskId, is_complete: bool) -> Result<()> {
        set_completion(&self.context().await?, id, is_complete).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        delete_task(&self.context().await?, id).await
    }
}
