//! Typed CRUD gateways over the shared [`ApiClient`].
//!
//! [`EntityGateway`] is the seam the cache layer is generic over; tests swap
//! in in-memory fakes, production uses [`RestGateway`]. The gateway holds no
//! state of its own beyond the client handle.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;

use focus_core::{ApiError, CompletionDetails, Entity, EntityId, QueryFingerprint, RequestScope, Task};

use crate::client::{ApiClient, Call};

/// CRUD verbs for one entity collection.
#[async_trait]
pub trait EntityGateway<E: Entity>: Send + Sync {
    /// List the collection. Only the fingerprint's non-blank values are sent.
    async fn list(&self, query: &QueryFingerprint) -> Result<Vec<E>, ApiError>;

    /// Fetch one record.
    async fn get(&self, id: &EntityId) -> Result<E, ApiError>;

    /// Create a record; the server assigns its id.
    async fn create(&self, draft: &E::Draft) -> Result<E, ApiError>;

    /// Partial update. Fields absent from `patch` are left untouched.
    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, ApiError>;

    /// Delete a record. A repeat delete surfaces [`ApiError::NotFound`].
    async fn delete(&self, id: &EntityId) -> Result<(), ApiError>;
}

/// Task-specific transitions.
#[async_trait]
pub trait TaskGateway: EntityGateway<Task> {
    /// Move a task to `completed`, optionally recording how it went.
    async fn complete(
        &self,
        id: &EntityId,
        details: Option<&CompletionDetails>,
    ) -> Result<Task, ApiError>;
}

/// REST implementation over `/api/{collection}`.
pub struct RestGateway<E> {
    client: ApiClient,
    collection_path: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for RestGateway<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection_path: self.collection_path.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> RestGateway<E> {
    /// Gateway for `E`'s collection.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            collection_path: format!("/api/{}", E::COLLECTION),
            _entity: PhantomData,
        }
    }

    /// `/api/{collection}/{id}` with the id pushed as one escaped segment.
    fn record_call<'a>(&'a self, method: Method, id: &'a EntityId) -> Call<'a> {
        Call::new(method, &self.collection_path, RequestScope::Record).segment(id.as_str())
    }
}

#[async_trait]
impl<E: Entity> EntityGateway<E> for RestGateway<E> {
    async fn list(&self, query: &QueryFingerprint) -> Result<Vec<E>, ApiError> {
        self.client
            .fetch(
                Call::new(Method::GET, &self.collection_path, RequestScope::Collection)
                    .query(query.query_pairs()),
            )
            .await
    }

    async fn get(&self, id: &EntityId) -> Result<E, ApiError> {
        self.client.fetch(self.record_call(Method::GET, id)).await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, ApiError> {
        let call =
            Call::new(Method::POST, &self.collection_path, RequestScope::Collection).json(draft)?;
        self.client.fetch(call).await
    }

    async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, ApiError> {
        let call = self.record_call(Method::PUT, id).json(patch)?;
        self.client.fetch(call).await
    }

    async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.client.execute(self.record_call(Method::DELETE, id)).await
    }
}

#[async_trait]
impl TaskGateway for RestGateway<Task> {
    async fn complete(
        &self,
        id: &EntityId,
        details: Option<&CompletionDetails>,
    ) -> Result<Task, ApiError> {
        let mut call = self.record_call(Method::PUT, id).segment("complete");
        if let Some(details) = details {
            call = call.json(details)?;
        }
        self.client.fetch(call).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
