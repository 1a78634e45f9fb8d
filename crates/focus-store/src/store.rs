//! Mutation coordinator.
//!
//! Every mutation runs the same protocol against one fingerprint:
//!
//! 1. snapshot and apply the optimistic transform ([`EntityCache::apply_optimistic`])
//! 2. await the gateway call (no lock held)
//! 3. success: commit; failure: roll back
//! 4. mark every fingerprint of the collection stale so the next read
//!    reconciles with the server
//!
//! Gateway errors are returned unchanged after the rollback. There are no
//! automatic retries. A mutation future dropped before the gateway answers
//! (a timeout, a losing `select!` branch, an aborted task) is settled by
//! rolling back and invalidating, since the server outcome is unknown.

use std::sync::Arc;

use tracing::{debug, info, warn};

use focus_api::{EntityGateway, TaskGateway};
use focus_core::{
    ApiError, CompletionDetails, Entity, EntityId, QueryFingerprint, Task, TaskPatch, TaskStatus,
};

use crate::cache::{CacheStatus, EntityCache, PendingMutation};

/// An optimistic write awaiting its gateway call.
///
/// Settled explicitly by [`EntityStore::settle`]; if dropped unsettled, the
/// write is rolled back and the collection marked stale.
struct InFlight<'a, E: Entity> {
    cache: &'a EntityCache<E>,
    pending: Option<PendingMutation<E>>,
}

impl<E: Entity> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            warn!(
                collection = E::COLLECTION,
                fingerprint = %pending.fingerprint(),
                "mutation abandoned before settling, rolling back"
            );
            let _ = self.cache.rollback(pending);
            self.cache.invalidate_all();
        }
    }
}

/// Cache plus gateway for one entity collection.
pub struct EntityStore<E, G> {
    cache: Arc<EntityCache<E>>,
    gateway: G,
}

impl<E: Entity, G: EntityGateway<E>> EntityStore<E, G> {
    /// Store with a fresh cache.
    pub fn new(gateway: G) -> Self {
        Self::with_cache(gateway, Arc::new(EntityCache::new()))
    }

    /// Store over an existing cache, shared with other components.
    pub fn with_cache(gateway: G, cache: Arc<EntityCache<E>>) -> Self {
        Self { cache, gateway }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Arc<EntityCache<E>> {
        &self.cache
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Cached records for `filter`, without fetching.
    pub fn cached(&self, filter: impl Into<QueryFingerprint>) -> Option<Vec<E>> {
        self.cache.get(&filter.into())
    }

    /// Records for `filter`: the cache when fresh, otherwise a fetch.
    ///
    /// While the fetch runs, a stale snapshot stays readable through
    /// [`Self::cached`].
    pub async fn query(&self, filter: impl Into<QueryFingerprint>) -> Result<Vec<E>, ApiError> {
        let fp = filter.into();
        if self.cache.status(&fp) == Some(CacheStatus::Fresh) {
            if let Some(records) = self.cache.get(&fp) {
                return Ok(records);
            }
        }
        self.fetch(fp).await
    }

    /// Fetch `filter` from the server regardless of freshness.
    pub async fn refresh(&self, filter: impl Into<QueryFingerprint>) -> Result<Vec<E>, ApiError> {
        self.fetch(filter.into()).await
    }

    /// Refetch every stale fingerprint. Returns the last error, if any.
    pub async fn refresh_stale(&self) -> Result<(), ApiError> {
        let mut last_err = None;
        for fp in self.cache.stale_fingerprints() {
            if let Err(e) = self.fetch(fp).await {
                last_err = Some(e);
            }
        }
        last_err.map_or(Ok(()), Err)
    }

    async fn fetch(&self, fp: QueryFingerprint) -> Result<Vec<E>, ApiError> {
        let ticket = self.cache.begin_load(&fp);
        match self.gateway.list(&fp).await {
            Ok(records) => {
                debug!(collection = E::COLLECTION, fingerprint = %fp, count = records.len(), "fetched");
                let _ = self.cache.finish_load(ticket, records.clone());
                Ok(records)
            }
            Err(e) => {
                warn!(collection = E::COLLECTION, fingerprint = %fp, code = e.code(), "fetch failed: {e}");
                self.cache.fail_load(ticket);
                Err(e)
            }
        }
    }

    /// Create a record. A placeholder is shown under `fp` until the next refetch.
    pub async fn create(&self, fp: &QueryFingerprint, draft: E::Draft) -> Result<E, ApiError> {
        let placeholder = E::placeholder(&draft);
        let in_flight = self.optimistic(fp, move |records| records.push(placeholder));
        let result = self.gateway.create(&draft).await;
        if let Ok(created) = &result {
            info!(collection = E::COLLECTION, id = %created.id(), "created");
        }
        self.settle(in_flight, result)
    }

    /// Apply `patch` to record `id`, optimistically under `fp`.
    pub async fn update(
        &self,
        fp: &QueryFingerprint,
        id: &EntityId,
        patch: E::Patch,
    ) -> Result<E, ApiError> {
        let in_flight = self.optimistic(fp, |records| {
            for record in records.iter_mut().filter(|r| r.id() == id) {
                record.apply_patch(&patch);
            }
        });
        let result = self.gateway.update(id, &patch).await;
        self.settle(in_flight, result)
    }

    /// Delete record `id`. A record that is already gone counts as deleted.
    pub async fn delete(&self, fp: &QueryFingerprint, id: &EntityId) -> Result<(), ApiError> {
        let in_flight = self.optimistic(fp, |records| records.retain(|r| r.id() != id));
        let result = match self.gateway.delete(id).await {
            Err(e) if e.is_not_found() => {
                debug!(collection = E::COLLECTION, id = %id, "already deleted");
                Ok(())
            }
            other => other,
        };
        self.settle(in_flight, result)
    }

    fn optimistic(
        &self,
        fp: &QueryFingerprint,
        transform: impl FnOnce(&mut Vec<E>),
    ) -> InFlight<'_, E> {
        InFlight {
            cache: &self.cache,
            pending: Some(self.cache.apply_optimistic(fp, transform)),
        }
    }

    fn settle<T>(
        &self,
        mut in_flight: InFlight<'_, E>,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        if let Some(pending) = in_flight.pending.take() {
            match &result {
                Ok(_) => self.cache.commit(pending),
                Err(e) => {
                    warn!(
                        collection = E::COLLECTION,
                        fingerprint = %pending.fingerprint(),
                        code = e.code(),
                        "mutation failed, rolling back: {e}"
                    );
                    let _ = self.cache.rollback(pending);
                }
            }
        }
        self.cache.invalidate_all();
        result
    }
}

impl<G: TaskGateway> EntityStore<Task, G> {
    /// Mark task `id` completed, optimistically under `fp`.
    pub async fn complete(
        &self,
        fp: &QueryFingerprint,
        id: &EntityId,
        details: Option<CompletionDetails>,
    ) -> Result<Task, ApiError> {
        let patch = TaskPatch::status(TaskStatus::Completed);
        let in_flight = self.optimistic(fp, |records| {
            for task in records.iter_mut().filter(|t| &t.id == id) {
                task.apply_patch(&patch);
            }
        });
        let result = self.gateway.complete(id, details.as_ref()).await;
        self.settle(in_flight, result)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
