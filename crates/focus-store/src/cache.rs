//! Entity cache keyed by query fingerprint.
//!
//! Each fingerprint moves through
//!
//! ```text
//! Absent ──begin_load──▶ Loading ──finish_load──▶ Fresh ──invalidate──▶ Stale
//!                           ▲                                           │
//!                           └───────────────begin_load──────────────────┘
//! ```
//!
//! Stale and Loading entries keep serving their last known records.
//!
//! Every write stamps the entry with a version drawn from one cache-wide
//! counter, so a stamp is never reused. Local writes (`set`, optimistic
//! writes, rollbacks) also record their stamp as the entry's last local
//! write; a load only lands if no local write happened since it began, so
//! overlapping loads of one fingerprint do not discard each other. A
//! [`PendingMutation`] remembers the
//! stamp of its optimistic write; [`EntityCache::rollback`] only restores the
//! prior snapshot while the entry still carries that stamp. If anything wrote
//! in between (a second mutation on the same fingerprint, or a refetch), the
//! restore would clobber newer state, so it is skipped and the fingerprint is
//! marked stale instead.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use focus_core::{Entity, QueryFingerprint};

/// Freshness of a cached snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// A fetch is in flight. Earlier records, if any, remain readable.
    Loading,
    /// Matches the last successful fetch or confirmed write.
    Fresh,
    /// Should be refetched. Records remain readable.
    Stale,
}

struct Entry<E> {
    records: Option<Vec<E>>,
    status: CacheStatus,
    version: u64,
    /// Stamp of the last local write.
    written: u64,
}

struct Inner<E> {
    entries: HashMap<QueryFingerprint, Entry<E>>,
    next_version: u64,
    in_flight: usize,
}

impl<E> Inner<E> {
    fn stamp(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }
}

/// Handle returned by [`EntityCache::begin_load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    fingerprint: QueryFingerprint,
    written: u64,
}

impl LoadTicket {
    /// Fingerprint being loaded.
    pub fn fingerprint(&self) -> &QueryFingerprint {
        &self.fingerprint
    }
}

/// Snapshot taken before an optimistic write, held until the call settles.
#[must_use = "a pending mutation must be settled with commit or rollback"]
#[derive(Debug)]
pub struct PendingMutation<E> {
    fingerprint: QueryFingerprint,
    prior: Option<Vec<E>>,
    /// Stamp of the optimistic write; `None` when nothing was cached to change.
    version: Option<u64>,
}

impl<E> PendingMutation<E> {
    /// Fingerprint the optimistic write targeted.
    pub fn fingerprint(&self) -> &QueryFingerprint {
        &self.fingerprint
    }

    /// Records as they were before the optimistic write.
    pub fn prior(&self) -> Option<&[E]> {
        self.prior.as_deref()
    }
}

/// Cache of collection snapshots for one entity type.
pub struct EntityCache<E> {
    inner: Mutex<Inner<E>>,
}

impl<E: Entity> Default for EntityCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityCache<E> {
    /// Empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_version: 0,
                in_flight: 0,
            }),
        }
    }

    /// Current records for `fp`, or `None` if nothing has been loaded yet.
    pub fn get(&self, fp: &QueryFingerprint) -> Option<Vec<E>> {
        self.inner
            .lock()
            .entries
            .get(fp)
            .and_then(|e| e.records.clone())
    }

    /// Freshness of `fp`, or `None` when absent.
    pub fn status(&self, fp: &QueryFingerprint) -> Option<CacheStatus> {
        self.inner.lock().entries.get(fp).map(|e| e.status)
    }

    /// Replace the snapshot for `fp` wholesale and mark it fresh.
    pub fn set(&self, fp: QueryFingerprint, records: Vec<E>) {
        let mut inner = self.inner.lock();
        let version = inner.stamp();
        let _ = inner.entries.insert(
            fp,
            Entry {
                records: Some(records),
                status: CacheStatus::Fresh,
                version,
                written: version,
            },
        );
    }

    /// Mark `fp` as loading and remember its last local write.
    pub fn begin_load(&self, fp: &QueryFingerprint) -> LoadTicket {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let entry = inner.entries.entry(fp.clone()).or_insert(Entry {
            records: None,
            status: CacheStatus::Loading,
            version: 0,
            written: 0,
        });
        entry.status = CacheStatus::Loading;
        LoadTicket {
            fingerprint: fp.clone(),
            written: entry.written,
        }
    }

    /// Store fetched records unless the entry was written locally after the
    /// fetch began.
    ///
    /// Returns `false` when the result was discarded; the entry is then left
    /// stale so the next read refetches. Records are kept but stay stale when
    /// the entry was invalidated while the fetch was in flight.
    pub fn finish_load(&self, ticket: LoadTicket, records: Vec<E>) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let version = inner.stamp();
        match inner.entries.get_mut(&ticket.fingerprint) {
            Some(entry) if entry.written == ticket.written => {
                entry.records = Some(records);
                if entry.status == CacheStatus::Loading {
                    entry.status = CacheStatus::Fresh;
                }
                entry.version = version;
                true
            }
            Some(entry) => {
                debug!(fingerprint = %ticket.fingerprint, "discarding fetch overtaken by a local write");
                entry.status = CacheStatus::Stale;
                false
            }
            None => {
                let _ = inner.entries.insert(
                    ticket.fingerprint,
                    Entry {
                        records: Some(records),
                        status: CacheStatus::Fresh,
                        version,
                        written: 0,
                    },
                );
                true
            }
        }
    }

    /// A fetch failed: fall back to stale, or to absent if nothing was ever loaded.
    pub fn fail_load(&self, ticket: LoadTicket) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let remove = match inner.entries.get_mut(&ticket.fingerprint) {
            Some(entry) if entry.records.is_none() => true,
            Some(entry) => {
                entry.status = CacheStatus::Stale;
                false
            }
            None => false,
        };
        if remove {
            let _ = inner.entries.remove(&ticket.fingerprint);
        }
    }

    /// Apply `transform` to the snapshot for `fp` and return the prior snapshot.
    ///
    /// Nothing is changed when `fp` has no records yet; the returned mutation
    /// still has to be settled.
    pub fn apply_optimistic(
        &self,
        fp: &QueryFingerprint,
        transform: impl FnOnce(&mut Vec<E>),
    ) -> PendingMutation<E> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.in_flight += 1;
        let version = inner.stamp();

        let untouched = || PendingMutation {
            fingerprint: fp.clone(),
            prior: None,
            version: None,
        };
        let Some(entry) = inner.entries.get_mut(fp) else {
            return untouched();
        };
        let Some(records) = entry.records.as_mut() else {
            return untouched();
        };

        let prior = records.clone();
        transform(records);
        entry.version = version;
        entry.written = version;

        PendingMutation {
            fingerprint: fp.clone(),
            prior: Some(prior),
            version: Some(version),
        }
    }

    /// Restore the snapshot captured by `pending`.
    ///
    /// Returns `false` when the restore was skipped because a newer write
    /// landed on the same fingerprint; that fingerprint is marked stale.
    pub fn rollback(&self, pending: PendingMutation<E>) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.in_flight = inner.in_flight.saturating_sub(1);

        let (Some(stamp), Some(prior)) = (pending.version, pending.prior) else {
            return true;
        };
        let version = inner.stamp();
        let Some(entry) = inner.entries.get_mut(&pending.fingerprint) else {
            return false;
        };

        if entry.version == stamp {
            entry.records = Some(prior);
            entry.version = version;
            entry.written = version;
            true
        } else {
            warn!(
                fingerprint = %pending.fingerprint,
                "skipping stale rollback: snapshot changed since the optimistic write"
            );
            entry.status = CacheStatus::Stale;
            false
        }
    }

    /// Drop the snapshot captured by `pending`; the optimistic state stands.
    pub fn commit(&self, pending: PendingMutation<E>) {
        let mut inner = self.inner.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        drop(pending);
    }

    /// Mark `fp` stale.
    pub fn invalidate(&self, fp: &QueryFingerprint) {
        if let Some(entry) = self.inner.lock().entries.get_mut(fp) {
            entry.status = CacheStatus::Stale;
        }
    }

    /// Mark every fingerprint stale.
    pub fn invalidate_all(&self) {
        for entry in self.inner.lock().entries.values_mut() {
            entry.status = CacheStatus::Stale;
        }
    }

    /// Fingerprints currently marked stale.
    pub fn stale_fingerprints(&self) -> Vec<QueryFingerprint> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|(_, e)| e.status == CacheStatus::Stale)
            .map(|(fp, _)| fp.clone())
            .collect()
    }

    /// Optimistic writes not yet committed or rolled back.
    pub fn pending_mutations(&self) -> usize {
        self.inner.lock().in_flight
    }

    /// Number of cached fingerprints.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use focus_core::{EntityId, Task, TaskDraft, TaskFilter, TaskPatch, TaskStatus};
    use proptest::prelude::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        let mut t = Task::placeholder(&TaskDraft::titled(format!("task {id}")));
        t.id = EntityId::from(id);
        t.status = status;
        t
    }

    fn todo_fp() -> QueryFingerprint {
        TaskFilter::status(TaskStatus::Todo).into()
    }

    fn set_status(id: &str, status: TaskStatus) -> impl FnOnce(&mut Vec<Task>) + '_ {
        move |records| {
            for t in records.iter_mut().filter(|t| t.id.as_str() == id) {
                t.apply_patch(&TaskPatch::status(status));
            }
        }
    }

    #[test]
    fn absent_until_loaded() {
        let cache = EntityCache::<Task>::new();
        assert!(cache.get(&todo_fp()).is_none());
        assert!(cache.status(&todo_fp()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn load_lifecycle() {
        let cache = EntityCache::<Task>::new();
        let ticket = cache.begin_load(&todo_fp());
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Loading));
        assert!(cache.get(&todo_fp()).is_none());

        assert!(cache.finish_load(ticket, vec![task("a", TaskStatus::Todo)]));
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Fresh));

        cache.invalidate(&todo_fp());
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));
        // Stale still serves the last known records.
        assert_eq!(cache.get(&todo_fp()).unwrap().len(), 1);

        let _ticket = cache.begin_load(&todo_fp());
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Loading));
        assert_eq!(cache.get(&todo_fp()).unwrap().len(), 1);
    }

    #[test]
    fn failed_first_load_returns_to_absent() {
        let cache = EntityCache::<Task>::new();
        let ticket = cache.begin_load(&todo_fp());
        cache.fail_load(ticket);
        assert!(cache.status(&todo_fp()).is_none());
    }

    #[test]
    fn failed_refetch_keeps_stale_records() {
        let cache = EntityCache::<Task>::new();
        cache.set(todo_fp(), vec![task("a", TaskStatus::Todo)]);
        let ticket = cache.begin_load(&todo_fp());
        cache.fail_load(ticket);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));
        assert!(cache.get(&todo_fp()).is_some());
    }

    #[test]
    fn equal_fingerprints_share_one_entry() {
        let cache = EntityCache::<Task>::new();
        let blank: QueryFingerprint = TaskFilter {
            status: Some(String::new()),
            ..TaskFilter::default()
        }
        .into();
        cache.set(blank, vec![task("a", TaskStatus::Todo)]);
        cache.set(QueryFingerprint::all(), vec![task("b", TaskStatus::Todo)]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn rollback_restores_prior_snapshot() {
        let cache = EntityCache::<Task>::new();
        let before = vec![task("a", TaskStatus::Todo)];
        cache.set(todo_fp(), before.clone());

        let pending = cache.apply_optimistic(&todo_fp(), set_status("a", TaskStatus::Completed));
        assert_eq!(cache.get(&todo_fp()).unwrap()[0].status, TaskStatus::Completed);
        assert_eq!(pending.prior().unwrap(), before.as_slice());
        assert_eq!(cache.pending_mutations(), 1);

        assert!(cache.rollback(pending));
        assert_eq!(cache.get(&todo_fp()).unwrap(), before);
        assert_eq!(cache.pending_mutations(), 0);
    }

    #[test]
    fn commit_keeps_optimistic_state() {
        let cache = EntityCache::<Task>::new();
        cache.set(todo_fp(), vec![task("a", TaskStatus::Todo)]);
        let pending = cache.apply_optimistic(&todo_fp(), set_status("a", TaskStatus::InProgress));
        cache.commit(pending);
        assert_eq!(cache.get(&todo_fp()).unwrap()[0].status, TaskStatus::InProgress);
        assert_eq!(cache.pending_mutations(), 0);
    }

    #[test]
    fn optimistic_on_absent_entry_is_a_noop() {
        let cache = EntityCache::<Task>::new();
        let pending = cache.apply_optimistic(&todo_fp(), |r| r.clear());
        assert!(pending.prior().is_none());
        assert!(cache.rollback(pending));
        assert!(cache.get(&todo_fp()).is_none());
        assert_eq!(cache.pending_mutations(), 0);
    }

    #[test]
    fn stale_rollback_is_skipped() {
        let cache = EntityCache::<Task>::new();
        cache.set(
            todo_fp(),
            vec![task("a", TaskStatus::Todo), task("b", TaskStatus::Todo)],
        );

        let first = cache.apply_optimistic(&todo_fp(), set_status("a", TaskStatus::Completed));
        let second = cache.apply_optimistic(&todo_fp(), set_status("b", TaskStatus::Completed));

        // The first call fails after the second one wrote: restoring its
        // snapshot would also undo b's change.
        assert!(!cache.rollback(first));
        let now = cache.get(&todo_fp()).unwrap();
        assert_eq!(now[1].status, TaskStatus::Completed);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));

        cache.commit(second);
        assert_eq!(cache.pending_mutations(), 0);
    }

    #[test]
    fn fetch_overtaken_by_optimistic_write_is_discarded() {
        let cache = EntityCache::<Task>::new();
        cache.set(todo_fp(), vec![task("a", TaskStatus::Todo)]);
        let ticket = cache.begin_load(&todo_fp());

        let pending = cache.apply_optimistic(&todo_fp(), set_status("a", TaskStatus::Paused));
        assert!(!cache.finish_load(ticket, vec![task("a", TaskStatus::Todo)]));
        assert_eq!(cache.get(&todo_fp()).unwrap()[0].status, TaskStatus::Paused);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));
        cache.commit(pending);
    }

    #[test]
    fn overlapping_loads_both_land() {
        let cache = EntityCache::<Task>::new();
        cache.set(todo_fp(), Vec::new());
        let first = cache.begin_load(&todo_fp());
        let second = cache.begin_load(&todo_fp());

        assert!(cache.finish_load(first, vec![task("a", TaskStatus::Todo)]));
        assert!(cache.finish_load(
            second,
            vec![task("a", TaskStatus::Todo), task("b", TaskStatus::Todo)]
        ));
        assert_eq!(cache.get(&todo_fp()).unwrap().len(), 2);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Fresh));
    }

    #[test]
    fn refetch_between_write_and_rollback_skips_rollback() {
        let cache = EntityCache::<Task>::new();
        cache.set(todo_fp(), vec![task("a", TaskStatus::Todo)]);
        let pending = cache.apply_optimistic(&todo_fp(), set_status("a", TaskStatus::Completed));
        let ticket = cache.begin_load(&todo_fp());
        assert!(cache.finish_load(ticket, vec![task("a", TaskStatus::Completed)]));

        assert!(!cache.rollback(pending));
        assert_eq!(cache.get(&todo_fp()).unwrap()[0].status, TaskStatus::Completed);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));
    }

    #[test]
    fn invalidation_during_load_keeps_result_stale() {
        let cache = EntityCache::<Task>::new();
        let ticket = cache.begin_load(&todo_fp());
        cache.invalidate_all();
        assert!(cache.finish_load(ticket, vec![task("a", TaskStatus::Todo)]));
        assert_eq!(cache.get(&todo_fp()).unwrap().len(), 1);
        assert_eq!(cache.status(&todo_fp()), Some(CacheStatus::Stale));
    }

    #[test]
    fn invalidate_all_and_stale_listing() {
        let cache = EntityCache::<Task>::new();
        let done: QueryFingerprint = TaskFilter::status(TaskStatus::Completed).into();
        cache.set(todo_fp(), Vec::new());
        cache.set(done.clone(), Vec::new());
        assert!(cache.stale_fingerprints().is_empty());

        cache.invalidate_all();
        let mut stale = cache.stale_fingerprints();
        stale.sort();
        let mut expected = vec![todo_fp(), done];
        expected.sort();
        assert_eq!(stale, expected);
    }

    proptest! {
        #[test]
        fn failed_update_restores_exactly(
            statuses in proptest::collection::vec(0u8..4, 1..8),
            target in 0usize..8,
        ) {
            let all = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed, TaskStatus::Paused];
            let before: Vec<Task> = statuses
                .iter()
                .enumerate()
                .map(|(i, s)| task(&i.to_string(), all[usize::from(*s)]))
                .collect();
            let cache = EntityCache::<Task>::new();
            cache.set(todo_fp(), before.clone());

            let id = (target % before.len()).to_string();
            let pending = cache.apply_optimistic(&todo_fp(), set_status(&id, TaskStatus::Completed));
            prop_assert!(cache.rollback(pending));
            prop_assert_eq!(cache.get(&todo_fp()).unwrap(), before);
            prop_assert_eq!(cache.pending_mutations(), 0);
        }
    }
}
