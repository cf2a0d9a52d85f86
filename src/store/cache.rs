//! Per-key stale-while-revalidate cache cell.
//!
//! Each content key owns one `CacheCell`. The cell guarantees:
//!
//! - at most one fetch in flight per key — concurrent requests subscribe to
//!   the same outcome instead of issuing duplicate network calls;
//! - within the staleness window, reads are served from the slot with no
//!   network activity (a `Failed` outcome is cached the same way, so a dead
//!   backend is not hammered on every render);
//! - after the window, the stale state is served immediately and a single
//!   background revalidation refreshes the slot;
//! - a caller dropped mid-wait just drops its subscription; the fetch task
//!   is detached and still lands in the cache.
//!
//! Lock discipline: the slot lock is only ever held for bookkeeping, never
//! across an await.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::state::ContentState;

enum Slot<T> {
    Empty,
    /// First fetch in flight; waiters subscribe to the sender.
    Fetching(broadcast::Sender<ContentState<T>>),
    Resolved {
        state: ContentState<T>,
        fetched_at: Instant,
        /// A background revalidation is in flight; don't start another.
        refreshing: bool,
    },
}

struct Inner<T> {
    label: String,
    ttl: Duration,
    slot: RwLock<Slot<T>>,
}

impl<T> Inner<T> {
    fn store(&self, state: ContentState<T>) {
        let mut slot = self.slot.write();
        *slot = Slot::Resolved {
            state,
            fetched_at: Instant::now(),
            refreshing: false,
        };
    }
}

/// Cheaply clonable handle to one key's cache slot.
pub(crate) struct CacheCell<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CacheCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> CacheCell<T> {
    pub fn new(label: impl Into<String>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                label: label.into(),
                ttl,
                slot: RwLock::new(Slot::Empty),
            }),
        }
    }

    /// Observe the current state without triggering a fetch.
    pub fn peek(&self) -> ContentState<T> {
        match &*self.inner.slot.read() {
            Slot::Empty | Slot::Fetching(_) => ContentState::Loading,
            Slot::Resolved { state, .. } => state.clone(),
        }
    }

    /// Drop whatever the slot holds. The next read starts from scratch.
    /// An in-flight fetch is not cancelled; it completes into the slot.
    pub fn invalidate(&self) {
        *self.inner.slot.write() = Slot::Empty;
    }

    /// Resolve the cell, fetching through `fetch` if the slot is empty or
    /// stale. `fetch` is only invoked when this call actually starts a
    /// fetch; coalesced callers never build a future.
    pub async fn get_with<F, Fut>(&self, fetch: F) -> ContentState<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ContentState<T>> + Send + 'static,
    {
        // Fast path: fresh value under the read lock.
        {
            let slot = self.inner.slot.read();
            if let Slot::Resolved {
                state, fetched_at, ..
            } = &*slot
            {
                if fetched_at.elapsed() < self.inner.ttl {
                    return state.clone();
                }
            }
        }

        let mut rx = {
            let mut slot = self.inner.slot.write();
            match &mut *slot {
                Slot::Resolved {
                    state,
                    fetched_at,
                    refreshing,
                } => {
                    if fetched_at.elapsed() < self.inner.ttl {
                        // Raced with a refresh that just landed.
                        return state.clone();
                    }
                    let stale = state.clone();
                    if !*refreshing {
                        *refreshing = true;
                        let inner = Arc::clone(&self.inner);
                        let fut = fetch();
                        tokio::spawn(async move {
                            let next = fut.await;
                            inner.store(next);
                        });
                        log::debug!(
                            "cache {}: serving stale, revalidating",
                            self.inner.label
                        );
                    }
                    return stale;
                }
                Slot::Fetching(tx) => tx.subscribe(),
                Slot::Empty => {
                    let (tx, rx) = broadcast::channel(1);
                    let task_tx = tx.clone();
                    let inner = Arc::clone(&self.inner);
                    let fut = fetch();
                    tokio::spawn(async move {
                        let next = fut.await;
                        inner.store(next.clone());
                        // Waiters may all be gone; that's fine.
                        let _ = task_tx.send(next);
                    });
                    log::debug!("cache {}: fetch started", self.inner.label);
                    *slot = Slot::Fetching(tx);
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(state) => state,
            // Sender dropped without sending: the fetch task died (runtime
            // shutdown). Report a failure rather than hanging forever.
            Err(_) => ContentState::Failed("content fetch interrupted".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Counter = Arc<AtomicUsize>;

    /// Fetch closure factory: counts invocations, sleeps `delay_ms`, then
    /// resolves to `state`.
    fn fetch(
        calls: &Counter,
        delay_ms: u64,
        state: ContentState<u32>,
    ) -> impl FnOnce() -> Pin<Box<dyn Future<Output = ContentState<u32>> + Send>> {
        let calls = Arc::clone(calls);
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                state
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_coalesce_into_one_fetch() {
        let cell = CacheCell::new("skills", Duration::from_secs(300));
        let calls = Counter::default();

        let (r1, r2, r3) = tokio::join!(
            cell.get_with(fetch(&calls, 20, ContentState::Loaded(1))),
            cell.get_with(fetch(&calls, 20, ContentState::Loaded(2))),
            cell.get_with(fetch(&calls, 20, ContentState::Loaded(3))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(r1, ContentState::Loaded(1));
        assert_eq!(r1, r2);
        assert_eq!(r2, r3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_value_served_without_refetch() {
        let cell = CacheCell::new("hero", Duration::from_secs(300));
        let calls = Counter::default();

        let first = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(1)))
            .await;
        assert_eq!(first, ContentState::Loaded(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Just inside the window: cached, no network.
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(2)))
            .await;
        assert_eq!(second, ContentState::Loaded(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_serves_old_value_and_revalidates_once() {
        let cell = CacheCell::new("hero", Duration::from_secs(300));
        let calls = Counter::default();

        cell.get_with(fetch(&calls, 0, ContentState::Loaded(1)))
            .await;
        tokio::time::advance(Duration::from_secs(301)).await;

        // Stale window: both calls serve the old value; only one
        // revalidation is started.
        let a = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(9)))
            .await;
        let b = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(9)))
            .await;
        assert_eq!(a, ContentState::Loaded(1));
        assert_eq!(b, ContentState::Loaded(1));

        // Let the background refresh land.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cell.peek(), ContentState::Loaded(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_outcome_cached_like_data() {
        let cell = CacheCell::new("skills", Duration::from_secs(300));
        let calls = Counter::default();

        let first = cell
            .get_with(fetch(&calls, 0, ContentState::Failed("down".to_string())))
            .await;
        assert!(first.is_failed());

        // No hammering: the failure is held until the window elapses.
        let second = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(1)))
            .await;
        assert!(second.is_failed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cell = CacheCell::new("navigation", Duration::from_secs(300));
        let calls = Counter::default();

        cell.get_with(fetch(&calls, 0, ContentState::Loaded(1)))
            .await;
        cell.invalidate();
        assert_eq!(cell.peek(), ContentState::Loading);

        let next = cell
            .get_with(fetch(&calls, 0, ContentState::Loaded(2)))
            .await;
        assert_eq!(next, ContentState::Loaded(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_does_not_lose_the_fetch() {
        let cell = CacheCell::new("projects", Duration::from_secs(300));
        let calls = Counter::default();

        let waiter = tokio::spawn({
            let cell = cell.clone();
            let fetch = fetch(&calls, 50, ContentState::Loaded(1));
            async move { cell.get_with(fetch).await }
        });

        // Let the waiter start the fetch, then drop it mid-flight.
        tokio::task::yield_now().await;
        waiter.abort();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.peek(), ContentState::Loaded(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek_reports_loading_while_fetch_in_flight() {
        let cell = CacheCell::new("activities", Duration::from_secs(300));
        let calls = Counter::default();

        assert_eq!(cell.peek(), ContentState::Loading);

        let waiter = tokio::spawn({
            let cell = cell.clone();
            let fetch = fetch(&calls, 50, ContentState::Empty);
            async move { cell.get_with(fetch).await }
        });

        tokio::task::yield_now().await;
        assert_eq!(cell.peek(), ContentState::Loading);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cell.peek(), ContentState::Empty);
        assert!(waiter.await.unwrap().is_empty());
    }
}
