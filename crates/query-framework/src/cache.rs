//! # Query Cache Actor
//!
//! The [`QueryCache`] is the "server" half of the coordinator. It owns every cache entry
//! and processes requests from [`QueryClient`]s sequentially in its own Tokio task, so the
//! entry map needs no locks.
//!
//! ## Entry lifecycle
//!
//! ```text
//!            observe + producer              producer Ok
//!   Idle ───────────────────────▶ Fetching ─────────────▶ Resolved
//!    ▲                               │  producer Err (after retries)
//!    │ invalidate / clear            └───────────────────▶ Failed
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! - A second observe of a fetching key joins the in-flight request instead of starting
//!   another one.
//! - Each fetch carries a generation number. A result whose generation no longer matches
//!   its entry (because the entry was invalidated or collected meanwhile) is discarded.
//! - Observers are reference counted. When the count drops to zero the entry is collected
//!   after [`QueryConfig::gc_time`]; failed entries are dropped immediately so the next
//!   observer fetches again. `invalidate` and `clear` never drop an observed entry; they
//!   reset it to `Idle` so the next observe refetches.

use crate::client::QueryClient;
use crate::config::QueryConfig;
use crate::error::FetchError;
use crate::key::QueryKey;
use crate::message::{
    CacheRequest, CacheStats, Internal, Observation, Producer, Settled, Snapshot,
};
use crate::result::CachedValue;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

enum EntryState {
    Idle,
    Fetching {
        waiters: Vec<oneshot::Sender<Snapshot>>,
        task: AbortHandle,
    },
    Resolved(CachedValue),
    Failed(FetchError),
}

struct Entry {
    state: EntryState,
    generation: u64,
    observers: usize,
    // Bumped whenever a pending collection must be cancelled.
    epoch: u64,
}

impl Entry {
    fn new() -> Self {
        Self {
            state: EntryState::Idle,
            generation: 0,
            observers: 0,
            epoch: 0,
        }
    }

    fn is_fetching(&self) -> bool {
        matches!(self.state, EntryState::Fetching { .. })
    }

    /// Aborts any in-flight fetch and forgets the value, keeping the observer count.
    fn reset(&mut self) {
        if let EntryState::Fetching { task, .. } = &self.state {
            task.abort();
        }
        // Dropping the waiters wakes them with `None`.
        self.state = EntryState::Idle;
    }
}

/// The actor that owns the shared query cache.
///
/// Create it with [`QueryCache::new`], spawn [`QueryCache::run`], and hand the returned
/// [`QueryClient`] to whoever needs data. The cache shuts down once every client has been
/// dropped, aborting any fetch still in flight.
///
/// ```rust
/// use query_framework::{producer, FetchError, QueryCache, QueryConfig, QueryKey};
///
/// #[tokio::main]
/// async fn main() {
///     let (cache, client) = QueryCache::new(QueryConfig::for_tests());
///     let handle = tokio::spawn(cache.run());
///
///     let products = producer(|| async { Ok::<_, FetchError>(vec!["Widget".to_string()]) });
///     let value = client
///         .fetch::<Vec<String>>(QueryKey::new("products"), products)
///         .await
///         .unwrap();
///     assert_eq!(value[0], "Widget");
///
///     drop(client);
///     handle.await.unwrap();
/// }
/// ```
pub struct QueryCache {
    receiver: mpsc::Receiver<CacheRequest>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    entries: HashMap<QueryKey, Entry>,
    config: QueryConfig,
    next_generation: u64,
}

impl QueryCache {
    /// Creates the cache actor and its client.
    ///
    /// The actor does nothing until [`run`](Self::run) is spawned.
    pub fn new(config: QueryConfig) -> (Self, QueryClient) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let cache = Self {
            receiver,
            internal_tx,
            internal_rx,
            entries: HashMap::new(),
            config,
            next_generation: 0,
        };
        (cache, QueryClient::new(sender))
    }

    /// Runs the event loop until all clients are dropped.
    pub async fn run(mut self) {
        info!(retry = self.config.retry, gc_time = ?self.config.gc_time, "Query cache started");

        loop {
            tokio::select! {
                biased;
                Some(internal) = self.internal_rx.recv() => self.handle_internal(internal),
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
            }
        }

        for entry in self.entries.values() {
            if let EntryState::Fetching { task, .. } = &entry.state {
                task.abort();
            }
        }
        info!(entries = self.entries.len(), "Query cache shutdown");
    }

    fn handle(&mut self, request: CacheRequest) {
        match request {
            CacheRequest::Observe {
                key,
                producer,
                retain,
                respond_to,
            } => {
                let observation = self.observe(key, producer, retain);
                let _ = respond_to.send(observation);
            }
            CacheRequest::Retain { key } => self.retain(key),
            CacheRequest::Release { key } => self.release(key),
            CacheRequest::Invalidate { prefix, respond_to } => {
                let count = self.invalidate(&prefix);
                let _ = respond_to.send(count);
            }
            CacheRequest::Clear { respond_to } => {
                self.clear();
                let _ = respond_to.send(());
            }
            CacheRequest::Stats { respond_to } => {
                let _ = respond_to.send(self.stats());
            }
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Settle {
                key,
                generation,
                result,
            } => self.settle(key, generation, result),
            Internal::Collect { key, epoch } => self.collect(&key, epoch),
        }
    }

    fn observe(&mut self, key: QueryKey, producer: Option<Producer>, retain: bool) -> Observation {
        if producer.is_none() && !self.entries.contains_key(&key) {
            debug!(%key, "Disabled query observed");
            return Observation {
                snapshot: Snapshot::Idle,
                settled: None,
            };
        }

        let entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
        if retain {
            entry.observers += 1;
            entry.epoch += 1;
        }

        match entry.state {
            EntryState::Resolved(ref value) => {
                debug!(%key, "Cache hit");
                Observation {
                    snapshot: Snapshot::Resolved(value.clone()),
                    settled: None,
                }
            }
            EntryState::Failed(ref error) => {
                debug!(%key, error = %error, "Cached failure");
                Observation {
                    snapshot: Snapshot::Failed(error.clone()),
                    settled: None,
                }
            }
            EntryState::Fetching {
                ref mut waiters, ..
            } => {
                debug!(%key, "Joined in-flight fetch");
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Observation {
                    snapshot: Snapshot::Fetching,
                    settled: Some(Settled::new(rx)),
                }
            }
            EntryState::Idle => {
                let Some(producer) = producer else {
                    return Observation {
                        snapshot: Snapshot::Idle,
                        settled: None,
                    };
                };
                self.next_generation += 1;
                let generation = self.next_generation;
                let task = spawn_fetch(
                    key.clone(),
                    generation,
                    producer,
                    self.config.clone(),
                    self.internal_tx.clone(),
                );
                let (tx, rx) = oneshot::channel();
                entry.generation = generation;
                entry.state = EntryState::Fetching {
                    waiters: vec![tx],
                    task,
                };
                info!(%key, generation, "Fetch started");
                Observation {
                    snapshot: Snapshot::Fetching,
                    settled: Some(Settled::new(rx)),
                }
            }
        }
    }

    fn settle(&mut self, key: QueryKey, generation: u64, result: Result<CachedValue, FetchError>) {
        let Some(entry) = self.entries.get_mut(&key) else {
            debug!(%key, generation, "Discarding result for evicted key");
            return;
        };
        if entry.generation != generation || !entry.is_fetching() {
            debug!(%key, generation, current = entry.generation, "Discarding stale result");
            return;
        }

        let (next, snapshot) = match result {
            Ok(value) => {
                info!(%key, generation, "Resolved");
                (EntryState::Resolved(value.clone()), Snapshot::Resolved(value))
            }
            Err(error) => {
                warn!(%key, generation, error = %error, "Failed");
                (EntryState::Failed(error.clone()), Snapshot::Failed(error))
            }
        };
        if let EntryState::Fetching { waiters, .. } = std::mem::replace(&mut entry.state, next) {
            for waiter in waiters {
                let _ = waiter.send(snapshot.clone());
            }
        }

        if entry.observers > 0 {
            return;
        }
        if matches!(entry.state, EntryState::Failed(_)) {
            self.entries.remove(&key);
            debug!(%key, "Dropped unobserved failure");
            return;
        }
        self.schedule_collect(key);
    }

    fn retain(&mut self, key: QueryKey) {
        let entry = self.entries.entry(key).or_insert_with(Entry::new);
        entry.observers += 1;
        entry.epoch += 1;
    }

    fn release(&mut self, key: QueryKey) {
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };
        entry.observers = entry.observers.saturating_sub(1);
        if entry.observers > 0 {
            return;
        }
        if matches!(entry.state, EntryState::Failed(_) | EntryState::Idle) {
            self.entries.remove(&key);
            debug!(%key, "Dropped unobserved entry");
            return;
        }
        self.schedule_collect(key);
    }

    fn schedule_collect(&mut self, key: QueryKey) {
        let Some(gc_time) = self.config.gc_time else {
            return;
        };
        let Some(entry) = self.entries.get_mut(&key) else {
            return;
        };
        entry.epoch += 1;
        let epoch = entry.epoch;

        if gc_time.is_zero() {
            self.collect(&key, epoch);
            return;
        }
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(gc_time).await;
            let _ = tx.send(Internal::Collect { key, epoch });
        });
    }

    fn collect(&mut self, key: &QueryKey, epoch: u64) {
        let collectable = self
            .entries
            .get(key)
            .is_some_and(|e| e.epoch == epoch && e.observers == 0 && !e.is_fetching());
        if collectable {
            self.entries.remove(key);
            debug!(%key, "Collected");
        }
    }

    fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        self.entries.retain(|key, entry| {
            if !key.starts_with(prefix) {
                return true;
            }
            count += 1;
            entry.reset();
            entry.observers > 0
        });
        info!(%prefix, count, "Invalidated");
        count
    }

    /// Drops every unobserved entry. Observed entries stay as idle shells so their
    /// observers keep them alive across the refetch.
    fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.reset();
            entry.observers > 0
        });
        info!(count, kept = self.entries.len(), "Cleared");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            in_flight: self.entries.values().filter(|e| e.is_fetching()).count(),
            observers: self.entries.values().map(|e| e.observers).sum(),
        }
    }
}

fn spawn_fetch(
    key: QueryKey,
    generation: u64,
    producer: Producer,
    config: QueryConfig,
    tx: mpsc::UnboundedSender<Internal>,
) -> AbortHandle {
    let handle = tokio::spawn(async move {
        let result = fetch_with_retry(&key, &producer, &config).await;
        let _ = tx.send(Internal::Settle {
            key,
            generation,
            result,
        });
    });
    handle.abort_handle()
}

async fn fetch_with_retry(
    key: &QueryKey,
    producer: &Producer,
    config: &QueryConfig,
) -> Result<CachedValue, FetchError> {
    let mut attempt = 0;
    loop {
        match producer().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < config.retry => {
                let delay = config.retry_delay_for(attempt);
                warn!(%key, attempt, error = %error, ?delay, "Fetch failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::producer;
    use crate::QueryError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn counting(calls: Arc<AtomicUsize>, value: u32) -> Producer {
        producer(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(value)
            }
        })
    }

    fn gated(calls: Arc<AtomicUsize>, gate: Arc<Notify>, value: u32) -> Producer {
        producer(move || {
            let calls = calls.clone();
            let gate = gate.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok::<_, FetchError>(value)
            }
        })
    }

    fn start(config: QueryConfig) -> (QueryClient, tokio::task::JoinHandle<()>) {
        let (cache, client) = QueryCache::new(config);
        (client, tokio::spawn(cache.run()))
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let (client, handle) = start(QueryConfig::for_tests());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("product").with(1u32);

        let first = client
            .fetch::<u32>(key.clone(), counting(calls.clone(), 7))
            .await
            .unwrap();
        let second = client
            .fetch::<u32>(key, counting(calls.clone(), 8))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_observers_share_one_request() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let key = QueryKey::new("products");

        let first = client
            .observe(key.clone(), Some(gated(calls.clone(), gate.clone(), 3)), false)
            .await
            .unwrap();
        let second = client
            .observe(key.clone(), Some(gated(calls.clone(), gate.clone(), 4)), false)
            .await
            .unwrap();
        assert!(matches!(first.snapshot, Snapshot::Fetching));
        assert!(matches!(second.snapshot, Snapshot::Fetching));
        assert_eq!(client.stats().await.unwrap().in_flight, 1);

        gate.notify_one();
        let a = first.settled.unwrap().wait().await.unwrap();
        let b = second.settled.unwrap().wait().await.unwrap();
        for snapshot in [a, b] {
            match snapshot {
                Snapshot::Resolved(value) => assert_eq!(*value.downcast::<u32>().unwrap(), 3),
                other => panic!("unexpected snapshot {other:?}"),
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_passed_through_unchanged() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let failing = producer(|| async { Err::<u32, _>(FetchError::msg("Failed to fetch product")) });

        let err = client
            .fetch::<u32>(QueryKey::new("product").with(1u32), failing)
            .await
            .unwrap_err();
        assert!(matches!(&err, QueryError::Fetch(e) if e.message() == "Failed to fetch product"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_with_backoff_then_succeeds() {
        let config = QueryConfig::for_tests()
            .with_retry(2)
            .with_retry_delay(Duration::from_millis(10));
        let (client, _handle) = start(config);
        let calls = Arc::new(AtomicUsize::new(0));
        let flaky = {
            let calls = calls.clone();
            producer(move || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(FetchError::msg("flaky"))
                    } else {
                        Ok(9u32)
                    }
                }
            })
        };

        let value = client.fetch::<u32>(QueryKey::new("flaky"), flaky).await.unwrap();
        assert_eq!(*value, 9);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_disabled_query_never_runs() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let observation = client
            .observe(QueryKey::new("product").with(0u32), None, true)
            .await
            .unwrap();
        assert!(matches!(observation.snapshot, Snapshot::Idle));
        assert!(observation.settled.is_none());
        assert_eq!(client.stats().await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_supersedes_in_flight_fetch() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let key = QueryKey::new("product").with(1u32);

        let observation = client
            .observe(key.clone(), Some(gated(calls.clone(), gate.clone(), 1)), true)
            .await
            .unwrap();
        assert_eq!(client.invalidate(QueryKey::new("product")).await.unwrap(), 1);
        assert!(observation.settled.unwrap().wait().await.is_none());

        // The shell survives because it is still observed; the next observe refetches.
        let refetch_calls = Arc::new(AtomicUsize::new(0));
        let refetched = client
            .fetch::<u32>(key, counting(refetch_calls.clone(), 2))
            .await
            .unwrap();
        assert_eq!(*refetched, 2);
        assert_eq!(refetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.stats().await.unwrap().observers, 1);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_reported() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let key = QueryKey::new("products");
        let calls = Arc::new(AtomicUsize::new(0));
        client.fetch::<u32>(key.clone(), counting(calls.clone(), 1)).await.unwrap();

        let err = client
            .fetch::<String>(key, counting(calls, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_released_entry_is_collected_after_gc_time() {
        let config = QueryConfig::for_tests().with_gc_time(Some(Duration::from_secs(60)));
        let (client, _handle) = start(config);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("product").with(3u32);

        let observation = client
            .observe(key.clone(), Some(counting(calls.clone(), 3)), true)
            .await
            .unwrap();
        observation.settled.unwrap().wait().await.unwrap();
        client.release(key.clone()).await.unwrap();
        assert_eq!(client.stats().await.unwrap().entries, 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(client.stats().await.unwrap().entries, 0);

        client.fetch::<u32>(key, counting(calls.clone(), 3)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retain_before_deadline_cancels_collection() {
        let config = QueryConfig::for_tests().with_gc_time(Some(Duration::from_secs(60)));
        let (client, _handle) = start(config);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("products");

        client.fetch::<u32>(key.clone(), counting(calls.clone(), 1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        client.retain(key.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(client.stats().await.unwrap().entries, 1);
        assert_eq!(client.stats().await.unwrap().observers, 1);
    }

    #[tokio::test]
    async fn test_prefetch_then_fetch_calls_producer_once() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("product").with(2u32);

        client.prefetch(key.clone(), counting(calls.clone(), 2)).await.unwrap();
        let value = client
            .fetch::<u32>(key, counting(calls.clone(), 3))
            .await
            .unwrap();

        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_entries_and_next_observe_refetches() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("products");

        client.fetch::<u32>(key.clone(), counting(calls.clone(), 1)).await.unwrap();
        client
            .fetch::<u32>(QueryKey::new("product").with(1u32), counting(calls.clone(), 1))
            .await
            .unwrap();
        client.clear().await.unwrap();
        assert_eq!(client.stats().await.unwrap().entries, 0);

        let observation = client
            .observe(key, Some(counting(calls.clone(), 5)), false)
            .await
            .unwrap();
        assert!(matches!(observation.snapshot, Snapshot::Fetching));
        assert!(matches!(
            observation.settled.unwrap().wait().await,
            Some(Snapshot::Resolved(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_observed_entry_alive() {
        let config = QueryConfig::for_tests().with_gc_time(Some(Duration::from_secs(60)));
        let (client, _handle) = start(config);
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("product").with(1u32);

        let observation = client
            .observe(key.clone(), Some(counting(calls.clone(), 1)), true)
            .await
            .unwrap();
        observation.settled.unwrap().wait().await.unwrap();
        client.clear().await.unwrap();

        let stats = client.stats().await.unwrap();
        assert_eq!((stats.entries, stats.observers), (1, 1));

        // The holder reads again without retaining a second time
        let observation = client
            .observe(key.clone(), Some(counting(calls.clone(), 2)), false)
            .await
            .unwrap();
        observation.settled.unwrap().wait().await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;

        let stats = client.stats().await.unwrap();
        assert_eq!((stats.entries, stats.observers), (1, 1));
        let value = client.fetch::<u32>(key, counting(calls.clone(), 3)).await.unwrap();
        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unobserved_failure_is_not_cached() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let key = QueryKey::new("products");
        let failing = producer(|| async { Err::<u32, _>(FetchError::msg("down")) });

        assert!(client.fetch::<u32>(key.clone(), failing).await.is_err());
        assert_eq!(client.stats().await.unwrap().entries, 0);

        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(*client.fetch::<u32>(key, counting(calls, 4)).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_released_failure_is_refetched_by_next_observer() {
        let (client, _handle) = start(QueryConfig::for_tests());
        let key = QueryKey::new("product").with(1u32);
        let failing = producer(|| async { Err::<u32, _>(FetchError::msg("down")) });

        let observation = client.observe(key.clone(), Some(failing), true).await.unwrap();
        assert!(matches!(
            observation.settled.unwrap().wait().await,
            Some(Snapshot::Failed(_))
        ));
        client.release(key.clone()).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let value = client.fetch::<u32>(key, counting(calls.clone(), 5)).await.unwrap();
        assert_eq!(*value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
