//! # Cache Messages
//!
//! The request types exchanged between [`QueryClient`](crate::QueryClient) and the
//! [`QueryCache`](crate::QueryCache) actor, plus the producer and observation types that
//! travel inside them.

use crate::error::FetchError;
use crate::key::QueryKey;
use crate::result::CachedValue;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Future returned by a [`Producer`].
pub type ProducerFuture = Pin<Box<dyn Future<Output = Result<CachedValue, FetchError>> + Send>>;

/// The asynchronous function that fills a cache entry.
///
/// It is `Fn` rather than `FnOnce` so the cache can call it again on retry.
pub type Producer = Arc<dyn Fn() -> ProducerFuture + Send + Sync>;

/// Builds a [`Producer`] from a typed async closure.
pub fn producer<T, F, Fut>(f: F) -> Producer
where
    T: Any + Send + Sync,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = f();
        Box::pin(async move { fut.await.map(|value| Arc::new(value) as CachedValue) })
    })
}

/// The state of a key at the moment it was observed.
#[derive(Clone)]
pub enum Snapshot {
    /// No data and no request in flight (disabled query).
    Idle,
    Fetching,
    Resolved(CachedValue),
    Failed(FetchError),
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Fetching => f.write_str("Fetching"),
            Self::Resolved(_) => f.write_str("Resolved(..)"),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Signal that fires once an in-flight key settles.
///
/// Resolves to `None` when the fetch was superseded (invalidated or torn down) before it
/// produced a result.
#[derive(Debug)]
pub struct Settled {
    receiver: oneshot::Receiver<Snapshot>,
}

impl Settled {
    pub(crate) fn new(receiver: oneshot::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    pub async fn wait(self) -> Option<Snapshot> {
        self.receiver.await.ok()
    }
}

/// Reply to an observe request.
#[derive(Debug)]
pub struct Observation {
    pub snapshot: Snapshot,
    /// Present while the key is fetching.
    pub settled: Option<Settled>,
}

/// Counters reported by [`QueryClient::stats`](crate::QueryClient::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    pub observers: usize,
}

/// Requests accepted by the cache actor.
pub enum CacheRequest {
    Observe {
        key: QueryKey,
        producer: Option<Producer>,
        retain: bool,
        respond_to: oneshot::Sender<Observation>,
    },
    Release {
        key: QueryKey,
    },
    Retain {
        key: QueryKey,
    },
    Invalidate {
        prefix: QueryKey,
        respond_to: oneshot::Sender<usize>,
    },
    Clear {
        respond_to: oneshot::Sender<()>,
    },
    Stats {
        respond_to: oneshot::Sender<CacheStats>,
    },
}

/// Messages the actor sends to itself from spawned fetch and timer tasks.
pub(crate) enum Internal {
    Settle {
        key: QueryKey,
        generation: u64,
        result: Result<CachedValue, FetchError>,
    },
    Collect {
        key: QueryKey,
        epoch: u64,
    },
}
