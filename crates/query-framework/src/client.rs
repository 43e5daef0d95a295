//! # Query Client
//!
//! The cloneable handle used to talk to a [`QueryCache`](crate::QueryCache).

use crate::error::QueryError;
use crate::key::QueryKey;
use crate::message::{CacheRequest, CacheStats, Observation, Producer, Snapshot};
use crate::result::CachedValue;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A type-safe client for the shared query cache.
///
/// Holds only a sender, so cloning is cheap. The cache stays alive as long as at least
/// one clone exists.
#[derive(Clone)]
pub struct QueryClient {
    sender: mpsc::Sender<CacheRequest>,
}

impl QueryClient {
    pub(crate) fn new(sender: mpsc::Sender<CacheRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> CacheRequest,
    ) -> Result<T, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| QueryError::CacheClosed)?;
        response.await.map_err(|_| QueryError::CacheDropped)
    }

    /// Reads the current state of `key`, starting `producer` if nothing is cached or in
    /// flight. Passing `None` as the producer never starts a request.
    ///
    /// With `retain` set, the caller becomes an observer of the entry and must later call
    /// [`release`](Self::release).
    #[instrument(level = "debug", skip(self, producer))]
    pub async fn observe(
        &self,
        key: QueryKey,
        producer: Option<Producer>,
        retain: bool,
    ) -> Result<Observation, QueryError> {
        self.request(|respond_to| CacheRequest::Observe {
            key,
            producer,
            retain,
            respond_to,
        })
        .await
    }

    /// Resolves `key` to a value, awaiting an in-flight or newly started fetch.
    ///
    /// A resolved entry is returned as-is without calling `producer`.
    #[instrument(level = "debug", skip(self, producer))]
    pub async fn fetch<T>(&self, key: QueryKey, producer: Producer) -> Result<Arc<T>, QueryError>
    where
        T: Any + Send + Sync,
    {
        loop {
            let observation = self
                .observe(key.clone(), Some(producer.clone()), false)
                .await?;
            let snapshot = match observation.settled {
                Some(settled) => match settled.wait().await {
                    Some(snapshot) => snapshot,
                    None => {
                        debug!("Fetch superseded, observing again");
                        continue;
                    }
                },
                None => observation.snapshot,
            };
            return match snapshot {
                Snapshot::Resolved(value) => downcast(&key, value),
                Snapshot::Failed(error) => Err(QueryError::Fetch(error)),
                Snapshot::Idle | Snapshot::Fetching => {
                    debug!("Entry reset before settling, observing again");
                    continue;
                }
            };
        }
    }

    /// Starts fetching `key` without waiting for it.
    pub async fn prefetch(&self, key: QueryKey, producer: Producer) -> Result<(), QueryError> {
        self.observe(key, Some(producer), false).await.map(|_| ())
    }

    pub async fn retain(&self, key: QueryKey) -> Result<(), QueryError> {
        self.sender
            .send(CacheRequest::Retain { key })
            .await
            .map_err(|_| QueryError::CacheClosed)
    }

    pub async fn release(&self, key: QueryKey) -> Result<(), QueryError> {
        self.sender
            .send(CacheRequest::Release { key })
            .await
            .map_err(|_| QueryError::CacheClosed)
    }

    /// Invalidates every entry under `prefix`, returning how many were affected.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, prefix: QueryKey) -> Result<usize, QueryError> {
        self.request(|respond_to| CacheRequest::Invalidate { prefix, respond_to })
            .await
    }

    /// Drops every entry.
    pub async fn clear(&self) -> Result<(), QueryError> {
        self.request(|respond_to| CacheRequest::Clear { respond_to })
            .await
    }

    pub async fn stats(&self) -> Result<CacheStats, QueryError> {
        self.request(|respond_to| CacheRequest::Stats { respond_to })
            .await
    }
}

pub(crate) fn downcast<T>(key: &QueryKey, value: CachedValue) -> Result<Arc<T>, QueryError>
where
    T: Any + Send + Sync,
{
    value
        .downcast::<T>()
        .map_err(|_| QueryError::TypeMismatch(key.clone()))
}
