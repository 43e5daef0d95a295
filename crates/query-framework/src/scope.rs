//! # Render Scope
//!
//! A [`Scope`] is handed to a component for exactly one evaluation. Hooks read queries
//! through it; the scope records which keys were read (so the router can hold them in
//! the cache) and which of them were still in flight (so the router knows when to
//! evaluate the component again).

use crate::client::{downcast, QueryClient};
use crate::error::FetchError;
use crate::key::QueryKey;
use crate::message::{Producer, Settled, Snapshot};
use crate::result::{FetchResult, Interrupt, QueryState};
use crate::route::RouteParams;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-evaluation context for a component.
///
/// `C` is the application context injected by the router (service handles and the like).
pub struct Scope<'a, C> {
    client: &'a QueryClient,
    params: &'a RouteParams,
    context: &'a C,
    retained: &'a HashSet<QueryKey>,
    dependencies: Vec<QueryKey>,
    pending: Vec<Settled>,
}

impl<'a, C> Scope<'a, C> {
    /// A scope that retains every key it reads that is not already in `retained`.
    pub fn new(
        client: &'a QueryClient,
        params: &'a RouteParams,
        context: &'a C,
        retained: &'a HashSet<QueryKey>,
    ) -> Self {
        Self {
            client,
            params,
            context,
            retained,
            dependencies: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn context(&self) -> &C {
        self.context
    }

    /// Manual convention: never interrupts, reports loading and error as fields.
    ///
    /// With `enabled` false the producer is not invoked and no request is issued.
    pub async fn use_query<T>(&mut self, key: QueryKey, producer: Producer, enabled: bool) -> QueryState<T>
    where
        T: Any + Send + Sync,
    {
        let (result, fetching) = self.read::<T>(&key, enabled.then_some(producer)).await;
        result.into_state(fetching)
    }

    /// Suspense convention: returns the data or interrupts the component.
    pub async fn use_suspense_query<T>(
        &mut self,
        key: QueryKey,
        producer: Producer,
    ) -> Result<Arc<T>, Interrupt>
    where
        T: Any + Send + Sync,
    {
        let (result, _) = self.read::<T>(&key, Some(producer)).await;
        result.suspend(&key)
    }

    /// Keys read during this evaluation and the settle signals of those still in flight.
    pub fn into_parts(self) -> (Vec<QueryKey>, Vec<Settled>) {
        (self.dependencies, self.pending)
    }

    async fn read<T>(&mut self, key: &QueryKey, producer: Option<Producer>) -> (FetchResult<T>, bool)
    where
        T: Any + Send + Sync,
    {
        let enabled = producer.is_some();
        let retain =
            enabled && !self.retained.contains(key) && !self.dependencies.contains(key);

        let observation = match self.client.observe(key.clone(), producer, retain).await {
            Ok(observation) => observation,
            Err(error) => return (FetchResult::Error(FetchError::new(error)), false),
        };
        if enabled && !self.dependencies.contains(key) {
            self.dependencies.push(key.clone());
        }

        match observation.snapshot {
            Snapshot::Idle => (FetchResult::Pending, false),
            Snapshot::Fetching => {
                if let Some(settled) = observation.settled {
                    self.pending.push(settled);
                }
                (FetchResult::Pending, true)
            }
            Snapshot::Resolved(value) => match downcast::<T>(key, value) {
                Ok(data) => (FetchResult::Success(data), false),
                Err(error) => (FetchResult::Error(FetchError::new(error)), false),
            },
            Snapshot::Failed(error) => (FetchResult::Error(error), false),
        }
    }
}
