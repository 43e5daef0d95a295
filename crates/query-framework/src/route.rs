//! # Routes & Boundaries
//!
//! A [`Router`] mounts one [`Route`] at a time and acts as its boundary: it evaluates the
//! route's component, shows the pending renderer while any read is still in flight, the
//! error renderer when a read failed, and the component's own view once everything is
//! ready.
//!
//! # Boundary State Machine
//!
//! ```text
//!            navigate
//!               │
//!               ▼
//!   ┌──────── Pending ────────┐
//!   │ all reads ready         │ a read failed
//!   ▼                         ▼
//! Resolved                  Failed
//! ```
//!
//! Each transition out of `Pending` happens on [`Router::settle`], which waits for the
//! next in-flight read of the current evaluation to finish and evaluates the component
//! again. Navigating away bumps a generation counter; signals from the previous
//! activation are ignored.
//!
//! # Cache Ownership
//! While a route is mounted the router holds every key its component read, so the data
//! survives between evaluations. Keys the component stops reading are released on the
//! next evaluation, and all keys are released when navigating away.

use crate::client::QueryClient;
use crate::component::Component;
use crate::error::{FetchError, RouteError};
use crate::key::QueryKey;
use crate::message::Settled;
use crate::result::Interrupt;
use crate::scope::Scope;
use crate::view::View;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Named parameters captured from a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path pattern such as `/products/$productId`.
///
/// Segments starting with `$` capture one path segment under that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty())
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment.strip_prefix('$') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the captured params when `path` matches this pattern.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = RouteParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.as_str(), part),
            }
        }
        Some(params)
    }
}

pub type PendingRenderer = Box<dyn Fn() -> View + Send + Sync>;
pub type ErrorRenderer = Box<dyn Fn(&FetchError) -> View + Send + Sync>;

fn default_pending() -> View {
    View::new().spinner("Loading...")
}

fn default_error(error: &FetchError) -> View {
    View::new().alert(format!("Error: {error}"))
}

/// A path pattern bound to a component and its boundary renderers.
pub struct Route<C> {
    pattern: RoutePattern,
    component: Box<dyn Component<C>>,
    pending_component: PendingRenderer,
    error_component: ErrorRenderer,
}

impl<C> Route<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(pattern: &str, component: impl Component<C> + 'static) -> Self {
        Self {
            pattern: RoutePattern::parse(pattern),
            component: Box::new(component),
            pending_component: Box::new(default_pending),
            error_component: Box::new(default_error),
        }
    }

    /// Renderer shown while any read of the component is in flight.
    #[must_use]
    pub fn pending_component(mut self, render: impl Fn() -> View + Send + Sync + 'static) -> Self {
        self.pending_component = Box::new(render);
        self
    }

    /// Renderer shown when a read failed; receives the failure unchanged.
    #[must_use]
    pub fn error_component(
        mut self,
        render: impl Fn(&FetchError) -> View + Send + Sync + 'static,
    ) -> Self {
        self.error_component = Box::new(render);
        self
    }
}

/// What the boundary of the active route is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryState {
    Pending(View),
    Resolved(View),
    Failed { error: FetchError, view: View },
}

impl BoundaryState {
    pub fn view(&self) -> &View {
        match self {
            Self::Pending(view) | Self::Resolved(view) | Self::Failed { view, .. } => view,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

struct Activation {
    route: usize,
    path: String,
    params: RouteParams,
    generation: u64,
}

/// Mounts routes against a shared [`QueryClient`] and context `C`.
pub struct Router<C> {
    client: QueryClient,
    context: Arc<C>,
    routes: Vec<Route<C>>,
    active: Option<Activation>,
    generation: u64,
    retained: HashSet<QueryKey>,
    subscriptions: JoinSet<u64>,
    current: Option<BoundaryState>,
}

impl<C> Router<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(client: QueryClient, context: Arc<C>) -> Self {
        Self {
            client,
            context,
            routes: Vec::new(),
            active: None,
            generation: 0,
            retained: HashSet::new(),
            subscriptions: JoinSet::new(),
            current: None,
        }
    }

    /// Registers a route. The first registered pattern that matches a path wins.
    #[must_use]
    pub fn route(mut self, route: Route<C>) -> Self {
        self.routes.push(route);
        self
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// The state produced by the latest evaluation, if a route is mounted.
    pub fn current(&self) -> Option<&BoundaryState> {
        self.current.as_ref()
    }

    pub fn path(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.path.as_str())
    }

    /// Keys currently held in the cache on behalf of the mounted route.
    pub fn retained(&self) -> impl Iterator<Item = &QueryKey> {
        self.retained.iter()
    }

    /// `true` when no read of the latest evaluation is still in flight.
    pub fn is_settled(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Mounts the route matching `path` and evaluates it once.
    ///
    /// Any previously mounted route is torn down first: its keys are released and its
    /// pending signals are dropped.
    #[instrument(skip(self))]
    pub async fn navigate(&mut self, path: &str) -> Result<BoundaryState, RouteError> {
        let (route, params) = self
            .routes
            .iter()
            .enumerate()
            .find_map(|(index, route)| route.pattern.matches(path).map(|params| (index, params)))
            .ok_or_else(|| RouteError::NotFound(path.to_string()))?;

        self.unmount().await;
        self.generation += 1;
        let pattern = self.routes[route].pattern.as_str();
        info!(generation = self.generation, pattern, "Route mounted");
        self.active = Some(Activation {
            route,
            path: path.to_string(),
            params,
            generation: self.generation,
        });
        self.render().await
    }

    /// Evaluates the mounted route's component once and updates the boundary.
    pub async fn render(&mut self) -> Result<BoundaryState, RouteError> {
        let active = self.active.as_ref().ok_or(RouteError::NoActiveRoute)?;
        let route = self
            .routes
            .get(active.route)
            .ok_or(RouteError::NoActiveRoute)?;
        let generation = active.generation;

        let mut cx = Scope::new(
            &self.client,
            &active.params,
            self.context.as_ref(),
            &self.retained,
        );
        let outcome = route.component.render(&mut cx).await;
        let (dependencies, pending) = cx.into_parts();

        let state = match outcome {
            Ok(view) => BoundaryState::Resolved(view),
            Err(Interrupt::Suspend(key)) => {
                debug!(%key, "Route suspended");
                BoundaryState::Pending((route.pending_component)())
            }
            Err(Interrupt::Fail(error)) => {
                warn!(%error, "Route failed");
                let view = (route.error_component)(&error);
                BoundaryState::Failed { error, view }
            }
        };

        self.track(dependencies).await;
        self.subscribe(generation, pending);
        self.current = Some(state.clone());
        Ok(state)
    }

    /// Waits for the next in-flight read of the current evaluation to finish, then
    /// evaluates again.
    ///
    /// Returns `Ok(None)` when nothing is in flight.
    pub async fn settle(&mut self) -> Result<Option<BoundaryState>, RouteError> {
        while let Some(joined) = self.subscriptions.join_next().await {
            let current = self.active.as_ref().map(|active| active.generation);
            match joined {
                Ok(generation) if Some(generation) == current => {
                    return self.render().await.map(Some);
                }
                Ok(generation) => debug!(generation, "Ignoring signal from previous route"),
                Err(error) => warn!(%error, "Settle watcher failed"),
            }
        }
        Ok(None)
    }

    /// Settles until the boundary leaves `Pending` or nothing is left in flight.
    ///
    /// Returns the last state reached when `timeout` elapses first.
    pub async fn render_until_settled(
        &mut self,
        timeout: Duration,
    ) -> Result<BoundaryState, RouteError> {
        let deadline = Instant::now() + timeout;
        loop {
            let state = self.current.clone().ok_or(RouteError::NoActiveRoute)?;
            if !state.is_pending() && self.is_settled() {
                return Ok(state);
            }
            match tokio::time::timeout_at(deadline, self.settle()).await {
                Ok(Ok(Some(_))) => {}
                Ok(Ok(None)) => return self.current.clone().ok_or(RouteError::NoActiveRoute),
                Ok(Err(error)) => return Err(error),
                Err(_) => {
                    warn!(?timeout, "Route did not settle in time");
                    return Ok(state);
                }
            }
        }
    }

    /// Tears down the mounted route, releasing every key it held.
    pub async fn unmount(&mut self) {
        self.subscriptions = JoinSet::new();
        self.active = None;
        self.current = None;
        for key in std::mem::take(&mut self.retained) {
            if let Err(error) = self.client.release(key).await {
                warn!(%error, "Failed to release query");
            }
        }
    }

    async fn track(&mut self, dependencies: Vec<QueryKey>) {
        let next: HashSet<QueryKey> = dependencies.into_iter().collect();
        for key in self.retained.difference(&next) {
            debug!(%key, "Query no longer read");
            if let Err(error) = self.client.release(key.clone()).await {
                warn!(%error, "Failed to release query");
            }
        }
        self.retained = next;
    }

    fn subscribe(&mut self, generation: u64, pending: Vec<Settled>) {
        self.subscriptions = JoinSet::new();
        for settled in pending {
            self.subscriptions.spawn(async move {
                settled.wait().await;
                generation
            });
        }
    }
}
