//! # Component Trait
//!
//! The contract every renderable page implements to be mounted by a [`Router`](crate::Router).
//!
//! # Architecture Note
//! A component is evaluated, not run. Each evaluation receives a fresh [`Scope`] and must
//! either produce a [`View`] or stop with an [`Interrupt`]. Hooks return
//! `Result<_, Interrupt>`, so a suspense-style component is written as straight-line code
//! with `?` after each read, and the boundary above it decides what to show.
//!
//! Components hold no per-evaluation state of their own; everything they read comes from
//! the scope (route params, the injected context `C`, and the query cache).

use crate::result::Interrupt;
use crate::scope::Scope;
use crate::view::View;
use async_trait::async_trait;

/// Outcome of one component evaluation.
pub type Render = Result<View, Interrupt>;

#[async_trait]
pub trait Component<C>: Send + Sync {
    async fn render(&self, cx: &mut Scope<'_, C>) -> Render;
}
