//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! Log levels come from the `RUST_LOG` environment variable. The format is compact and
//! hides the module prefix (`with_target(false)`); spans from `#[instrument]` show inline.
//!
//! ```bash
//! # Cache hits, route mounts and failures
//! RUST_LOG=info cargo run
//!
//! # Every observe/settle with its key
//! RUST_LOG=debug cargo run
//!
//! # Only the cache
//! RUST_LOG=query_framework::cache=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Cache lifecycle**: startup, shutdown, in-flight requests aborted on shutdown
//! - **Fetches**: start, retry with backoff, success, failure, superseded results
//! - **Routes**: mount, suspend, failure, stale settle signals
//!
//! ```text
//! INFO navigate: Route mounted path="/product/1" generation=1
//! INFO Fetch started key=["product",1] generation=1
//! INFO Resolved key=["product",1] generation=1
//! ```

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
