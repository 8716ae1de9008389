//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//! The compact format hides module paths; events carry `subject`, `page`,
//! `id` and `status` fields instead.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: collection actor startup, resets and shutdown
//! - **Pagination**: pages merged (with `added`/`size`), exhaustion, skipped loads
//! - **Fetching**: requests sent, private failures, public fallbacks
//! - **Errors**: failed pages and fetches with their HTTP status
//!
//! ## Usage Examples
//!
//! ```bash
//! # Page-level progress
//! RUST_LOG=info cargo run
//!
//! # Every request and skipped load
//! RUST_LOG=debug cargo run
//!
//! # Only the fetcher
//! RUST_LOG=shelf_sync::fetcher=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Collection actor started subject=Some("user_1") page_size=50
//! INFO Page merged subject=user_1 page=0 added=50 has_more=true size=50
//! INFO Page merged subject=user_1 page=1 added=50 has_more=true size=100
//! INFO Page merged subject=user_1 page=2 added=20 has_more=false size=120
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
