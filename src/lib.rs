//! # Shelf Sync
//!
//! > **Resilient book retrieval and incremental collection loading for a reading tracker.**
//!
//! This crate fetches single books with identity-aware routing and pages
//! through a user's collection one page at a time, merging pages into a
//! de-duplicated list that presentation can filter and sort.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why an actor per shelf?
//!
//! A collection is mutable state shared by everything that displays it.
//! Owning it inside one Tokio task gives:
//! - **No Locks**: requests are processed sequentially, so the
//!   "only one load at a time" guard is a plain field check.
//! - **Stale-Page Safety**: every reset bumps a generation; pages fetched
//!   for an older generation are discarded when they land.
//! - **Cheap Reads**: snapshots share the item list through an `Arc`.
//!
//! ## 🚀 Core Concepts
//!
//! ### Fallback, not failure
//! Signed-in callers read from the private endpoint. When it answers with a
//! server error the fetcher retries once against the public endpoint before
//! giving up. Client errors are final. See [`fetcher`].
//!
//! ### "Not found" is a value
//! The catalog marks unknown books with a `404` status inside a *successful*
//! payload. [`BookFetcher::fetch_book`](fetcher::BookFetcher::fetch_book)
//! turns that into `Ok(None)`; every other failure stays an error.
//!
//! ### Loads report, never raise
//! [`load_next_page`](clients::ShelfClient::load_next_page) resolves with a
//! [`LoadOutcome`](pagination::LoadOutcome) describing what happened. Failed
//! pages are recorded in the snapshot and halt pagination until a reset.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`pagination`])
//! - **Role**: the generic collection actor, its state machine and the merge.
//! - **Key items**: [`CollectionActor`](pagination::CollectionActor),
//!   [`CollectionState`](pagination::CollectionState), [`merge`](pagination::merge()).
//!
//! ### 2. The Fetcher ([`fetcher`], [`transport`], [`session`])
//! - **Role**: builds URLs from the request context, picks the endpoint from
//!   the session, decodes payloads.
//! - **Key items**: [`BookFetcher`](fetcher::BookFetcher),
//!   [`Transport`](transport::Transport), [`MockTransport`](transport::mock::MockTransport).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Role**: wires one fetcher to any number of shelves and shuts them down.
//! - **Key items**: [`LibrarySystem`](lifecycle::LibrarySystem),
//!   [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 4. The Interface ([`clients`], [`projection`])
//! - **Role**: the typed shelf handle and the pure filter/sort projection.
//! - **Key items**: [`ShelfClient`](clients::ShelfClient),
//!   [`filtered_and_sorted`](projection::filtered_and_sorted).
//!
//! ### 5. Plumbing ([`config`], [`model`])
//! - **Role**: `SHELF_*` settings and the plain data types.
//!
//! ## 🚀 Quick Start
//!
//! ### Running the Demo
//!
//! ```bash
//! SHELF_ENV=development SHELF_PROFILE_ID=user_1 RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod fetcher;
pub mod lifecycle;
pub mod model;
pub mod pagination;
pub mod projection;
pub mod session;
pub mod transport;
