//! Runtime orchestration: wiring the fetcher to per-shelf actors, and
//! observability setup.
//!
//! # Main Components
//!
//! - [`LibrarySystem`] - owns the fetcher and the collection actors it spawns
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod library_system;
pub mod tracing;

pub use library_system::*;
pub use self::tracing::*;
