//! Incremental, de-duplicated collection loading.
//!
//! # Main Components
//!
//! - [`merge`] - pure first-occurrence-wins merge over [`Keyed`] items
//! - [`CollectionState`] - the `Idle`/`Loading` state machine for one subject
//! - [`CollectionActor`] - owns a state, spawns fetches, discards stale pages
//! - [`CollectionClient`] - cloneable handle used by everything else
//! - [`PageSource`] - where pages come from

pub mod actor;
pub mod merge;
pub mod state;

pub use actor::*;
pub use merge::*;
pub use state::*;
