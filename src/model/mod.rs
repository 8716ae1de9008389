//! Plain data carried through the retrieval layer.
//!
//! - [`BookResource`]: one catalog entity, opaque apart from its `id`.
//! - [`Page`]: one transient result of a collection fetch.
//! - [`Filters`]: the presentation's filter and sort configuration.

pub mod book;
pub mod filters;
pub mod page;

pub use book::*;
pub use filters::*;
pub use page::*;
