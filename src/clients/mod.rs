//! Type-safe wrappers around [`CollectionClient`](crate::pagination::CollectionClient).

pub mod shelf_client;

pub use shelf_client::*;
