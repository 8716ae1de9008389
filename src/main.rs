//! # Shelf Sync demo
//!
//! Fetches one book and loads a whole shelf against a running catalog.
//!
//! - `SHELF_BOOK_ID`: book to fetch (default `1`)
//! - `SHELF_PROFILE_ID`: whose shelf to load (default `demo`)
//! - `SHELF_USER_ID`: when set, the book is fetched as this signed-in user
//! - `SHELF_COOKIES`: cookie header forwarded to the private endpoint
//!
//! All `SHELF_*` settings of [`LibraryConfig`] apply as well.

use shelf_sync::config::LibraryConfig;
use shelf_sync::lifecycle::{setup_tracing, LibrarySystem};
use shelf_sync::session::{StaticRequestContext, StaticSession};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = LibraryConfig::from_env().map_err(|e| e.to_string())?;
    info!(environment = ?config.environment, host = %config.default_host, "Starting shelf sync");

    let book_id = std::env::var("SHELF_BOOK_ID").unwrap_or_else(|_| "1".to_string());
    let profile_id = std::env::var("SHELF_PROFILE_ID").unwrap_or_else(|_| "demo".to_string());
    let session = match std::env::var("SHELF_USER_ID") {
        Ok(user_id) => StaticSession::authenticated(user_id),
        Err(_) => StaticSession::anonymous(),
    };
    let cookies = std::env::var("SHELF_COOKIES").unwrap_or_default();

    let mut system = LibrarySystem::from_config(
        config,
        Arc::new(session),
        Arc::new(StaticRequestContext::new(None, cookies)),
    )
    .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("book_fetch", id = %book_id);
    async {
        match system.fetch_book(&book_id).await {
            Ok(Some(book)) => info!(title = %book.title, author = ?book.author_name(), "Book fetched"),
            Ok(None) => warn!("Book not found"),
            Err(e) => error!(error = %e, "Book fetch failed"),
        }
    }
    .instrument(span)
    .await;

    let shelf = system.open_shelf(Some(profile_id.clone()));
    let span = tracing::info_span!("shelf_load", subject = %profile_id);
    let snapshot = shelf.load_all().instrument(span).await.map_err(|e| e.to_string())?;

    match &snapshot.last_error {
        Some(e) => error!(error = %e, loaded = snapshot.items.len(), "Shelf load stopped early"),
        None => info!(loaded = snapshot.items.len(), pages = snapshot.cursor, "Shelf loaded"),
    }

    let options = shelf.filter_options().await.map_err(|e| e.to_string())?;
    info!(
        statuses = ?options.statuses,
        authors = options.authors.len(),
        series = options.series.len(),
        "Filter options"
    );

    drop(shelf);
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
