use crate::model::{BookResource, Filters};
use crate::pagination::{CollectionClient, CollectionSnapshot, LoadOutcome, PaginationError};
use crate::projection::{self, FilterOptions};
use tracing::{debug, instrument};

/// A user's bookshelf: one paginated collection of books plus the
/// filter/sort projection presentation reads from it.
#[derive(Clone)]
pub struct ShelfClient {
    inner: CollectionClient<BookResource>,
}

impl ShelfClient {
    pub fn new(inner: CollectionClient<BookResource>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &CollectionClient<BookResource> {
        &self.inner
    }

    #[instrument(skip(self))]
    pub async fn load_next_page(&self) -> Result<LoadOutcome, PaginationError> {
        debug!("Sending request");
        self.inner.load_next_page().await
    }

    /// Switches the shelf to another profile, discarding everything loaded.
    #[instrument(skip(self))]
    pub async fn reset_pagination(&self, subject: Option<String>) -> Result<(), PaginationError> {
        debug!("Sending request");
        self.inner.reset_pagination(subject).await
    }

    pub async fn snapshot(&self) -> Result<CollectionSnapshot<BookResource>, PaginationError> {
        self.inner.snapshot().await
    }

    /// Loads pages until the collection is exhausted or a load fails.
    ///
    /// Stops early if another handle already has a load in flight.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<CollectionSnapshot<BookResource>, PaginationError> {
        let mut pages = 0usize;
        while let LoadOutcome::Loaded { has_more: true, .. } = self.inner.load_next_page().await? {
            pages += 1;
        }
        debug!(pages, "load_all finished");
        self.inner.snapshot().await
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, PaginationError> {
        let snapshot = self.inner.snapshot().await?;
        Ok(projection::filter_options(&snapshot.items))
    }

    pub async fn filtered_and_sorted(&self, filters: &Filters) -> Result<Vec<BookResource>, PaginationError> {
        let snapshot = self.inner.snapshot().await?;
        Ok(projection::filtered_and_sorted(&snapshot.items, filters))
    }
}
