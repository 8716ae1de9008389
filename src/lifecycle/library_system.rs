use crate::clients::ShelfClient;
use crate::config::LibraryConfig;
use crate::fetcher::{BookError, BookFetcher};
use crate::model::BookResource;
use crate::pagination::CollectionActor;
use crate::session::{RequestContext, SessionProbe};
use crate::transport::{HttpTransport, Transport, TransportError};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// The runtime orchestrator for book retrieval.
///
/// `LibrarySystem` is responsible for:
/// - **Dependency Wiring**: one [`BookFetcher`] built from the transport,
///   session probe and request context, shared by every shelf
/// - **Lifecycle Management**: spawning a collection actor per opened shelf
///   and waiting for them on shutdown
///
/// # Example
///
/// ```ignore
/// let mut system = LibrarySystem::from_config(config, session, context)?;
///
/// let book = system.fetch_book("b1").await?;
///
/// let shelf = system.open_shelf(Some("user_1".into()));
/// let snapshot = shelf.load_all().await?;
///
/// drop(shelf);
/// system.shutdown().await?;
/// ```
pub struct LibrarySystem {
    config: Arc<LibraryConfig>,
    fetcher: Arc<BookFetcher>,

    /// Task handles for all running collection actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl LibrarySystem {
    pub fn new(
        config: LibraryConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProbe>,
        context: Arc<dyn RequestContext>,
    ) -> Self {
        let config = Arc::new(config);
        let fetcher = Arc::new(BookFetcher::new(config.clone(), transport, session, context));
        Self {
            config,
            fetcher,
            handles: Vec::new(),
        }
    }

    /// Same as [`LibrarySystem::new`] with a real HTTP transport.
    pub fn from_config(
        config: LibraryConfig,
        session: Arc<dyn SessionProbe>,
        context: Arc<dyn RequestContext>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(config, Arc::new(transport), session, context))
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn fetcher(&self) -> Arc<BookFetcher> {
        self.fetcher.clone()
    }

    pub async fn fetch_book(&self, id: &str) -> Result<Option<BookResource>, BookError> {
        self.fetcher.fetch_book(id).await
    }

    /// Spawns a collection actor for `subject` and returns its client.
    ///
    /// Every shelf has its own state; loads on one never affect another.
    pub fn open_shelf(&mut self, subject: Option<String>) -> ShelfClient {
        let (actor, client) = CollectionActor::new(
            self.config.channel_buffer,
            self.config.page_size,
            self.fetcher.clone(),
            subject,
        );
        self.handles.push(tokio::spawn(actor.run()));
        info!(shelves = self.handles.len(), "Shelf opened");
        ShelfClient::new(client)
    }

    /// Gracefully shuts down every shelf.
    ///
    /// An actor exits once all clients of its shelf are dropped, so drop
    /// every [`ShelfClient`] before awaiting this.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!(shelves = self.handles.len(), "Shutting down library system...");

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Collection actor failed: {:?}", e);
                return Err(e);
            }
        }

        info!("Library system shutdown complete.");
        Ok(())
    }
}
