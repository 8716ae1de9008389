//! # Collection Actor
//!
//! Owns one [`CollectionState`] and serialises every operation on it.
//!
//! The actor never awaits a fetch inside its loop. A legal
//! `LoadNextPage` flips the state to `Loading`, spawns the fetch and parks the
//! caller's responder. The spawned task posts a completion back on an
//! internal channel; the actor settles the state and only then answers the
//! parked caller. A `LoadNextPage` arriving meanwhile is answered at once with
//! [`LoadOutcome::Skipped`], so duplicate loads are dropped rather than queued.

use super::merge::Keyed;
use super::state::{CollectionSnapshot, CollectionState, LoadOutcome, PageTicket};
use crate::model::Page;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Boxed error from a [`PageSource`]. Only its message is kept.
pub type PageError = Box<dyn std::error::Error + Send + Sync>;

/// Where pages come from.
#[async_trait]
pub trait PageSource<T>: Send + Sync + 'static {
    /// Fetches zero-based page `page` of `subject`'s collection.
    async fn fetch_page(&self, subject: &str, page: usize, size: usize) -> Result<Page<T>, PageError>;
}

/// Errors of the actor plumbing itself.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PaginationError {
    #[error("Collection actor closed")]
    ActorClosed,
    #[error("Collection actor dropped response channel")]
    ActorDropped,
}

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<T>;

/// Messages accepted by [`CollectionActor`].
#[derive(Debug)]
pub enum CollectionRequest<T> {
    LoadNextPage {
        respond_to: Response<LoadOutcome>,
    },
    Reset {
        subject: Option<String>,
        respond_to: Response<()>,
    },
    Snapshot {
        respond_to: Response<CollectionSnapshot<T>>,
    },
}

struct PageCompletion<T> {
    ticket: PageTicket,
    result: Result<Page<T>, String>,
}

pub struct CollectionActor<T> {
    receiver: mpsc::Receiver<CollectionRequest<T>>,
    completion_tx: mpsc::UnboundedSender<PageCompletion<T>>,
    completion_rx: mpsc::UnboundedReceiver<PageCompletion<T>>,
    state: CollectionState<T>,
    source: Arc<dyn PageSource<T>>,
    page_size: usize,
    /// Responder of the load currently in flight. `Some` exactly while loading.
    pending: Option<Response<LoadOutcome>>,
}

impl<T: Keyed + Clone + Send + Sync + 'static> CollectionActor<T> {
    pub fn new(
        buffer_size: usize,
        page_size: usize,
        source: Arc<dyn PageSource<T>>,
        subject: Option<String>,
    ) -> (Self, CollectionClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            completion_tx,
            completion_rx,
            state: CollectionState::new(subject),
            source,
            page_size,
            pending: None,
        };
        (actor, CollectionClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(subject = ?self.state.subject(), page_size = self.page_size, "Collection actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                Some(completion) = self.completion_rx.recv() => self.settle(completion),
            }
        }

        info!(subject = ?self.state.subject(), size = self.state.items().len(), "Shutdown");
    }

    fn handle(&mut self, request: CollectionRequest<T>) {
        match request {
            CollectionRequest::LoadNextPage { respond_to } => match self.state.begin_load() {
                Ok(ticket) => {
                    debug!(subject = %ticket.subject, page = ticket.page, "Loading page");
                    self.pending = Some(respond_to);
                    self.spawn_fetch(ticket);
                }
                Err(reason) => {
                    debug!(subject = ?self.state.subject(), ?reason, "Load skipped");
                    let _ = respond_to.send(LoadOutcome::Skipped(reason));
                }
            },
            CollectionRequest::Reset { subject, respond_to } => {
                if let Some(parked) = self.pending.take() {
                    let _ = parked.send(LoadOutcome::Superseded);
                }
                info!(from = ?self.state.subject(), to = ?subject, "Reset");
                self.state.reset(subject);
                let _ = respond_to.send(());
            }
            CollectionRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(self.state.snapshot());
            }
        }
    }

    fn spawn_fetch(&self, ticket: PageTicket) {
        let source = self.source.clone();
        let completion_tx = self.completion_tx.clone();
        let page_size = self.page_size;

        tokio::spawn(async move {
            let subject = ticket.subject.clone();
            let page = ticket.page;
            // Inner task so a panicking source still releases the guard.
            let fetch = tokio::spawn(async move {
                source
                    .fetch_page(&subject, page, page_size)
                    .await
                    .map_err(|e| e.to_string())
            });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => Err(format!("Page fetch aborted: {}", e)),
            };
            let _ = completion_tx.send(PageCompletion { ticket, result });
        });
    }

    fn settle(&mut self, completion: PageCompletion<T>) {
        let PageCompletion { ticket, result } = completion;
        let outcome = self.state.settle(&ticket, result);

        match &outcome {
            LoadOutcome::Superseded => {
                debug!(subject = %ticket.subject, page = ticket.page, "Discarding stale page");
                return;
            }
            LoadOutcome::Loaded { added, has_more } => {
                info!(
                    subject = %ticket.subject,
                    page = ticket.page,
                    added,
                    has_more,
                    size = self.state.items().len(),
                    "Page merged"
                );
            }
            LoadOutcome::Exhausted => {
                info!(subject = %ticket.subject, page = ticket.page, "Collection exhausted");
            }
            LoadOutcome::Failed(error) => {
                warn!(subject = %ticket.subject, page = ticket.page, %error, "Page load failed");
            }
            LoadOutcome::Skipped(_) => {}
        }

        if let Some(parked) = self.pending.take() {
            let _ = parked.send(outcome);
        }
    }
}

/// Handle for talking to a [`CollectionActor`].
pub struct CollectionClient<T> {
    sender: mpsc::Sender<CollectionRequest<T>>,
}

impl<T> Clone for CollectionClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> CollectionClient<T> {
    pub fn new(sender: mpsc::Sender<CollectionRequest<T>>) -> Self {
        Self { sender }
    }

    /// Loads the next page, resolving once the state has settled.
    ///
    /// Never surfaces fetch failures; see [`LoadOutcome`].
    pub async fn load_next_page(&self) -> Result<LoadOutcome, PaginationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CollectionRequest::LoadNextPage { respond_to })
            .await
            .map_err(|_| PaginationError::ActorClosed)?;
        response.await.map_err(|_| PaginationError::ActorDropped)
    }

    /// Clears the collection and points it at `subject`.
    pub async fn reset_pagination(&self, subject: Option<String>) -> Result<(), PaginationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CollectionRequest::Reset { subject, respond_to })
            .await
            .map_err(|_| PaginationError::ActorClosed)?;
        response.await.map_err(|_| PaginationError::ActorDropped)
    }

    pub async fn snapshot(&self) -> Result<CollectionSnapshot<T>, PaginationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CollectionRequest::Snapshot { respond_to })
            .await
            .map_err(|_| PaginationError::ActorClosed)?;
        response.await.map_err(|_| PaginationError::ActorDropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookResource;
    use crate::pagination::SkipReason;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Serves `total` numbered books; each fetch waits for `gate` when set.
    struct CountingSource {
        total: usize,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl PageSource<BookResource> for CountingSource {
        async fn fetch_page(&self, _subject: &str, page: usize, size: usize) -> Result<Page<BookResource>, PageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let start = (page * size).min(self.total);
            let end = ((page + 1) * size).min(self.total);
            let items = (start..end)
                .map(|n| BookResource::new(format!("book_{}", n), format!("Book {}", n)))
                .collect();
            Ok(Page::new(items, end < self.total))
        }
    }

    fn spawn_actor(source: Arc<CountingSource>, page_size: usize) -> CollectionClient<BookResource> {
        let (actor, client) = CollectionActor::new(8, page_size, source, Some("user_1".into()));
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_collection_actor_pages_until_exhausted() {
        let source = Arc::new(CountingSource {
            total: 5,
            calls: AtomicUsize::new(0),
            gate: None,
        });
        let client = spawn_actor(source.clone(), 2);

        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(client.load_next_page().await.unwrap());
        }

        assert_eq!(
            outcomes,
            vec![
                LoadOutcome::Loaded { added: 2, has_more: true },
                LoadOutcome::Loaded { added: 2, has_more: true },
                LoadOutcome::Loaded { added: 1, has_more: false },
                LoadOutcome::Skipped(SkipReason::Exhausted),
            ]
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        let snap = client.snapshot().await.unwrap();
        assert_eq!(snap.items.len(), 5);
        assert_eq!(snap.cursor, 3);
        assert!(!snap.has_more);
    }

    #[tokio::test]
    async fn test_reset_answers_parked_load_with_superseded() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(CountingSource {
            total: 10,
            calls: AtomicUsize::new(0),
            gate: Some(gate.clone()),
        });
        let client = spawn_actor(source, 5);

        let loader = {
            let client = client.clone();
            tokio::spawn(async move { client.load_next_page().await })
        };
        // Wait until the load is parked in the actor
        while !client.snapshot().await.unwrap().is_loading {
            tokio::task::yield_now().await;
        }

        client.reset_pagination(Some("user_2".into())).await.unwrap();
        assert_eq!(loader.await.unwrap().unwrap(), LoadOutcome::Superseded);

        // Let the stale fetch finish; its page must not land in user_2's state
        gate.notify_one();
        tokio::task::yield_now().await;
        let snap = client.snapshot().await.unwrap();
        assert_eq!(snap.subject.as_deref(), Some("user_2"));
        assert!(snap.items.is_empty());
        assert!(!snap.is_loading);
    }
}
