//! The per-subject pagination state machine.
//!
//! [`CollectionState`] is plain data plus transitions. It never performs I/O:
//! the actor asks it for a [`PageTicket`] before fetching and hands the
//! result back through [`CollectionState::settle`].
//!
//! ```text
//!            begin_load (guards pass)
//!   Idle ───────────────────────────────▶ Loading
//!    ▲                                       │
//!    └────────── settle (any result) ◀───────┘
//! ```
//!
//! Every [`reset`](CollectionState::reset) bumps a generation counter.
//! Tickets carry the generation and subject they were issued for, so a page
//! that lands after a reset is recognised as stale and discarded.

use super::merge::{merge, Keyed};
use crate::model::Page;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
}

/// Why a load request was dropped without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSubject,
    InFlight,
    Exhausted,
}

/// How a `load_next_page` call ended. Errors are reported here, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A non-empty page was merged.
    Loaded { added: usize, has_more: bool },
    /// The page came back empty; pagination is finished.
    Exhausted,
    /// The fetch failed; pagination stops until the next reset.
    Failed(String),
    /// Nothing was requested.
    Skipped(SkipReason),
    /// The collection was reset while this load was in flight.
    Superseded,
}

/// Permission to fetch one page, tagged with the state it was issued from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub subject: String,
    pub generation: u64,
    pub page: usize,
}

/// Read-only view handed to presentation.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<T> {
    pub subject: Option<String>,
    pub items: Arc<Vec<T>>,
    pub cursor: usize,
    pub is_loading: bool,
    pub has_more: bool,
    pub last_error: Option<String>,
}

#[derive(Debug)]
pub struct CollectionState<T> {
    subject: Option<String>,
    generation: u64,
    items: Arc<Vec<T>>,
    cursor: usize,
    phase: LoadPhase,
    has_more: bool,
    last_error: Option<String>,
}

impl<T: Keyed + Clone> CollectionState<T> {
    pub fn new(subject: Option<String>) -> Self {
        Self {
            subject: subject.filter(|s| !s.is_empty()),
            generation: 0,
            items: Arc::new(Vec::new()),
            cursor: 0,
            phase: LoadPhase::Idle,
            has_more: true,
            last_error: None,
        }
    }

    /// Starts over for `subject`: no items, cursor 0, more to load, idle.
    pub fn reset(&mut self, subject: Option<String>) {
        self.generation += 1;
        self.subject = subject.filter(|s| !s.is_empty());
        self.items = Arc::new(Vec::new());
        self.cursor = 0;
        self.phase = LoadPhase::Idle;
        self.has_more = true;
        self.last_error = None;
    }

    /// Moves `Idle -> Loading` if a fetch is allowed right now.
    pub fn begin_load(&mut self) -> Result<PageTicket, SkipReason> {
        let subject = self.subject.clone().ok_or(SkipReason::NoSubject)?;
        if self.phase == LoadPhase::Loading {
            return Err(SkipReason::InFlight);
        }
        if !self.has_more {
            return Err(SkipReason::Exhausted);
        }

        self.phase = LoadPhase::Loading;
        Ok(PageTicket {
            subject,
            generation: self.generation,
            page: self.cursor,
        })
    }

    /// Applies the result of the fetch `ticket` authorised.
    ///
    /// A ticket from an earlier generation leaves the state untouched.
    /// The phase returns to `Idle` only after everything else is settled.
    pub fn settle(&mut self, ticket: &PageTicket, result: Result<Page<T>, String>) -> LoadOutcome {
        if !self.owns(ticket) {
            return LoadOutcome::Superseded;
        }

        let outcome = match result {
            Ok(page) if page.is_empty() => {
                self.has_more = false;
                LoadOutcome::Exhausted
            }
            Ok(page) => {
                let before = self.items.len();
                self.items = Arc::new(merge(&self.items, &page.items));
                self.cursor += 1;
                self.has_more = page.has_more;
                self.last_error = None;
                LoadOutcome::Loaded {
                    added: self.items.len() - before,
                    has_more: self.has_more,
                }
            }
            Err(error) => {
                self.has_more = false;
                self.last_error = Some(error.clone());
                LoadOutcome::Failed(error)
            }
        };

        self.phase = LoadPhase::Idle;
        outcome
    }

    fn owns(&self, ticket: &PageTicket) -> bool {
        ticket.generation == self.generation && self.subject.as_deref() == Some(ticket.subject.as_str())
    }

    pub fn snapshot(&self) -> CollectionSnapshot<T> {
        CollectionSnapshot {
            subject: self.subject.clone(),
            items: self.items.clone(),
            cursor: self.cursor,
            is_loading: self.is_loading(),
            has_more: self.has_more,
            last_error: self.last_error.clone(),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
