/// One page of a subject's collection.
///
/// Pages are consumed by the merger as soon as they arrive and never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation signal from the server.
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self { items, has_more }
    }

    /// A page with no items and no continuation.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
