//! Cursor-paginated page of items
//!
//! The backend paginates every list (rooms, message history) with an opaque
//! cursor token. The client trusts the server's `has_next` flag verbatim.

/// One page of a cursor-paginated list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    /// Items in server-returned order
    pub items: Vec<T>,
    /// Opaque token to resume the list from, None on the last page
    pub next_cursor: Option<String>,
    /// Whether more pages exist
    pub has_next: bool,
}

impl<T> CursorPage<T> {
    /// Create a page from its parts
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<String>, has_next: bool) -> Self {
        Self {
            items,
            next_cursor,
            has_next,
        }
    }

    /// An empty, exhausted page
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_next: false,
        }
    }

    /// Number of items in this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map the items while keeping the pagination state
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_next: self.has_next,
        }
    }

    /// Fallibly map the items while keeping the pagination state
    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, f: F) -> Result<CursorPage<U>, E> {
        Ok(CursorPage {
            items: self.items.into_iter().map(f).collect::<Result<_, E>>()?,
            next_cursor: self.next_cursor,
            has_next: self.has_next,
        })
    }
}

impl<T> Default for CursorPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}
