//! Lazy page iteration over listing endpoints.
//!
//! A [`PageIterator`] is a forward-only, single-pass cursor over a paginated
//! listing. The continuation cursor lives inside the page source closure
//! (an absolute `next` URL for the gateway, `{start, limit}` controls for
//! the direct protocol); the iterator itself only manages the buffered page,
//! the current entry, and the sticky error state.
//!
//! Iterators are single-use: to retry a failed listing, construct a new one.

use std::collections::VecDeque;

use crate::error::TransportError;

/// A source of pages. Returns `Ok(Some(entries))` for each fetched page and
/// `Ok(None)` once the continuation cursor is exhausted.
pub(crate) type PageSource<'a, T> =
    Box<dyn FnMut() -> Result<Option<Vec<T>>, TransportError> + Send + 'a>;

/// A lazy iterator over a paginated listing.
///
/// # Example
///
/// ```rust,no_run
/// # fn example(transport: &dyn sawtooth_kit::Transport) -> Result<(), sawtooth_kit::TransportError> {
/// let mut blocks = transport.blocks(100, false);
/// while blocks.advance()? {
///     println!("{}", blocks.current()?.id());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PageIterator<'a, T> {
    source: PageSource<'a, T>,
    buffer: VecDeque<T>,
    current: Option<T>,
    error: Option<TransportError>,
    exhausted: bool,
    error_yielded: bool,
}

impl<'a, T> PageIterator<'a, T> {
    pub(crate) fn new(source: PageSource<'a, T>) -> Self {
        PageIterator {
            source,
            buffer: VecDeque::new(),
            current: None,
            error: None,
            exhausted: false,
            error_yielded: false,
        }
    }

    /// Step to the next entry.
    ///
    /// Returns `Ok(true)` when a new current entry is available, `Ok(false)`
    /// on exhaustion (not an error). Performs at most one fetch per call.
    /// The first fetch or decode error becomes sticky: every later call
    /// fails with it immediately, without retrying.
    pub fn advance(&mut self) -> Result<bool, TransportError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        if self.buffer.is_empty() && !self.exhausted {
            match (self.source)() {
                Ok(Some(entries)) => self.buffer.extend(entries),
                Ok(None) => self.exhausted = true,
                Err(err) => {
                    self.current = None;
                    self.error = Some(err.clone());
                    return Err(err);
                }
            }
        }

        match self.buffer.pop_front() {
            Some(entry) => {
                self.current = Some(entry);
                Ok(true)
            }
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    /// The current entry.
    ///
    /// Fails before the first successful [`advance`](Self::advance), after
    /// exhaustion, and after any recorded error.
    pub fn current(&self) -> Result<&T, TransportError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.current.as_ref().ok_or(TransportError::NoCurrentEntry)
    }

    /// The recorded sticky error, if any fetch has failed.
    pub fn error(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }
}

impl<T> Iterator for PageIterator<'_, T> {
    type Item = Result<T, TransportError>;

    /// Yields each entry, then the sticky error at most once, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current.take().map(Ok),
            Ok(false) => None,
            Err(err) => {
                if self.error_yielded {
                    None
                } else {
                    self.error_yielded = true;
                    Some(Err(err))
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for PageIterator<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageIterator")
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .field("error", &self.error)
            .finish()
    }
}
