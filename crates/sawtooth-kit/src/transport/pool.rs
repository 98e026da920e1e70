//! Bounded connection free list for the direct transport.

use std::sync::{Mutex, PoisonError};

/// A bounded, thread-safe free list of idle connections.
///
/// `checkout` never blocks: when the list is empty the caller opens a fresh
/// connection instead of waiting. `checkin` never blocks either: a connection
/// returned while the list is full is handed back to the caller to close.
/// Together these bound the number of retained connections at `capacity`
/// without ever stalling a request under bursty load.
pub(crate) struct ConnectionPool<T> {
    slots: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T> ConnectionPool<T> {
    pub fn new(capacity: usize) -> Self {
        ConnectionPool {
            slots: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Pop an idle connection, if one is available.
    pub fn checkout(&self) -> Option<T> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Return a connection to the pool.
    ///
    /// Gives the connection back as `Some` when the pool is already at
    /// capacity; the caller is expected to drop it.
    pub fn checkin(&self, connection: T) -> Option<T> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.len() < self.capacity {
            slots.push(connection);
            None
        } else {
            Some(connection)
        }
    }

    /// Number of idle connections currently held.
    pub fn idle(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
