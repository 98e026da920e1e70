//! Transport abstraction over the two Sawtooth wire protocols.
//!
//! A [`Transport`] submits signed batch lists and answers queries against
//! the ledger. Two implementations exist with identical call contracts:
//!
//! - [`RestTransport`] — the HTTP/JSON gateway (the Sawtooth REST API)
//! - [`DirectTransport`] — the framed binary protocol to a validator node
//!
//! Both are constructed through [`connect`], which probes connectivity and
//! fails fast. All operations are blocking calls on the caller's thread;
//! transports are safe to share across threads.

pub mod direct;
mod iterator;
pub mod messages;
mod pool;
pub mod rest;

use std::collections::HashMap;

pub use direct::{DEFAULT_POOL_CAPACITY, DirectTransport};
pub use iterator::PageIterator;
pub use rest::RestTransport;

use crate::error::TransportError;
use crate::types::{BatchList, BatchStatus, BatchView, BlockView, StateEntry, TransactionView};

/// Which wire protocol a client speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// HTTP/JSON gateway.
    Rest,
    /// Framed binary protocol to a validator.
    Direct,
}

/// Construct a transport of the given kind.
///
/// Fails when the endpoint URL is unusable or the connectivity probe does
/// not succeed.
pub fn connect(kind: TransportKind, endpoint: &str) -> Result<Box<dyn Transport>, TransportError> {
    match kind {
        TransportKind::Rest => Ok(Box::new(RestTransport::new(endpoint)?)),
        TransportKind::Direct => Ok(Box::new(DirectTransport::new(endpoint)?)),
    }
}

/// The capability contract both wire protocols satisfy.
///
/// A requested entity that does not exist is a distinct error (see
/// [`TransportError::is_not_found`]), never a null result. Listing methods
/// take a per-page `limit` (0 lets the endpoint choose) and a `reverse`
/// ordering flag; they return single-use iterators. `wait_secs` asks the
/// endpoint to hold a status request open until a terminal status or the
/// wait elapses, when supported; 0 means "answer immediately".
pub trait Transport: Send + Sync {
    /// Submit a prepared, fully signed batch list. Fire-and-forget: a clean
    /// return means the endpoint accepted the list, not that it committed.
    fn submit_batch_list(&self, batch_list: &BatchList) -> Result<(), TransportError>;

    fn batch(&self, batch_id: &str) -> Result<BatchView, TransportError>;

    fn batches(&self, limit: usize, reverse: bool) -> PageIterator<'_, BatchView>;

    /// The status of a single batch.
    fn batch_status(&self, batch_id: &str, wait_secs: u32) -> Result<BatchStatus, TransportError> {
        let ids = [batch_id.to_string()];
        let mut statuses = self.batch_statuses(&ids, wait_secs)?;
        Ok(statuses.remove(batch_id).unwrap_or(BatchStatus::Unknown))
    }

    /// The statuses of several batches in one query.
    fn batch_statuses(
        &self,
        batch_ids: &[String],
        wait_secs: u32,
    ) -> Result<HashMap<String, BatchStatus>, TransportError>;

    fn block(&self, block_id: &str) -> Result<BlockView, TransportError>;

    fn blocks(&self, limit: usize, reverse: bool) -> PageIterator<'_, BlockView>;

    fn transaction(&self, transaction_id: &str) -> Result<TransactionView, TransportError>;

    fn transactions(&self, limit: usize, reverse: bool) -> PageIterator<'_, TransactionView>;

    /// Read state at the given address, as of the latest block.
    ///
    /// The head is resolved per call: two consecutive head-less reads may
    /// observe different ledger snapshots. Use
    /// [`state_at_head`](Transport::state_at_head) to pin one.
    fn state(&self, address: &str) -> Result<StateEntry, TransportError>;

    /// Read state at the given address, as of the block `head`.
    fn state_at_head(&self, address: &str, head: &str) -> Result<StateEntry, TransportError>;

    fn state_entries(
        &self,
        address_prefix: &str,
        limit: usize,
        reverse: bool,
    ) -> PageIterator<'_, StateEntry>;
}
