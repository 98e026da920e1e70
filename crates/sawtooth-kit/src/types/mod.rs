//! Entity types: transactions, batches, blocks, and state entries.
//!
//! Each signed entity exists in two forms. The *wire* form
//! ([`Transaction`], [`Batch`], [`Block`]) carries its header as the exact
//! canonical bytes that were signed. The *view* form ([`TransactionView`],
//! [`BatchView`], [`BlockView`]) is what queries return, with headers
//! decoded. Ids are always the lowercase hex header signature.

mod batch;
mod block;
mod state;
mod transaction;

pub use batch::{Batch, BatchHeader, BatchList, BatchStatus, BatchView, InvalidTransaction};
pub use block::{Block, BlockHeader, BlockView};
pub use state::StateEntry;
pub use transaction::{Transaction, TransactionHeader, TransactionView};
