//! Batch types.
//!
//! A batch is the atomic unit of submission: every transaction it contains
//! commits, or none does. [`BatchList`] is the wrapper actually sent over the
//! wire.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::types::transaction::{Transaction, TransactionView};

/// The header of a batch, in canonical field order.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Public key of the batch signer.
    pub signer_public_key: String,
    /// Transaction ids, in the order the transactions were supplied.
    pub transaction_ids: Vec<String>,
}

/// A signed batch in wire form.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Batch {
    /// Canonical header bytes, exactly as signed.
    pub header: Vec<u8>,
    /// Lowercase hex signature over `header`; also the batch id.
    pub header_signature: String,
    pub transactions: Vec<Transaction>,
    /// Ask the endpoint to trace this batch through its lifecycle.
    pub trace: bool,
}

impl Batch {
    /// The batch id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode the canonical header bytes.
    pub fn decode_header(&self) -> Result<BatchHeader, TransportError> {
        borsh::from_slice(&self.header).map_err(|e| {
            TransportError::InvalidResponse(format!("undecodable batch header: {}", e))
        })
    }
}

/// An ordered list of batches; the unit sent to an endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub struct BatchList {
    pub batches: Vec<Batch>,
}

impl BatchList {
    pub fn new(batches: Vec<Batch>) -> Self {
        BatchList { batches }
    }

    /// Canonical bytes for submission (`POST /batches` body on the gateway).
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("batch list serialization should never fail")
    }

    /// Decode a submitted batch list.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        borsh::from_slice(bytes)
            .map_err(|e| TransportError::InvalidResponse(format!("undecodable batch list: {}", e)))
    }
}

/// A batch as returned by queries, with headers decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchView {
    pub header: BatchHeader,
    pub header_signature: String,
    pub transactions: Vec<TransactionView>,
    #[serde(default)]
    pub trace: bool,
}

impl BatchView {
    /// The batch id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode a wire-form batch into a view.
    pub fn from_wire(batch: &Batch) -> Result<Self, TransportError> {
        let transactions = batch
            .transactions
            .iter()
            .map(TransactionView::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BatchView {
            header: batch.decode_header()?,
            header_signature: batch.header_signature.clone(),
            transactions,
            trace: batch.trace,
        })
    }
}

// ============================================================================
// Batch status
// ============================================================================

/// A transaction the endpoint rejected, with its reported reason.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct InvalidTransaction {
    pub id: String,
    pub message: String,
}

/// The externally-mutable status of a submitted batch.
///
/// A status is never cached: every query re-fetches it from the endpoint.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum BatchStatus {
    /// The endpoint has no record of the batch.
    Unknown,
    /// Submitted but not yet committed.
    Pending,
    /// Rejected; carries per-transaction detail when the endpoint reports it.
    Invalid(Vec<InvalidTransaction>),
    /// Committed to the ledger.
    Committed,
}

impl BatchStatus {
    /// Whether this status can still change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Committed | BatchStatus::Invalid(_))
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, BatchStatus::Committed)
    }
}
