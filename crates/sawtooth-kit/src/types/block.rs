//! Block types.
//!
//! Blocks are read-only from the client's perspective: they are parsed from
//! endpoint responses, never constructed or signed here.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, base64::Base64, serde_as};

use crate::error::TransportError;
use crate::types::batch::{Batch, BatchView};

/// The header of a block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of this block. Stringified in gateway JSON.
    #[serde_as(as = "DisplayFromStr")]
    pub block_num: u64,
    /// Id of the preceding block.
    pub previous_block_id: String,
    /// Public key of the validator that published the block.
    pub signer_public_key: String,
    /// Ids of the batches in this block, in order.
    pub batch_ids: Vec<String>,
    /// Consensus-specific opaque payload.
    #[serde_as(as = "Base64")]
    pub consensus: Vec<u8>,
    /// Digest of the entire ledger state as of this block. The direct
    /// transport addresses state queries by this root.
    pub state_root_hash: String,
}

/// A block in wire form, as carried by the direct protocol.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Block {
    /// Canonical header bytes, exactly as signed by the validator.
    pub header: Vec<u8>,
    /// Signature over `header`; also the block id.
    pub header_signature: String,
    pub batches: Vec<Batch>,
}

impl Block {
    /// The block id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode the canonical header bytes.
    pub fn decode_header(&self) -> Result<BlockHeader, TransportError> {
        borsh::from_slice(&self.header).map_err(|e| {
            TransportError::InvalidResponse(format!("undecodable block header: {}", e))
        })
    }
}

/// A block as returned by queries, with headers decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    pub header: BlockHeader,
    pub header_signature: String,
    pub batches: Vec<BatchView>,
}

impl BlockView {
    /// The block id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode a wire-form block into a view.
    pub fn from_wire(block: &Block) -> Result<Self, TransportError> {
        let batches = block
            .batches
            .iter()
            .map(BatchView::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BlockView {
            header: block.decode_header()?,
            header_signature: block.header_signature.clone(),
            batches,
        })
    }
}
