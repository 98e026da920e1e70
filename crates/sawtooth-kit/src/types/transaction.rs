//! Transaction types.
//!
//! A [`Transaction`] is the wire form: the header travels as the exact
//! canonical bytes that were signed, so the signature can always be verified
//! against them. A [`TransactionView`] is the decoded form returned by
//! queries.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::error::TransportError;

/// The header of a transaction, in canonical field order.
///
/// The canonical bytes of this header are its borsh serialization; the
/// transaction id is the signature over exactly those bytes.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TransactionHeader {
    /// Public key of the party that signs the enclosing batch.
    pub batcher_public_key: String,
    /// Ids of transactions that must be committed before this one.
    pub dependencies: Vec<String>,
    /// Transaction family that interprets the payload.
    pub family_name: String,
    pub family_version: String,
    /// State addresses this transaction may read.
    pub inputs: Vec<String>,
    /// Differentiates otherwise-identical submissions.
    pub nonce: String,
    /// State addresses this transaction may write.
    pub outputs: Vec<String>,
    /// Lowercase hex SHA-512 of the exact encoded payload bytes.
    pub payload_sha512: String,
    /// Public key of the transaction signer.
    pub signer_public_key: String,
}

/// A signed transaction in wire form.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    /// Canonical header bytes, exactly as signed.
    pub header: Vec<u8>,
    /// Lowercase hex signature over `header`; also the transaction id.
    pub header_signature: String,
    /// Encoded payload bytes.
    pub payload: Vec<u8>,
}

impl Transaction {
    /// The transaction id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode the canonical header bytes.
    pub fn decode_header(&self) -> Result<TransactionHeader, TransportError> {
        borsh::from_slice(&self.header).map_err(|e| {
            TransportError::InvalidResponse(format!("undecodable transaction header: {}", e))
        })
    }
}

/// A transaction as returned by queries, with the header decoded.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub header: TransactionHeader,
    pub header_signature: String,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
}

impl TransactionView {
    /// The transaction id (identical to the header signature).
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    /// Decode a wire-form transaction into a view.
    pub fn from_wire(transaction: &Transaction) -> Result<Self, TransportError> {
        Ok(TransactionView {
            header: transaction.decode_header()?,
            header_signature: transaction.header_signature.clone(),
            payload: transaction.payload.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> TransactionHeader {
        TransactionHeader {
            batcher_public_key: "02aa".to_string(),
            dependencies: vec![],
            family_name: "intkey".to_string(),
            family_version: "1.0".to_string(),
            inputs: vec!["1cf126".to_string()],
            nonce: "00ff".to_string(),
            outputs: vec!["1cf126".to_string()],
            payload_sha512: "beef".to_string(),
            signer_public_key: "02aa".to_string(),
        }
    }

    #[test]
    fn test_header_canonical_bytes_are_stable() {
        let header = sample_header();
        let first = borsh::to_vec(&header).unwrap();
        let second = borsh::to_vec(&header).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_view_from_wire_recovers_header() {
        let header = sample_header();
        let wire = Transaction {
            header: borsh::to_vec(&header).unwrap(),
            header_signature: "cafe".to_string(),
            payload: vec![1, 2, 3],
        };

        let view = TransactionView::from_wire(&wire).unwrap();
        assert_eq!(view.header, header);
        assert_eq!(view.id(), "cafe");
        assert_eq!(view.payload, vec![1, 2, 3]);
    }

    #[test]
    fn test_view_from_wire_rejects_garbage_header() {
        let wire = Transaction {
            header: vec![0xff, 0xff],
            header_signature: "cafe".to_string(),
            payload: vec![],
        };
        let err = TransactionView::from_wire(&wire).unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[test]
    fn test_view_json_payload_is_base64() {
        let view = TransactionView {
            header: sample_header(),
            header_signature: "cafe".to_string(),
            payload: b"hello".to_vec(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["payload"], "aGVsbG8=");

        let back: TransactionView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }
}
