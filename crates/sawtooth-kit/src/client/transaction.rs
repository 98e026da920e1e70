//! The transaction and batch signing pipeline.
//!
//! A payload becomes a transaction by encoding it through the codec,
//! building a header around the encoded bytes, and signing the header's
//! canonical borsh serialization. The signature is the entity's id, for
//! transactions and batches alike, so ids are content-addressed and
//! deterministic for fixed header bytes.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha512};

use crate::client::codec::PayloadCodec;
use crate::client::signer::Signer;
use crate::error::Error;
use crate::types::{Batch, BatchHeader, BatchList, Transaction, TransactionHeader};

/// Lowercase hex SHA-512 digest of a byte sequence.
///
/// This is the digest used for payload hashes in transaction headers and,
/// by convention, for deriving state addresses from family and key names.
pub fn hex_digest(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// A nonce differentiating otherwise-identical payload submissions.
///
/// Random bytes rather than a timestamp: two submissions within one clock
/// tick must still produce distinct transaction ids.
fn random_nonce() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build and sign a transaction for one payload.
///
/// The signer's public key is used as both signer and batcher key, for
/// self-batched submission. Any codec or signing failure aborts before
/// anything touches the network.
pub(crate) fn build_transaction<C: PayloadCodec>(
    signer: &dyn Signer,
    codec: &C,
    payload: &C::Payload,
) -> Result<Transaction, Error> {
    let payload_bytes = codec.encode_payload(payload)?;

    let header = TransactionHeader {
        batcher_public_key: signer.public_key().to_string(),
        dependencies: codec.dependencies(payload),
        family_name: codec.family_name().to_string(),
        family_version: codec.family_version().to_string(),
        inputs: codec.input_addresses(payload),
        nonce: random_nonce(),
        outputs: codec.output_addresses(payload),
        payload_sha512: hex_digest(&payload_bytes),
        signer_public_key: signer.public_key().to_string(),
    };
    let header_bytes =
        borsh::to_vec(&header).expect("transaction header serialization should never fail");
    let header_signature = signer.sign(&header_bytes)?;

    Ok(Transaction {
        header: header_bytes,
        header_signature,
        payload: payload_bytes,
    })
}

/// Group signed transactions into one atomic batch.
///
/// The batch header records the transaction ids in supply order; its
/// signature is the batch id.
pub(crate) fn build_batch(
    signer: &dyn Signer,
    transactions: Vec<Transaction>,
) -> Result<Batch, Error> {
    let header = BatchHeader {
        signer_public_key: signer.public_key().to_string(),
        transaction_ids: transactions
            .iter()
            .map(|transaction| transaction.header_signature.clone())
            .collect(),
    };
    let header_bytes =
        borsh::to_vec(&header).expect("batch header serialization should never fail");
    let header_signature = signer.sign(&header_bytes)?;

    Ok(Batch {
        header: header_bytes,
        header_signature,
        transactions,
        trace: false,
    })
}

/// Wrap batches for submission.
pub(crate) fn build_batch_list(batches: Vec<Batch>) -> BatchList {
    BatchList::new(batches)
}
