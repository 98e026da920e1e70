//! The main Sawtooth client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::client::codec::PayloadCodec;
use crate::client::signer::{InMemorySigner, Signer};
use crate::client::transaction::{build_batch, build_batch_list, build_transaction};
use crate::error::Error;
use crate::transport::{self, Transport, TransportKind};
use crate::types::{Batch, BatchStatus, Transaction};

/// The main client for a Sawtooth application family.
///
/// A `Sawtooth` client owns an identity (the [`Signer`]), a wire protocol
/// (the [`Transport`]), and the application's [`PayloadCodec`], all bound at
/// construction. Submission is fire-and-forget by default; the `_sync`
/// variants layer commit-waiting on top.
///
/// # Example
///
/// ```rust,no_run
/// use sawtooth_kit::SawtoothBuilder;
/// # use sawtooth_kit::{Error, PayloadCodec};
/// # fn example<C: PayloadCodec<Payload = Vec<u8>>>(codec: C) -> Result<(), Error> {
/// let client = SawtoothBuilder::gateway("http://localhost:8008")
///     .key_file("/etc/sawtooth/keys/app.priv")
///     .build(codec)?;
///
/// let batch_id = client.execute_payload(&vec![1, 2, 3])?;
/// let committed = client.wait_batch(&batch_id, 30, 5)?;
/// # Ok(())
/// # }
/// ```
pub struct Sawtooth<C: PayloadCodec> {
    signer: Arc<dyn Signer>,
    transport: Box<dyn Transport>,
    codec: C,
}

impl<C: PayloadCodec> Sawtooth<C> {
    /// The transport, for direct queries (entities, state, listings).
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The application codec this client was built with.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The public key of the active identity.
    pub fn public_key(&self) -> &str {
        self.signer.public_key()
    }

    /// Build and sign a transaction for one payload, without submitting it.
    pub fn create_transaction(&self, payload: &C::Payload) -> Result<Transaction, Error> {
        build_transaction(self.signer.as_ref(), &self.codec, payload)
    }

    /// Group signed transactions into one atomic batch.
    pub fn create_batch(&self, transactions: Vec<Transaction>) -> Result<Batch, Error> {
        build_batch(self.signer.as_ref(), transactions)
    }

    /// Submit one payload as a single-transaction batch.
    ///
    /// Returns the batch id for later status queries. Fire-and-forget:
    /// acceptance by the endpoint, not commitment.
    pub fn execute_payload(&self, payload: &C::Payload) -> Result<String, Error> {
        self.execute_payloads(std::slice::from_ref(payload))
    }

    /// Submit several payloads as one atomic batch.
    ///
    /// Every payload commits or none does. Submitting payloads one at a
    /// time instead yields independent batches with independent outcomes.
    pub fn execute_payloads(&self, payloads: &[C::Payload]) -> Result<String, Error> {
        let transactions = payloads
            .iter()
            .map(|payload| self.create_transaction(payload))
            .collect::<Result<Vec<_>, _>>()?;

        let batch = self.create_batch(transactions)?;
        let batch_id = batch.id().to_string();

        let batch_list = build_batch_list(vec![batch]);
        self.transport.submit_batch_list(&batch_list)?;
        debug!(batch_id, payloads = payloads.len(), "batch submitted");

        Ok(batch_id)
    }

    /// Submit one payload and wait for it to commit.
    pub fn execute_payload_sync(
        &self,
        payload: &C::Payload,
        timeout_secs: u64,
        poll_interval_secs: u32,
    ) -> Result<String, Error> {
        self.execute_payloads_sync(std::slice::from_ref(payload), timeout_secs, poll_interval_secs)
    }

    /// Submit several payloads as one atomic batch and wait for it to commit.
    pub fn execute_payloads_sync(
        &self,
        payloads: &[C::Payload],
        timeout_secs: u64,
        poll_interval_secs: u32,
    ) -> Result<String, Error> {
        let batch_id = self.execute_payloads(payloads)?;
        if self.wait_batch(&batch_id, timeout_secs, poll_interval_secs)? {
            Ok(batch_id)
        } else {
            Err(Error::BatchNotCommitted {
                batch_id,
                timeout_secs,
            })
        }
    }

    /// Poll a batch until it resolves or the timeout elapses.
    ///
    /// Returns `Ok(true)` once the batch commits and `Ok(false)` when the
    /// timeout passes without resolution — callers that treat "not yet
    /// committed" as fatal must do so explicitly. An invalid batch fails
    /// immediately with [`Error::BatchInvalid`], without waiting out the
    /// remaining budget, and carries the endpoint-reported detail. A
    /// `timeout_secs` of 0 polls indefinitely.
    ///
    /// Each poll asks the endpoint to hold the status request for
    /// `poll_interval_secs`; when the endpoint answers faster, the remainder
    /// of the interval is slept client-side.
    pub fn wait_batch(
        &self,
        batch_id: &str,
        timeout_secs: u64,
        poll_interval_secs: u32,
    ) -> Result<bool, Error> {
        let deadline =
            (timeout_secs != 0).then(|| Instant::now() + Duration::from_secs(timeout_secs));
        let interval = Duration::from_secs(u64::from(poll_interval_secs));

        loop {
            let poll_started = Instant::now();
            let status = self.transport.batch_status(batch_id, poll_interval_secs)?;

            match status {
                BatchStatus::Committed => {
                    debug!(batch_id, "batch committed");
                    return Ok(true);
                }
                BatchStatus::Invalid(invalid) => {
                    let detail = if invalid.is_empty() {
                        "no detail reported".to_string()
                    } else {
                        invalid
                            .iter()
                            .map(|tx| format!("{}: {}", tx.id, tx.message))
                            .collect::<Vec<_>>()
                            .join("; ")
                    };
                    return Err(Error::BatchInvalid {
                        batch_id: batch_id.to_string(),
                        detail,
                    });
                }
                BatchStatus::Pending | BatchStatus::Unknown => {
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            return Ok(false);
                        }
                    }
                    let elapsed = poll_started.elapsed();
                    if elapsed < interval {
                        std::thread::sleep(interval - elapsed);
                    }
                }
            }
        }
    }
}

impl<C: PayloadCodec> std::fmt::Debug for Sawtooth<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sawtooth")
            .field("public_key", &self.signer.public_key())
            .field("family", &self.codec.family_name())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

enum KeySource {
    DefaultFile,
    File(PathBuf),
    Hex(String),
    Custom(Arc<dyn Signer>),
}

impl KeySource {
    fn into_signer(self) -> Result<Arc<dyn Signer>, Error> {
        Ok(match self {
            KeySource::DefaultFile => Arc::new(InMemorySigner::from_default_key_file()?),
            KeySource::File(path) => Arc::new(InMemorySigner::from_file(path)?),
            KeySource::Hex(hex_key) => Arc::new(InMemorySigner::from_hex(&hex_key)?),
            KeySource::Custom(signer) => signer,
        })
    }
}

/// Fluent builder for [`Sawtooth`] clients.
///
/// Construction fails fast: a bad endpoint, unreadable key material, or a
/// failed connectivity probe all abort [`build`](SawtoothBuilder::build).
pub struct SawtoothBuilder {
    kind: TransportKind,
    endpoint: String,
    key: KeySource,
}

impl SawtoothBuilder {
    /// Target an HTTP/JSON gateway (the Sawtooth REST API).
    pub fn gateway(url: impl Into<String>) -> Self {
        SawtoothBuilder {
            kind: TransportKind::Rest,
            endpoint: url.into(),
            key: KeySource::DefaultFile,
        }
    }

    /// Target a validator directly over the binary protocol
    /// (`tcp://host:port`).
    pub fn direct(url: impl Into<String>) -> Self {
        SawtoothBuilder {
            kind: TransportKind::Direct,
            endpoint: url.into(),
            key: KeySource::DefaultFile,
        }
    }

    /// Load the identity from a specific private key file.
    ///
    /// Without this, the default `~/.sawtooth/keys/<user>.priv` is used.
    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = KeySource::File(path.into());
        self
    }

    /// Use a hex-encoded private key directly.
    pub fn private_key(mut self, hex_key: impl Into<String>) -> Self {
        self.key = KeySource::Hex(hex_key.into());
        self
    }

    /// Use a custom signing provider.
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.key = KeySource::Custom(Arc::new(signer));
        self
    }

    /// Build the client for the given application codec.
    pub fn build<C: PayloadCodec>(self, codec: C) -> Result<Sawtooth<C>, Error> {
        let signer = self.key.into_signer()?;
        let transport = transport::connect(self.kind, &self.endpoint)?;

        Ok(Sawtooth {
            signer,
            transport,
            codec,
        })
    }

    /// Build against an already-constructed transport.
    ///
    /// Intended for tests and for embedding a custom transport; no
    /// connectivity probe is run here beyond what the transport's own
    /// constructor did.
    pub fn build_with_transport<C: PayloadCodec>(
        self,
        codec: C,
        transport: Box<dyn Transport>,
    ) -> Result<Sawtooth<C>, Error> {
        let signer = self.key.into_signer()?;

        Ok(Sawtooth {
            signer,
            transport,
            codec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportError};
    use crate::transport::PageIterator;
    use crate::types::{
        BatchList, BatchView, BlockView, InvalidTransaction, StateEntry, TransactionView,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Instant;

    const KEY_HEX: &str = "2f1e7b7a098d9d7e8195e5fb0b36a132cb1b1e58a3eeb44e1d412f24e5bd4ebb";

    struct RawCodec;

    impl PayloadCodec for RawCodec {
        type Payload = Vec<u8>;
        type StateValue = Vec<u8>;

        fn family_name(&self) -> &str {
            "raw"
        }

        fn family_version(&self) -> &str {
            "1.0"
        }

        fn encode_payload(&self, payload: &Vec<u8>) -> Result<Vec<u8>, Error> {
            Ok(payload.clone())
        }

        fn decode_payload(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
            Ok(bytes.to_vec())
        }

        fn input_addresses(&self, _payload: &Vec<u8>) -> Vec<String> {
            vec![]
        }

        fn output_addresses(&self, _payload: &Vec<u8>) -> Vec<String> {
            vec![]
        }

        fn encode_state(&self, value: &Vec<u8>) -> Result<Vec<u8>, Error> {
            Ok(value.clone())
        }

        fn decode_state(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
            Ok(bytes.to_vec())
        }
    }

    /// A transport whose status answers follow a script; everything else is
    /// unreachable in these tests. Submitted batch lists are recorded into a
    /// shared handle the test keeps.
    struct ScriptedTransport {
        statuses: Mutex<Vec<BatchStatus>>,
        submitted: Arc<Mutex<Vec<BatchList>>>,
    }

    impl ScriptedTransport {
        fn new(statuses: Vec<BatchStatus>) -> (Self, Arc<Mutex<Vec<BatchList>>>) {
            let submitted = Arc::new(Mutex::new(Vec::new()));
            let transport = ScriptedTransport {
                statuses: Mutex::new(statuses),
                submitted: Arc::clone(&submitted),
            };
            (transport, submitted)
        }
    }

    impl Transport for ScriptedTransport {
        fn submit_batch_list(&self, batch_list: &BatchList) -> Result<(), TransportError> {
            self.submitted.lock().unwrap().push(batch_list.clone());
            Ok(())
        }

        fn batch(&self, _batch_id: &str) -> Result<BatchView, TransportError> {
            unimplemented!()
        }

        fn batches(&self, _limit: usize, _reverse: bool) -> PageIterator<'_, BatchView> {
            unimplemented!()
        }

        fn batch_statuses(
            &self,
            batch_ids: &[String],
            _wait_secs: u32,
        ) -> Result<HashMap<String, BatchStatus>, TransportError> {
            let mut statuses = self.statuses.lock().unwrap();
            let next = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0].clone()
            };
            Ok(batch_ids
                .iter()
                .map(|id| (id.clone(), next.clone()))
                .collect())
        }

        fn block(&self, _block_id: &str) -> Result<BlockView, TransportError> {
            unimplemented!()
        }

        fn blocks(&self, _limit: usize, _reverse: bool) -> PageIterator<'_, BlockView> {
            unimplemented!()
        }

        fn transaction(&self, _transaction_id: &str) -> Result<TransactionView, TransportError> {
            unimplemented!()
        }

        fn transactions(
            &self,
            _limit: usize,
            _reverse: bool,
        ) -> PageIterator<'_, TransactionView> {
            unimplemented!()
        }

        fn state(&self, _address: &str) -> Result<StateEntry, TransportError> {
            unimplemented!()
        }

        fn state_at_head(&self, _address: &str, _head: &str) -> Result<StateEntry, TransportError> {
            unimplemented!()
        }

        fn state_entries(
            &self,
            _address_prefix: &str,
            _limit: usize,
            _reverse: bool,
        ) -> PageIterator<'_, StateEntry> {
            unimplemented!()
        }
    }

    fn client_with_statuses(statuses: Vec<BatchStatus>) -> Sawtooth<RawCodec> {
        let (transport, _) = ScriptedTransport::new(statuses);
        SawtoothBuilder::gateway("http://unused")
            .private_key(KEY_HEX)
            .build_with_transport(RawCodec, Box::new(transport))
            .unwrap()
    }

    #[test]
    fn test_wait_batch_committed_returns_immediately() {
        let client = client_with_statuses(vec![BatchStatus::Committed]);
        let started = Instant::now();
        assert!(client.wait_batch("batch", 60, 1).unwrap());
        // Terminal on first poll; no interval pacing, no timeout burn.
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_batch_invalid_fails_fast_with_detail() {
        let client = client_with_statuses(vec![BatchStatus::Invalid(vec![InvalidTransaction {
            id: "tx1".to_string(),
            message: "verb must be set, inc, or dec".to_string(),
        }])]);

        let started = Instant::now();
        let err = client.wait_batch("batch", 60, 1).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(1));
        match err {
            Error::BatchInvalid { batch_id, detail } => {
                assert_eq!(batch_id, "batch");
                assert!(detail.contains("tx1"));
                assert!(detail.contains("verb must be set"));
            }
            other => panic!("expected BatchInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_wait_batch_pending_runs_out_the_timeout() {
        let client = client_with_statuses(vec![BatchStatus::Pending]);
        let started = Instant::now();
        assert!(!client.wait_batch("batch", 1, 0).unwrap());
        // Pending must not resolve before the timeout elapses.
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_wait_batch_unknown_then_committed() {
        let client = client_with_statuses(vec![
            BatchStatus::Unknown,
            BatchStatus::Pending,
            BatchStatus::Committed,
        ]);
        assert!(client.wait_batch("batch", 30, 0).unwrap());
    }

    #[test]
    fn test_execute_payloads_submits_one_atomic_batch() {
        let (transport, submitted) = ScriptedTransport::new(vec![BatchStatus::Committed]);
        let client = SawtoothBuilder::gateway("http://unused")
            .private_key(KEY_HEX)
            .build_with_transport(RawCodec, Box::new(transport))
            .unwrap();

        let batch_id = client
            .execute_payloads(&[vec![1u8], vec![2u8], vec![3u8]])
            .unwrap();

        let submitted = submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].batches.len(), 1);
        let batch = &submitted[0].batches[0];
        assert_eq!(batch.id(), batch_id);
        assert_eq!(batch.transactions.len(), 3);

        // Header ids must match the contained transactions, in order.
        let header = batch.decode_header().unwrap();
        let ids: Vec<String> = batch
            .transactions
            .iter()
            .map(|t| t.header_signature.clone())
            .collect();
        assert_eq!(header.transaction_ids, ids);
    }

    #[test]
    fn test_execute_payload_sync_escalates_timeout() {
        let client = client_with_statuses(vec![BatchStatus::Pending]);
        let err = client
            .execute_payload_sync(&vec![1u8], 1, 0)
            .unwrap_err();
        assert!(matches!(err, Error::BatchNotCommitted { .. }));
    }

    #[test]
    fn test_builder_rejects_unreadable_key_file() {
        let (transport, _) = ScriptedTransport::new(vec![]);
        let result = SawtoothBuilder::gateway("http://unused")
            .key_file("/nonexistent/key.priv")
            .build_with_transport(RawCodec, Box::new(transport));
        assert!(matches!(result, Err(Error::Signing(_))));
    }
}
