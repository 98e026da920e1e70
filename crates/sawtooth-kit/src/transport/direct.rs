//! Direct transport: the framed binary protocol to a validator node.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::transport::Transport;
use crate::transport::iterator::PageIterator;
use crate::transport::messages::{
    BatchGetRequest, BatchGetResponse, BatchListRequest, BatchListResponse, BatchStatusRequest,
    BatchStatusResponse, BatchSubmitRequest, BatchSubmitResponse, BlockGetRequest,
    BlockGetResponse, BlockListRequest, BlockListResponse, Envelope, MAX_MESSAGE_SIZE, MessageKind,
    PagingControls, PagingResponse, PeersGetRequest, PeersGetResponse, SortControls,
    StateGetRequest, StateGetResponse, StateListRequest, StateListResponse, TransactionGetRequest,
    TransactionGetResponse, TransactionListRequest, TransactionListResponse, decode_frame,
    encode_frame,
};
use crate::transport::pool::ConnectionPool;
use crate::types::{
    BatchList, BatchStatus, BatchView, BlockView, StateEntry, TransactionView,
};

/// Default capacity of the idle-connection pool.
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Socket timeout for a single request/response exchange. Status queries
/// with a server-side wait extend this by the wait duration.
const IO_TIMEOUT: Duration = Duration::from_secs(60);

/// A connection to a validator over the framed binary protocol.
///
/// Holds a bounded pool of idle TCP connections. Each pooled connection
/// serves one in-flight request at a time; responses are matched to requests
/// by correlation id, and frames bearing a foreign correlation id are
/// skipped. Construction probes the endpoint with a peers request and fails
/// fast.
pub struct DirectTransport {
    address: String,
    pool: ConnectionPool<Connection>,
    correlation: AtomicU64,
}

impl DirectTransport {
    /// Connect to the validator at `endpoint` (`tcp://host:port`).
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_capacity(endpoint, DEFAULT_POOL_CAPACITY)
    }

    /// Connect with an explicit idle-pool capacity.
    pub fn with_capacity(endpoint: &str, capacity: usize) -> Result<Self, TransportError> {
        let transport = DirectTransport {
            address: parse_endpoint(endpoint)?,
            pool: ConnectionPool::new(capacity),
            correlation: AtomicU64::new(1),
        };

        // The simplest possible request, to verify validator connectivity.
        let probe: PeersGetResponse = transport.exchange(
            MessageKind::PeersGetRequest,
            &PeersGetRequest,
            MessageKind::PeersGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = probe.status.error_code() {
            return Err(TransportError::endpoint(code, "connectivity probe failed"));
        }
        debug!(address = %transport.address, "direct transport connected");

        Ok(transport)
    }

    fn connection(&self) -> Result<Connection, TransportError> {
        match self.pool.checkout() {
            Some(connection) => Ok(connection),
            None => {
                trace!(address = %self.address, "pool empty, dialing validator");
                Connection::open(&self.address)
            }
        }
    }

    fn release(&self, connection: Connection) {
        if self.pool.checkin(connection).is_some() {
            trace!("connection pool full, closing connection");
        }
    }

    /// Send one request and block until its response arrives.
    ///
    /// The connection returns to the pool only after a clean exchange; a
    /// connection that failed mid-request is dropped instead.
    fn exchange<Req, Resp>(
        &self,
        kind: MessageKind,
        request: &Req,
        expect: MessageKind,
        read_timeout: Duration,
    ) -> Result<Resp, TransportError>
    where
        Req: BorshSerialize,
        Resp: BorshDeserialize,
    {
        let correlation_id = self.correlation.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope::new(kind, correlation_id, request);
        trace!(?kind, correlation_id, "direct request");

        let mut connection = self.connection()?;
        match connection.exchange(&envelope, expect, read_timeout) {
            Ok(response) => {
                self.release(connection);
                response.decode()
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve a head block id to its state root (one extra round trip).
    fn state_root_for_head(&self, block_id: &str) -> Result<String, TransportError> {
        let response: BlockGetResponse = self.exchange(
            MessageKind::BlockGetRequest,
            &BlockGetRequest {
                block_id: block_id.to_string(),
            },
            MessageKind::BlockGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(
                code,
                format!("cannot resolve head {}", block_id),
            ));
        }
        let block = response
            .block
            .ok_or_else(|| TransportError::InvalidResponse("missing block".to_string()))?;
        Ok(block.decode_header()?.state_root_hash)
    }

    /// Fetch the latest block and return its id and state root.
    fn latest_head_and_root(&self) -> Result<(String, String), TransportError> {
        let response: BlockListResponse = self.exchange(
            MessageKind::BlockListRequest,
            &BlockListRequest {
                paging: PagingControls {
                    start: None,
                    limit: 1,
                },
                sorting: SortControls::default_order(false),
            },
            MessageKind::BlockListResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(code, "cannot resolve latest head"));
        }
        let block = response
            .blocks
            .first()
            .ok_or_else(|| TransportError::InvalidResponse("empty block list".to_string()))?;
        Ok((block.id().to_string(), block.decode_header()?.state_root_hash))
    }

    fn state_at_root(
        &self,
        address: &str,
        head: &str,
        state_root: &str,
    ) -> Result<StateEntry, TransportError> {
        let response: StateGetResponse = self.exchange(
            MessageKind::StateGetRequest,
            &StateGetRequest {
                state_root: state_root.to_string(),
                address: address.to_string(),
            },
            MessageKind::StateGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(
                code,
                format!("state query failed for {}", address),
            ));
        }
        Ok(StateEntry {
            address: address.to_string(),
            data: response.value,
            head: head.to_string(),
        })
    }
}

impl Transport for DirectTransport {
    fn submit_batch_list(&self, batch_list: &BatchList) -> Result<(), TransportError> {
        let response: BatchSubmitResponse = self.exchange(
            MessageKind::BatchSubmitRequest,
            &BatchSubmitRequest {
                batches: batch_list.batches.clone(),
            },
            MessageKind::BatchSubmitResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(code, "batch submission rejected"));
        }
        debug!(batches = batch_list.batches.len(), "batch list submitted");
        Ok(())
    }

    fn batch(&self, batch_id: &str) -> Result<BatchView, TransportError> {
        let response: BatchGetResponse = self.exchange(
            MessageKind::BatchGetRequest,
            &BatchGetRequest {
                batch_id: batch_id.to_string(),
            },
            MessageKind::BatchGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(
                code,
                format!("batch query failed for {}", batch_id),
            ));
        }
        let batch = response
            .batch
            .ok_or_else(|| TransportError::InvalidResponse("missing batch".to_string()))?;
        BatchView::from_wire(&batch)
    }

    fn batches(&self, limit: usize, reverse: bool) -> PageIterator<'_, BatchView> {
        let sorting = SortControls::default_order(reverse);
        paged_source(limit, move |paging| {
            let response: BatchListResponse = self.exchange(
                MessageKind::BatchListRequest,
                &BatchListRequest {
                    paging,
                    sorting: sorting.clone(),
                },
                MessageKind::BatchListResponse,
                IO_TIMEOUT,
            )?;
            if let Some(code) = response.status.error_code() {
                return Err(TransportError::endpoint(code, "batch listing failed"));
            }
            let views = response
                .batches
                .iter()
                .map(BatchView::from_wire)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((views, response.paging))
        })
    }

    fn batch_statuses(
        &self,
        batch_ids: &[String],
        wait_secs: u32,
    ) -> Result<HashMap<String, BatchStatus>, TransportError> {
        let response: BatchStatusResponse = self.exchange(
            MessageKind::BatchStatusRequest,
            &BatchStatusRequest {
                batch_ids: batch_ids.to_vec(),
                wait: wait_secs > 0,
                timeout: wait_secs,
            },
            MessageKind::BatchStatusResponse,
            IO_TIMEOUT + Duration::from_secs(u64::from(wait_secs)),
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(code, "batch status query failed"));
        }
        Ok(response
            .batch_statuses
            .into_iter()
            .map(|entry| (entry.batch_id, entry.status))
            .collect())
    }

    fn block(&self, block_id: &str) -> Result<BlockView, TransportError> {
        let response: BlockGetResponse = self.exchange(
            MessageKind::BlockGetRequest,
            &BlockGetRequest {
                block_id: block_id.to_string(),
            },
            MessageKind::BlockGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(
                code,
                format!("block query failed for {}", block_id),
            ));
        }
        let block = response
            .block
            .ok_or_else(|| TransportError::InvalidResponse("missing block".to_string()))?;
        BlockView::from_wire(&block)
    }

    fn blocks(&self, limit: usize, reverse: bool) -> PageIterator<'_, BlockView> {
        let sorting = SortControls::default_order(reverse);
        paged_source(limit, move |paging| {
            let response: BlockListResponse = self.exchange(
                MessageKind::BlockListRequest,
                &BlockListRequest {
                    paging,
                    sorting: sorting.clone(),
                },
                MessageKind::BlockListResponse,
                IO_TIMEOUT,
            )?;
            if let Some(code) = response.status.error_code() {
                return Err(TransportError::endpoint(code, "block listing failed"));
            }
            let views = response
                .blocks
                .iter()
                .map(BlockView::from_wire)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((views, response.paging))
        })
    }

    fn transaction(&self, transaction_id: &str) -> Result<TransactionView, TransportError> {
        let response: TransactionGetResponse = self.exchange(
            MessageKind::TransactionGetRequest,
            &TransactionGetRequest {
                transaction_id: transaction_id.to_string(),
            },
            MessageKind::TransactionGetResponse,
            IO_TIMEOUT,
        )?;
        if let Some(code) = response.status.error_code() {
            return Err(TransportError::endpoint(
                code,
                format!("transaction query failed for {}", transaction_id),
            ));
        }
        let transaction = response
            .transaction
            .ok_or_else(|| TransportError::InvalidResponse("missing transaction".to_string()))?;
        TransactionView::from_wire(&transaction)
    }

    fn transactions(&self, limit: usize, reverse: bool) -> PageIterator<'_, TransactionView> {
        let sorting = SortControls::default_order(reverse);
        paged_source(limit, move |paging| {
            let response: TransactionListResponse = self.exchange(
                MessageKind::TransactionListRequest,
                &TransactionListRequest {
                    paging,
                    sorting: sorting.clone(),
                },
                MessageKind::TransactionListResponse,
                IO_TIMEOUT,
            )?;
            if let Some(code) = response.status.error_code() {
                return Err(TransportError::endpoint(code, "transaction listing failed"));
            }
            let views = response
                .transactions
                .iter()
                .map(TransactionView::from_wire)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((views, response.paging))
        })
    }

    /// Read state as of the latest block.
    ///
    /// The head is re-resolved on every call, so two head-less reads are not
    /// guaranteed to observe the same ledger snapshot. Pin a head with
    /// [`state_at_head`](Transport::state_at_head) for snapshot consistency.
    fn state(&self, address: &str) -> Result<StateEntry, TransportError> {
        let (head, state_root) = self.latest_head_and_root()?;
        self.state_at_root(address, &head, &state_root)
    }

    fn state_at_head(&self, address: &str, head: &str) -> Result<StateEntry, TransportError> {
        let state_root = self.state_root_for_head(head)?;
        self.state_at_root(address, head, &state_root)
    }

    fn state_entries(
        &self,
        address_prefix: &str,
        limit: usize,
        reverse: bool,
    ) -> PageIterator<'_, StateEntry> {
        let sorting = SortControls::default_order(reverse);
        let address_prefix = address_prefix.to_string();
        // Resolved on the first fetch and pinned, so every page of one
        // traversal reads the same snapshot.
        let mut pinned: Option<(String, String)> = None;

        paged_source(limit, move |paging| {
            let (head, state_root) = match &pinned {
                Some(resolved) => resolved.clone(),
                None => {
                    let resolved = self.latest_head_and_root()?;
                    pinned = Some(resolved.clone());
                    resolved
                }
            };
            let response: StateListResponse = self.exchange(
                MessageKind::StateListRequest,
                &StateListRequest {
                    state_root,
                    address_prefix: address_prefix.clone(),
                    paging,
                    sorting: sorting.clone(),
                },
                MessageKind::StateListResponse,
                IO_TIMEOUT,
            )?;
            if let Some(code) = response.status.error_code() {
                return Err(TransportError::endpoint(code, "state listing failed"));
            }
            let entries = response
                .entries
                .into_iter()
                .map(|entry| StateEntry {
                    address: entry.address,
                    data: entry.data,
                    head: head.clone(),
                })
                .collect();
            Ok((entries, response.paging))
        })
    }
}

impl std::fmt::Debug for DirectTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectTransport")
            .field("address", &self.address)
            .field("idle_connections", &self.pool.idle())
            .field("pool_capacity", &self.pool.capacity())
            .finish()
    }
}

// ============================================================================
// Connection
// ============================================================================

struct Connection {
    stream: TcpStream,
}

impl Connection {
    fn open(address: &str) -> Result<Self, TransportError> {
        let stream =
            TcpStream::connect(address).map_err(|e| TransportError::Network(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::Network(e.to_string()))?;
        stream
            .set_write_timeout(Some(IO_TIMEOUT))
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Connection { stream })
    }

    /// Write one framed request and read frames until the response bearing
    /// the request's correlation id arrives.
    fn exchange(
        &mut self,
        envelope: &Envelope,
        expect: MessageKind,
        read_timeout: Duration,
    ) -> Result<Envelope, TransportError> {
        self.stream
            .set_read_timeout(Some(read_timeout))
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let frame = encode_frame(envelope);
        self.stream
            .write_all(&frame)
            .map_err(|e| TransportError::Network(e.to_string()))?;

        loop {
            let mut length_prefix = [0u8; 4];
            self.stream
                .read_exact(&mut length_prefix)
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let length = u32::from_be_bytes(length_prefix) as usize;
            if length > MAX_MESSAGE_SIZE {
                return Err(TransportError::InvalidResponse(format!(
                    "frame of {} bytes exceeds maximum",
                    length
                )));
            }

            let mut body = vec![0u8; length];
            self.stream
                .read_exact(&mut body)
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let response = decode_frame(&body)?;

            if response.correlation_id != envelope.correlation_id {
                trace!(
                    got = response.correlation_id,
                    want = envelope.correlation_id,
                    "skipping frame with foreign correlation id"
                );
                continue;
            }
            if response.kind != expect {
                return Err(TransportError::InvalidResponse(format!(
                    "expected {:?}, got {:?}",
                    expect, response.kind
                )));
            }
            return Ok(response);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Parse a `tcp://host:port` validator endpoint.
fn parse_endpoint(endpoint: &str) -> Result<String, TransportError> {
    let address = endpoint.strip_prefix("tcp://").unwrap_or(endpoint);
    if address.is_empty() || !address.contains(':') {
        return Err(TransportError::Config(format!(
            "invalid validator endpoint: {}",
            endpoint
        )));
    }
    Ok(address.to_string())
}

/// Build a [`PageIterator`] over `{start, limit}`-paged responses. The
/// continuation comes from each response's explicit `next` field.
fn paged_source<'a, T, F>(limit: usize, mut fetch: F) -> PageIterator<'a, T>
where
    T: Send + 'a,
    F: FnMut(PagingControls) -> Result<(Vec<T>, PagingResponse), TransportError> + Send + 'a,
{
    let mut paging = Some(PagingControls {
        start: None,
        limit: limit as u32,
    });
    PageIterator::new(Box::new(move || {
        let controls = match paging.take() {
            Some(controls) => controls,
            None => return Ok(None),
        };
        let limit = controls.limit;
        let (entries, continuation) = fetch(controls)?;
        paging = continuation.next.map(|start| PagingControls {
            start: Some(start),
            limit,
        });
        Ok(Some(entries))
    }))
}
