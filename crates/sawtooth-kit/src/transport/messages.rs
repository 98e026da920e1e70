//! Message catalogue for the direct validator protocol.
//!
//! Every request travels as a framed [`Envelope`]: a 4-byte big-endian length
//! prefix followed by the borsh-encoded envelope, whose `content` is the
//! borsh-encoded message body for the envelope's [`MessageKind`]. Responses
//! echo the request's correlation id.
//!
//! Each response kind carries its own status enumeration, and each status
//! enumeration maps *exhaustively* onto the shared [`ErrorCode`] space — an
//! unrecognized wire discriminant fails at decode time rather than slipping
//! through as success.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{ErrorCode, TransportError};
use crate::types::{Batch, BatchStatus, Block, Transaction};

/// Upper bound for a single frame; guards against nonsense length prefixes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

// ============================================================================
// Envelope
// ============================================================================

/// The wire kind of a message; one request/response pair per capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MessageKind {
    PeersGetRequest,
    PeersGetResponse,
    BatchSubmitRequest,
    BatchSubmitResponse,
    BatchStatusRequest,
    BatchStatusResponse,
    BatchGetRequest,
    BatchGetResponse,
    BatchListRequest,
    BatchListResponse,
    BlockGetRequest,
    BlockGetResponse,
    BlockListRequest,
    BlockListResponse,
    TransactionGetRequest,
    TransactionGetResponse,
    TransactionListRequest,
    TransactionListResponse,
    StateGetRequest,
    StateGetResponse,
    StateListRequest,
    StateListResponse,
}

/// The framed unit of the direct protocol.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Envelope {
    pub kind: MessageKind,
    /// Matches a response to its request on a shared connection.
    pub correlation_id: u64,
    /// Borsh-encoded message body for `kind`.
    pub content: Vec<u8>,
}

impl Envelope {
    pub fn new<M: BorshSerialize>(
        kind: MessageKind,
        correlation_id: u64,
        message: &M,
    ) -> Envelope {
        Envelope {
            kind,
            correlation_id,
            content: borsh::to_vec(message).expect("message serialization should never fail"),
        }
    }

    /// Decode the envelope content as a message of type `M`.
    pub fn decode<M: BorshDeserialize>(&self) -> Result<M, TransportError> {
        borsh::from_slice(&self.content).map_err(|e| {
            TransportError::InvalidResponse(format!("undecodable {:?} body: {}", self.kind, e))
        })
    }
}

/// Encode an envelope into a length-prefixed frame.
pub fn encode_frame(envelope: &Envelope) -> Vec<u8> {
    let body = borsh::to_vec(envelope).expect("envelope serialization should never fail");
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    frame
}

/// Decode a frame body (the bytes after the length prefix).
pub fn decode_frame(body: &[u8]) -> Result<Envelope, TransportError> {
    borsh::from_slice(body)
        .map_err(|e| TransportError::InvalidResponse(format!("undecodable frame: {}", e)))
}

// ============================================================================
// Paging and sorting controls
// ============================================================================

/// Explicit paging cursor for listing requests.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PagingControls {
    /// Id to start from; `None` means the head of the listing.
    pub start: Option<String>,
    /// Maximum number of entries per page; 0 lets the endpoint choose.
    pub limit: u32,
}

/// Sort key selection for listing requests.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SortControls {
    pub keys: Vec<String>,
    pub reverse: bool,
}

impl SortControls {
    /// The endpoint's default ordering, optionally reversed.
    pub fn default_order(reverse: bool) -> Vec<SortControls> {
        vec![SortControls {
            keys: vec!["default".to_string()],
            reverse,
        }]
    }
}

/// Continuation data returned by listing responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PagingResponse {
    /// Start id for the next page; `None` when the listing is exhausted.
    pub next: Option<String>,
}

// ============================================================================
// Peers (liveness probe)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PeersGetRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PeersStatus {
    Ok,
    Error,
}

impl PeersStatus {
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            PeersStatus::Ok => None,
            PeersStatus::Error => Some(ErrorCode::ValidatorUnknownError),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PeersGetResponse {
    pub status: PeersStatus,
    pub peers: Vec<String>,
}

// ============================================================================
// Batch submission
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchSubmitRequest {
    pub batches: Vec<Batch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum BatchSubmitStatus {
    Ok,
    InternalError,
    InvalidBatch,
    QueueFull,
}

impl BatchSubmitStatus {
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            BatchSubmitStatus::Ok => None,
            BatchSubmitStatus::InternalError => Some(ErrorCode::ValidatorUnknownError),
            BatchSubmitStatus::InvalidBatch => Some(ErrorCode::BatchInvalid),
            BatchSubmitStatus::QueueFull => Some(ErrorCode::BatchUnableToAccept),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchSubmitResponse {
    pub status: BatchSubmitStatus,
}

// ============================================================================
// Batch status
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchStatusRequest {
    pub batch_ids: Vec<String>,
    /// Ask the endpoint to hold the request until a terminal status or the
    /// timeout elapses.
    pub wait: bool,
    pub timeout: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum BatchStatusQueryStatus {
    Ok,
    InternalError,
    InvalidId,
    NoResource,
}

impl BatchStatusQueryStatus {
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            BatchStatusQueryStatus::Ok => None,
            BatchStatusQueryStatus::InternalError => Some(ErrorCode::ValidatorUnknownError),
            BatchStatusQueryStatus::InvalidId => Some(ErrorCode::InvalidResourceId),
            BatchStatusQueryStatus::NoResource => Some(ErrorCode::BatchStatusUnavailable),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchStatusEntry {
    pub batch_id: String,
    pub status: BatchStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchStatusResponse {
    pub status: BatchStatusQueryStatus,
    pub batch_statuses: Vec<BatchStatusEntry>,
}

// ============================================================================
// Entity get/list
// ============================================================================

/// Status vocabulary shared in shape (not in meaning) by the three get
/// responses; each response kind keeps its own enum so the not-found image
/// stays per-entity.
macro_rules! get_status {
    ($name:ident, $not_found:expr) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
        pub enum $name {
            Ok,
            InternalError,
            InvalidId,
            NoResource,
        }

        impl $name {
            pub fn error_code(self) -> Option<ErrorCode> {
                match self {
                    $name::Ok => None,
                    $name::InternalError => Some(ErrorCode::ValidatorUnknownError),
                    $name::InvalidId => Some(ErrorCode::InvalidResourceId),
                    $name::NoResource => Some($not_found),
                }
            }
        }
    };
}

macro_rules! list_status {
    ($name:ident, $not_found:expr) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
        pub enum $name {
            Ok,
            InternalError,
            NotReady,
            NoRoot,
            InvalidPaging,
            InvalidSort,
            InvalidId,
            NoResource,
        }

        impl $name {
            pub fn error_code(self) -> Option<ErrorCode> {
                match self {
                    $name::Ok => None,
                    $name::InternalError => Some(ErrorCode::ValidatorUnknownError),
                    $name::NotReady => Some(ErrorCode::ValidatorNotReady),
                    $name::NoRoot => Some(ErrorCode::InvalidHead),
                    $name::InvalidPaging => Some(ErrorCode::InvalidPagingQuery),
                    $name::InvalidSort => Some(ErrorCode::InvalidSortQuery),
                    $name::InvalidId => Some(ErrorCode::InvalidResourceId),
                    $name::NoResource => Some($not_found),
                }
            }
        }
    };
}

get_status!(BatchGetStatus, ErrorCode::BatchNotFound);
get_status!(BlockGetStatus, ErrorCode::BlockNotFound);
get_status!(TransactionGetStatus, ErrorCode::TransactionNotFound);
list_status!(BatchListStatus, ErrorCode::BatchNotFound);
list_status!(BlockListStatus, ErrorCode::BlockNotFound);
list_status!(TransactionListStatus, ErrorCode::TransactionNotFound);

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchGetRequest {
    pub batch_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchGetResponse {
    pub status: BatchGetStatus,
    pub batch: Option<Batch>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchListRequest {
    pub paging: PagingControls,
    pub sorting: Vec<SortControls>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BatchListResponse {
    pub status: BatchListStatus,
    pub batches: Vec<Batch>,
    pub paging: PagingResponse,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockGetRequest {
    pub block_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockGetResponse {
    pub status: BlockGetStatus,
    pub block: Option<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockListRequest {
    pub paging: PagingControls,
    pub sorting: Vec<SortControls>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BlockListResponse {
    pub status: BlockListStatus,
    pub blocks: Vec<Block>,
    pub paging: PagingResponse,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionGetRequest {
    pub transaction_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionGetResponse {
    pub status: TransactionGetStatus,
    pub transaction: Option<Transaction>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionListRequest {
    pub paging: PagingControls,
    pub sorting: Vec<SortControls>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionListResponse {
    pub status: TransactionListStatus,
    pub transactions: Vec<Transaction>,
    pub paging: PagingResponse,
}

// ============================================================================
// State get/list
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum StateGetStatus {
    Ok,
    InternalError,
    NotReady,
    NoRoot,
    InvalidRoot,
    InvalidAddress,
    NoResource,
}

impl StateGetStatus {
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            StateGetStatus::Ok => None,
            StateGetStatus::InternalError => Some(ErrorCode::ValidatorUnknownError),
            StateGetStatus::NotReady => Some(ErrorCode::ValidatorNotReady),
            StateGetStatus::NoRoot => Some(ErrorCode::InvalidHead),
            StateGetStatus::InvalidRoot => Some(ErrorCode::InvalidHead),
            StateGetStatus::InvalidAddress => Some(ErrorCode::InvalidStateAddress),
            StateGetStatus::NoResource => Some(ErrorCode::StateNotFound),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum StateListStatus {
    Ok,
    InternalError,
    NotReady,
    NoRoot,
    InvalidRoot,
    InvalidPaging,
    InvalidSort,
    InvalidAddress,
    NoResource,
}

impl StateListStatus {
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            StateListStatus::Ok => None,
            StateListStatus::InternalError => Some(ErrorCode::ValidatorUnknownError),
            StateListStatus::NotReady => Some(ErrorCode::ValidatorNotReady),
            StateListStatus::NoRoot => Some(ErrorCode::InvalidHead),
            StateListStatus::InvalidRoot => Some(ErrorCode::InvalidHead),
            StateListStatus::InvalidPaging => Some(ErrorCode::InvalidPagingQuery),
            StateListStatus::InvalidSort => Some(ErrorCode::InvalidSortQuery),
            StateListStatus::InvalidAddress => Some(ErrorCode::InvalidStateAddress),
            StateListStatus::NoResource => Some(ErrorCode::StateNotFound),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateGetRequest {
    /// State root to address the query at; resolved from a block header.
    pub state_root: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateGetResponse {
    pub status: StateGetStatus,
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateListRequest {
    pub state_root: String,
    pub address_prefix: String,
    pub paging: PagingControls,
    pub sorting: Vec<SortControls>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateListEntry {
    pub address: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StateListResponse {
    pub status: StateListStatus,
    pub entries: Vec<StateListEntry>,
    pub paging: PagingResponse,
}
