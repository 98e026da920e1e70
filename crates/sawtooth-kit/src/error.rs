//! Error types for sawtooth-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) — Main error type, returned by most operations
//!   - [`TransportError`] — Transport-level errors (network, endpoint status,
//!     malformed responses), shared by both the gateway and direct transports
//!   - [`SignerError`] — Key loading and signing failures
//! - [`ErrorCode`] — The closed, endpoint-reported error-code space. Both
//!   transports normalize their own status vocabulary into this one enum.
//!
//! # Checking Error Codes
//!
//! ```rust,no_run
//! use sawtooth_kit::{ErrorCode, TransportError};
//!
//! fn is_missing_state(err: &TransportError) -> bool {
//!     err.error_code() == Some(ErrorCode::StateNotFound)
//! }
//! ```

use thiserror::Error;

// ============================================================================
// ErrorCode
// ============================================================================

/// An error code reported by a Sawtooth endpoint.
///
/// The numeric values are the wire contract: the gateway reports them in its
/// JSON error envelope, and the direct transport maps each response kind's
/// embedded status onto them. Codes the client does not recognize collapse to
/// [`ErrorCode::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    Unknown = 1024,

    // ─── Validator ───
    ValidatorUnknownError = 10,
    ValidatorNotReady = 15,
    ValidatorTimedOut = 17,
    ValidatorDisconnected = 18,
    ValidatorInvalidResponse = 20,

    // ─── Batch submission/status ───
    BatchStatusUnavailable = 27,
    BatchInvalid = 30,
    BatchUnableToAccept = 31,
    BatchNoneSubmitted = 34,
    BatchNotDecodable = 35,

    // ─── Query validation ───
    InvalidHead = 50,
    InvalidCountQuery = 53,
    InvalidPagingQuery = 54,
    InvalidSortQuery = 57,
    InvalidResourceId = 60,
    InvalidStateAddress = 62,

    // ─── Not found, per entity kind ───
    BlockNotFound = 70,
    BatchNotFound = 71,
    TransactionNotFound = 72,
    StateNotFound = 75,
    TransactionReceiptNotFound = 80,
}

impl ErrorCode {
    /// Map a numeric wire code onto the closed enum.
    ///
    /// Unrecognized values become [`ErrorCode::Unknown`] rather than failing;
    /// an endpoint speaking a newer protocol revision must still classify.
    pub fn from_code(code: u32) -> Self {
        match code {
            10 => ErrorCode::ValidatorUnknownError,
            15 => ErrorCode::ValidatorNotReady,
            17 => ErrorCode::ValidatorTimedOut,
            18 => ErrorCode::ValidatorDisconnected,
            20 => ErrorCode::ValidatorInvalidResponse,
            27 => ErrorCode::BatchStatusUnavailable,
            30 => ErrorCode::BatchInvalid,
            31 => ErrorCode::BatchUnableToAccept,
            34 => ErrorCode::BatchNoneSubmitted,
            35 => ErrorCode::BatchNotDecodable,
            50 => ErrorCode::InvalidHead,
            53 => ErrorCode::InvalidCountQuery,
            54 => ErrorCode::InvalidPagingQuery,
            57 => ErrorCode::InvalidSortQuery,
            60 => ErrorCode::InvalidResourceId,
            62 => ErrorCode::InvalidStateAddress,
            70 => ErrorCode::BlockNotFound,
            71 => ErrorCode::BatchNotFound,
            72 => ErrorCode::TransactionNotFound,
            75 => ErrorCode::StateNotFound,
            80 => ErrorCode::TransactionReceiptNotFound,
            _ => ErrorCode::Unknown,
        }
    }

    /// The numeric wire value of this code.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether this code is one of the per-entity "not found" codes.
    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            ErrorCode::BlockNotFound
                | ErrorCode::BatchNotFound
                | ErrorCode::TransactionNotFound
                | ErrorCode::StateNotFound
                | ErrorCode::TransactionReceiptNotFound
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Unknown => "unknown error",
            ErrorCode::ValidatorUnknownError => "validator unknown error",
            ErrorCode::ValidatorNotReady => "validator not ready",
            ErrorCode::ValidatorTimedOut => "validator timed out",
            ErrorCode::ValidatorDisconnected => "validator disconnected",
            ErrorCode::ValidatorInvalidResponse => "validator invalid response",
            ErrorCode::BatchStatusUnavailable => "batch status unavailable",
            ErrorCode::BatchInvalid => "batch invalid",
            ErrorCode::BatchUnableToAccept => "batch unable to accept",
            ErrorCode::BatchNoneSubmitted => "no batches submitted",
            ErrorCode::BatchNotDecodable => "batch not decodable",
            ErrorCode::InvalidHead => "invalid head",
            ErrorCode::InvalidCountQuery => "invalid count query",
            ErrorCode::InvalidPagingQuery => "invalid paging query",
            ErrorCode::InvalidSortQuery => "invalid sort query",
            ErrorCode::InvalidResourceId => "invalid resource id",
            ErrorCode::InvalidStateAddress => "invalid state address",
            ErrorCode::BlockNotFound => "block not found",
            ErrorCode::BatchNotFound => "batch not found",
            ErrorCode::TransactionNotFound => "transaction not found",
            ErrorCode::StateNotFound => "state not found",
            ErrorCode::TransactionReceiptNotFound => "transaction receipt not found",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

// ============================================================================
// SignerError
// ============================================================================

/// Error loading key material or producing a signature.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Could not read private key from {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Private key is not valid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Could not determine the default key file location")]
    NoDefaultKeyFile,

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

// ============================================================================
// TransportError
// ============================================================================

/// Transport-level errors, shared by the gateway and direct transports.
///
/// `TransportError` is `Clone` so that a page iterator can record its first
/// failure and keep reporting it on every subsequent advance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The configured endpoint is not a usable URL.
    #[error("Invalid endpoint: {0}")]
    Config(String),

    /// The endpoint could not be reached, or the connection failed mid-request.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered, but with an error status.
    ///
    /// `status` carries the raw HTTP status for the gateway transport; the
    /// direct transport reports embedded statuses only, so it leaves `status`
    /// unset.
    #[error("Endpoint returned {code}: {message}")]
    Endpoint {
        code: ErrorCode,
        status: Option<u16>,
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An iterator was read before a successful advance, or after exhaustion.
    #[error("Iterator has no current entry")]
    NoCurrentEntry,
}

impl TransportError {
    /// Create an [`TransportError::Endpoint`] without an HTTP status.
    pub fn endpoint(code: ErrorCode, message: impl Into<String>) -> Self {
        TransportError::Endpoint {
            code,
            status: None,
            message: message.into(),
        }
    }

    /// The normalized error code, if the endpoint reported one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            TransportError::Endpoint { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this error means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        self.error_code().is_some_and(ErrorCode::is_not_found)
    }

    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Endpoint { code, .. } => matches!(
                code,
                ErrorCode::ValidatorNotReady
                    | ErrorCode::ValidatorTimedOut
                    | ErrorCode::ValidatorDisconnected
                    | ErrorCode::BatchUnableToAccept
            ),
            _ => false,
        }
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for sawtooth-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ─── Signing ───
    #[error(transparent)]
    Signing(#[from] SignerError),

    // ─── Payload codec ───
    #[error("Payload codec error: {0}")]
    Codec(String),

    // ─── Transport ───
    #[error(transparent)]
    Transport(#[from] TransportError),

    // ─── Commit waiting ───
    #[error("Batch {batch_id} is invalid: {detail}")]
    BatchInvalid { batch_id: String, detail: String },

    #[error("Batch {batch_id} was not committed within {timeout_secs} seconds")]
    BatchNotCommitted { batch_id: String, timeout_secs: u64 },
}

impl Error {
    /// The endpoint-reported error code, if this error carries one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Error::Transport(e) => e.error_code(),
            _ => None,
        }
    }
}
