//! A clean, ergonomic Rust client SDK for Hyperledger Sawtooth.
//!
//! **sawtooth-kit** builds, signs, and submits transaction batches to a
//! Sawtooth network and queries its replicated state, over either of two
//! interchangeable wire protocols: the HTTP/JSON gateway (the REST API) or
//! the framed binary protocol straight to a validator.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sawtooth_kit::SawtoothBuilder;
//! # use sawtooth_kit::{Error, PayloadCodec};
//! # fn main_with<C: PayloadCodec<Payload = Vec<u8>>>(codec: C) -> Result<(), Error> {
//! // Configure once: endpoint, identity, application codec.
//! let client = SawtoothBuilder::gateway("http://localhost:8008").build(codec)?;
//!
//! // Submit a payload as one atomic batch and wait for it to commit.
//! let batch_id = client.execute_payload_sync(&b"payload".to_vec(), 30, 5)?;
//! println!("committed: {}", batch_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! 1. **Single entry point**: everything hangs off the [`Sawtooth`] client
//! 2. **Configure once**: endpoint, key material, and codec are fixed at
//!    construction, which probes connectivity and fails fast
//! 3. **Two wires, one contract**: the [`Transport`] trait means application
//!    code cannot tell the gateway and the direct protocol apart
//! 4. **Fire-and-forget by default**: commit-waiting is an explicit opt-in
//!    (`execute_payload_sync`, [`Sawtooth::wait_batch`])
//!
//! # Core Types
//!
//! - [`Sawtooth`] / [`SawtoothBuilder`] — the client and its builder
//! - [`Transport`] — submit/query contract over both wire protocols
//! - [`PayloadCodec`] — the seam an application family implements
//! - [`Signer`] / [`InMemorySigner`] — secp256k1 identity
//! - [`Transaction`], [`Batch`], [`BatchList`] — signed wire entities
//! - [`BatchStatus`] — polled commit status
//! - [`PageIterator`] — lazy cursor over listing endpoints

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorCode, SignerError, TransportError};
pub use types::*;

// Re-export client types
pub use client::{
    InMemorySigner, PayloadCodec, Sawtooth, SawtoothBuilder, Signer, default_key_path, hex_digest,
};

// Re-export transport types
pub use transport::{
    DEFAULT_POOL_CAPACITY, DirectTransport, PageIterator, RestTransport, Transport, TransportKind,
    connect,
};
