//! Client module: identity, payload codec seam, signing pipeline, and the
//! [`Sawtooth`] facade.
//!
//! - [`Sawtooth`] — the main client; submits payloads and waits for commits
//! - [`SawtoothBuilder`] — fluent construction (endpoint, key material, codec)
//! - [`Signer`] / [`InMemorySigner`] — the signing provider seam
//! - [`PayloadCodec`] — the application family seam

mod codec;
mod sawtooth;
mod signer;
mod transaction;

pub use codec::PayloadCodec;
pub use sawtooth::{Sawtooth, SawtoothBuilder};
pub use signer::{InMemorySigner, Signer, default_key_path};
pub use transaction::hex_digest;
