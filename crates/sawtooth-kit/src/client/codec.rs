//! The payload codec seam between the SDK and an application family.

use crate::error::Error;

/// Application-supplied codec for one transaction family.
///
/// The codec is bound once at client construction. It owns everything the
/// SDK must not know: the family identity, the payload wire format, and the
/// addressing scheme. The builder asks it to encode each payload and to
/// declare the inputs, outputs, and dependencies that go into the
/// transaction header.
///
/// # Example
///
/// ```rust
/// use sawtooth_kit::{Error, PayloadCodec, hex_digest};
///
/// struct RawCodec;
///
/// impl PayloadCodec for RawCodec {
///     type Payload = Vec<u8>;
///     type StateValue = Vec<u8>;
///
///     fn family_name(&self) -> &str {
///         "raw"
///     }
///
///     fn family_version(&self) -> &str {
///         "1.0"
///     }
///
///     fn encode_payload(&self, payload: &Vec<u8>) -> Result<Vec<u8>, Error> {
///         Ok(payload.clone())
///     }
///
///     fn decode_payload(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
///         Ok(bytes.to_vec())
///     }
///
///     fn input_addresses(&self, payload: &Vec<u8>) -> Vec<String> {
///         vec![format!("{}{}", &hex_digest(b"raw")[..6], &hex_digest(payload)[..64])]
///     }
///
///     fn output_addresses(&self, payload: &Vec<u8>) -> Vec<String> {
///         self.input_addresses(payload)
///     }
///
///     fn encode_state(&self, value: &Vec<u8>) -> Result<Vec<u8>, Error> {
///         Ok(value.clone())
///     }
///
///     fn decode_state(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
///         Ok(bytes.to_vec())
///     }
/// }
/// ```
pub trait PayloadCodec: Send + Sync {
    /// The application's payload type.
    type Payload;
    /// The application's decoded state representation.
    type StateValue;

    /// Name of the transaction family that interprets these payloads.
    fn family_name(&self) -> &str;

    /// Version of the transaction family.
    fn family_version(&self) -> &str;

    /// Encode a payload to its exact wire bytes. The payload digest in the
    /// transaction header is computed over these bytes.
    fn encode_payload(&self, payload: &Self::Payload) -> Result<Vec<u8>, Error>;

    /// Decode wire bytes back into a payload.
    fn decode_payload(&self, bytes: &[u8]) -> Result<Self::Payload, Error>;

    /// State addresses the payload's transaction may read.
    fn input_addresses(&self, payload: &Self::Payload) -> Vec<String>;

    /// State addresses the payload's transaction may write.
    fn output_addresses(&self, payload: &Self::Payload) -> Vec<String>;

    /// Ids of transactions that must commit before this payload's
    /// transaction. Most families have none.
    fn dependencies(&self, payload: &Self::Payload) -> Vec<String> {
        let _ = payload;
        Vec::new()
    }

    /// Encode a state value to its stored representation.
    fn encode_state(&self, value: &Self::StateValue) -> Result<Vec<u8>, Error>;

    /// Decode a stored state blob.
    fn decode_state(&self, bytes: &[u8]) -> Result<Self::StateValue, Error>;
}
