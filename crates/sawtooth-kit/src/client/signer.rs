//! Signer trait and the secp256k1 key-file implementation.
//!
//! A `Signer` derives the public key of the active identity and produces
//! signatures over arbitrary byte sequences. Sawtooth identities are plain
//! secp256k1 keys; public keys travel as lowercase hex compressed points and
//! signatures as lowercase hex 64-byte compact encodings.

use std::path::{Path, PathBuf};

use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::{Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::error::SignerError;

/// Trait for signing transaction and batch headers.
///
/// Implement this to plug in an external key holder (an HSM, a remote
/// signing service); [`InMemorySigner`] covers the common key-file case.
pub trait Signer: Send + Sync {
    /// The lowercase hex, compressed public key of this identity.
    fn public_key(&self) -> &str;

    /// Sign a byte sequence, returning the lowercase hex compact signature.
    fn sign(&self, message: &[u8]) -> Result<String, SignerError>;
}

/// A signer with a single secp256k1 key held in memory.
pub struct InMemorySigner {
    signing_key: SigningKey,
    public_key: String,
}

impl InMemorySigner {
    /// Create a signer from a hex-encoded private key.
    ///
    /// Surrounding whitespace is trimmed, matching the on-disk key-file
    /// format.
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(private_key.trim())
            .map_err(|e| SignerError::InvalidHex(e.to_string()))?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let public_key = hex::encode(
            signing_key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes(),
        );
        Ok(InMemorySigner {
            signing_key,
            public_key,
        })
    }

    /// Load a signer from a private key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SignerError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_hex(&contents)
    }

    /// Load a signer from the default key file,
    /// `~/.sawtooth/keys/<user>.priv`.
    pub fn from_default_key_file() -> Result<Self, SignerError> {
        Self::from_file(default_key_path()?)
    }
}

impl Signer for InMemorySigner {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, message: &[u8]) -> Result<String, SignerError> {
        let signature: Signature = self.signing_key.sign(message);
        Ok(hex::encode(signature.to_bytes()))
    }
}

impl std::fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySigner")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// The default private key location for the current user.
pub fn default_key_path() -> Result<PathBuf, SignerError> {
    let home = dirs::home_dir().ok_or(SignerError::NoDefaultKeyFile)?;
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map_err(|_| SignerError::NoDefaultKeyFile)?;
    Ok(home.join(".sawtooth/keys").join(format!("{}.priv", user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_HEX: &str = "2f1e7b7a098d9d7e8195e5fb0b36a132cb1b1e58a3eeb44e1d412f24e5bd4ebb";

    #[test]
    fn test_from_hex_derives_compressed_public_key() {
        let signer = InMemorySigner::from_hex(KEY_HEX).unwrap();
        let public_key = signer.public_key();
        // 33 bytes compressed, hex encoded, with an 02/03 prefix.
        assert_eq!(public_key.len(), 66);
        assert!(public_key.starts_with("02") || public_key.starts_with("03"));
        assert_eq!(public_key, public_key.to_lowercase());
    }

    #[test]
    fn test_from_hex_trims_whitespace() {
        let trimmed = InMemorySigner::from_hex(KEY_HEX).unwrap();
        let padded = InMemorySigner::from_hex(&format!("  {}\n", KEY_HEX)).unwrap();
        assert_eq!(trimmed.public_key(), padded.public_key());
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(matches!(
            InMemorySigner::from_hex("zz-not-hex"),
            Err(SignerError::InvalidHex(_))
        ));
        assert!(matches!(
            InMemorySigner::from_hex("abcd"),
            Err(SignerError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_sign_is_deterministic_and_verifiable() {
        use k256::ecdsa::signature::Verifier;

        let signer = InMemorySigner::from_hex(KEY_HEX).unwrap();
        let first = signer.sign(b"message").unwrap();
        let second = signer.sign(b"message").unwrap();
        // RFC 6979 deterministic nonces: identical input, identical signature.
        assert_eq!(first, second);
        assert_eq!(first.len(), 128);

        let signature = Signature::from_slice(&hex::decode(&first).unwrap()).unwrap();
        let verifying_key = signer.signing_key.verifying_key();
        assert!(verifying_key.verify(b"message", &signature).is_ok());
        assert!(verifying_key.verify(b"tampered", &signature).is_err());
    }

    #[test]
    fn test_from_file_reads_and_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", KEY_HEX).unwrap();

        let signer = InMemorySigner::from_file(file.path()).unwrap();
        assert_eq!(
            signer.public_key(),
            InMemorySigner::from_hex(KEY_HEX).unwrap().public_key()
        );
    }

    #[test]
    fn test_from_file_missing_reports_path() {
        let err = InMemorySigner::from_file("/nonexistent/key.priv").unwrap_err();
        match err {
            SignerError::KeyFile { path, .. } => assert_eq!(path, "/nonexistent/key.priv"),
            other => panic!("expected key file error, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_omits_private_key() {
        let signer = InMemorySigner::from_hex(KEY_HEX).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.contains("public_key"));
        assert!(!debug.contains(KEY_HEX));
    }
}
