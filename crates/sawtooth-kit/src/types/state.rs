//! State entry type.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// One entry of replicated state.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// The 70-character hex address of the entry.
    pub address: String,
    /// The opaque payload, decoded from its transit encoding. Hand these
    /// bytes to the application's payload codec.
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
    /// The block id this entry was read under.
    pub head: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_entry_json_data_is_base64() {
        let entry = StateEntry {
            address: "1cf126".to_string(),
            data: b"{\"x\":5}".to_vec(),
            head: "block1".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["data"], "eyJ4Ijo1fQ==");

        let back: StateEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
