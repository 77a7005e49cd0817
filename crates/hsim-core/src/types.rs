use serde::{Deserialize, Serialize};

/// A named blob in the persistence layer.
///
/// Every slot holds lowercase hexadecimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Diffie-Hellman private exponent `a`
    PrivateExponent,
    /// Our public value `AA = g^a mod p`
    PublicValue,
    /// The peer's public value `B`
    PeerPublicValue,
    /// 128-bit pre-shared AES key
    SessionKey,
    /// Incoming envelope (`IV || ciphertext`)
    Message,
    /// Outgoing envelope with the reversed message
    MessageInverted,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::PrivateExponent => "private_exponent",
            Slot::PublicValue => "public_value",
            Slot::PeerPublicValue => "peer_public_value",
            Slot::SessionKey => "session_key",
            Slot::Message => "message",
            Slot::MessageInverted => "message_inverted",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
