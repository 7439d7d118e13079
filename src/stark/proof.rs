//! The STARK proof's wire format (§6): an opaque byte vector built purely
//! by concatenating the channel's sends, in send order. This type is a
//! thin, typed wrapper so callers don't pass raw `Vec<u8>` around, but it
//! carries no structure beyond the bytes themselves — the verifier parses
//! it back out by replaying the same protocol steps in the same order.

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StarkProof {
    bytes: Vec<u8>,
}

impl StarkProof {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        StarkProof { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
