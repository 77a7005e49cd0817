//! Fixed-size key and IV types

use hsim_core::{HsimError, HsimResult};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::codec;
use crate::{IV_SIZE, KEY_SIZE};

/// A pre-shared 128-bit AES key. Zeroized on drop.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of an arbitrary slice, rejecting anything but 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> HsimResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| HsimError::InvalidKeyLength { len: bytes.len() })?;
        Ok(Self { bytes })
    }

    /// Decode the key slot format (hex text).
    pub fn from_hex(text: &str) -> HsimResult<Self> {
        let mut raw = codec::hex_to_bytes(text.trim())?;
        let key = Self::from_slice(&raw);
        raw.zeroize();
        key
    }

    pub fn to_hex(&self) -> String {
        codec::bytes_to_hex(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A 128-bit CBC initialization vector.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InitializationVector {
    bytes: [u8; IV_SIZE],
}

impl InitializationVector {
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> HsimResult<Self> {
        let bytes: [u8; IV_SIZE] = bytes
            .try_into()
            .map_err(|_| HsimError::InvalidIvLength { len: bytes.len() })?;
        Ok(Self { bytes })
    }

    /// Draw a fresh IV from the operating system CSPRNG.
    pub fn generate() -> HsimResult<Self> {
        let mut bytes = [0u8; IV_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| HsimError::RandomnessUnavailable(e.to_string()))?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for InitializationVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InitializationVector({})", codec::bytes_to_hex(&self.bytes))
    }
}

/// Generate a random IV. Never derived from the key or the plaintext.
pub fn generate_iv() -> HsimResult<InitializationVector> {
    InitializationVector::generate()
}
