//! Message pipeline: decrypt -> reverse -> re-encrypt
//!
//! Envelope format (binary):
//! ```text
//! [16 bytes: IV][N bytes: AES-128-CBC ciphertext, PKCS#7 padded]
//! ```
//!
//! Stages run strictly in order and any failure ends the run:
//! `AwaitingEnvelope -> Decrypting -> Reversing -> Encrypting -> Done`.
//! The reply always carries a freshly generated IV.

use hsim_core::{HsimError, HsimResult};
use zeroize::Zeroizing;

use crate::cipher;
use crate::keys::{InitializationVector, SymmetricKey};
use crate::IV_SIZE;

/// Pipeline stage, reported through tracing as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingEnvelope,
    Decrypting,
    Reversing,
    Encrypting,
    Done,
}

/// An IV followed by its ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    iv: InitializationVector,
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn new(iv: InitializationVector, ciphertext: Vec<u8>) -> Self {
        Self { iv, ciphertext }
    }

    /// Split raw envelope bytes into IV and ciphertext.
    pub fn split(bytes: &[u8]) -> HsimResult<Self> {
        if bytes.len() < IV_SIZE {
            return Err(HsimError::EnvelopeTooShort { len: bytes.len() });
        }
        let (iv, ciphertext) = bytes.split_at(IV_SIZE);
        Ok(Self {
            iv: InitializationVector::from_slice(iv)?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Encrypt `plaintext` under a fresh random IV.
    pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> HsimResult<Self> {
        let iv = InitializationVector::generate()?;
        let ciphertext = cipher::encrypt(plaintext, key.as_bytes(), iv.as_bytes())?;
        Ok(Self { iv, ciphertext })
    }

    /// Decrypt the payload with `key`.
    pub fn open(&self, key: &SymmetricKey) -> HsimResult<Zeroizing<Vec<u8>>> {
        cipher::decrypt(&self.ciphertext, key.as_bytes(), self.iv.as_bytes()).map(Zeroizing::new)
    }

    pub fn iv(&self) -> &InitializationVector {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// `IV || ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.iv.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Result of a completed pipeline run.
pub struct Exchange {
    /// The envelope to send back
    pub reply: Envelope,
    /// Decrypted incoming message
    pub plaintext: Zeroizing<String>,
    /// The reversed message that was re-encrypted
    pub reversed: Zeroizing<String>,
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("reply", &self.reply)
            .field("plaintext", &"[REDACTED]")
            .field("reversed", &"[REDACTED]")
            .finish()
    }
}

/// Reverse a string by Unicode scalar values.
pub fn reverse_text(text: &str) -> String {
    text.chars().rev().collect()
}

/// Run the full pipeline over raw envelope bytes.
pub fn process_envelope(bytes: &[u8], key: &SymmetricKey) -> HsimResult<Exchange> {
    enter(Stage::AwaitingEnvelope);
    let envelope = Envelope::split(bytes)?;

    enter(Stage::Decrypting);
    let plaintext = decrypt_text(&envelope, key)?;

    enter(Stage::Reversing);
    let reversed = Zeroizing::new(reverse_text(&plaintext));

    enter(Stage::Encrypting);
    let reply = Envelope::seal(reversed.as_bytes(), key)?;

    enter(Stage::Done);
    tracing::info!(
        input_len = bytes.len(),
        reply_len = IV_SIZE + reply.ciphertext.len(),
        "message pipeline complete"
    );
    Ok(Exchange {
        reply,
        plaintext,
        reversed,
    })
}

fn decrypt_text(envelope: &Envelope, key: &SymmetricKey) -> HsimResult<Zeroizing<String>> {
    let mut raw = envelope.open(key)?;
    let bytes = std::mem::take(&mut *raw);
    String::from_utf8(bytes)
        .map(Zeroizing::new)
        .map_err(HsimError::InvalidUtf8)
}

fn enter(stage: Stage) {
    tracing::debug!(stage = ?stage, "pipeline stage");
}
