//! hsim-crypto: primitives for the hsim two-phase exchange simulator
//!
//! Phase 1 (key agreement):
//! ```text
//! a  <- OsRng, a < 2^(bits(p) - 1)
//! AA =  g^a mod p                      (sent to the peer)
//! V  =  B^a mod p                      (B received from the peer)
//! S  =  SHA-256(V)[16..32]             (128-bit AES session key)
//! ```
//!
//! Phase 2 (message exchange):
//! ```text
//! [IV][AES-128-CBC(S, IV, m)]  ->  decrypt  ->  reverse(m)  ->  [IV'][AES-128-CBC(S, IV', rev(m))]
//! ```
//!
//! All persisted values cross the boundary as lowercase hex (see [`codec`]).

pub mod cipher;
pub mod codec;
pub mod dh;
pub mod kdf;
pub mod keys;
pub mod params;
pub mod pipeline;

pub use cipher::{decrypt, encrypt};
pub use codec::{biguint_to_hex, bytes_to_hex, hex_to_biguint, hex_to_bytes};
pub use dh::{
    compute_shared_secret, derive_public_value, generate_private_exponent, PrivateExponent,
    PublicValue, SharedSecret,
};
pub use kdf::{derive_session_key, sha256};
pub use keys::{generate_iv, InitializationVector, SymmetricKey};
pub use params::DomainParameters;
pub use pipeline::{process_envelope, reverse_text, Envelope, Exchange, Stage};

/// Size of an AES-128 key in bytes
pub const KEY_SIZE: usize = 16;

/// Size of a CBC initialization vector
pub const IV_SIZE: usize = 16;

/// AES block size
pub const BLOCK_SIZE: usize = 16;
