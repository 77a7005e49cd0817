//! AES-128-CBC with PKCS#7 padding
//!
//! Key and IV are taken as raw slices so length errors surface as
//! `InvalidKeyLength` / `InvalidIvLength` instead of panics. Key length is
//! checked first.
//!
//! CBC carries no authentication tag: a wrong key is only detected when the
//! padding happens to be malformed, and otherwise yields garbage plaintext.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hsim_core::{HsimError, HsimResult};

use crate::{BLOCK_SIZE, IV_SIZE, KEY_SIZE};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Encrypt `plaintext`, padding it to a multiple of the block size.
///
/// Output length is always `(plaintext.len() / 16 + 1) * 16`.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> HsimResult<Vec<u8>> {
    validate_key_and_iv(key, iv)?;
    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| HsimError::CipherInit(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt `ciphertext` and strip the padding.
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> HsimResult<Vec<u8>> {
    validate_key_and_iv(key, iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(HsimError::Decryption(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| HsimError::CipherInit(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| HsimError::Decryption("invalid padding: wrong key or corrupted data".into()))
}

fn validate_key_and_iv(key: &[u8], iv: &[u8]) -> HsimResult<()> {
    if key.len() != KEY_SIZE {
        return Err(HsimError::InvalidKeyLength { len: key.len() });
    }
    if iv.len() != IV_SIZE {
        return Err(HsimError::InvalidIvLength { len: iv.len() });
    }
    Ok(())
}
