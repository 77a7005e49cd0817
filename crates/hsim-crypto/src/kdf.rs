//! Session key derivation: shared secret `V` -> 128-bit AES key
//!
//! `S = SHA-256(V)[16..32]`, i.e. the least-significant 128 bits of the digest,
//! with `V` encoded as minimal big-endian bytes.

use sha2::{Digest, Sha256};

use crate::dh::SharedSecret;
use crate::keys::SymmetricKey;
use crate::KEY_SIZE;

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Derive the session key from a Diffie-Hellman shared secret.
pub fn derive_session_key(shared: &SharedSecret) -> SymmetricKey {
    let digest = sha256(&shared.to_bytes_be());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[digest.len() - KEY_SIZE..]);
    SymmetricKey::from_bytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::bytes_to_hex;
    use crate::dh::{compute_shared_secret, derive_public_value, PrivateExponent};
    use crate::params::DomainParameters;
    use num_bigint::BigUint;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            bytes_to_hex(&sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_session_key_is_low_half_of_digest() {
        let params = DomainParameters::standard();
        let two = PrivateExponent::from_biguint(BigUint::from(2u8));
        let one = PrivateExponent::from_biguint(BigUint::from(1u8));
        // peer B = g^1, a = 2  =>  V = g^2 mod p
        let peer = derive_public_value(&one, params);
        let shared = compute_shared_secret(&peer, &two, params).unwrap();

        let key = derive_session_key(&shared);
        let digest = sha256(&shared.to_bytes_be());

        assert_eq!(&key.as_bytes()[..], &digest[16..]);
        assert_eq!(key.to_hex(), "f95d75d404470d6f35740f23485bd1f2");
    }
}
