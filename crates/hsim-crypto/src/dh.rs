//! Diffie-Hellman key agreement over the fixed domain parameters
//!
//! `derive_public_value` and `compute_shared_secret` use the big-integer
//! library's square-and-multiply `modpow`, which is not constant-time. That is
//! acceptable for a simulator; production key agreement needs a
//! timing-attack-resistant implementation.

use hsim_core::{HsimError, HsimResult};
use num_bigint::BigUint;
use num_traits::One;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::codec;
use crate::params::DomainParameters;

/// The secret exponent `a`.
///
/// `Debug` is redacted; use [`PrivateExponent::to_hex`] for deliberate echo.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateExponent {
    value: BigUint,
}

impl PrivateExponent {
    /// Wrap an existing value, e.g. one loaded from persisted state.
    ///
    /// No range check is applied: a reloaded exponent is reused verbatim.
    pub fn from_biguint(value: BigUint) -> Self {
        Self { value }
    }

    pub fn from_hex(text: &str) -> HsimResult<Self> {
        codec::hex_to_biguint(text).map(Self::from_biguint)
    }

    pub fn to_hex(&self) -> String {
        codec::biguint_to_hex(&self.value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.value
    }
}

impl std::fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateExponent")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A public value `g^x mod p`, ours (`AA`) or the peer's (`B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicValue {
    value: BigUint,
}

impl PublicValue {
    pub fn from_biguint(value: BigUint) -> Self {
        Self { value }
    }

    pub fn from_hex(text: &str) -> HsimResult<Self> {
        codec::hex_to_biguint(text).map(Self::from_biguint)
    }

    pub fn to_hex(&self) -> String {
        codec::biguint_to_hex(&self.value)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.value
    }
}

/// The raw shared group element `V = B^a mod p`.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret {
    value: BigUint,
}

impl SharedSecret {
    pub fn as_biguint(&self) -> &BigUint {
        &self.value
    }

    /// Minimal big-endian encoding, as fed to the session key hash.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.value.to_bytes_be()
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Generate a uniformly random exponent in `[0, 2^(bits(p) - 1))`.
///
/// Reads from the operating system CSPRNG and clears the bits above
/// `bits(p) - 1`, so the result is always below `p`.
pub fn generate_private_exponent(params: &DomainParameters) -> HsimResult<PrivateExponent> {
    let bits = params.bits().saturating_sub(1) as usize;
    let len = bits.div_ceil(8);

    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| HsimError::RandomnessUnavailable(e.to_string()))?;

    let excess = len * 8 - bits;
    if let Some(first) = buf.first_mut() {
        *first &= 0xFFu8 >> excess;
    }

    let value = BigUint::from_bytes_be(&buf);
    buf.zeroize();

    tracing::debug!(bits, "generated private exponent");
    Ok(PrivateExponent { value })
}

/// Compute `AA = g^a mod p`. Pure and deterministic.
pub fn derive_public_value(a: &PrivateExponent, params: &DomainParameters) -> PublicValue {
    PublicValue {
        value: params.g().modpow(&a.value, params.p()),
    }
}

/// Compute `V = B^a mod p` from the peer's public value.
///
/// The peer value must lie in `[2, p - 2]`; `0`, `1` and `p - 1` would force
/// the shared secret into a trivial subgroup.
pub fn compute_shared_secret(
    peer: &PublicValue,
    a: &PrivateExponent,
    params: &DomainParameters,
) -> HsimResult<SharedSecret> {
    let b = peer.as_biguint();
    let one = BigUint::one();
    let upper = params.p() - &one;
    if *b <= one || *b >= upper {
        return Err(HsimError::InvalidPeerValue(
            "peer public value must lie in [2, p - 2]".into(),
        ));
    }
    Ok(SharedSecret {
        value: b.modpow(&a.value, params.p()),
    })
}
