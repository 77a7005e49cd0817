//! Fixed Diffie-Hellman domain parameters
//!
//! The group is the 1024-bit MODP group with a 160-bit prime-order subgroup
//! from RFC 5114 section 2.1. Both values are embedded and never configurable.

use std::sync::OnceLock;

use hsim_core::{HsimError, HsimResult};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Prime modulus `p`, hex, whitespace is ignored.
pub const P_HEX: &str = "
    B10B8F96A080E01DDE92DE5EAE5D54EC52C99FBCFB06A3C69A6A9DCA52D23B61
    6073E28675A23D189838EF1E2EE652C013ECB4AEA906112324975C3CD49B83BF
    ACCBDD7D90C4BD7098488E9C219A73724EFFD6FAE5644738FAA31A4FF55BCCC0
    A151AF5F0DC8B4BD45BF37DF365C1A65E68CFDA76D4DA708DF1FB2BC2E4A4371
";

/// Generator `g`, hex, whitespace is ignored.
pub const G_HEX: &str = "
    A4D1CBD5C3FD34126765A442EFB99905F8104DD258AC507FD6406CFF14266D31
    266FEA1E5C41564B777E690F5504F213160217B4B01B886A5E91547F9E2749F4
    D7FBD7D3B9A92EE1909D0D2263F80A76A6A24C087A091F531DBF0A0169B6A28A
    D662A4D18E73AFA32D779D5918D08BC8858F4DCEF97C2A24855E6EEB22B3B2E5
";

/// Prime modulus and generator shared by both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    p: BigUint,
    g: BigUint,
}

impl DomainParameters {
    /// The embedded group, parsed once per process.
    pub fn standard() -> &'static DomainParameters {
        static STANDARD: OnceLock<DomainParameters> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Self::from_hex(P_HEX, G_HEX).expect("embedded domain parameters are valid")
        })
    }

    /// Parse `p` and `g` from hex text with all whitespace stripped.
    ///
    /// Requires an odd `p > 2` and `1 < g < p`.
    pub fn from_hex(p_hex: &str, g_hex: &str) -> HsimResult<Self> {
        let p = parse_stripped(p_hex)?;
        let g = parse_stripped(g_hex)?;

        let two = BigUint::from(2u8);
        if p <= two || (&p % &two).is_zero() {
            return Err(HsimError::Config("modulus p must be an odd number > 2".into()));
        }
        if g <= BigUint::one() || g >= p {
            return Err(HsimError::Config("generator g must satisfy 1 < g < p".into()));
        }
        Ok(Self { p, g })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Bit length of `p`.
    pub fn bits(&self) -> u64 {
        self.p.bits()
    }
}

fn parse_stripped(text: &str) -> HsimResult<BigUint> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Err(HsimError::InvalidHexInput("empty domain parameter".into()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| HsimError::InvalidHexInput("domain parameter is not hex".into()))
}
