//! Hex <-> binary conversion at the persistence boundary
//!
//! Every slot holds lowercase hex. Decoding accepts either case and repairs an
//! odd-length input by prefixing a single `0` nibble, so `"f"` decodes to `[0x0f]`.

use std::borrow::Cow;

use hsim_core::{HsimError, HsimResult};
use num_bigint::BigUint;

/// Encode bytes as lowercase hex, two digits per byte.
pub fn bytes_to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex text into bytes.
///
/// Empty input is rejected. Odd-length input is left-padded with `0`.
pub fn hex_to_bytes(text: &str) -> HsimResult<Vec<u8>> {
    if text.is_empty() {
        return Err(HsimError::InvalidHexInput("hex string must not be empty".into()));
    }

    let digits: Cow<'_, str> = if text.len() % 2 == 1 {
        Cow::Owned(format!("0{text}"))
    } else {
        Cow::Borrowed(text)
    };

    hex::decode(digits.as_ref()).map_err(|e| HsimError::InvalidHexInput(e.to_string()))
}

/// Render an integer as lowercase hex with no `0x` prefix and no zero padding.
pub fn biguint_to_hex(value: &BigUint) -> String {
    value.to_str_radix(16)
}

/// Parse an integer from hex text, ignoring surrounding whitespace.
pub fn hex_to_biguint(text: &str) -> HsimResult<BigUint> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(HsimError::InvalidHexInput("hex string must not be empty".into()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HsimError::InvalidHexInput(format!(
            "'{}' contains non-hex characters",
            truncate(trimmed)
        )));
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 16)
        .ok_or_else(|| HsimError::InvalidHexInput("unparseable hex integer".into()))
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(32) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
