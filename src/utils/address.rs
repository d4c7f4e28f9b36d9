//! Address validation
//!
//! Format check plus EIP-55 checksum verification for mixed-case input.
//! All-lowercase and all-uppercase hex carry no checksum and are accepted
//! on format alone. Pure, no network access, never panics.

use alloy_primitives::Address;
use std::str::FromStr;

/// Expected number of hex digits after the `0x` prefix
const ADDRESS_HEX_LEN: usize = 40;

/// Returns true iff `input` is a syntactically valid EVM address
pub fn is_valid_address(input: &str) -> bool {
    let Some(hex_part) = input.strip_prefix("0x") else {
        return false;
    };

    if hex_part.len() != ADDRESS_HEX_LEN || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(input, None).is_ok()
    } else {
        true
    }
}

/// EIP-55 checksummed form of a valid address, for display and logs
pub fn checksum_address(input: &str) -> Option<String> {
    if !is_valid_address(input) {
        return None;
    }
    Address::from_str(input)
        .ok()
        .map(|addr| addr.to_checksum(None))
}
