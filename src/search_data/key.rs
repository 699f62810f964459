//! Search key codec
//!
//! Generated keys are the lowercased symbol name with every byte outside
//! `[a-z0-9]` written as `_XX` (lowercase hex), followed by `_N` where `N`
//! is the entry's serial number: `uint128_t.hpp` #2202 is stored as
//! `uint128_5ft_2ehpp_2202`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedKey {
    pub name: String,
    pub serial: Option<u32>,
}

/// Decode a raw key into its name and serial number.
///
/// Malformed escapes are kept verbatim rather than rejected.
pub fn decode_key(raw: &str) -> DecodedKey {
    let (body, serial) = split_serial(raw);
    DecodedKey {
        name: unescape(body),
        serial,
    }
}

/// Escape a symbol name the way generated keys are written (no serial).
pub fn encode_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for byte in lowered.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{:02x}", byte));
        }
    }
    out
}

/// Build a complete raw key from a name and serial number
pub fn encode_key(name: &str, serial: u32) -> String {
    format!("{}_{}", encode_name(name), serial)
}

fn split_serial(raw: &str) -> (&str, Option<u32>) {
    let Some(pos) = raw.rfind('_') else {
        return (raw, None);
    };
    let digits = &raw[pos + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (raw, None);
    }
    match digits.parse::<u32>() {
        Ok(serial) => (&raw[..pos], Some(serial)),
        Err(_) => (raw, None),
    }
}

fn unescape(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
