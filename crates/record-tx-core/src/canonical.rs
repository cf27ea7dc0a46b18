//! Deterministic CBOR writer for ledger structures.
//!
//! The ledger hashes the exact bytes it receives, so every structure in this
//! workspace is written by hand with these primitives rather than through a
//! generic serializer:
//! - Integers use the smallest valid encoding
//! - Integers outside the 64-bit range use bignum tags 2 and 3
//! - Definite lengths everywhere except where the ledger's Plutus data
//!   encoding calls for indefinite lists and chunked byte strings
//!
//! Decoding goes through `ciborium`, which accepts every valid encoding.

use ciborium::value::Value;

use crate::error::{CoreError, Result};

/// CBOR major types.
pub mod major {
    pub const UNSIGNED: u8 = 0;
    pub const NEGATIVE: u8 = 1;
    pub const BYTES: u8 = 2;
    pub const TEXT: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const MAP: u8 = 5;
    pub const TAG: u8 = 6;
}

/// Tag wrapping CBOR-in-CBOR (`#6.24`).
pub const TAG_ENCODED_CBOR: u64 = 24;

/// Maximum chunk length for byte strings inside Plutus data.
pub const PLUTUS_BYTES_CHUNK: usize = 64;

/// Encode an unsigned integer with the given major type.
pub fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a signed integer (major types 0 and 1, bignum tags beyond 64 bits).
pub fn encode_int(buf: &mut Vec<u8>, n: i128) {
    if n >= 0 {
        match u64::try_from(n) {
            Ok(small) => encode_uint(buf, major::UNSIGNED, small),
            Err(_) => encode_bignum(buf, 2, n as u128),
        }
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u128;
        match u64::try_from(abs) {
            Ok(small) => encode_uint(buf, major::NEGATIVE, small),
            Err(_) => encode_bignum(buf, 3, abs),
        }
    }
}

fn encode_bignum(buf: &mut Vec<u8>, tag: u64, magnitude: u128) {
    let bytes = magnitude.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    encode_tag(buf, tag);
    encode_bytes(buf, &bytes[first..]);
}

/// Encode a definite-length byte string (major type 2).
pub fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, major::BYTES, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a byte string the way Plutus data requires.
///
/// Strings up to 64 bytes are definite; longer ones become an indefinite
/// string of 64-byte chunks.
pub fn encode_bounded_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() <= PLUTUS_BYTES_CHUNK {
        encode_bytes(buf, bytes);
        return;
    }
    buf.push(0x5f);
    for chunk in bytes.chunks(PLUTUS_BYTES_CHUNK) {
        encode_bytes(buf, chunk);
    }
    encode_break(buf);
}

/// Encode a text string (major type 3).
pub fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, major::TEXT, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Write a definite array header (major type 4).
pub fn encode_array_header(buf: &mut Vec<u8>, len: usize) {
    encode_uint(buf, major::ARRAY, len as u64);
}

/// Write a definite map header (major type 5).
pub fn encode_map_header(buf: &mut Vec<u8>, len: usize) {
    encode_uint(buf, major::MAP, len as u64);
}

/// Write a semantic tag (major type 6).
pub fn encode_tag(buf: &mut Vec<u8>, tag: u64) {
    encode_uint(buf, major::TAG, tag);
}

/// Open an indefinite-length array.
pub fn begin_indefinite_array(buf: &mut Vec<u8>) {
    buf.push(0x9f);
}

/// Close an indefinite-length item.
pub fn encode_break(buf: &mut Vec<u8>) {
    buf.push(0xff);
}

/// Wrap already-encoded CBOR as `#6.24(bytes)`.
pub fn encode_embedded_cbor(buf: &mut Vec<u8>, cbor: &[u8]) {
    encode_tag(buf, TAG_ENCODED_CBOR);
    encode_bytes(buf, cbor);
}

/// Wrap raw bytes as a single CBOR byte string.
pub fn wrap_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(bytes.len() + 9);
    encode_bytes(&mut buf, bytes);
    buf
}

/// Decode exactly one CBOR item, rejecting trailing bytes.
pub fn decode_single(bytes: &[u8]) -> Result<Value> {
    let mut rest = bytes;
    let value: Value =
        ciborium::from_reader(&mut rest).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    if !rest.is_empty() {
        return Err(CoreError::DecodingError(format!(
            "{} trailing bytes after CBOR item",
            rest.len()
        )));
    }
    Ok(value)
}

/// If `bytes` is exactly one CBOR byte string, return its content.
pub fn unwrap_bytes(bytes: &[u8]) -> Option<Vec<u8>> {
    match decode_single(bytes) {
        Ok(Value::Bytes(inner)) => Some(inner),
        _ => None,
    }
}
