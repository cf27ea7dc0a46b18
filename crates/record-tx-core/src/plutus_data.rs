//! Plutus structured data and its ledger CBOR encoding.
//!
//! Datums, redeemers and script parameters are all `PlutusData`. The
//! encoding follows the ledger's rules exactly:
//! - Constructor `i` uses tag `121 + i` for `i < 7`, tag `1280 + (i - 7)` for
//!   `i < 128`, and the general form `#6.102([i, fields])` otherwise
//! - Non-empty lists (and constructor fields) are indefinite-length arrays;
//!   empty ones are `0x80`
//! - Byte strings longer than 64 bytes are chunked
//! - Maps are definite and keep their entry order

use ciborium::value::Value;

use crate::canonical::{
    begin_indefinite_array, decode_single, encode_array_header, encode_bounded_bytes,
    encode_break, encode_int, encode_map_header, encode_tag,
};
use crate::error::{CoreError, Result};

/// Plutus structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlutusData {
    /// Tagged constructor with positional fields.
    Constr { tag: u64, fields: Vec<PlutusData> },
    /// Association list; order is preserved.
    Map(Vec<(PlutusData, PlutusData)>),
    List(Vec<PlutusData>),
    Integer(i128),
    Bytes(Vec<u8>),
}

/// Conversion into Plutus data, implemented by every on-chain shape.
pub trait ToPlutusData {
    fn to_plutus_data(&self) -> PlutusData;
}

/// Conversion back from Plutus data.
pub trait FromPlutusData: Sized {
    fn from_plutus_data(data: &PlutusData) -> Result<Self>;
}

impl PlutusData {
    pub fn constr(tag: u64, fields: Vec<PlutusData>) -> Self {
        Self::Constr { tag, fields }
    }

    pub fn bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self::Bytes(bytes.as_ref().to_vec())
    }

    pub fn integer(n: impl Into<i128>) -> Self {
        Self::Integer(n.into())
    }

    pub fn list(items: Vec<PlutusData>) -> Self {
        Self::List(items)
    }

    pub fn map(entries: Vec<(PlutusData, PlutusData)>) -> Self {
        Self::Map(entries)
    }

    /// Encode to ledger CBOR bytes.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }

    /// Append the ledger CBOR encoding to `buf`.
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        match self {
            PlutusData::Constr { tag, fields } => encode_constr(buf, *tag, fields),
            PlutusData::Map(entries) => {
                encode_map_header(buf, entries.len());
                for (k, v) in entries {
                    k.encode_to(buf);
                    v.encode_to(buf);
                }
            }
            PlutusData::List(items) => encode_list(buf, items),
            PlutusData::Integer(n) => encode_int(buf, *n),
            PlutusData::Bytes(b) => encode_bounded_bytes(buf, b),
        }
    }

    /// Decode from CBOR bytes.
    ///
    /// Accepts both definite and indefinite encodings; re-encoding may
    /// therefore differ from the input bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let value = decode_single(bytes)?;
        from_cbor_value(&value)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PlutusData::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            PlutusData::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

fn encode_constr(buf: &mut Vec<u8>, tag: u64, fields: &[PlutusData]) {
    match tag {
        0..=6 => {
            encode_tag(buf, 121 + tag);
            encode_list(buf, fields);
        }
        7..=127 => {
            encode_tag(buf, 1280 + tag - 7);
            encode_list(buf, fields);
        }
        _ => {
            encode_tag(buf, 102);
            encode_array_header(buf, 2);
            encode_int(buf, tag as i128);
            encode_list(buf, fields);
        }
    }
}

fn encode_list(buf: &mut Vec<u8>, items: &[PlutusData]) {
    if items.is_empty() {
        encode_array_header(buf, 0);
        return;
    }
    begin_indefinite_array(buf);
    for item in items {
        item.encode_to(buf);
    }
    encode_break(buf);
}

fn from_cbor_value(value: &Value) -> Result<PlutusData> {
    match value {
        Value::Integer(i) => Ok(PlutusData::Integer((*i).into())),
        Value::Bytes(b) => Ok(PlutusData::Bytes(b.clone())),
        Value::Array(items) => Ok(PlutusData::List(decode_items(items)?)),
        Value::Map(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((from_cbor_value(k)?, from_cbor_value(v)?));
            }
            Ok(PlutusData::Map(out))
        }
        Value::Tag(tag, inner) => match *tag {
            121..=127 => Ok(PlutusData::constr(tag - 121, decode_fields(inner)?)),
            1280..=1400 => Ok(PlutusData::constr(tag - 1280 + 7, decode_fields(inner)?)),
            102 => match inner.as_ref() {
                Value::Array(pair) if pair.len() == 2 => {
                    let ctor = match &pair[0] {
                        Value::Integer(i) => u64::try_from(i128::from(*i)).map_err(|_| {
                            CoreError::MalformedData("negative constructor index".into())
                        })?,
                        _ => {
                            return Err(CoreError::MalformedData(
                                "constructor index must be an integer".into(),
                            ))
                        }
                    };
                    Ok(PlutusData::constr(ctor, decode_fields(&pair[1])?))
                }
                _ => Err(CoreError::MalformedData(
                    "general constructor must be a 2-element array".into(),
                )),
            },
            2 | 3 => decode_bignum(*tag, inner),
            other => Err(CoreError::MalformedData(format!("unexpected tag {}", other))),
        },
        _ => Err(CoreError::MalformedData(
            "unsupported CBOR item in plutus data".into(),
        )),
    }
}

fn decode_items(items: &[Value]) -> Result<Vec<PlutusData>> {
    items.iter().map(from_cbor_value).collect()
}

fn decode_fields(value: &Value) -> Result<Vec<PlutusData>> {
    match value {
        Value::Array(items) => decode_items(items),
        _ => Err(CoreError::MalformedData(
            "constructor fields must be an array".into(),
        )),
    }
}

fn decode_bignum(tag: u64, inner: &Value) -> Result<PlutusData> {
    let bytes = match inner {
        Value::Bytes(b) => b,
        _ => return Err(CoreError::MalformedData("bignum payload must be bytes".into())),
    };
    let digits = bytes.iter().skip_while(|b| **b == 0).count();
    if digits > 16 {
        return Err(CoreError::MalformedData("integer exceeds 128 bits".into()));
    }
    let magnitude = bytes
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | u128::from(*b));
    let magnitude = i128::try_from(magnitude)
        .map_err(|_| CoreError::MalformedData("integer exceeds 128 bits".into()))?;
    Ok(PlutusData::Integer(if tag == 2 {
        magnitude
    } else {
        -1 - magnitude
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Shape helpers for FromPlutusData implementations
// ─────────────────────────────────────────────────────────────────────────────

/// Match a constructor with the given tag and arity, returning its fields.
pub fn expect_constr<'a>(
    data: &'a PlutusData,
    tag: u64,
    arity: usize,
    what: &str,
) -> Result<&'a [PlutusData]> {
    match data {
        PlutusData::Constr { tag: t, fields } if *t == tag && fields.len() == arity => Ok(fields),
        _ => Err(CoreError::MalformedData(format!(
            "{}: expected constructor {} with {} fields",
            what, tag, arity
        ))),
    }
}

pub fn expect_bytes<'a>(data: &'a PlutusData, what: &str) -> Result<&'a [u8]> {
    data.as_bytes()
        .ok_or_else(|| CoreError::MalformedData(format!("{}: expected bytes", what)))
}

pub fn expect_int(data: &PlutusData, what: &str) -> Result<i128> {
    data.as_integer()
        .ok_or_else(|| CoreError::MalformedData(format!("{}: expected integer", what)))
}

/// `Some x = Constr 0 [x]`, `None = Constr 1 []`
impl<T: ToPlutusData> ToPlutusData for Option<T> {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            Some(inner) => PlutusData::constr(0, vec![inner.to_plutus_data()]),
            None => PlutusData::constr(1, vec![]),
        }
    }
}

impl<T: FromPlutusData> FromPlutusData for Option<T> {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        match data {
            PlutusData::Constr { tag: 0, fields } if fields.len() == 1 => {
                Ok(Some(T::from_plutus_data(&fields[0])?))
            }
            PlutusData::Constr { tag: 1, fields } if fields.is_empty() => Ok(None),
            _ => Err(CoreError::MalformedData("expected optional value".into())),
        }
    }
}

impl ToPlutusData for PlutusData {
    fn to_plutus_data(&self) -> PlutusData {
        self.clone()
    }
}

impl FromPlutusData for PlutusData {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        Ok(data.clone())
    }
}

impl ToPlutusData for Vec<u8> {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::Bytes(self.clone())
    }
}

impl FromPlutusData for Vec<u8> {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        expect_bytes(data, "byte string").map(<[u8]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_constructor_tags() {
        assert_eq!(hex::encode(PlutusData::constr(0, vec![]).to_cbor()), "d87980");
        assert_eq!(hex::encode(PlutusData::constr(1, vec![]).to_cbor()), "d87a80");
        assert_eq!(hex::encode(PlutusData::constr(6, vec![]).to_cbor()), "d87f80");
    }

    #[test]
    fn test_extended_constructor_tags() {
        // 7 -> 1280
        assert_eq!(hex::encode(PlutusData::constr(7, vec![]).to_cbor()), "d9050080");
        // 127 -> 1400
        assert_eq!(hex::encode(PlutusData::constr(127, vec![]).to_cbor()), "d9057880");
        // general form
        assert_eq!(
            hex::encode(PlutusData::constr(128, vec![]).to_cbor()),
            "d866821880 80".replace(' ', "")
        );
    }

    #[test]
    fn test_non_empty_fields_are_indefinite() {
        let data = PlutusData::constr(2, vec![PlutusData::integer(1)]);
        assert_eq!(hex::encode(data.to_cbor()), "d87b9f01ff");
    }

    #[test]
    fn test_map_keeps_entry_order() {
        let data = PlutusData::map(vec![
            (PlutusData::bytes([0x02]), PlutusData::integer(1)),
            (PlutusData::bytes([0x01]), PlutusData::integer(2)),
        ]);
        assert_eq!(hex::encode(data.to_cbor()), "a2410201410102");
    }

    #[test]
    fn test_decode_roundtrip() {
        let data = PlutusData::constr(
            0,
            vec![
                PlutusData::bytes(vec![0xab; 100]),
                PlutusData::list(vec![PlutusData::integer(-5), PlutusData::integer(1_000_000)]),
                PlutusData::map(vec![(PlutusData::Bytes(Vec::new()), PlutusData::integer(0))]),
                PlutusData::constr(200, vec![PlutusData::integer(u64::MAX)]),
                PlutusData::constr(9, vec![]),
            ],
        );
        let decoded = PlutusData::from_cbor(&data.to_cbor()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_option_encoding() {
        let some: Option<Vec<u8>> = Some(vec![0x01]);
        let none: Option<Vec<u8>> = None;
        assert_eq!(hex::encode(some.to_plutus_data().to_cbor()), "d8799f4101ff");
        assert_eq!(hex::encode(none.to_plutus_data().to_cbor()), "d87a80");

        let back = Option::<Vec<u8>>::from_plutus_data(&some.to_plutus_data()).unwrap();
        assert_eq!(back, some);
    }

    #[test]
    fn test_rejects_text() {
        let mut buf = Vec::new();
        crate::canonical::encode_text(&mut buf, "nope");
        assert!(matches!(
            PlutusData::from_cbor(&buf),
            Err(CoreError::MalformedData(_))
        ));
    }
}
