//! Untyped Plutus Core programs in de Bruijn form and their flat encoding.
//!
//! Only the structure needed to apply parameters is interpreted; builtin
//! functions are kept as their 7-bit tags and `Data` constants as raw CBOR,
//! so decoding then re-encoding an unmodified program reproduces its bytes.

use record_tx_core::{PlutusData, ToPlutusData};

use crate::error::Result;
use crate::flat::{Decoder, Encoder};

const TERM_TAG_BITS: u8 = 4;
const BUILTIN_TAG_BITS: u8 = 7;
const TYPE_TAG_BITS: u8 = 4;

/// A versioned program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub version: (u64, u64, u64),
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// De Bruijn index.
    Var(u64),
    Delay(Box<Term>),
    Lambda(Box<Term>),
    Apply(Box<Term>, Box<Term>),
    Constant(Constant),
    Force(Box<Term>),
    Error,
    Builtin(u8),
    Constr { tag: u64, fields: Vec<Term> },
    Case { scrutinee: Box<Term>, branches: Vec<Term> },
}

/// Constant types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Integer,
    ByteString,
    String,
    Unit,
    Bool,
    List(Box<Type>),
    Pair(Box<Type>, Box<Type>),
    Data,
}

/// Zigzag-encoded integer kept as its flat 7-bit groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatInteger(Vec<u8>);

impl FlatInteger {
    pub fn from_i128(n: i128) -> Self {
        let mut zigzag = ((n << 1) ^ (n >> 127)) as u128;
        let mut groups = Vec::new();
        loop {
            groups.push((zigzag & 0x7f) as u8);
            zigzag >>= 7;
            if zigzag == 0 {
                return Self(groups);
            }
        }
    }

    /// The value, when it fits in 128 bits.
    pub fn to_i128(&self) -> Option<i128> {
        let mut zigzag: u128 = 0;
        for (i, group) in self.0.iter().enumerate() {
            let shift = u32::try_from(i * 7).ok()?;
            if shift >= 128 {
                return None;
            }
            let part = u128::from(*group).checked_shl(shift)?;
            if part >> shift != u128::from(*group) {
                return None;
            }
            zigzag |= part;
        }
        Some(((zigzag >> 1) as i128) ^ -((zigzag & 1) as i128))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    Integer(FlatInteger),
    ByteString(Vec<u8>),
    String(String),
    Unit,
    Bool(bool),
    List(Type, Vec<Constant>),
    Pair(Type, Type, Box<Constant>, Box<Constant>),
    /// CBOR encoding of a Plutus data value.
    Data(Vec<u8>),
}

impl Constant {
    pub fn data(data: &impl ToPlutusData) -> Self {
        Constant::Data(data.to_plutus_data().to_cbor())
    }

    pub fn type_of(&self) -> Type {
        match self {
            Constant::Integer(_) => Type::Integer,
            Constant::ByteString(_) => Type::ByteString,
            Constant::String(_) => Type::String,
            Constant::Unit => Type::Unit,
            Constant::Bool(_) => Type::Bool,
            Constant::List(elem, _) => Type::List(Box::new(elem.clone())),
            Constant::Pair(a, b, _, _) => Type::Pair(Box::new(a.clone()), Box::new(b.clone())),
            Constant::Data(_) => Type::Data,
        }
    }
}

impl Term {
    /// `[self arg]`
    pub fn apply(self, arg: Term) -> Term {
        Term::Apply(Box::new(self), Box::new(arg))
    }

    /// `[self (con data d)]`
    pub fn apply_data(self, data: &PlutusData) -> Term {
        self.apply(Term::Constant(Constant::data(data)))
    }
}

impl Program {
    /// Decode a flat-encoded program, requiring every byte to be consumed.
    pub fn from_flat(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let version = (dec.natural()?, dec.natural()?, dec.natural()?);
        let term = decode_term(&mut dec)?;
        dec.filler()?;
        if !dec.is_exhausted() {
            return Err(dec.error("trailing bytes after program"));
        }
        Ok(Self { version, term })
    }

    pub fn to_flat(&self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        enc.natural(self.version.0);
        enc.natural(self.version.1);
        enc.natural(self.version.2);
        encode_term(&mut enc, &self.term);
        enc.filler();
        enc.finish()
    }

    /// Apply each parameter in order as a data constant.
    pub fn apply_data(self, params: &[PlutusData]) -> Self {
        let term = params
            .iter()
            .fold(self.term, |term, param| term.apply_data(param));
        Self {
            version: self.version,
            term,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

fn encode_term(enc: &mut Encoder, term: &Term) {
    match term {
        Term::Var(index) => {
            enc.bits(TERM_TAG_BITS, 0);
            enc.natural(*index);
        }
        Term::Delay(body) => {
            enc.bits(TERM_TAG_BITS, 1);
            encode_term(enc, body);
        }
        Term::Lambda(body) => {
            enc.bits(TERM_TAG_BITS, 2);
            encode_term(enc, body);
        }
        Term::Apply(function, argument) => {
            enc.bits(TERM_TAG_BITS, 3);
            encode_term(enc, function);
            encode_term(enc, argument);
        }
        Term::Constant(constant) => {
            enc.bits(TERM_TAG_BITS, 4);
            let mut tags = Vec::new();
            type_tags(&constant.type_of(), &mut tags);
            for tag in tags {
                enc.list_cons();
                enc.bits(TYPE_TAG_BITS, tag);
            }
            enc.list_nil();
            encode_constant(enc, constant);
        }
        Term::Force(body) => {
            enc.bits(TERM_TAG_BITS, 5);
            encode_term(enc, body);
        }
        Term::Error => enc.bits(TERM_TAG_BITS, 6),
        Term::Builtin(tag) => {
            enc.bits(TERM_TAG_BITS, 7);
            enc.bits(BUILTIN_TAG_BITS, *tag);
        }
        Term::Constr { tag, fields } => {
            enc.bits(TERM_TAG_BITS, 8);
            enc.natural(*tag);
            encode_terms(enc, fields);
        }
        Term::Case {
            scrutinee,
            branches,
        } => {
            enc.bits(TERM_TAG_BITS, 9);
            encode_term(enc, scrutinee);
            encode_terms(enc, branches);
        }
    }
}

fn encode_terms(enc: &mut Encoder, terms: &[Term]) {
    for term in terms {
        enc.list_cons();
        encode_term(enc, term);
    }
    enc.list_nil();
}

fn type_tags(ty: &Type, out: &mut Vec<u8>) {
    match ty {
        Type::Integer => out.push(0),
        Type::ByteString => out.push(1),
        Type::String => out.push(2),
        Type::Unit => out.push(3),
        Type::Bool => out.push(4),
        Type::List(elem) => {
            out.extend_from_slice(&[7, 5]);
            type_tags(elem, out);
        }
        Type::Pair(a, b) => {
            out.extend_from_slice(&[7, 7, 6]);
            type_tags(a, out);
            type_tags(b, out);
        }
        Type::Data => out.push(8),
    }
}

fn encode_constant(enc: &mut Encoder, constant: &Constant) {
    match constant {
        Constant::Integer(n) => enc.natural_groups(&n.0),
        Constant::ByteString(b) => enc.bytes(b),
        Constant::String(s) => enc.bytes(s.as_bytes()),
        Constant::Unit => {}
        Constant::Bool(b) => enc.bit(*b),
        Constant::List(_, items) => {
            for item in items {
                enc.list_cons();
                encode_constant(enc, item);
            }
            enc.list_nil();
        }
        Constant::Pair(_, _, a, b) => {
            encode_constant(enc, a);
            encode_constant(enc, b);
        }
        Constant::Data(cbor) => enc.bytes(cbor),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

fn decode_term(dec: &mut Decoder<'_>) -> Result<Term> {
    let tag = dec.bits(TERM_TAG_BITS)?;
    Ok(match tag {
        0 => Term::Var(dec.natural()?),
        1 => Term::Delay(Box::new(decode_term(dec)?)),
        2 => Term::Lambda(Box::new(decode_term(dec)?)),
        3 => {
            let function = decode_term(dec)?;
            let argument = decode_term(dec)?;
            Term::Apply(Box::new(function), Box::new(argument))
        }
        4 => {
            let mut tags = Vec::new();
            while dec.list_next()? {
                tags.push(dec.bits(TYPE_TAG_BITS)?);
            }
            let (ty, rest) = parse_type(dec, &tags)?;
            if !rest.is_empty() {
                return Err(dec.error("unused constant type tags"));
            }
            Term::Constant(decode_constant(dec, &ty)?)
        }
        5 => Term::Force(Box::new(decode_term(dec)?)),
        6 => Term::Error,
        7 => Term::Builtin(dec.bits(BUILTIN_TAG_BITS)?),
        8 => {
            let tag = dec.natural()?;
            Term::Constr {
                tag,
                fields: decode_terms(dec)?,
            }
        }
        9 => {
            let scrutinee = Box::new(decode_term(dec)?);
            Term::Case {
                scrutinee,
                branches: decode_terms(dec)?,
            }
        }
        other => return Err(dec.error(format!("unknown term tag {}", other))),
    })
}

fn decode_terms(dec: &mut Decoder<'_>) -> Result<Vec<Term>> {
    let mut terms = Vec::new();
    while dec.list_next()? {
        terms.push(decode_term(dec)?);
    }
    Ok(terms)
}

/// Parse one type from the front of `tags`, returning the remaining tags.
fn parse_type<'t>(dec: &Decoder<'_>, tags: &'t [u8]) -> Result<(Type, &'t [u8])> {
    let (first, rest) = tags
        .split_first()
        .ok_or_else(|| dec.error("missing constant type tag"))?;
    let simple = match *first {
        0 => Type::Integer,
        1 => Type::ByteString,
        2 => Type::String,
        3 => Type::Unit,
        4 => Type::Bool,
        8 => Type::Data,
        7 => {
            return match rest {
                [5, inner @ ..] => {
                    let (elem, rest) = parse_type(dec, inner)?;
                    Ok((Type::List(Box::new(elem)), rest))
                }
                [7, 6, inner @ ..] => {
                    let (a, rest) = parse_type(dec, inner)?;
                    let (b, rest) = parse_type(dec, rest)?;
                    Ok((Type::Pair(Box::new(a), Box::new(b)), rest))
                }
                _ => Err(dec.error("unsupported type application")),
            }
        }
        other => return Err(dec.error(format!("unsupported constant type {}", other))),
    };
    Ok((simple, rest))
}

fn decode_constant(dec: &mut Decoder<'_>, ty: &Type) -> Result<Constant> {
    Ok(match ty {
        Type::Integer => Constant::Integer(FlatInteger(dec.natural_groups()?)),
        Type::ByteString => Constant::ByteString(dec.bytes()?),
        Type::String => {
            let bytes = dec.bytes()?;
            Constant::String(
                String::from_utf8(bytes).map_err(|_| dec.error("string constant is not utf-8"))?,
            )
        }
        Type::Unit => Constant::Unit,
        Type::Bool => Constant::Bool(dec.bit()?),
        Type::List(elem) => {
            let mut items = Vec::new();
            while dec.list_next()? {
                items.push(decode_constant(dec, elem)?);
            }
            Constant::List(elem.as_ref().clone(), items)
        }
        Type::Pair(a, b) => {
            let first = decode_constant(dec, a)?;
            let second = decode_constant(dec, b)?;
            Constant::Pair(
                a.as_ref().clone(),
                b.as_ref().clone(),
                Box::new(first),
                Box::new(second),
            )
        }
        Type::Data => Constant::Data(dec.bytes()?),
    })
}
