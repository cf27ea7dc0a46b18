//! Transaction outputs and the builder that assembles them.
//!
//! Outputs are built in a fixed order: address, then an optional reference
//! script, then an optional datum, then the value. The order is carried in
//! the builder's type, so an output without a value cannot be finalized:
//!
//! ```text
//! AddressSet ──script──▶ ScriptAttached ──datum──▶ DatumAttached
//!     │                        │                        │
//!     └────────────────────────┴─────────value──────────┴──▶ ValueAttached ──build──▶ TxOutput
//! ```
//!
//! [`OutputSpec`] is the declarative counterpart for outputs described at
//! runtime; it performs the one check the types cannot.

use serde::{Deserialize, Serialize};

use record_tx_core::canonical::{
    encode_array_header, encode_bytes, encode_embedded_cbor, encode_map_header, encode_uint, major,
};
use record_tx_core::{Address, Assets, DatumHash, PlutusData, ToPlutusData, Value, ValueOrder};
use record_tx_script::{Script, ScriptError, ScriptType};

use crate::error::{BuildError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Output model
// ─────────────────────────────────────────────────────────────────────────────

/// An inline datum: its exact CBOR bytes plus the decoded data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDatum {
    cbor: Vec<u8>,
    data: PlutusData,
}

impl InlineDatum {
    /// Wrap a CBOR blob, which must be exactly one Plutus data item.
    pub fn from_cbor(cbor: impl Into<Vec<u8>>) -> Result<Self> {
        let cbor = cbor.into();
        let data = PlutusData::from_cbor(&cbor).map_err(|e| BuildError::InvalidDatum(e.to_string()))?;
        Ok(Self { cbor, data })
    }

    pub fn from_data(data: &impl ToPlutusData) -> Self {
        let data = data.to_plutus_data();
        Self {
            cbor: data.to_cbor(),
            data,
        }
    }

    pub fn cbor(&self) -> &[u8] {
        &self.cbor
    }

    pub fn data(&self) -> &PlutusData {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatumOption {
    Hash(DatumHash),
    Inline(InlineDatum),
}

/// A transaction output, ready to hand to a transaction assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub address: Address,
    pub value: Value,
    pub datum: Option<DatumOption>,
    pub script_ref: Option<Script>,
}

impl TxOutput {
    /// Whether the post-Alonzo map encoding is required.
    pub fn needs_map_format(&self) -> bool {
        self.script_ref.is_some() || matches!(self.datum, Some(DatumOption::Inline(_)))
    }

    /// Ledger CBOR encoding.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }

    /// Legacy `[address, value(, datum_hash)]` when possible, otherwise
    /// `{0: address, 1: value, ?2: datum_option, ?3: script_ref}`.
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        let address = self.address.to_bytes();

        if !self.needs_map_format() {
            match &self.datum {
                Some(DatumOption::Hash(hash)) => {
                    encode_array_header(buf, 3);
                    encode_bytes(buf, &address);
                    self.value.encode_to(buf);
                    encode_bytes(buf, hash.as_bytes());
                }
                _ => {
                    encode_array_header(buf, 2);
                    encode_bytes(buf, &address);
                    self.value.encode_to(buf);
                }
            }
            return;
        }

        let entries = 2 + usize::from(self.datum.is_some()) + usize::from(self.script_ref.is_some());
        encode_map_header(buf, entries);

        encode_uint(buf, major::UNSIGNED, 0);
        encode_bytes(buf, &address);

        encode_uint(buf, major::UNSIGNED, 1);
        self.value.encode_to(buf);

        if let Some(datum) = &self.datum {
            encode_uint(buf, major::UNSIGNED, 2);
            encode_array_header(buf, 2);
            match datum {
                DatumOption::Hash(hash) => {
                    encode_uint(buf, major::UNSIGNED, 0);
                    encode_bytes(buf, hash.as_bytes());
                }
                DatumOption::Inline(inline) => {
                    encode_uint(buf, major::UNSIGNED, 1);
                    encode_embedded_cbor(buf, inline.cbor());
                }
            }
        }

        if let Some(script) = &self.script_ref {
            encode_uint(buf, major::UNSIGNED, 3);
            encode_embedded_cbor(buf, &script.to_reference_cbor());
        }
    }
}

/// `Constr 0 [address, value, datum, Nullable(script_hash)]` with
/// `NoDatum = Constr 0 []`, `DatumHash h = Constr 1 [h]`,
/// `InlineDatum d = Constr 2 [d]`.
impl ToPlutusData for TxOutput {
    fn to_plutus_data(&self) -> PlutusData {
        let datum = match &self.datum {
            None => PlutusData::constr(0, vec![]),
            Some(DatumOption::Hash(h)) => PlutusData::constr(1, vec![PlutusData::bytes(h)]),
            Some(DatumOption::Inline(d)) => PlutusData::constr(2, vec![d.data().clone()]),
        };
        let script_hash = self
            .script_ref
            .as_ref()
            .map(|script| PlutusData::bytes(script.hash()));
        PlutusData::constr(
            0,
            vec![
                self.address.to_plutus_data(),
                self.value.to_plutus_data(),
                datum,
                script_hash.to_plutus_data(),
            ],
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed builder
// ─────────────────────────────────────────────────────────────────────────────

/// Only the address is set.
#[derive(Debug)]
pub struct AddressSet;

/// A reference script has been attached.
#[derive(Debug)]
pub struct ScriptAttached;

/// A datum has been attached.
#[derive(Debug)]
pub struct DatumAttached;

/// The value has been attached; the output can be built.
#[derive(Debug)]
pub struct ValueAttached {
    value: Value,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::AddressSet {}
    impl Sealed for super::ScriptAttached {}
    impl Sealed for super::DatumAttached {}
}

/// States that still accept a value.
pub trait AcceptsValue: sealed::Sealed {}
impl AcceptsValue for AddressSet {}
impl AcceptsValue for ScriptAttached {}
impl AcceptsValue for DatumAttached {}

/// States that still accept a datum.
pub trait AcceptsDatum: AcceptsValue {}
impl AcceptsDatum for AddressSet {}
impl AcceptsDatum for ScriptAttached {}

#[derive(Debug)]
pub struct OutputBuilder<S> {
    address: Address,
    script_ref: Option<Script>,
    datum: Option<DatumOption>,
    order: ValueOrder,
    state: S,
}

impl OutputBuilder<AddressSet> {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            script_ref: None,
            datum: None,
            order: ValueOrder::default(),
            state: AddressSet,
        }
    }

    pub fn with_reference_script(self, script: Script) -> OutputBuilder<ScriptAttached> {
        OutputBuilder {
            address: self.address,
            script_ref: Some(script),
            datum: None,
            order: self.order,
            state: ScriptAttached,
        }
    }

    /// Attach a reference script given as a type tag and hex code.
    ///
    /// The tag is a script type name (`Native`, `PlutusV2`, `v3`, ...) or its
    /// numeric ledger tag.
    pub fn with_reference_script_tagged(
        self,
        tag: &str,
        code_hex: &str,
    ) -> Result<OutputBuilder<ScriptAttached>> {
        let script_type = parse_script_tag(tag)?;
        let script = Script::from_hex(script_type, code_hex)?;
        Ok(self.with_reference_script(script))
    }
}

impl<S: AcceptsDatum> OutputBuilder<S> {
    /// Attach an inline datum from its CBOR bytes.
    pub fn with_datum(self, cbor: &[u8]) -> Result<OutputBuilder<DatumAttached>> {
        let datum = InlineDatum::from_cbor(cbor)?;
        Ok(self.attach_datum(DatumOption::Inline(datum)))
    }

    pub fn with_inline_datum(self, data: &impl ToPlutusData) -> OutputBuilder<DatumAttached> {
        self.attach_datum(DatumOption::Inline(InlineDatum::from_data(data)))
    }

    pub fn with_datum_hash(self, hash: DatumHash) -> OutputBuilder<DatumAttached> {
        self.attach_datum(DatumOption::Hash(hash))
    }

    fn attach_datum(self, datum: DatumOption) -> OutputBuilder<DatumAttached> {
        OutputBuilder {
            address: self.address,
            script_ref: self.script_ref,
            datum: Some(datum),
            order: self.order,
            state: DatumAttached,
        }
    }
}

impl<S: AcceptsValue> OutputBuilder<S> {
    /// Encode `assets` into the output's value.
    pub fn with_value(self, assets: &Assets) -> Result<OutputBuilder<ValueAttached>> {
        let value = Value::from_assets(assets)?;
        Ok(self.with_encoded_value(value))
    }

    pub fn with_encoded_value(self, value: Value) -> OutputBuilder<ValueAttached> {
        OutputBuilder {
            address: self.address,
            script_ref: self.script_ref,
            datum: self.datum,
            order: self.order,
            state: ValueAttached { value },
        }
    }

    /// Policy and token ordering used when the output is built.
    pub fn value_order(mut self, order: ValueOrder) -> Self {
        self.order = order;
        self
    }
}

impl OutputBuilder<ValueAttached> {
    pub fn build(self) -> TxOutput {
        let output = TxOutput {
            address: self.address,
            value: self.state.value.ordered(self.order),
            datum: self.datum,
            script_ref: self.script_ref,
        };
        tracing::debug!(
            address = %output.address,
            coin = output.value.coin(),
            policies = output.value.multi_asset().len(),
            inline_datum = matches!(output.datum, Some(DatumOption::Inline(_))),
            script_ref = output.script_ref.is_some(),
            "built output"
        );
        output
    }
}

fn parse_script_tag(tag: &str) -> Result<ScriptType> {
    let parsed = match tag.parse::<u8>() {
        Ok(numeric) => ScriptType::try_from(numeric),
        Err(_) => tag.parse::<ScriptType>(),
    };
    parsed.map_err(|e| match e {
        ScriptError::UnsupportedScriptType(what) => BuildError::UnsupportedScriptType(what),
        other => BuildError::Script(other),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Declarative outputs
// ─────────────────────────────────────────────────────────────────────────────

/// Reference script as `{ "type": "PlutusV2", "script": "<hex>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRefSpec {
    #[serde(rename = "type")]
    pub script_type: String,
    pub script: String,
}

/// An output described at runtime, e.g. deserialized from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Bech32 address.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
    /// Hex CBOR of an inline datum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_ref: Option<ScriptRefSpec>,
}

impl OutputSpec {
    /// Run the description through the typed builder.
    pub fn build(&self) -> Result<TxOutput> {
        let builder = OutputBuilder::new(self.address.parse::<Address>()?);
        match &self.script_ref {
            Some(script_ref) => self.attach_datum(
                builder.with_reference_script_tagged(&script_ref.script_type, &script_ref.script)?,
            ),
            None => self.attach_datum(builder),
        }
    }

    fn attach_datum<S: AcceptsDatum>(&self, builder: OutputBuilder<S>) -> Result<TxOutput> {
        match (&self.datum, &self.datum_hash) {
            (Some(_), Some(_)) => Err(BuildError::InvalidDatum(
                "both an inline datum and a datum hash were given".into(),
            )),
            (Some(datum), None) => {
                let cbor = hex::decode(datum)
                    .map_err(|e| BuildError::InvalidDatum(format!("datum is not hex: {}", e)))?;
                self.attach_value(builder.with_datum(&cbor)?)
            }
            (None, Some(hash)) => self.attach_value(builder.with_datum_hash(DatumHash::from_hex(hash)?)),
            (None, None) => self.attach_value(builder),
        }
    }

    fn attach_value<S: AcceptsValue>(&self, builder: OutputBuilder<S>) -> Result<TxOutput> {
        let assets = self
            .assets
            .as_ref()
            .ok_or(BuildError::IncompleteOutput("value"))?;
        Ok(builder.with_value(assets)?.build())
    }
}
