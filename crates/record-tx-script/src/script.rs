//! Scripts, their language tags and the identifiers derived from them.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use record_tx_core::canonical::{
    decode_single, encode_array_header, encode_bytes, encode_uint, major, unwrap_bytes, wrap_bytes,
};
use record_tx_core::crypto::blake2b_224;
use record_tx_core::{Address, Credential, Network, PolicyId, ScriptHash};

use crate::error::{Result, ScriptError};
use crate::uplc::Program;

/// Script language, identified on chain by a one-byte tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptType {
    #[serde(alias = "native")]
    Native,
    #[serde(alias = "v1")]
    PlutusV1,
    #[serde(alias = "v2")]
    PlutusV2,
    #[serde(alias = "v3")]
    PlutusV3,
}

impl ScriptType {
    /// Tag prefixed to the code when hashing, and the first element of a
    /// reference-script wrapper.
    pub fn tag(self) -> u8 {
        match self {
            ScriptType::Native => 0,
            ScriptType::PlutusV1 => 1,
            ScriptType::PlutusV2 => 2,
            ScriptType::PlutusV3 => 3,
        }
    }

    pub fn is_plutus(self) -> bool {
        !matches!(self, ScriptType::Native)
    }
}

impl TryFrom<u8> for ScriptType {
    type Error = ScriptError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ScriptType::Native),
            1 => Ok(ScriptType::PlutusV1),
            2 => Ok(ScriptType::PlutusV2),
            3 => Ok(ScriptType::PlutusV3),
            other => Err(ScriptError::UnsupportedScriptType(format!("tag {}", other))),
        }
    }
}

impl FromStr for ScriptType {
    type Err = ScriptError;

    /// Accepts `Native`, `PlutusV1`..`PlutusV3` and the blueprint spellings
    /// `v1`..`v3`, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(ScriptType::Native),
            "plutusv1" | "v1" => Ok(ScriptType::PlutusV1),
            "plutusv2" | "v2" => Ok(ScriptType::PlutusV2),
            "plutusv3" | "v3" => Ok(ScriptType::PlutusV3),
            _ => Err(ScriptError::UnsupportedScriptType(s.to_string())),
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptType::Native => "Native",
            ScriptType::PlutusV1 => "PlutusV1",
            ScriptType::PlutusV2 => "PlutusV2",
            ScriptType::PlutusV3 => "PlutusV3",
        };
        f.write_str(name)
    }
}

/// A script in its on-chain form.
///
/// Plutus code is held as a single CBOR byte string wrapping the flat
/// program; native scripts are held as their CBOR encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct Script {
    script_type: ScriptType,
    code: Bytes,
}

impl Script {
    /// Create from raw code. Double-wrapped Plutus code is unwrapped once.
    pub fn new(script_type: ScriptType, code: impl Into<Bytes>) -> Result<Self> {
        let code = code.into();
        let code = if script_type.is_plutus() {
            normalize_plutus_code(code)?
        } else {
            decode_single(&code).map_err(|e| {
                ScriptError::MalformedScript(format!("native script is not CBOR: {}", e))
            })?;
            code
        };
        Ok(Self { script_type, code })
    }

    pub fn from_hex(script_type: ScriptType, code: &str) -> Result<Self> {
        let bytes = hex::decode(code)
            .map_err(|e| ScriptError::MalformedScript(format!("code is not hex: {}", e)))?;
        Self::new(script_type, bytes)
    }

    /// Encode a program as Plutus code of the given type.
    pub fn from_program(script_type: ScriptType, program: &Program) -> Result<Self> {
        if !script_type.is_plutus() {
            return Err(ScriptError::UnsupportedScriptType(format!(
                "{} cannot carry a UPLC program",
                script_type
            )));
        }
        Ok(Self {
            script_type,
            code: Bytes::from(wrap_bytes(&program.to_flat()?)),
        })
    }

    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    pub fn code(&self) -> &Bytes {
        &self.code
    }

    pub fn code_hex(&self) -> String {
        hex::encode(&self.code)
    }

    /// Decode the flat program inside Plutus code.
    pub fn program(&self) -> Result<Program> {
        if !self.script_type.is_plutus() {
            return Err(ScriptError::UnsupportedScriptType(format!(
                "{} has no UPLC program",
                self.script_type
            )));
        }
        let flat = unwrap_bytes(&self.code)
            .ok_or_else(|| ScriptError::MalformedScript("code is not a CBOR byte string".into()))?;
        Program::from_flat(&flat)
    }

    /// blake2b-224 over the type tag followed by the code.
    pub fn hash(&self) -> ScriptHash {
        let mut preimage = Vec::with_capacity(self.code.len() + 1);
        preimage.push(self.script_type.tag());
        preimage.extend_from_slice(&self.code);
        ScriptHash::from_bytes(blake2b_224(&preimage))
    }

    pub fn policy_id(&self) -> PolicyId {
        self.hash().into()
    }

    /// Enterprise address locked by this script.
    pub fn address(&self, network: Network) -> Address {
        Address::enterprise(network, Credential::Script(self.hash()))
    }

    /// The `[tag, script]` wrapper embedded in a reference-script field.
    pub fn to_reference_cbor(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.code.len() + 4);
        encode_array_header(&mut buf, 2);
        encode_uint(&mut buf, major::UNSIGNED, u64::from(self.script_type.tag()));
        if self.script_type.is_plutus() {
            encode_bytes(&mut buf, &self.code);
        } else {
            buf.extend_from_slice(&self.code);
        }
        buf
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("type", &self.script_type)
            .field("hash", &self.hash())
            .field("size", &self.code.len())
            .finish()
    }
}

fn normalize_plutus_code(code: Bytes) -> Result<Bytes> {
    let inner = unwrap_bytes(&code)
        .ok_or_else(|| ScriptError::MalformedScript("code is not a CBOR byte string".into()))?;
    if unwrap_bytes(&inner).is_some() {
        Ok(Bytes::from(inner))
    } else {
        Ok(code)
    }
}
