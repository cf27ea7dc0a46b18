//! Compiled-validator blueprints (CIP-57 `plutus.json`).
//!
//! A blueprint is loaded once and shared read-only; validators are looked up
//! by their exact title, e.g. `record.mint`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScriptError};
use crate::script::ScriptType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preamble {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
    pub plutus_version: String,
}

impl Preamble {
    /// Script type declared for every validator in the blueprint.
    pub fn script_type(&self) -> Result<ScriptType> {
        self.plutus_version.parse()
    }
}

/// A declared compile-time parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub title: String,
    /// Hex of the CBOR-wrapped flat program.
    pub compiled_code: String,
    /// Hash of the unparameterized script, as reported by the compiler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Validator {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn compiled_code_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.compiled_code).map_err(|e| {
            ScriptError::MalformedScript(format!("{}: compiled code is not hex: {}", self.title, e))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub preamble: Preamble,
    pub validators: Vec<Validator>,
}

impl Blueprint {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let blueprint: Self = serde_json::from_str(json)?;
        tracing::debug!(
            title = %blueprint.preamble.title,
            validators = blueprint.validators.len(),
            "loaded blueprint"
        );
        Ok(blueprint)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Look up a validator by exact title.
    pub fn validator(&self, title: &str) -> Result<&Validator> {
        self.validators
            .iter()
            .find(|v| v.title == title)
            .ok_or_else(|| ScriptError::ScriptNotFound(title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BLUEPRINT: &str = r##"{
        "preamble": {
            "title": "record/contracts",
            "version": "0.0.0",
            "plutusVersion": "v2",
            "compiler": { "name": "Aiken", "version": "v1.0.26" }
        },
        "validators": [
            {
                "title": "record.mint",
                "redeemer": { "title": "action", "schema": {} },
                "parameters": [
                    { "title": "utxo_ref", "schema": { "$ref": "#/definitions/OutputReference" } }
                ],
                "compiledCode": "46010000222499",
                "hash": "52c6af0c9b744b4eecce838538a52ceb155038b3de68e2bb2fa8fc37"
            }
        ],
        "definitions": {}
    }"##;

    #[test]
    fn test_parse_and_lookup() {
        let blueprint = Blueprint::from_json_str(BLUEPRINT).unwrap();
        assert_eq!(blueprint.preamble.script_type().unwrap(), ScriptType::PlutusV2);

        let validator = blueprint.validator("record.mint").unwrap();
        assert_eq!(validator.arity(), 1);
        assert_eq!(validator.compiled_code_bytes().unwrap(), hex::decode("46010000222499").unwrap());
    }

    #[test]
    fn test_missing_validator() {
        let blueprint = Blueprint::from_json_str(BLUEPRINT).unwrap();
        assert!(matches!(
            blueprint.validator("record.spend"),
            Err(ScriptError::ScriptNotFound(title)) if title == "record.spend"
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BLUEPRINT.as_bytes()).unwrap();
        let blueprint = Blueprint::from_path(file.path()).unwrap();
        assert_eq!(blueprint.validators.len(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Blueprint::from_json_str("{\"preamble\": 1}"),
            Err(ScriptError::Blueprint(_))
        ));
    }
}
