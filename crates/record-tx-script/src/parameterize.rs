//! Parameter application for blueprint validators.
//!
//! Applying the same parameters to the same template always yields
//! byte-identical code, so a validator parameterized by an output reference
//! is unique to that (single-use) output.

use std::sync::Arc;

use record_tx_core::{Address, Network, OutputReference, PlutusData, PolicyId, ScriptHash, ToPlutusData};

use crate::blueprint::Blueprint;
use crate::error::{Result, ScriptError};
use crate::script::Script;

/// A concrete script obtained by applying parameters to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedScript {
    pub title: String,
    pub script: Script,
}

impl AppliedScript {
    pub fn hash(&self) -> ScriptHash {
        self.script.hash()
    }

    pub fn policy_id(&self) -> PolicyId {
        self.script.policy_id()
    }

    pub fn address(&self, network: Network) -> Address {
        self.script.address(network)
    }
}

/// Applies compile-time parameters to validators of a shared blueprint.
#[derive(Debug, Clone)]
pub struct ScriptParameterizer {
    blueprint: Arc<Blueprint>,
}

impl ScriptParameterizer {
    pub fn new(blueprint: Arc<Blueprint>) -> Self {
        Self { blueprint }
    }

    pub fn blueprint(&self) -> &Arc<Blueprint> {
        &self.blueprint
    }

    /// The validator's code without any parameters applied.
    pub fn template(&self, title: &str) -> Result<Script> {
        let validator = self.blueprint.validator(title)?;
        Script::new(
            self.blueprint.preamble.script_type()?,
            validator.compiled_code_bytes()?,
        )
    }

    /// Apply `params` in declared order.
    pub fn apply(&self, title: &str, params: &[PlutusData]) -> Result<AppliedScript> {
        let validator = self.blueprint.validator(title)?;
        if params.len() != validator.arity() {
            return Err(ScriptError::ParameterArityMismatch {
                title: title.to_string(),
                expected: validator.arity(),
                got: params.len(),
            });
        }

        let template = self.template(title)?;
        let program = template.program()?.apply_data(params);
        let script = Script::from_program(template.script_type(), &program)?;

        tracing::debug!(
            validator = title,
            params = params.len(),
            hash = %script.hash(),
            "applied script parameters"
        );

        Ok(AppliedScript {
            title: title.to_string(),
            script,
        })
    }

    /// Bind a validator to a single output reference.
    pub fn apply_one_shot(&self, title: &str, out_ref: &OutputReference) -> Result<AppliedScript> {
        self.apply(title, &[out_ref.to_plutus_data()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_tx_core::TxHash;

    fn parameterizer() -> ScriptParameterizer {
        let json = r#"{
            "preamble": { "title": "record", "version": "0.0.0", "plutusVersion": "v2" },
            "validators": [
                {
                    "title": "record.mint",
                    "parameters": [ { "title": "utxo_ref", "schema": {} } ],
                    "compiledCode": "46010000222499"
                },
                { "title": "record.spend", "compiledCode": "46010000222499" }
            ]
        }"#;
        ScriptParameterizer::new(Arc::new(Blueprint::from_json_str(json).unwrap()))
    }

    fn out_ref(byte: u8, index: u64) -> OutputReference {
        OutputReference::new(TxHash::from_bytes([byte; 32]), index)
    }

    #[test]
    fn test_apply_integer_parameter_golden() {
        let applied = parameterizer()
            .apply("record.mint", &[PlutusData::integer(1)])
            .unwrap();
        assert_eq!(applied.script.code_hex(), "4c010000322249930101010001");
        assert_eq!(
            applied.hash().to_hex(),
            "76cd32622d5f93ead5b3de3a1c5f54ab6f6aa64888e5e48ca73b8f34"
        );
    }

    #[test]
    fn test_one_shot_is_deterministic() {
        let p = parameterizer();
        let a = p.apply_one_shot("record.mint", &out_ref(0x11, 0)).unwrap();
        let b = p.apply_one_shot("record.mint", &out_ref(0x11, 0)).unwrap();
        assert_eq!(a.script.code(), b.script.code());
        assert_eq!(a.address(Network::Testnet), b.address(Network::Testnet));
    }

    #[test]
    fn test_distinct_references_give_distinct_policies() {
        let p = parameterizer();
        let a = p.apply_one_shot("record.mint", &out_ref(0x11, 0)).unwrap();
        let b = p.apply_one_shot("record.mint", &out_ref(0x11, 1)).unwrap();
        let c = p.apply_one_shot("record.mint", &out_ref(0x22, 0)).unwrap();
        assert_ne!(a.policy_id(), b.policy_id());
        assert_ne!(a.policy_id(), c.policy_id());
        assert_ne!(b.address(Network::Mainnet), c.address(Network::Mainnet));
    }

    #[test]
    fn test_arity_mismatch() {
        let p = parameterizer();
        assert!(matches!(
            p.apply("record.mint", &[]),
            Err(ScriptError::ParameterArityMismatch { expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            p.apply("record.spend", &[PlutusData::integer(1)]),
            Err(ScriptError::ParameterArityMismatch { expected: 0, got: 1, .. })
        ));
    }

    #[test]
    fn test_unknown_title() {
        assert!(matches!(
            parameterizer().apply_one_shot("record.burn", &out_ref(0, 0)),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }

    #[test]
    fn test_zero_parameters_keeps_template() {
        let p = parameterizer();
        let applied = p.apply("record.spend", &[]).unwrap();
        assert_eq!(applied.script, p.template("record.spend").unwrap());
    }
}
