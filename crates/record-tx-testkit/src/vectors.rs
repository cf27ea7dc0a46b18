//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the exact ledger bytes of redeemers, parameterized
//! scripts and addresses. Another implementation of the record flows must
//! reproduce every one of them.

use std::sync::Arc;

use record_tx_builder::{OutputBuilder, RecordMint, TxOutput, UsernameHash};
use record_tx_core::{
    Address, Assets, Credential, KeyHash, Network, PlutusData, ScriptHash, ToPlutusData,
};
use record_tx_script::{Blueprint, Script, ScriptParameterizer, ScriptType};

/// Smallest well-formed Plutus V2 program, CBOR-wrapped.
pub const TEMPLATE_CODE: &str = "46010000222499";

/// Hash of the record policy used by the derived-output vectors.
pub const RECORD_HASH: &str = "9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616";

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Produces the hex under test.
    pub compute: fn() -> String,
    /// Expected hex or text.
    pub expected: &'static str,
}

impl GoldenVector {
    pub fn actual(&self) -> String {
        (self.compute)()
    }

    pub fn verify(&self) -> bool {
        self.actual() == self.expected
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "InitiateRecord redeemer",
            compute: || hex::encode(RecordMint::InitiateRecord.to_cbor()),
            expected: "d87980",
        },
        GoldenVector {
            name: "MintNewAccount redeemer for alice without outputs",
            compute: || {
                let redeemer = RecordMint::MintNewAccount {
                    username: alice(),
                    outputs: vec![],
                };
                hex::encode(redeemer.to_cbor())
            },
            expected: "d87a9f581fd806c97f0e00af1a1fc3328fa763a9269723c8db8fac4f93af71db186d6e9080ff",
        },
        GoldenVector {
            name: "Five derived outputs at the record script",
            compute: || {
                let list = PlutusData::list(
                    derived_outputs()
                        .iter()
                        .map(ToPlutusData::to_plutus_data)
                        .collect(),
                );
                hex::encode(list.to_cbor())
            },
            expected: DERIVED_OUTPUTS,
        },
        GoldenVector {
            name: "Template script hash",
            compute: || template().hash().to_hex(),
            expected: "52c6af0c9b744b4eecce838538a52ceb155038b3de68e2bb2fa8fc37",
        },
        GoldenVector {
            name: "Template applied to Integer 1",
            compute: || applied_to_one().script.code_hex(),
            expected: "4c010000322249930101010001",
        },
        GoldenVector {
            name: "Hash of template applied to Integer 1",
            compute: || applied_to_one().hash().to_hex(),
            expected: "76cd32622d5f93ead5b3de3a1c5f54ab6f6aa64888e5e48ca73b8f34",
        },
        GoldenVector {
            name: "Testnet enterprise script address",
            compute: || record_address(Network::Testnet).to_string(),
            expected: "addr_test1wz0wdhakrghmjq7lfp7yq9nrsfty8wuzt4qkjhnrm790v9savl6a9",
        },
        GoldenVector {
            name: "Mainnet enterprise script address",
            compute: || record_address(Network::Mainnet).to_string(),
            expected: "addr1wx0wdhakrghmjq7lfp7yq9nrsfty8wuzt4qkjhnrm790v9sxytxjq",
        },
        GoldenVector {
            name: "Testnet base key address",
            compute: || {
                Address::base(
                    Network::Testnet,
                    Credential::PublicKey(KeyHash::from_bytes([0x11; 28])),
                    Credential::PublicKey(KeyHash::from_bytes([0x22; 28])),
                )
                .to_string()
            },
            expected: "addr_test1qqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyfzyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3qwzdgzn",
        },
    ]
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, actual)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let actual = v.actual();
            (v.name.to_string(), actual == v.expected, actual)
        })
        .collect()
}

const DERIVED_OUTPUTS: &str = concat!(
    "9fd8799fd8799fd87a9f581c9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616",
    "ffd87a80ffa240a1401a00030d40581c9ee6dfb61a2fb903df487c401663825643bb825d41695e63",
    "df8af616a1419e01d87b9f01ffd87a80ffd8799fd8799fd87a9f581c9ee6dfb61a2fb903df487c40",
    "1663825643bb825d41695e63df8af616ffd87a80ffa240a1401a00030d40581c9ee6dfb61a2fb903",
    "df487c401663825643bb825d41695e63df8af616a1419e01d87b9f01ffd87a80ffd8799fd8799fd8",
    "7a9f581c9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616ffd87a80ffa140a1",
    "401a00030d40d87b9f01ffd87a80ffd8799fd8799fd87a9f581c9ee6dfb61a2fb903df487c401663",
    "825643bb825d41695e63df8af616ffd87a80ffa140a1401a00030d40d87b9f01ffd87a80ffd8799f",
    "d8799fd87a9f581c9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616ffd87a80",
    "ffa140a1401a00030d40d87b9f01ffd87a80ffff",
);

fn alice() -> UsernameHash {
    UsernameHash::from_username("alice").expect("non-empty username")
}

fn template() -> Script {
    Script::from_hex(ScriptType::PlutusV2, TEMPLATE_CODE).expect("template is well formed")
}

fn applied_to_one() -> record_tx_script::AppliedScript {
    let blueprint = Blueprint::from_json_str(&format!(
        r#"{{
            "preamble": {{ "title": "golden", "version": "0.0.0", "plutusVersion": "v2" }},
            "validators": [
                {{ "title": "golden.mint", "parameters": [ {{ "title": "n" }} ], "compiledCode": "{}" }}
            ]
        }}"#,
        TEMPLATE_CODE
    ))
    .expect("golden blueprint parses");
    ScriptParameterizer::new(Arc::new(blueprint))
        .apply("golden.mint", &[PlutusData::integer(1)])
        .expect("one parameter declared")
}

fn record_address(network: Network) -> Address {
    let hash = ScriptHash::from_hex(RECORD_HASH).expect("valid script hash");
    Address::enterprise(network, Credential::Script(hash))
}

/// Two outputs with 200000 lovelace plus one `9e` token, then three
/// lovelace-only outputs, each with inline datum `1`.
fn derived_outputs() -> Vec<TxOutput> {
    let token = format!("{}9e", RECORD_HASH);
    let with_token = Assets::lovelace(200_000).with(token, 1);
    let lovelace_only = Assets::lovelace(200_000);

    [&with_token, &with_token, &lovelace_only, &lovelace_only, &lovelace_only]
        .into_iter()
        .map(|assets| {
            OutputBuilder::new(record_address(Network::Testnet))
                .with_inline_datum(&PlutusData::integer(1))
                .with_value(assets)
                .expect("valid assets")
                .build()
        })
        .collect()
}
