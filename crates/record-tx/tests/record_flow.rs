//! End-to-end planning of record transactions.

use std::sync::Arc;

use proptest::prelude::*;

use record_tx::builder::{
    CredentialDeriver, DatumOption, Entry, RedeemerError, SelectionError, UsernameHash,
};
use record_tx::core::{
    Address, AssetId, AssetName, Assets, Credential, FromPlutusData, KeyHash, Network,
    OutputReference, TxHash,
};
use record_tx::{AccountRequest, Blueprint, CoreConfig, Error, RecordMint, RecordTx, Utxo};

const ADA: u64 = 1_000_000;

const BLUEPRINT: &str = r#"{
    "preamble": { "title": "record", "version": "0.0.0", "plutusVersion": "v2" },
    "validators": [
        {
            "title": "record.mint",
            "parameters": [ { "title": "utxo_ref", "schema": {} } ],
            "compiledCode": "46010000222499"
        }
    ]
}"#;

struct FixedDeriver;

impl CredentialDeriver for FixedDeriver {
    fn derive_public_key(
        &self,
        username: &UsernameHash,
        password: &str,
    ) -> Result<Vec<u8>, RedeemerError> {
        if password.is_empty() {
            return Err(RedeemerError::Derivation("empty password".into()));
        }
        let mut key = username.as_bytes().to_vec();
        key.push(password.len() as u8);
        Ok(key)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn record_tx() -> RecordTx {
    let blueprint = Blueprint::from_json_str(BLUEPRINT).unwrap();
    RecordTx::new(CoreConfig::default(), Arc::new(blueprint))
}

fn wallet() -> Address {
    Address::enterprise(
        Network::Testnet,
        Credential::PublicKey(KeyHash::from_bytes([0x33; 28])),
    )
}

fn utxo(tx: u8, index: u64, assets: Assets) -> Utxo {
    Utxo {
        out_ref: OutputReference::new(TxHash::from_bytes([tx; 32]), index),
        address: wallet(),
        assets,
    }
}

fn snapshot() -> Vec<Utxo> {
    let token = format!("{}{}", "ab".repeat(28), "01");
    vec![
        utxo(1, 0, Assets::lovelace(100 * ADA).with(token, 1)),
        utxo(1, 1, Assets::lovelace(40 * ADA)),
        utxo(2, 0, Assets::lovelace(60 * ADA)),
    ]
}

#[test]
fn initiate_record_plans_head_output() {
    init_tracing();
    let record = record_tx();
    let plan = record.initiate_record(&snapshot(), wallet()).unwrap();

    assert_eq!(plan.funding_input.out_ref.index, 0);
    assert_eq!(plan.funding_input.out_ref.tx_hash, TxHash::from_bytes([2; 32]));
    assert_eq!(plan.record_address, plan.record_script.address(Network::Testnet));
    assert_eq!(plan.redeemer, RecordMint::InitiateRecord);
    assert_eq!(hex::encode(plan.redeemer_cbor()), "d87980");

    let head = AssetId::from_unit(plan.mint.iter().next().unwrap().0).unwrap();
    match &head {
        AssetId::Native { policy, name } => {
            assert_eq!(*policy, plan.record_script.policy_id());
            assert_eq!(name.as_bytes(), &[0x9e]);
        }
        AssetId::Lovelace => panic!("head token must be native"),
    }

    assert_eq!(plan.outputs.len(), 1);
    let output = &plan.outputs[0];
    assert_eq!(output.address, plan.record_address);
    assert_eq!(output.value.coin(), 2 * ADA);
    match &output.datum {
        Some(DatumOption::Inline(datum)) => {
            let entry = Entry::from_plutus_data(datum.data(), Network::Testnet).unwrap();
            assert_eq!(entry, Entry::tail(wallet()));
        }
        other => panic!("unexpected datum {:?}", other),
    }
}

#[test]
fn initiate_record_is_deterministic_per_funding_input() {
    let record = record_tx();
    let a = record.initiate_record(&snapshot(), wallet()).unwrap();
    let b = record.initiate_record(&snapshot(), wallet()).unwrap();
    assert_eq!(a.record_script, b.record_script);
    assert_eq!(a.outputs, b.outputs);

    let other = vec![utxo(9, 3, Assets::lovelace(75 * ADA))];
    let c = record.initiate_record(&other, wallet()).unwrap();
    assert_ne!(a.record_script.policy_id(), c.record_script.policy_id());
    assert_ne!(a.record_address, c.record_address);
}

#[test]
fn initiate_record_without_funding_input() {
    let record = record_tx();
    let utxos = &snapshot()[..2];
    let err = record.initiate_record(utxos, wallet()).unwrap_err();
    assert!(matches!(err, Error::Selection(SelectionError::NoMatch { .. })));
    assert!(err.is_user_actionable());
    assert!(!err.is_retryable());
}

#[test]
fn initiate_record_with_unknown_validator() {
    let config = CoreConfig {
        record_validator: "record.missing".into(),
        ..CoreConfig::default()
    };
    let record = RecordTx::new(config, Arc::new(Blueprint::from_json_str(BLUEPRINT).unwrap()));
    assert!(matches!(
        record.initiate_record(&snapshot(), wallet()),
        Err(Error::Script(_))
    ));
}

#[test]
fn mint_new_account_plans_account_output() {
    init_tracing();
    let record = record_tx();
    let script = record.record_script(&snapshot()[2].out_ref).unwrap();

    let request = AccountRequest {
        username: "alice",
        password: "hunter2",
        now_ms: 1_700_000_000_000,
        extra_outputs: vec![],
    };
    let plan = record.mint_new_account(&script, request, &FixedDeriver).unwrap();

    let expected_hash = UsernameHash::from_username("alice").unwrap();
    assert_eq!(plan.username, expected_hash);
    match &plan.account_token {
        AssetId::Native { policy, name } => {
            assert_eq!(*policy, script.policy_id());
            assert_eq!(name.as_bytes()[0], 0x9e);
            assert_eq!(&name.as_bytes()[1..], expected_hash.as_bytes());
        }
        AssetId::Lovelace => panic!("account token must be native"),
    }

    assert_eq!(plan.outputs.len(), 1);
    match &plan.outputs[0].datum {
        Some(DatumOption::Inline(datum)) => {
            let account = record_tx::builder::AccountDatum::from_plutus_data(datum.data()).unwrap();
            assert_eq!(account.pubkey.len(), 32);
            assert_eq!(account.latest_activity, 1_700_000_000_000);
        }
        other => panic!("unexpected datum {:?}", other),
    }

    match &plan.redeemer {
        RecordMint::MintNewAccount { username, outputs } => {
            assert_eq!(*username, expected_hash);
            assert_eq!(outputs, &plan.outputs);
        }
        RecordMint::InitiateRecord => panic!("wrong redeemer"),
    }
}

#[test]
fn mint_new_account_rejects_empty_username() {
    let record = record_tx();
    let script = record.record_script(&snapshot()[2].out_ref).unwrap();
    let request = AccountRequest {
        username: "",
        password: "pw",
        now_ms: 0,
        extra_outputs: vec![],
    };
    assert!(matches!(
        record.mint_new_account(&script, request, &FixedDeriver),
        Err(Error::Redeemer(RedeemerError::EmptyUsername))
    ));
}

#[test]
fn mint_new_account_surfaces_deriver_failure() {
    let record = record_tx();
    let script = record.record_script(&snapshot()[2].out_ref).unwrap();
    let request = AccountRequest {
        username: "bob",
        password: "",
        now_ms: 0,
        extra_outputs: vec![],
    };
    assert!(matches!(
        record.mint_new_account(&script, request, &FixedDeriver),
        Err(Error::Redeemer(RedeemerError::Derivation(_)))
    ));
}

proptest! {
    #[test]
    fn account_token_tracks_username(
        username in "[a-z][a-z0-9_]{0,15}",
        now_ms in 0i128..=i64::MAX as i128,
    ) {
        let record = record_tx();
        let script = record.record_script(&snapshot()[2].out_ref).unwrap();
        let request = AccountRequest {
            username: &username,
            password: "pw",
            now_ms,
            extra_outputs: vec![],
        };
        let plan = record.mint_new_account(&script, request, &FixedDeriver).unwrap();

        let hash = UsernameHash::from_username(&username).unwrap();
        let name = AssetName::new(hash.token_name(0x9e).to_vec()).unwrap();
        let expected = AssetId::native(script.policy_id(), name.clone());

        prop_assert_eq!(plan.username, hash);
        prop_assert_eq!(&plan.account_token, &expected);
        prop_assert_eq!(plan.mint.get(&expected.to_unit()), Some(1));
        prop_assert_eq!(plan.outputs[0].value.quantity_of(&script.policy_id(), &name), 1);
    }
}
