//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a wallet with a real ed25519
//! key, a small blueprint, and a deterministic credential deriver.

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use record_tx::{CoreConfig, RecordTx};
use record_tx_builder::{CredentialDeriver, RedeemerError, UsernameHash, Utxo};
use record_tx_core::crypto::sha256;
use record_tx_core::{Address, Assets, Credential, KeyHash, Network, OutputReference, TxHash};
use record_tx_script::Blueprint;

pub const ADA: u64 = 1_000_000;

/// A blueprint with a one-parameter minting policy and a spending validator.
///
/// Both use the smallest well-formed Plutus V2 program, so application
/// results are cheap to check by hand.
pub const SAMPLE_BLUEPRINT: &str = r##"{
    "preamble": {
        "title": "sample/record",
        "description": "Fixture blueprint",
        "version": "0.0.0",
        "plutusVersion": "v2"
    },
    "validators": [
        {
            "title": "record.mint",
            "parameters": [
                { "title": "utxo_ref", "schema": { "$ref": "#/definitions/OutputReference" } }
            ],
            "compiledCode": "46010000222499",
            "hash": "52c6af0c9b744b4eecce838538a52ceb155038b3de68e2bb2fa8fc37"
        },
        {
            "title": "record.spend",
            "compiledCode": "46010000222499",
            "hash": "52c6af0c9b744b4eecce838538a52ceb155038b3de68e2bb2fa8fc37"
        }
    ]
}"##;

/// Parse [`SAMPLE_BLUEPRINT`].
pub fn sample_blueprint() -> Arc<Blueprint> {
    Arc::new(Blueprint::from_json_str(SAMPLE_BLUEPRINT).expect("sample blueprint is valid"))
}

/// A wallet holding one payment key.
pub struct TestWallet {
    pub signing_key: SigningKey,
    pub network: Network,
}

impl TestWallet {
    /// A wallet with a random key.
    pub fn new(network: Network) -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
            network,
        }
    }

    /// A wallet with a deterministic key.
    pub fn from_seed(seed: [u8; 32], network: Network) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
            network,
        }
    }

    pub fn key_hash(&self) -> KeyHash {
        KeyHash::of_verification_key(self.signing_key.verifying_key().as_bytes())
    }

    /// Enterprise address paying to the wallet key.
    pub fn address(&self) -> Address {
        Address::enterprise(self.network, Credential::PublicKey(self.key_hash()))
    }

    /// A UTxO at the wallet address.
    pub fn utxo(&self, tx: u8, index: u64, assets: Assets) -> Utxo {
        Utxo {
            out_ref: OutputReference::new(TxHash::from_bytes([tx; 32]), index),
            address: self.address(),
            assets,
        }
    }

    /// Three UTxOs of which only the last one can fund a record:
    /// 100 ADA plus a token, 40 ADA, 60 ADA.
    pub fn snapshot(&self) -> Vec<Utxo> {
        let token = format!("{}{}", "ab".repeat(28), "01");
        vec![
            self.utxo(1, 0, Assets::lovelace(100 * ADA).with(token, 1)),
            self.utxo(1, 1, Assets::lovelace(40 * ADA)),
            self.utxo(2, 0, Assets::lovelace(60 * ADA)),
        ]
    }
}

/// Derives an ed25519 key from `sha256(username_hash ‖ password)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestDeriver;

impl CredentialDeriver for TestDeriver {
    fn derive_public_key(
        &self,
        username: &UsernameHash,
        password: &str,
    ) -> Result<Vec<u8>, RedeemerError> {
        if password.is_empty() {
            return Err(RedeemerError::Derivation("empty password".into()));
        }
        let mut material = username.as_bytes().to_vec();
        material.extend_from_slice(password.as_bytes());
        let key = SigningKey::from_bytes(&sha256(&material));
        Ok(key.verifying_key().to_bytes().to_vec())
    }
}

/// A test fixture with a wallet and a planner over the sample blueprint.
pub struct TestFixture {
    pub wallet: TestWallet,
    pub record: RecordTx,
}

impl TestFixture {
    /// Create a new test fixture with a random wallet key.
    pub fn new() -> Self {
        Self::with_wallet(TestWallet::new(Network::Testnet))
    }

    /// Create with a deterministic wallet key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_wallet(TestWallet::from_seed(seed, Network::Testnet))
    }

    fn with_wallet(wallet: TestWallet) -> Self {
        let config = CoreConfig::default().with_network(wallet.network);
        Self {
            record: RecordTx::new(config, sample_blueprint()),
            wallet,
        }
    }

    pub fn snapshot(&self) -> Vec<Utxo> {
        self.wallet.snapshot()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_tx::AccountRequest;

    #[test]
    fn test_sample_blueprint() {
        let blueprint = sample_blueprint();
        assert_eq!(blueprint.validators.len(), 2);
        assert_eq!(blueprint.validator("record.mint").unwrap().arity(), 1);
        assert_eq!(blueprint.validator("record.spend").unwrap().arity(), 0);
    }

    #[test]
    fn test_seeded_wallet_is_deterministic() {
        let a = TestWallet::from_seed([7; 32], Network::Testnet);
        let b = TestWallet::from_seed([7; 32], Network::Testnet);
        let c = TestWallet::from_seed([8; 32], Network::Testnet);
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
        assert!(a.address().to_string().starts_with("addr_test1v"));
    }

    #[test]
    fn test_deriver() {
        let hash = UsernameHash::from_username("alice").unwrap();
        let k1 = TestDeriver.derive_public_key(&hash, "pw").unwrap();
        let k2 = TestDeriver.derive_public_key(&hash, "pw").unwrap();
        let k3 = TestDeriver.derive_public_key(&hash, "other").unwrap();
        assert_eq!(k1.len(), 32);
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert!(TestDeriver.derive_public_key(&hash, "").is_err());
    }

    #[test]
    fn test_fixture_plans_both_flows() {
        let fixture = TestFixture::with_seed([1; 32]);
        let snapshot = fixture.snapshot();
        let plan = fixture
            .record
            .initiate_record(&snapshot, fixture.wallet.address())
            .unwrap();
        assert_eq!(plan.funding_input, snapshot[2]);

        let account = fixture
            .record
            .mint_new_account(
                &plan.record_script,
                AccountRequest {
                    username: "carol",
                    password: "secret",
                    now_ms: 0,
                    extra_outputs: vec![],
                },
                &TestDeriver,
            )
            .unwrap();
        assert_eq!(account.outputs[0].address, plan.record_address);
    }

    #[test]
    fn test_blueprint_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plutus.json");
        std::fs::write(&path, SAMPLE_BLUEPRINT).unwrap();
        let blueprint = Blueprint::from_path(&path).unwrap();
        assert_eq!(blueprint.preamble.title, "sample/record");
    }
}
