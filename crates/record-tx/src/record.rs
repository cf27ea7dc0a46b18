//! The record flows.
//!
//! Each flow turns a wallet snapshot and user input into a plan: the script,
//! mint, outputs and redeemer an external assembler needs to build, balance
//! and sign the transaction. No flow performs I/O.

use std::sync::Arc;

use record_tx_builder::{
    select_first, AccountDatum, CredentialDeriver, Entry, LovelaceOnlyAtLeast, OutputBuilder,
    RecordMint, TxOutput, UsernameHash, Utxo,
};
use record_tx_core::{Address, AssetId, AssetName, Assets, OutputReference};
use record_tx_script::{AppliedScript, Blueprint, ScriptParameterizer};

use crate::config::CoreConfig;
use crate::error::Result;

/// Everything needed to assemble the transaction that starts a record.
#[derive(Debug, Clone)]
pub struct InitiateRecordPlan {
    /// Input to spend; its reference parameterizes the minting policy.
    pub funding_input: Utxo,
    pub record_script: AppliedScript,
    pub record_address: Address,
    /// Assets to mint under the record policy.
    pub mint: Assets,
    pub outputs: Vec<TxOutput>,
    pub redeemer: RecordMint,
}

impl InitiateRecordPlan {
    pub fn redeemer_cbor(&self) -> Vec<u8> {
        self.redeemer.to_cbor()
    }
}

/// Everything needed to assemble an account registration.
#[derive(Debug, Clone)]
pub struct AccountMintPlan {
    pub username: UsernameHash,
    pub account_token: AssetId,
    pub mint: Assets,
    /// The account output first, followed by any caller-supplied outputs.
    pub outputs: Vec<TxOutput>,
    pub redeemer: RecordMint,
}

impl AccountMintPlan {
    pub fn redeemer_cbor(&self) -> Vec<u8> {
        self.redeemer.to_cbor()
    }
}

/// A new account registration request.
pub struct AccountRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    /// POSIX milliseconds recorded as the account's latest activity.
    pub now_ms: i128,
    /// Extra outputs the transaction will also create.
    pub extra_outputs: Vec<TxOutput>,
}

/// Entry point for planning record transactions.
#[derive(Debug, Clone)]
pub struct RecordTx {
    config: CoreConfig,
    parameterizer: ScriptParameterizer,
}

impl RecordTx {
    pub fn new(config: CoreConfig, blueprint: Arc<Blueprint>) -> Self {
        Self {
            config,
            parameterizer: ScriptParameterizer::new(blueprint),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn parameterizer(&self) -> &ScriptParameterizer {
        &self.parameterizer
    }

    /// The record minting policy bound to `funding`.
    pub fn record_script(&self, funding: &OutputReference) -> Result<AppliedScript> {
        Ok(self
            .parameterizer
            .apply_one_shot(&self.config.record_validator, funding)?)
    }

    /// Plan the transaction that creates a new record.
    ///
    /// Picks the first ADA-only UTxO holding at least the funding threshold,
    /// binds the minting policy to it, and locks the freshly minted head
    /// token at the policy's address under an empty [`Entry`] naming
    /// `contributor`.
    pub fn initiate_record(&self, utxos: &[Utxo], contributor: Address) -> Result<InitiateRecordPlan> {
        let funding = select_first(utxos, &LovelaceOnlyAtLeast(self.config.funding_threshold))?;
        let record_script = self.record_script(&funding.out_ref)?;
        let record_address = record_script.address(self.config.network);

        let head_token = AssetId::native(
            record_script.policy_id(),
            AssetName::new(vec![self.config.record_label])?,
        );
        let mint = Assets::new().with(head_token.to_unit(), 1);

        let head_output = OutputBuilder::new(record_address)
            .with_inline_datum(&Entry::tail(contributor))
            .value_order(self.config.value_order)
            .with_value(
                &Assets::lovelace(self.config.min_output_lovelace).with(head_token.to_unit(), 1),
            )?
            .build();

        tracing::debug!(
            funding = %funding.out_ref,
            policy = %record_script.policy_id(),
            address = %record_address,
            "planned record initiation"
        );

        Ok(InitiateRecordPlan {
            funding_input: funding.clone(),
            record_script,
            record_address,
            mint,
            outputs: vec![head_output],
            redeemer: RecordMint::InitiateRecord,
        })
    }

    /// Plan the registration of a new account under an existing record.
    ///
    /// The password only reaches `deriver`; neither it nor the raw username
    /// appears in the plan.
    pub fn mint_new_account(
        &self,
        record: &AppliedScript,
        request: AccountRequest<'_>,
        deriver: &dyn CredentialDeriver,
    ) -> Result<AccountMintPlan> {
        let username = UsernameHash::from_username(request.username)?;
        let pubkey = deriver.derive_public_key(&username, request.password)?;

        let account_token = AssetId::native(
            record.policy_id(),
            AssetName::new(username.token_name(self.config.record_label).to_vec())?,
        );
        let mint = Assets::new().with(account_token.to_unit(), 1);

        let datum = AccountDatum {
            pubkey,
            nonce: Vec::new(),
            latest_activity: request.now_ms,
        };
        let account_output = OutputBuilder::new(record.address(self.config.network))
            .with_inline_datum(&datum)
            .value_order(self.config.value_order)
            .with_value(
                &Assets::lovelace(self.config.min_output_lovelace).with(account_token.to_unit(), 1),
            )?
            .build();

        let mut outputs = Vec::with_capacity(request.extra_outputs.len() + 1);
        outputs.push(account_output);
        outputs.extend(request.extra_outputs);

        let redeemer = RecordMint::MintNewAccount {
            username,
            outputs: outputs.clone(),
        };

        tracing::debug!(
            username = ?username,
            outputs = outputs.len(),
            "planned account mint"
        );

        Ok(AccountMintPlan {
            username,
            account_token,
            mint,
            outputs,
            redeemer,
        })
    }
}
