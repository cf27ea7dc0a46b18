//! Proptest generators for property-based testing.

use proptest::prelude::*;

use record_tx_core::{
    Address, AssetId, AssetName, Assets, Credential, KeyHash, Network, OutputReference,
    PlutusData, PolicyId, ScriptHash, TxHash,
};

/// Generate a random PolicyId.
pub fn policy_id() -> impl Strategy<Value = PolicyId> {
    any::<[u8; 28]>().prop_map(PolicyId::from_bytes)
}

/// Generate an asset name of 0 to 32 bytes.
pub fn asset_name() -> impl Strategy<Value = AssetName> {
    prop::collection::vec(any::<u8>(), 0..=AssetName::MAX_LEN)
        .prop_map(|bytes| AssetName::new(bytes).expect("length within bound"))
}

/// Generate lovelace or a native asset.
pub fn asset_id() -> impl Strategy<Value = AssetId> {
    prop_oneof![
        1 => Just(AssetId::Lovelace),
        4 => (policy_id(), asset_name()).prop_map(|(p, n)| AssetId::native(p, n)),
    ]
}

/// Generate a sparse asset map, zero quantities included.
///
/// Native assets are drawn from a handful of policies so that grouping
/// under a shared policy is exercised.
pub fn assets() -> impl Strategy<Value = Assets> {
    (
        prop::collection::vec(policy_id(), 1..=3),
        0u64..=1_000_000_000,
        prop::collection::vec((any::<prop::sample::Index>(), asset_name(), 0u64..=1_000), 0..8),
    )
        .prop_map(|(policies, coin, natives)| {
            let mut assets = Assets::lovelace(coin);
            for (idx, name, quantity) in natives {
                let policy = *idx.get(&policies);
                assets.insert_asset(&AssetId::native(policy, name), quantity);
            }
            assets
        })
}

/// Generate a random OutputReference.
pub fn out_ref() -> impl Strategy<Value = OutputReference> {
    (any::<[u8; 32]>(), 0u64..=1_000)
        .prop_map(|(hash, index)| OutputReference::new(TxHash::from_bytes(hash), index))
}

pub fn network() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Testnet), Just(Network::Mainnet)]
}

pub fn credential() -> impl Strategy<Value = Credential> {
    prop_oneof![
        any::<[u8; 28]>().prop_map(|h| Credential::PublicKey(KeyHash::from_bytes(h))),
        any::<[u8; 28]>().prop_map(|h| Credential::Script(ScriptHash::from_bytes(h))),
    ]
}

/// Generate an enterprise or base address.
pub fn address() -> impl Strategy<Value = Address> {
    (network(), credential(), proptest::option::of(credential())).prop_map(
        |(network, payment, stake)| match stake {
            Some(stake) => Address::base(network, payment, stake),
            None => Address::enterprise(network, payment),
        },
    )
}

/// Generate Plutus data up to a few levels deep.
pub fn plutus_data() -> impl Strategy<Value = PlutusData> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(|n| PlutusData::integer(n)),
        prop::collection::vec(any::<u8>(), 0..=64).prop_map(PlutusData::Bytes),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            (0u64..=200, prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(tag, fields)| PlutusData::constr(tag, fields)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(PlutusData::list),
            prop::collection::vec((inner.clone(), inner), 0..3).prop_map(PlutusData::map),
        ]
    })
}

/// Generate a username.
pub fn username() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Parameters for planning a record initiation.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub funding: OutputReference,
    pub funding_lovelace: u64,
    pub contributor: Address,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            out_ref(),
            50_000_000u64..=10_000_000_000u64, // at or above the default threshold
            address(),
        )
            .prop_map(|(funding, funding_lovelace, contributor)| RecordParams {
                funding,
                funding_lovelace,
                contributor,
            })
            .boxed()
    }
}
