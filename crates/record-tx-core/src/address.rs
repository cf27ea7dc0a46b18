//! Shelley addresses: credentials, header byte layout, bech32 text form and
//! the Plutus data view used inside datums and redeemers.
//!
//! Header byte: high nibble is the address type, low nibble the network id.
//!
//! | type | payment | stake   |
//! |------|---------|---------|
//! | 0    | key     | key     |
//! | 1    | script  | key     |
//! | 2    | key     | script  |
//! | 3    | script  | script  |
//! | 4    | key     | pointer |
//! | 5    | script  | pointer |
//! | 6    | key     | none    |
//! | 7    | script  | none    |

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::plutus_data::{expect_bytes, expect_int, FromPlutusData, PlutusData, ToPlutusData};
use crate::types::{KeyHash, ScriptHash};

/// Network discriminant carried in the address header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Network id in the address header.
    pub fn id(self) -> u8 {
        match self {
            Network::Testnet => 0,
            Network::Mainnet => 1,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Network::Testnet),
            1 => Ok(Network::Mainnet),
            other => Err(CoreError::MalformedAddress(format!(
                "unknown network id {}",
                other
            ))),
        }
    }

    /// Human-readable part for bech32 payment addresses.
    pub fn address_hrp(self) -> &'static str {
        match self {
            Network::Testnet => "addr_test",
            Network::Mainnet => "addr",
        }
    }
}

/// A payment or stake credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Credential {
    PublicKey(KeyHash),
    Script(ScriptHash),
}

impl Credential {
    /// The 28 hash bytes, regardless of kind.
    pub fn hash_bytes(&self) -> &[u8; 28] {
        match self {
            Credential::PublicKey(h) => h.as_bytes(),
            Credential::Script(h) => h.as_bytes(),
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Credential::Script(_))
    }

    fn from_hash_bytes(is_script: bool, bytes: &[u8]) -> Result<Self> {
        Ok(if is_script {
            Credential::Script(ScriptHash::try_from(bytes)?)
        } else {
            Credential::PublicKey(KeyHash::try_from(bytes)?)
        })
    }
}

/// `PublicKeyCredential h = Constr 0 [h]`, `ScriptCredential h = Constr 1 [h]`
impl ToPlutusData for Credential {
    fn to_plutus_data(&self) -> PlutusData {
        let tag = if self.is_script() { 1 } else { 0 };
        PlutusData::constr(tag, vec![PlutusData::bytes(self.hash_bytes())])
    }
}

impl FromPlutusData for Credential {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        match data {
            PlutusData::Constr { tag, fields } if *tag <= 1 && fields.len() == 1 => {
                let hash = expect_bytes(&fields[0], "credential hash")?;
                Credential::from_hash_bytes(*tag == 1, hash)
            }
            _ => Err(CoreError::MalformedData("expected credential".into())),
        }
    }
}

/// Location of a stake registration certificate on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub slot: u64,
    pub tx_index: u64,
    pub cert_index: u64,
}

/// Delegation part of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StakeCredential {
    Inline(Credential),
    Pointer(Pointer),
}

/// `Inline c = Constr 0 [c]`, `Pointer = Constr 1 [slot, tx, cert]`
impl ToPlutusData for StakeCredential {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            StakeCredential::Inline(c) => PlutusData::constr(0, vec![c.to_plutus_data()]),
            StakeCredential::Pointer(p) => PlutusData::constr(
                1,
                vec![
                    PlutusData::integer(p.slot),
                    PlutusData::integer(p.tx_index),
                    PlutusData::integer(p.cert_index),
                ],
            ),
        }
    }
}

impl FromPlutusData for StakeCredential {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        let nat = |d: &PlutusData| -> Result<u64> {
            u64::try_from(expect_int(d, "pointer field")?)
                .map_err(|_| CoreError::MalformedData("pointer field out of range".into()))
        };
        match data {
            PlutusData::Constr { tag: 0, fields } if fields.len() == 1 => Ok(
                StakeCredential::Inline(Credential::from_plutus_data(&fields[0])?),
            ),
            PlutusData::Constr { tag: 1, fields } if fields.len() == 3 => {
                Ok(StakeCredential::Pointer(Pointer {
                    slot: nat(&fields[0])?,
                    tx_index: nat(&fields[1])?,
                    cert_index: nat(&fields[2])?,
                }))
            }
            _ => Err(CoreError::MalformedData("expected stake credential".into())),
        }
    }
}

/// A Shelley payment address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub network: Network,
    pub payment: Credential,
    pub stake: Option<StakeCredential>,
}

impl Address {
    /// Address without a delegation part.
    pub fn enterprise(network: Network, payment: Credential) -> Self {
        Self {
            network,
            payment,
            stake: None,
        }
    }

    /// Address with an inline stake credential.
    pub fn base(network: Network, payment: Credential, stake: Credential) -> Self {
        Self {
            network,
            payment,
            stake: Some(StakeCredential::Inline(stake)),
        }
    }

    /// The 4-bit address type.
    pub fn type_id(&self) -> u8 {
        let stake_base = match self.stake {
            Some(StakeCredential::Inline(Credential::PublicKey(_))) => 0,
            Some(StakeCredential::Inline(Credential::Script(_))) => 2,
            Some(StakeCredential::Pointer(_)) => 4,
            None => 6,
        };
        stake_base + u8::from(self.payment.is_script())
    }

    pub fn header(&self) -> u8 {
        (self.type_id() << 4) | self.network.id()
    }

    /// Raw address bytes as they appear in a transaction output.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(57);
        buf.push(self.header());
        buf.extend_from_slice(self.payment.hash_bytes());
        match &self.stake {
            Some(StakeCredential::Inline(c)) => buf.extend_from_slice(c.hash_bytes()),
            Some(StakeCredential::Pointer(p)) => {
                encode_variable_nat(&mut buf, p.slot);
                encode_variable_nat(&mut buf, p.tx_index);
                encode_variable_nat(&mut buf, p.cert_index);
            }
            None => {}
        }
        buf
    }

    /// Parse raw address bytes. Byron and reward addresses are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = *bytes
            .first()
            .ok_or_else(|| CoreError::MalformedAddress("empty address".into()))?;
        let type_id = header >> 4;
        let network = Network::from_id(header & 0x0f)?;
        if type_id > 7 {
            return Err(CoreError::MalformedAddress(format!(
                "unsupported address type {}",
                type_id
            )));
        }
        if bytes.len() < 29 {
            return Err(CoreError::MalformedAddress(format!(
                "address too short: {} bytes",
                bytes.len()
            )));
        }

        let payment = Credential::from_hash_bytes(type_id & 1 == 1, &bytes[1..29])?;
        let rest = &bytes[29..];

        let stake = match type_id {
            0..=3 => {
                if rest.len() != 28 {
                    return Err(CoreError::MalformedAddress(
                        "base address must carry a 28-byte stake hash".into(),
                    ));
                }
                Some(StakeCredential::Inline(Credential::from_hash_bytes(
                    type_id >= 2,
                    rest,
                )?))
            }
            4 | 5 => {
                let mut pos = 0;
                let pointer = Pointer {
                    slot: decode_variable_nat(rest, &mut pos)?,
                    tx_index: decode_variable_nat(rest, &mut pos)?,
                    cert_index: decode_variable_nat(rest, &mut pos)?,
                };
                if pos != rest.len() {
                    return Err(CoreError::MalformedAddress(
                        "trailing bytes after pointer".into(),
                    ));
                }
                Some(StakeCredential::Pointer(pointer))
            }
            _ => {
                if !rest.is_empty() {
                    return Err(CoreError::MalformedAddress(
                        "enterprise address must be 29 bytes".into(),
                    ));
                }
                None
            }
        };

        Ok(Self {
            network,
            payment,
            stake,
        })
    }

    /// Encode as bech32 (`addr1...` / `addr_test1...`).
    pub fn to_bech32(&self) -> Result<String> {
        let hrp = Hrp::parse(self.network.address_hrp())
            .map_err(|e| CoreError::MalformedAddress(e.to_string()))?;
        bech32::encode::<Bech32>(hrp, &self.to_bytes())
            .map_err(|e| CoreError::MalformedAddress(e.to_string()))
    }

    /// Parse a bech32 payment address, checking that the prefix matches the
    /// network encoded in the header.
    pub fn from_bech32(s: &str) -> Result<Self> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| CoreError::MalformedAddress(e.to_string()))?;
        let address = Self::from_bytes(&data)?;
        if hrp.as_str() != address.network.address_hrp() {
            return Err(CoreError::MalformedAddress(format!(
                "prefix {} does not match {:?}",
                hrp.as_str(),
                address.network
            )));
        }
        Ok(address)
    }

    /// Rebuild an address from its Plutus data view, which has no network.
    pub fn from_plutus_data(data: &PlutusData, network: Network) -> Result<Self> {
        match data {
            PlutusData::Constr { tag: 0, fields } if fields.len() == 2 => Ok(Self {
                network,
                payment: Credential::from_plutus_data(&fields[0])?,
                stake: Option::<StakeCredential>::from_plutus_data(&fields[1])?,
            }),
            _ => Err(CoreError::MalformedData("expected address".into())),
        }
    }
}

/// `Constr 0 [payment, Nullable(stake)]`
impl ToPlutusData for Address {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                self.payment.to_plutus_data(),
                self.stake.to_plutus_data(),
            ],
        )
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{}", hex::encode(self.to_bytes())),
        }
    }
}

/// Big-endian base-128 natural with the high bit set on all but the last byte.
fn encode_variable_nat(buf: &mut Vec<u8>, mut n: u64) {
    let mut groups = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        groups.push((n & 0x7f) as u8 | 0x80);
        n >>= 7;
    }
    groups.reverse();
    buf.extend_from_slice(&groups);
}

fn decode_variable_nat(bytes: &[u8], pos: &mut usize) -> Result<u64> {
    let mut n: u64 = 0;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| CoreError::MalformedAddress("truncated pointer".into()))?;
        *pos += 1;
        if n > (u64::MAX >> 7) {
            return Err(CoreError::MalformedAddress("pointer overflow".into()));
        }
        n = (n << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_script() -> ScriptHash {
        ScriptHash::from_hex("9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616").unwrap()
    }

    #[test]
    fn test_enterprise_script_address_bech32() {
        let testnet = Address::enterprise(Network::Testnet, Credential::Script(record_script()));
        assert_eq!(testnet.header(), 0x70);
        assert_eq!(
            testnet.to_bech32().unwrap(),
            "addr_test1wz0wdhakrghmjq7lfp7yq9nrsfty8wuzt4qkjhnrm790v9savl6a9"
        );

        let mainnet = Address::enterprise(Network::Mainnet, Credential::Script(record_script()));
        assert_eq!(
            mainnet.to_bech32().unwrap(),
            "addr1wx0wdhakrghmjq7lfp7yq9nrsfty8wuzt4qkjhnrm790v9sxytxjq"
        );
    }

    #[test]
    fn test_base_address_bech32_roundtrip() {
        let address = Address::base(
            Network::Testnet,
            Credential::PublicKey(KeyHash::from_bytes([0x11; 28])),
            Credential::PublicKey(KeyHash::from_bytes([0x22; 28])),
        );
        let text = address.to_bech32().unwrap();
        assert_eq!(
            text,
            "addr_test1qqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyfzyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3qwzdgzn"
        );
        assert_eq!(Address::from_bech32(&text).unwrap(), address);
    }

    #[test]
    fn test_pointer_address_bytes() {
        let address = Address {
            network: Network::Mainnet,
            payment: Credential::PublicKey(KeyHash::from_bytes([0x11; 28])),
            stake: Some(StakeCredential::Pointer(Pointer {
                slot: 128,
                tx_index: 2,
                cert_index: 3,
            })),
        };
        let bytes = address.to_bytes();
        assert_eq!(bytes[0], 0x41);
        assert_eq!(&bytes[29..], &[0x81, 0x00, 0x02, 0x03]);
        assert_eq!(
            address.to_bech32().unwrap(),
            "addr1gyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyvpqqpqxy778ed"
        );
        assert_eq!(Address::from_bytes(&bytes).unwrap(), address);
    }

    #[test]
    fn test_rejects_reward_and_short_addresses() {
        let mut reward = vec![0xe0];
        reward.extend_from_slice(&[0u8; 28]);
        assert!(Address::from_bytes(&reward).is_err());
        assert!(Address::from_bytes(&[0x70, 0x01]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_prefix() {
        let mainnet = Address::enterprise(Network::Mainnet, Credential::Script(record_script()));
        let bytes = mainnet.to_bytes();
        let hrp = Hrp::parse("addr_test").unwrap();
        let text = bech32::encode::<Bech32>(hrp, &bytes).unwrap();
        assert!(Address::from_bech32(&text).is_err());
    }

    #[test]
    fn test_address_plutus_data() {
        let address = Address::enterprise(Network::Testnet, Credential::Script(record_script()));
        let cbor = address.to_plutus_data().to_cbor();
        assert_eq!(
            hex::encode(&cbor),
            "d8799fd87a9f581c9ee6dfb61a2fb903df487c401663825643bb825d41695e63df8af616ffd87a80ff"
        );
        let back = Address::from_plutus_data(&PlutusData::from_cbor(&cbor).unwrap(), Network::Testnet);
        assert_eq!(back.unwrap(), address);
    }

    #[test]
    fn test_pointer_plutus_data_roundtrip() {
        let stake = StakeCredential::Pointer(Pointer {
            slot: 42,
            tx_index: 1,
            cert_index: 0,
        });
        let back = StakeCredential::from_plutus_data(&stake.to_plutus_data()).unwrap();
        assert_eq!(back, stake);
    }
}
