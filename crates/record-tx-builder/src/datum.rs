//! Datums stored at the record script.
//!
//! The record is an append-only linked list of entries keyed by username
//! hash; accounts carry their own datum.

use record_tx_core::plutus_data::{expect_bytes, expect_constr, expect_int};
use record_tx_core::{Address, FromPlutusData, Network, PlutusData, Result, ToPlutusData};

/// State of a registered account: `Constr 0 [pubkey, nonce, latest_activity]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDatum {
    pub pubkey: Vec<u8>,
    pub nonce: Vec<u8>,
    /// POSIX time in milliseconds.
    pub latest_activity: i128,
}

impl ToPlutusData for AccountDatum {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                PlutusData::bytes(&self.pubkey),
                PlutusData::bytes(&self.nonce),
                PlutusData::integer(self.latest_activity),
            ],
        )
    }
}

impl FromPlutusData for AccountDatum {
    fn from_plutus_data(data: &PlutusData) -> Result<Self> {
        let fields = expect_constr(data, 0, 3, "account datum")?;
        Ok(Self {
            pubkey: expect_bytes(&fields[0], "pubkey")?.to_vec(),
            nonce: expect_bytes(&fields[1], "nonce")?.to_vec(),
            latest_activity: expect_int(&fields[2], "latest activity")?,
        })
    }
}

/// One node of the record: `Constr 0 [Nullable(next_username), contributor]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub next_username: Option<Vec<u8>>,
    pub contributor: Address,
}

impl Entry {
    /// The last node of the list.
    pub fn tail(contributor: Address) -> Self {
        Self {
            next_username: None,
            contributor,
        }
    }

    /// A copy of this entry pointing at `next`.
    pub fn relink(&self, next: impl Into<Vec<u8>>) -> Self {
        Self {
            next_username: Some(next.into()),
            contributor: self.contributor,
        }
    }

    pub fn from_plutus_data(data: &PlutusData, network: Network) -> Result<Self> {
        let fields = expect_constr(data, 0, 2, "entry")?;
        Ok(Self {
            next_username: Option::<Vec<u8>>::from_plutus_data(&fields[0])?,
            contributor: Address::from_plutus_data(&fields[1], network)?,
        })
    }
}

impl ToPlutusData for Entry {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                self.next_username.to_plutus_data(),
                self.contributor.to_plutus_data(),
            ],
        )
    }
}

/// `Constr 0 [address]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contributor {
    pub address: Address,
}

impl Contributor {
    pub fn from_plutus_data(data: &PlutusData, network: Network) -> Result<Self> {
        let fields = expect_constr(data, 0, 1, "contributor")?;
        Ok(Self {
            address: Address::from_plutus_data(&fields[0], network)?,
        })
    }
}

impl ToPlutusData for Contributor {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(0, vec![self.address.to_plutus_data()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_tx_core::{Credential, KeyHash};

    fn address() -> Address {
        Address::base(
            Network::Testnet,
            Credential::PublicKey(KeyHash::from_bytes([0x11; 28])),
            Credential::PublicKey(KeyHash::from_bytes([0x22; 28])),
        )
    }

    #[test]
    fn test_account_datum_encoding() {
        let datum = AccountDatum {
            pubkey: vec![0xaa; 4],
            nonce: vec![],
            latest_activity: 1_700_000_000_000,
        };
        let cbor = hex::encode(datum.to_plutus_data().to_cbor());
        assert_eq!(cbor, "d8799f44aaaaaaaa401b0000018bcfe56800ff");

        let back = AccountDatum::from_plutus_data(&PlutusData::from_cbor(&hex::decode(cbor).unwrap()).unwrap());
        assert_eq!(back.unwrap(), datum);
    }

    #[test]
    fn test_entry_relink_leaves_original() {
        let tail = Entry::tail(address());
        let linked = tail.relink(vec![0x01; 31]);
        assert_eq!(tail.next_username, None);
        assert_eq!(linked.next_username, Some(vec![0x01; 31]));
        assert_eq!(linked.contributor, tail.contributor);
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = Entry::tail(address()).relink(vec![0x02; 31]);
        let back = Entry::from_plutus_data(&entry.to_plutus_data(), Network::Testnet).unwrap();
        assert_eq!(back, entry);

        let tail = Entry::tail(address());
        let cbor = hex::encode(tail.to_plutus_data().to_cbor());
        assert!(cbor.starts_with("d8799fd87a80d8799f"));
    }

    #[test]
    fn test_contributor_roundtrip() {
        let contributor = Contributor { address: address() };
        let back = Contributor::from_plutus_data(&contributor.to_plutus_data(), Network::Testnet);
        assert_eq!(back.unwrap(), contributor);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(AccountDatum::from_plutus_data(&PlutusData::constr(1, vec![])).is_err());
        assert!(Entry::from_plutus_data(&PlutusData::integer(0), Network::Mainnet).is_err());
    }
}
