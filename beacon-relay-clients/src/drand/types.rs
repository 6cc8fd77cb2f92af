//! drand API response types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Chain parameters served at `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Group public key, hex encoded
    pub public_key: String,
    /// Seconds between two rounds
    pub period: u64,
    /// Unix timestamp of round 1
    pub genesis_time: i64,
    /// Chain hash, hex encoded
    pub hash: String,
    #[serde(rename = "groupHash", default)]
    pub group_hash: String,
    #[serde(rename = "schemeID", default)]
    pub scheme_id: String,
}

impl ChainInfo {
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_secs(self.period)
    }

    /// Round that is current at `unix_secs`. Zero before genesis.
    #[must_use]
    pub fn round_at(&self, unix_secs: i64) -> u64 {
        if unix_secs < self.genesis_time || self.period == 0 {
            return 0;
        }
        let elapsed = (unix_secs - self.genesis_time).unsigned_abs();
        elapsed / self.period + 1
    }

    /// Unix timestamp at which `round` is emitted.
    #[must_use]
    pub fn round_time(&self, round: u64) -> i64 {
        let offset = round.saturating_sub(1).saturating_mul(self.period);
        self.genesis_time
            .saturating_add(i64::try_from(offset).unwrap_or(i64::MAX))
    }
}

/// One beacon round as served at `/public/latest` and `/public/<round>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomData {
    pub round: u64,
    #[serde(default)]
    pub randomness: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub previous_signature: String,
}

impl RandomData {
    /// Decoded signature bytes.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quicknet() -> ChainInfo {
        ChainInfo {
            public_key: "83cf0f28".to_string(),
            period: 3,
            genesis_time: 1_692_803_367,
            hash: "52db9ba7".to_string(),
            group_hash: String::new(),
            scheme_id: "bls-unchained-g1-rfc9380".to_string(),
        }
    }

    #[test]
    fn test_round_at() {
        let info = quicknet();
        assert_eq!(info.round_at(info.genesis_time - 1), 0);
        assert_eq!(info.round_at(info.genesis_time), 1);
        assert_eq!(info.round_at(info.genesis_time + 2), 1);
        assert_eq!(info.round_at(info.genesis_time + 3), 2);
        assert_eq!(info.round_at(info.genesis_time + 30), 11);
    }

    #[test]
    fn test_round_time_inverts_round_at() {
        let info = quicknet();
        for round in [1, 2, 10, 1_000_000] {
            let t = info.round_time(round);
            assert_eq!(info.round_at(t), round);
            assert_eq!(info.round_at(t - 1), round - 1);
        }
    }

    #[test]
    fn test_random_data_deserialize() {
        let json = r#"{
            "round": 42,
            "randomness": "aabb",
            "signature": "deadbeef"
        }"#;
        let data: RandomData = serde_json::from_str(json).unwrap();
        assert_eq!(data.round, 42);
        assert!(data.previous_signature.is_empty());
        assert_eq!(data.signature_bytes().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_invalid_signature_hex() {
        let data = RandomData {
            round: 1,
            randomness: String::new(),
            signature: "zz".to_string(),
            previous_signature: String::new(),
        };
        assert!(data.signature_bytes().is_err());
    }

    #[test]
    fn test_chain_info_field_names() {
        let json = r#"{
            "public_key": "868f",
            "period": 30,
            "genesis_time": 1595431050,
            "hash": "8990e7a9",
            "groupHash": "176f93498e",
            "schemeID": "pedersen-bls-chained"
        }"#;
        let info: ChainInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.period(), Duration::from_secs(30));
        assert_eq!(info.group_hash, "176f93498e");
        assert_eq!(info.scheme_id, "pedersen-bls-chained");
    }
}
