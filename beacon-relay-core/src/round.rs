//! Beacon rounds and the payload published for them

use serde::Serialize;

/// One emitted randomness value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    number: u64,
    signature: Vec<u8>,
}

impl Round {
    #[must_use]
    pub const fn new(number: u64, signature: Vec<u8>) -> Self {
        Self { number, signature }
    }

    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

/// Published view of a [`Round`]: number plus hex signature.
///
/// Zero round and empty signature are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeaconPost {
    #[serde(skip_serializing_if = "is_zero")]
    pub round: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub signature: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl BeaconPost {
    /// Compact JSON text sent as the post body
    pub fn to_status(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Round> for BeaconPost {
    fn from(round: &Round) -> Self {
        Self {
            round: round.number(),
            signature: hex::encode(round.signature()),
        }
    }
}
