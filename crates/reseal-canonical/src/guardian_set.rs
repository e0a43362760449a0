use crate::identifiers::GuardianAddress;
use crate::validation::ValidationError;
use serde::Serialize;
use std::collections::HashMap;

/// Largest roster a one-byte guardian index can address.
pub const MAX_GUARDIANS: usize = 256;

/// Ordered, epoch-versioned guardian roster.
///
/// A guardian's identity inside an attestation is its position in this
/// list, not its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardianSet {
    /// Roster epoch.
    pub index: u32,
    /// Guardian addresses in roster order.
    pub addresses: Vec<GuardianAddress>,
}

impl GuardianSet {
    /// Constructs a validated roster.
    pub fn new(index: u32, addresses: Vec<GuardianAddress>) -> Result<Self, ValidationError> {
        if addresses.len() > MAX_GUARDIANS {
            return Err(ValidationError::OutOfBounds {
                field: "guardian_set",
                value: addresses.len().to_string(),
            });
        }
        Ok(Self { index, addresses })
    }

    /// Number of guardians in the roster.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True when the roster has no guardians.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Position of `address` in the roster, if present.
    pub fn position(&self, address: &GuardianAddress) -> Option<u8> {
        self.addresses
            .iter()
            .position(|a| a == address)
            .and_then(|p| u8::try_from(p).ok())
    }

    /// Address → position lookup table. The first listing of an address wins.
    pub fn index_map(&self) -> HashMap<GuardianAddress, u8> {
        let mut map = HashMap::with_capacity(self.addresses.len());
        for (position, address) in self.addresses.iter().enumerate() {
            if let Ok(index) = u8::try_from(position) {
                map.entry(*address).or_insert(index);
            }
        }
        map
    }

    /// Minimum signatures for protocol quorum: `floor(2n/3) + 1`.
    pub fn quorum(&self) -> usize {
        self.addresses.len() * 2 / 3 + 1
    }
}
