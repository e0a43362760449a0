use crate::validation::ValidationError;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! fixed_bytes {
    ($name:ident, $len:expr, $prefix:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Width of the value in bytes.
            pub const LEN: usize = $len;

            /// Wraps raw bytes without further checks.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Builds the value from a slice that must be exactly the right width.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| ValidationError::InvalidLength {
                            field: stringify!($name),
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            /// Parses hex with or without a `0x` prefix, in either case.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                let trimmed = value.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                let bytes = hex::decode(digits).map_err(|e| ValidationError::InvalidHex {
                    field: stringify!($name),
                    reason: e.to_string(),
                })?;
                Self::from_slice(&bytes)
            }

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    GuardianAddress,
    20,
    "0x",
    "Ethereum-style guardian signing address (20 bytes). Displays as lowercase `0x` hex."
);
fixed_bytes!(
    EmitterAddress,
    32,
    "",
    "Universal emitter address (32 bytes). Displays as 64 lowercase hex chars, no prefix."
);

/// Identifier of a signed attestation: `<chain>/<emitter hex>/<sequence>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaaId {
    /// Source chain id.
    pub chain: u16,
    /// Emitter address on the source chain.
    pub emitter: EmitterAddress,
    /// Emitter sequence number.
    pub sequence: u64,
}

impl VaaId {
    /// Creates an identifier from its parts.
    pub fn new(chain: u16, emitter: EmitterAddress, sequence: u64) -> Self {
        Self {
            chain,
            emitter,
            sequence,
        }
    }

    /// Parses a validated identifier from a string.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let re = Regex::new(r"^([0-9]{1,5})/([0-9a-fA-F]{64})/([0-9]{1,20})$")
            .expect("invalid regex");
        let mismatch = || ValidationError::PatternMismatch {
            field: "VaaId",
            value: value.to_string(),
        };
        let caps = re.captures(value).ok_or_else(mismatch)?;

        let chain = caps[1].parse::<u16>().map_err(|_| ValidationError::OutOfBounds {
            field: "chain",
            value: caps[1].to_string(),
        })?;
        let emitter = EmitterAddress::parse(&caps[2])?;
        let sequence = caps[3]
            .parse::<u64>()
            .map_err(|_| ValidationError::OutOfBounds {
                field: "sequence",
                value: caps[3].to_string(),
            })?;

        Ok(Self::new(chain, emitter, sequence))
    }
}

impl fmt::Display for VaaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.chain, self.emitter, self.sequence)
    }
}

impl FromStr for VaaId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VaaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VaaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
