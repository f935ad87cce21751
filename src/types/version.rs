//! Concurrency markers for versioned account records
//!
//! This module defines the concurrency policies supported by the store and the
//! version values each of them attaches to a record.

use std::fmt;
use std::str::FromStr;

/// Concurrency-control discipline applied by a store
///
/// The policy decides whether a write is validated against the version the
/// writer read, and how the next version is produced after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcurrencyPolicy {
    /// No marker, no validation. Concurrent writers silently overwrite each other.
    None,

    /// Integer counter starting at 0, advanced by exactly 1 on every successful write.
    TokenBased,

    /// Opaque stamp generated by the store on insert and on every update.
    RowVersionBased,
}

impl ConcurrencyPolicy {
    /// All policies, in the order the demo exercises them
    pub const ALL: [ConcurrencyPolicy; 3] = [
        ConcurrencyPolicy::None,
        ConcurrencyPolicy::TokenBased,
        ConcurrencyPolicy::RowVersionBased,
    ];

    /// Whether writes under this policy must present the version they read
    pub fn requires_version(&self) -> bool {
        !matches!(self, ConcurrencyPolicy::None)
    }
}

impl fmt::Display for ConcurrencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConcurrencyPolicy::None => "none",
            ConcurrencyPolicy::TokenBased => "token",
            ConcurrencyPolicy::RowVersionBased => "row-version",
        };
        f.write_str(name)
    }
}

impl FromStr for ConcurrencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(ConcurrencyPolicy::None),
            "token" | "token-based" => Ok(ConcurrencyPolicy::TokenBased),
            "row-version" | "rowversion" | "row-version-based" => {
                Ok(ConcurrencyPolicy::RowVersionBased)
            }
            other => Err(format!("Unknown concurrency policy: '{}'", other)),
        }
    }
}

/// Opaque row-version stamp
///
/// Stamps are only ever compared for equality. The byte layout is an
/// implementation detail of the store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowVersion([u8; RowVersion::WIDTH]);

impl RowVersion {
    /// Width of a stamp in bytes
    pub const WIDTH: usize = 8;

    /// Wrap raw stamp bytes
    pub fn from_bytes(bytes: [u8; Self::WIDTH]) -> Self {
        RowVersion(bytes)
    }

    /// Raw stamp bytes
    pub fn as_bytes(&self) -> &[u8; Self::WIDTH] {
        &self.0
    }
}

impl fmt::Display for RowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Version marker carried by an account record
///
/// The variant in use always matches the policy of the store holding the
/// record. Two versions are the same only if they are equal variant-wise and
/// value-wise; no ordering is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Record kept under [`ConcurrencyPolicy::None`]
    Unversioned,

    /// Concurrency token value
    Token(u64),

    /// Store-generated row-version stamp
    RowVersion(RowVersion),
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Unversioned => f.write_str("none"),
            Version::Token(token) => write!(f, "{}", token),
            Version::RowVersion(stamp) => write!(f, "{}", stamp),
        }
    }
}
