//! Supported digest algorithms

use filever_errors::ConfigError;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Digest algorithms an index may have been produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha1,
    Sha512,
    Sha384,
    Md5,
}

impl HashAlgorithm {
    /// Parse an algorithm name, ignoring case, surrounding whitespace and
    /// a dash after `SHA` (`sha-256` and `SHA256` are the same)
    ///
    /// # Errors
    /// Returns `ConfigError::UnsupportedAlgorithm` for any other name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let normalized = name.trim().to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "SHA256" => Ok(Self::Sha256),
            "SHA1" => Ok(Self::Sha1),
            "SHA512" => Ok(Self::Sha512),
            "SHA384" => Ok(Self::Sha384),
            "MD5" => Ok(Self::Md5),
            _ => Err(ConfigError::UnsupportedAlgorithm {
                algorithm: name.to_string(),
            }),
        }
    }

    /// Canonical upper-case name, as written by the indexer
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha1 => "SHA1",
            Self::Sha512 => "SHA512",
            Self::Sha384 => "SHA384",
            Self::Md5 => "MD5",
        }
    }

    /// Length of the hex digest this algorithm produces
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
            Self::Sha512 => 128,
            Self::Sha384 => 96,
            Self::Md5 => 32,
        }
    }

    pub(crate) fn digester(self) -> Digester {
        match self {
            Self::Sha256 => Digester::Sha256(Sha256::new()),
            Self::Sha1 => Digester::Sha1(Sha1::new()),
            Self::Sha512 => Digester::Sha512(Sha512::new()),
            Self::Sha384 => Digester::Sha384(Sha384::new()),
            Self::Md5 => Digester::Md5(Md5::new()),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running digest state for one of the supported algorithms
pub(crate) enum Digester {
    Sha256(Sha256),
    Sha1(Sha1),
    Sha512(Sha512),
    Sha384(Sha384),
    Md5(Md5),
}

impl Digester {
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Md5(h) => h.update(data),
        }
    }

    /// Upper-case hex of the final digest
    pub(crate) fn finalize_hex(self) -> String {
        match self {
            Self::Sha256(h) => hex::encode_upper(h.finalize()),
            Self::Sha1(h) => hex::encode_upper(h.finalize()),
            Self::Sha512(h) => hex::encode_upper(h.finalize()),
            Self::Sha384(h) => hex::encode_upper(h.finalize()),
            Self::Md5(h) => hex::encode_upper(h.finalize()),
        }
    }
}
