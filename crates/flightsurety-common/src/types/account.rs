//! Account - opaque identity of airlines, oracles, owners and passengers
//!
//! An account is the equivalent of a public address. The core never
//! interprets its contents; it only compares and hashes them.

use serde::{Deserialize, Serialize};

/// Opaque account identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    /// Create an account from its address
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl From<String> for Account {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl AsRef<[u8]> for Account {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_serializes_as_plain_string() {
        let account = Account::from("0xf17f52151EbEF6C7334FAD080c5704D77216b732");
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, "\"0xf17f52151EbEF6C7334FAD080c5704D77216b732\"");

        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
