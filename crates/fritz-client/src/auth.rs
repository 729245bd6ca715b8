//! Challenge-response login (PBKDF2 variant, challenge version 2)
//!
//! The gateway issues `2$<iter1>$<salt1>$<iter2>$<salt2>`. The client answers
//! with `<salt2>$<hex(key2)>` where
//!
//! ```text
//! key1 = PBKDF2-HMAC-SHA256(password, salt1, iter1, 32)
//! key2 = PBKDF2-HMAC-SHA256(key1,     salt2, iter2, 32)
//! ```
//!
//! The second stage takes the raw bytes of `key1`, not its hex form. A wrong
//! response is never reported as such: the gateway just hands out the zero
//! session id.

use std::str::FromStr;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::FritzError;

/// The only challenge version this client answers
pub const SUPPORTED_VERSION: &str = "2";

/// Length of both derived keys in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 producing a single 32-byte block
pub fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}

/// A parsed login challenge.
///
/// Consumed once per login attempt and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub iterations1: u32,
    pub salt1: Vec<u8>,
    pub iterations2: u32,
    pub salt2: Vec<u8>,
}

impl Challenge {
    /// Compute the login response for `password`
    pub fn response(&self, password: &str) -> String {
        let key1 = pbkdf2_sha256(password.as_bytes(), &self.salt1, self.iterations1);
        let key2 = pbkdf2_sha256(&key1, &self.salt2, self.iterations2);
        format!("{}${}", hex::encode(&self.salt2), hex::encode(key2))
    }
}

fn parse_iterations(field: &str, name: &str) -> Result<u32, FritzError> {
    match field.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FritzError::ParseError(format!(
            "Invalid {} in challenge: {:?}",
            name, field
        ))),
    }
}

fn parse_salt(field: &str, name: &str) -> Result<Vec<u8>, FritzError> {
    hex::decode(field)
        .map_err(|e| FritzError::ParseError(format!("Invalid {} in challenge: {}", name, e)))
}

impl FromStr for Challenge {
    type Err = FritzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('$');

        // `split` always yields at least one item
        let version = parts.next().unwrap_or_default();
        if version != SUPPORTED_VERSION {
            return Err(FritzError::UnsupportedVersion(version.to_string()));
        }

        let fields: Vec<&str> = parts.collect();
        let [iter1, salt1, iter2, salt2] = fields.as_slice() else {
            return Err(FritzError::ParseError(format!(
                "Expected 5 '$'-separated fields in challenge, got {}",
                fields.len() + 1
            )));
        };

        Ok(Self {
            iterations1: parse_iterations(iter1, "iteration count 1")?,
            salt1: parse_salt(salt1, "salt 1")?,
            iterations2: parse_iterations(iter2, "iteration count 2")?,
            salt2: parse_salt(salt2, "salt 2")?,
        })
    }
}
