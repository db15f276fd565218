//! Pre-shared API key gate.
//!
//! Keys are held only as SHA-256 digests. A presented key is hashed and
//! compared against the configured set, so raw keys never sit in memory past
//! configuration loading and never appear in logs.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

/// Header carrying the pre-shared key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Hex characters of the digest shown in fingerprints.
const FINGERPRINT_LEN: usize = 8;

type KeyDigest = [u8; 32];

fn digest(key: &str) -> KeyDigest {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(key.as_bytes()));
    out
}

/// The configured set of accepted keys.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKeySet {
    digests: Vec<KeyDigest>,
}

impl fmt::Debug for ApiKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeySet")
            .field("fingerprints", &self.fingerprints())
            .finish()
    }
}

impl ApiKeySet {
    /// Build a set from raw keys. Blank entries and duplicates are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut digests: Vec<KeyDigest> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim();
            if key.is_empty() {
                continue;
            }
            let d = digest(key);
            if !digests.contains(&d) {
                digests.push(d);
            }
        }
        Self { digests }
    }

    /// Parse a comma-separated key list, e.g. `"key-a, key-b"`.
    pub fn parse_list(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Whether `candidate` is one of the configured keys.
    pub fn contains(&self, candidate: &str) -> bool {
        let presented = digest(candidate.trim());
        // Compare every digest so timing does not depend on the match position.
        self.digests
            .iter()
            .fold(false, |found, d| found | constant_time_eq(d, &presented))
    }

    /// Short digest prefixes, safe to log.
    pub fn fingerprints(&self) -> Vec<String> {
        self.digests
            .iter()
            .map(|d| hex::encode(d)[..FINGERPRINT_LEN].to_string())
            .collect()
    }
}

fn constant_time_eq(a: &KeyDigest, b: &KeyDigest) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Result of checking a request against the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// No key header, or an empty one.
    Missing,
    /// A key was presented but is not configured.
    Invalid,
    /// The server has no keys configured; every request is denied.
    Misconfigured,
}

/// Shared gate guarding the orchestrator's endpoints.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGate {
    keys: Arc<ApiKeySet>,
}

impl ApiKeyGate {
    pub fn new(keys: ApiKeySet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn keys(&self) -> &ApiKeySet {
        &self.keys
    }

    /// Decide whether a request presenting `presented` may proceed.
    ///
    /// Misconfiguration is checked first: with no keys configured nothing
    /// can pass, whatever the request carries.
    pub fn check(&self, presented: Option<&str>) -> GateDecision {
        if self.keys.is_empty() {
            return GateDecision::Misconfigured;
        }
        match presented.map(str::trim) {
            None | Some("") => GateDecision::Missing,
            Some(key) if self.keys.contains(key) => GateDecision::Allow,
            Some(_) => GateDecision::Invalid,
        }
    }
}
