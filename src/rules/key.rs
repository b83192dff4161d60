// src/rules/key.rs

//! Content-hashed rule keys.

use std::fmt;

/// Deterministic content hash over a rule's declared inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey(String);

impl RuleKey {
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates named fields into a blake3 hash, order-sensitively.
///
/// Each field is written length-delimited so `("ab", "c")` and `("a", "bc")`
/// never collide. Callers set every field unconditionally (absent optionals
/// hash as empty) so the key layout stays fixed across rule instances.
pub struct RuleKeyBuilder {
    hasher: blake3::Hasher,
}

impl RuleKeyBuilder {
    pub fn new(rule_type: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        write_field(&mut hasher, "rule_type", rule_type.as_bytes());
        Self { hasher }
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        write_field(&mut self.hasher, key, value.as_bytes());
        self
    }

    pub fn set_opt(self, key: &str, value: Option<&str>) -> Self {
        self.set(key, value.unwrap_or(""))
    }

    /// Hash a list of values under one key; element order matters.
    pub fn set_all<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hasher.update(&(key.len() as u64).to_le_bytes());
        self.hasher.update(key.as_bytes());
        for value in values {
            let value = value.as_ref();
            self.hasher.update(&(value.len() as u64).to_le_bytes());
            self.hasher.update(value.as_bytes());
        }
        // List terminator keeps adjacent lists unambiguous.
        self.hasher.update(&u64::MAX.to_le_bytes());
        self
    }

    pub fn build(self) -> RuleKey {
        RuleKey(self.hasher.finalize().to_hex().to_string())
    }
}

fn write_field(hasher: &mut blake3::Hasher, key: &str, value: &[u8]) {
    hasher.update(&(key.len() as u64).to_le_bytes());
    hasher.update(key.as_bytes());
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value);
}
