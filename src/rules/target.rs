// src/rules/target.rs

//! Parsed build target identifiers.

use std::fmt;

use crate::errors::{FallbuildError, Result};

/// A build target of the form `//base/path:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildTarget {
    base_path: String,
    short_name: String,
}

impl BuildTarget {
    /// Parse a fully qualified target like `//lib/server:api`.
    ///
    /// The base path may be empty (`//:root`), the short name may not.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = s.strip_prefix("//").ok_or_else(|| {
            FallbuildError::InvalidTarget(format!("'{s}' must start with '//'"))
        })?;

        let (base_path, short_name) = rest.split_once(':').ok_or_else(|| {
            FallbuildError::InvalidTarget(format!("'{s}' is missing a ':name' part"))
        })?;

        if short_name.is_empty() {
            return Err(FallbuildError::InvalidTarget(format!(
                "'{s}' has an empty rule name"
            )));
        }
        if short_name.contains(':') || base_path.contains(':') {
            return Err(FallbuildError::InvalidTarget(format!(
                "'{s}' contains more than one ':'"
            )));
        }

        Ok(Self {
            base_path: base_path.to_string(),
            short_name: short_name.to_string(),
        })
    }

    /// Path part, e.g. `lib/server` for `//lib/server:api`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Name part, e.g. `api` for `//lib/server:api`.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The fully qualified form, `//base/path:name`.
    pub fn full_name(&self) -> String {
        format!("//{}:{}", self.base_path, self.short_name)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.base_path, self.short_name)
    }
}
