// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::strategy::FallbackPolicy;

/// Top-level configuration as read from a TOML file:
///
/// ```toml
/// [strategy]
/// local_fallback_enabled = true
///
/// [project]
/// gen_dir = "out/gen"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Fallback behaviour from `[strategy]`.
    #[serde(default)]
    pub strategy: StrategySection,

    /// Project layout from `[project]`.
    #[serde(default)]
    pub project: ProjectSection,
}

/// Validated configuration; constructed through
/// `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub strategy: StrategySection,
    pub project: ProjectSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(strategy: StrategySection, project: ProjectSection) -> Self {
        Self { strategy, project }
    }
}

/// `[strategy]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySection {
    /// Whether an unusable remote attempt triggers a local rebuild.
    ///
    /// When false, a remote build failure is published verbatim and a remote
    /// execution error propagates as the terminal error.
    #[serde(default = "default_local_fallback_enabled")]
    pub local_fallback_enabled: bool,
}

fn default_local_fallback_enabled() -> bool {
    true
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            local_fallback_enabled: default_local_fallback_enabled(),
        }
    }
}

impl StrategySection {
    pub fn to_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            local_fallback_enabled: self.local_fallback_enabled,
        }
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Root directory for generated rule outputs.
    #[serde(default = "default_gen_dir")]
    pub gen_dir: PathBuf,
}

fn default_gen_dir() -> PathBuf {
    PathBuf::from("out/gen")
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            gen_dir: default_gen_dir(),
        }
    }
}
