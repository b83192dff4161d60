// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FallbuildError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::FallbuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.strategy, raw.project))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_project(cfg)?;
    Ok(())
}

fn validate_project(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.gen_dir.as_os_str().is_empty() {
        return Err(FallbuildError::ConfigError(
            "[project].gen_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
