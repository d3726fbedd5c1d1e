//! Configuration for entity factories, loaded with figment.
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. An optional TOML file
//! 3. Environment variables with the `ENTIKIT_` prefix
//!
//! Nothing is read implicitly; factories use [`EntikitConfig::default()`]
//! unless a loaded config is passed to
//! [`EntityFactory::with_config`](crate::factory::EntityFactory::with_config).

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "ENTIKIT_";

/// Behavior switches for materialization and serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntikitConfig {
    /// Write undefined fields as `null` in JSON output instead of omitting them.
    pub undefined_as_null: bool,
    /// Fail construction when the input names a field the schema lacks.
    pub reject_unknown_input: bool,
}

impl EntikitConfig {
    /// Defaults merged with `ENTIKIT_` environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Defaults, then `path` as TOML, then environment variables.
    /// A missing file is skipped.
    pub fn figment_with_file(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Extract a config from any figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract()?;
        debug!(?config, "entikit configuration loaded");
        Ok(config)
    }

    /// Load from defaults and environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(&Self::figment())
    }

    /// Load from defaults, a TOML file, and environment.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(&Self::figment_with_file(path))
    }
}
