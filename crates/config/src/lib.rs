//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults.
//! 2. `orderly.toml`, `orderly.yaml` and `orderly.json` in the user config
//!    directory (see [`user_config_dir`]).
//! 3. An explicit file, usually from `--config`.
//! 4. `ORDERLY_`-prefixed environment variables, with `__` separating nested
//!    keys: `ORDERLY_SERVICES__SHOP__KIND=custom`.

pub mod error;
mod paths;

pub use crate::paths::{default_data_dir, user_config_dir};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use orderly_upload::{DEFAULT_CONCURRENCY, ServiceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FILE_STEM: &str = "orderly";
const ENV_PREFIX: &str = "ORDERLY_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the collection cache and blob store.
    pub data_dir: PathBuf,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Maximum simultaneous item uploads per group.
    pub upload_concurrency: usize,
    /// Prefix suggested for rename rules when none is given.
    pub default_prefix: String,
    /// Walk through uploads without writing anything.
    pub dry_run: bool,
    /// Upload services by name.
    pub services: BTreeMap<String, ServiceKind>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            upload_concurrency: DEFAULT_CONCURRENCY,
            default_prefix: String::new(),
            dry_run: false,
            services: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load from every source, using the user config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(user_config_dir().as_deref(), explicit)?)
    }

    /// Assemble the sources without extracting anything.
    pub fn figment(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = config_dir {
            figment = figment
                .merge(Toml::file(dir.join(format!("{FILE_STEM}.toml"))))
                .merge(Yaml::file(dir.join(format!("{FILE_STEM}.yaml"))))
                .merge(Json::file(dir.join(format!("{FILE_STEM}.json"))));
        }
        if let Some(path) = explicit {
            // Figment skips missing files silently; an explicit one must exist.
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(data_dir = %config.data_dir.display(), services = config.services.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.data_dir.is_absolute() {
            exn::bail!(ErrorKind::Invalid(format!("data_dir must be absolute, got {}", self.data_dir.display())));
        }
        if self.upload_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("upload_concurrency must be at least 1".to_string()));
        }
        if let Some(name) = self.services.keys().find(|name| name.trim().is_empty()) {
            exn::bail!(ErrorKind::Invalid(format!("service name {name:?} is blank")));
        }
        Ok(())
    }
}
