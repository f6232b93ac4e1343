//! Server configuration loaded from `ROLLCALL_*` environment variables.
//!
//! Nested keys use a double underscore, e.g. `ROLLCALL_DB__URL`.

use config::{Config, ConfigError, Environment, File};
use rollcall_authz::config::AuthzConfig;
use rollcall_authz::defaults::DefaultRoleTable;
use rollcall_db::DbConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub db: DbConfig,

    /// TOML or JSON file replacing the built-in default role table.
    #[serde(default)]
    pub default_roles_path: Option<String>,

    /// Upsert the default roles as global system roles at startup.
    #[serde(default = "default_seed_system_roles")]
    pub seed_system_roles: bool,
}

fn default_log_filter() -> String {
    "rollcall=info".to_string()
}

fn default_seed_system_roles() -> bool {
    true
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix("ROLLCALL")
            .prefix_separator("_")
            .separator("__")
    }

    fn load(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Authorization config, with the role table read from
    /// `default_roles_path` when one is set.
    pub fn authz_config(&self) -> Result<AuthzConfig, ConfigError> {
        let mut authz = AuthzConfig::default();
        if let Some(path) = &self.default_roles_path {
            authz.default_roles = load_default_roles(path)?;
        }
        Ok(authz)
    }
}

fn load_default_roles(path: &str) -> Result<DefaultRoleTable, ConfigError> {
    Config::builder()
        .add_source(File::with_name(path))
        .build()?
        .try_deserialize()
}
