//! Rollcall Server — bootstraps storage and seeds the system roles.

mod config;

use rollcall_authz::roles::RoleService;
use rollcall_core::error::RollcallError;
use rollcall_db::repository::{SurrealRoleRepository, SurrealUserRepository};
use rollcall_db::{DbError, DbManager};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("database connection failed: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error(transparent)]
    Migration(#[from] DbError),

    #[error("seeding failed: {0}")]
    Seed(#[from] RollcallError),
}

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    let config = ServerConfig::from_env()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting Rollcall server...");

    let authz = config.authz_config()?;
    let manager = DbManager::connect(&config.db).await?;
    let db = manager.client().clone();

    let applied = rollcall_db::run_migrations(&db).await?;
    info!(applied, "Schema up to date");

    if config.seed_system_roles {
        let roles = RoleService::new(
            SurrealRoleRepository::new(db.clone()),
            SurrealUserRepository::new(db),
            authz.default_roles,
        );
        roles.seed_system_roles().await?;
    }

    info!(
        modules = authz.catalog.list_modules().len(),
        "Rollcall server bootstrap complete"
    );
    Ok(())
}
