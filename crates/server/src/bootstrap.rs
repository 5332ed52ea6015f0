use std::sync::Arc;

use maitred_agent::oracle::OracleGateway;
use maitred_agent::runtime::AgentRuntime;
use maitred_core::budget::BudgetQuotas;
use maitred_core::catalog::Catalog;
use maitred_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("oracle backend initialization failed: {0}")]
    Oracle(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        oracle_provider = ?config.oracle.provider,
        "starting application bootstrap"
    );

    let gateway = OracleGateway::from_config(&config.oracle).map_err(BootstrapError::Oracle)?;
    let catalog = Arc::new(Catalog::builtin());
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        locations = catalog.locations().len(),
        "catalog reference data loaded"
    );

    let runtime = Arc::new(AgentRuntime::new(
        catalog,
        gateway,
        BudgetQuotas {
            daily_tokens: config.limits.daily_tokens,
            lifetime_tokens: config.limits.lifetime_tokens,
        },
        config.limits.max_input_words,
    ));

    Ok(Application { config, runtime })
}
