use crate::resolver::UnresolvedPolicy;
use crate::utils::config_loader::{
    LoadConfigError, PipelineConfigLoader, PipelineConfigLoaderSync, load_from_file, load_from_file_sync,
};
use crate::utils::constants::{DEFAULT_GAS_PRICE, DEFAULT_MAX_WORKERS, EXECUTE_TRANSACTION_METHOD, MAX_GAS_BUDGET};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub executor: ExecutorConfigSection,
    #[serde(default)]
    pub resolver: ResolverConfigSection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfigSection {
    /// Size of the worker pool used by the parallel executors
    pub max_workers: usize,
    /// RPC method the caching executor submits transaction bytes to
    pub execute_method: String,
    /// Ask the node to include effects in the response
    pub show_effects: bool,
}

impl Default for ExecutorConfigSection {
    fn default() -> Self {
        Self { max_workers: DEFAULT_MAX_WORKERS, execute_method: EXECUTE_TRANSACTION_METHOD.to_string(), show_effects: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfigSection {
    pub unresolved_policy: UnresolvedPolicy,
    pub default_gas_budget: u64,
    pub default_gas_price: u64,
}

impl Default for ResolverConfigSection {
    fn default() -> Self {
        Self {
            unresolved_policy: UnresolvedPolicy::default(),
            default_gas_budget: MAX_GAS_BUDGET,
            default_gas_price: DEFAULT_GAS_PRICE,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `TX_PIPELINE_*` environment variables.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(max_workers) = std::env::var("TX_PIPELINE_MAX_WORKERS") {
            config.executor.max_workers =
                max_workers.parse().map_err(|e| eyre::eyre!("Invalid TX_PIPELINE_MAX_WORKERS: {}", e))?;
        }

        if let Ok(method) = std::env::var("TX_PIPELINE_EXECUTE_METHOD") {
            config.executor.execute_method = method;
        }

        if let Ok(policy) = std::env::var("TX_PIPELINE_UNRESOLVED_POLICY") {
            config.resolver.unresolved_policy = UnresolvedPolicy::from_str(&policy)
                .map_err(|e| eyre::eyre!("Invalid TX_PIPELINE_UNRESOLVED_POLICY: {}", e))?;
        }

        if let Ok(budget) = std::env::var("TX_PIPELINE_GAS_BUDGET") {
            config.resolver.default_gas_budget =
                budget.parse().map_err(|e| eyre::eyre!("Invalid TX_PIPELINE_GAS_BUDGET: {}", e))?;
        }

        if let Ok(price) = std::env::var("TX_PIPELINE_GAS_PRICE") {
            config.resolver.default_gas_price =
                price.parse().map_err(|e| eyre::eyre!("Invalid TX_PIPELINE_GAS_PRICE: {}", e))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.executor.max_workers == 0 {
            return Err(eyre::eyre!("executor.max_workers must be at least 1"));
        }
        if self.executor.execute_method.is_empty() {
            return Err(eyre::eyre!("executor.execute_method must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl PipelineConfigLoader for PipelineConfig {
    type SectionType = PipelineConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let config: PipelineConfig = load_from_file(file_name).await?;
        config.validate().map_err(|e| LoadConfigError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

impl PipelineConfigLoaderSync for PipelineConfig {
    type SectionType = PipelineConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let config: PipelineConfig = load_from_file_sync(file_name)?;
        config.validate().map_err(|e| LoadConfigError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}
