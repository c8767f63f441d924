use crate::config::ResolverConfigSection;
use crate::resolver::context::ResolutionContext;
use crate::resolver::plugin::ResolvePlugin;
use crate::utils::constants::{DEFAULT_GAS_PRICE, MAX_GAS_BUDGET};

/// Fills gas fields the caller left unset. Values already on the transaction win.
#[derive(Clone, Copy, Debug)]
pub struct GasDefaultsPlugin {
    pub budget: u64,
    pub price: u64,
}

impl Default for GasDefaultsPlugin {
    fn default() -> Self {
        Self { budget: MAX_GAS_BUDGET, price: DEFAULT_GAS_PRICE }
    }
}

impl GasDefaultsPlugin {
    pub fn from_config(config: &ResolverConfigSection) -> Self {
        Self { budget: config.default_gas_budget, price: config.default_gas_price }
    }
}

impl ResolvePlugin for GasDefaultsPlugin {
    fn name(&self) -> &str {
        "GasDefaultsPlugin"
    }

    fn resolve(&self, ctx: &mut ResolutionContext) -> eyre::Result<()> {
        ctx.transaction.set_gas_budget_if_not_set(self.budget);
        ctx.transaction.set_gas_price_if_not_set(self.price);

        if ctx.transaction.gas_config().owner.is_none() {
            ctx.transaction.gas_config_mut().owner = ctx.sender.clone();
        }
        Ok(())
    }
}
