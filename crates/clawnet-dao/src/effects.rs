use clawnet_core::types::{Balance, Did};
use serde_json::Value;

/// A side effect a timelock execution needs another part of the engine to
/// carry out (§4.7). Parameter changes and protocol upgrades are applied by
/// the engine itself (there is no general VM inside this reducer);
/// treasury spends are handed to the wallet reducer as a credit.
#[derive(Clone, Debug)]
pub enum DaoEffect {
    ApplyParameterChange { parameter: String, new_value: Value },
    ApplyProtocolUpgrade { description: String },
    ExecuteTreasurySpend { to: Did, amount: Balance },
}
