//! Ledger configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tally_core::{FeeSchedule, DEFAULT_FEE_COLLECTOR_NAME};

/// What happens to an account's transaction history when the account is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Delete every row where the account is sender or recipient, then the account.
    #[default]
    Cascade,

    /// Delete only the account row; history keeps referencing the old id.
    RetainHistory,
}

impl DeletionPolicy {
    /// Stable lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::RetainHistory => "retain_history",
        }
    }
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "retain_history" | "retain-history" | "retain" => Ok(Self::RetainHistory),
            other => Err(format!("unknown deletion policy: {other}")),
        }
    }
}

/// Configuration of the ledger engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Name of the account that collects fees.
    pub fee_collector_name: String,

    /// Fee rates.
    pub fees: FeeSchedule,

    /// History handling on account deletion.
    pub deletion_policy: DeletionPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee_collector_name: DEFAULT_FEE_COLLECTOR_NAME.to_string(),
            fees: FeeSchedule::default(),
            deletion_policy: DeletionPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fee collector account name.
    #[must_use]
    pub fn with_fee_collector_name(mut self, name: impl Into<String>) -> Self {
        self.fee_collector_name = name.into();
        self
    }

    /// Set the fee schedule.
    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Set the deletion policy.
    #[must_use]
    pub fn with_deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }
}
