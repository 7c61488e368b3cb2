//! Fee rules for transfers and deposits.
//!
//! Transfers charge the sender a percentage on top of the amount sent.
//! Deposits keep a percentage of the amount added. Withdrawals are free.
//! Every intermediate value is rounded to the cent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MoneyError;
use crate::Money;

/// Transfer fee rate (8 %).
pub const DEFAULT_TRANSFER_FEE_RATE: Decimal = dec!(0.08);

/// Deposit fee rate (5 %).
pub const DEFAULT_DEPOSIT_FEE_RATE: Decimal = dec!(0.05);

/// Fee rates applied by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fraction of the transfer amount charged to the sender.
    pub transfer_rate: Decimal,

    /// Fraction of the deposited amount routed to the fee collector.
    pub deposit_rate: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            transfer_rate: DEFAULT_TRANSFER_FEE_RATE,
            deposit_rate: DEFAULT_DEPOSIT_FEE_RATE,
        }
    }
}

impl FeeSchedule {
    /// Set the transfer fee rate.
    #[must_use]
    pub fn with_transfer_rate(mut self, rate: Decimal) -> Self {
        self.transfer_rate = rate;
        self
    }

    /// Set the deposit fee rate.
    #[must_use]
    pub fn with_deposit_rate(mut self, rate: Decimal) -> Self {
        self.deposit_rate = rate;
        self
    }

    /// Quote a transfer: `fee = round2(amount * rate)`, `total = amount + fee`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arithmetic overflows.
    pub fn quote_transfer(&self, amount: Money) -> Result<TransferQuote, MoneyError> {
        let fee = amount.apply_rate(self.transfer_rate)?;
        let total_deduction = amount.checked_add(fee).ok_or(MoneyError::Overflow)?;
        Ok(TransferQuote {
            amount,
            fee,
            total_deduction,
        })
    }

    /// Quote a deposit: `fee = round2(amount * rate)`, `credited = amount - fee`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arithmetic overflows.
    pub fn quote_deposit(&self, amount: Money) -> Result<DepositQuote, MoneyError> {
        let fee = amount.apply_rate(self.deposit_rate)?;
        let credited = amount.checked_sub(fee).ok_or(MoneyError::Overflow)?;
        Ok(DepositQuote {
            amount,
            fee,
            credited,
        })
    }
}

/// Monetary effects of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuote {
    /// Principal received by the recipient.
    pub amount: Money,
    /// Fee routed to the collector.
    pub fee: Money,
    /// What leaves the sender: principal plus fee.
    pub total_deduction: Money,
}

/// Monetary effects of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQuote {
    /// Gross amount deposited.
    pub amount: Money,
    /// Fee routed to the collector.
    pub fee: Money,
    /// Net amount credited to the account.
    pub credited: Money,
}
