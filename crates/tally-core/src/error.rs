//! Error types for tally core values.

use rust_decimal::Decimal;

/// Errors that can occur when constructing or combining [`Money`](crate::Money) values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The input could not be parsed as a decimal amount.
    #[error("invalid amount: {0:?}")]
    Parse(String),

    /// The amount does not fit in the cent range.
    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),

    /// Arithmetic on two amounts overflowed.
    #[error("amount arithmetic overflowed")]
    Overflow,
}
