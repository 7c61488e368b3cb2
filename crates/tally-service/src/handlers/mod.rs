//! API handlers.

pub mod accounts;
pub mod health;
pub mod operations;
pub mod transactions;
