use thiserror::Error;

use crate::domain::{Amount, RuleViolation};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] RuleViolation),

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Amount {amount} is outside the per-transaction limit (1 to {limit})")]
    LimitExceeded { amount: Amount, limit: Amount },

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Amount, required: Amount },

    #[error("Could not generate a unique account number after {0} attempts")]
    AccountNumberExhausted(usize),

    #[error("Storage unavailable: {0:#}")]
    StorageUnavailable(#[from] anyhow::Error),
}
