use std::fmt;

/// Balances and transaction amounts are whole minor units. The ledger does not
/// care which currency they denote.
pub type Amount = i64;

/// Largest amount a single deposit or withdrawal may move.
pub const TRANSACTION_LIMIT: Amount = 10_000;

/// Returns true if `amount` lies in `(0, TRANSACTION_LIMIT]`.
pub fn within_transaction_limit(amount: Amount) -> bool {
    amount > 0 && amount <= TRANSACTION_LIMIT
}

/// Parse user input into an amount.
/// Example: "250" -> 250, " 42 " -> 42, "-5" -> -5
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    input
        .trim()
        .parse::<Amount>()
        .map_err(|_| ParseAmountError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount, expected a whole number"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
