use std::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;

/// Identifier handed out when an account is opened. Never changes afterwards.
pub type AccountNumber = String;

pub const MINIMUM_AGE: u32 = 18;
pub const PIN_LENGTH: usize = 4;

/// A business rule an account or an account change failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    EmptyName,
    Underage { age: u32 },
    InvalidAge(String),
    InvalidPin,
    NegativeBalance { balance: Amount },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::EmptyName => write!(f, "name must not be empty"),
            RuleViolation::Underage { age } => {
                write!(f, "age must be {} or older, got {}", MINIMUM_AGE, age)
            }
            RuleViolation::InvalidAge(raw) => write!(f, "'{}' is not a valid age", raw),
            RuleViolation::InvalidPin => write!(f, "PIN must be exactly {} digits", PIN_LENGTH),
            RuleViolation::NegativeBalance { balance } => {
                write!(f, "balance must not be negative, got {}", balance)
            }
        }
    }
}

impl std::error::Error for RuleViolation {}

/// Four-digit numeric secret. Stored as text so leading zeros survive.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pin(String);

impl Pin {
    pub fn parse(input: &str) -> Result<Self, RuleViolation> {
        if input.len() == PIN_LENGTH && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(RuleViolation::InvalidPin)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Pin {
    type Error = RuleViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pin::parse(&value)
    }
}

impl From<Pin> for String {
    fn from(pin: Pin) -> Self {
        pin.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// The account fields a holder may change after opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    Name,
    Age,
    Email,
    Pin,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountField::Name => "name",
            AccountField::Age => "age",
            AccountField::Email => "email",
            AccountField::Pin => "pin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(AccountField::Name),
            "age" => Some(AccountField::Age),
            "email" => Some(AccountField::Email),
            "pin" => Some(AccountField::Pin),
            _ => None,
        }
    }
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub age: u32,
    pub email: String,
    pub account_number: AccountNumber,
    pub pin: Pin,
    pub balance: Amount,
}

impl Account {
    /// Open a new account with a zero balance.
    pub fn open(
        name: String,
        age: u32,
        email: String,
        account_number: AccountNumber,
        pin: Pin,
    ) -> Result<Self, RuleViolation> {
        validate_name(&name)?;
        validate_age(age)?;

        Ok(Self {
            name,
            age,
            email,
            account_number,
            pin,
            balance: 0,
        })
    }

    /// True if both the number and the PIN belong to this account.
    pub fn matches(&self, account_number: &str, pin: &str) -> bool {
        self.account_number == account_number && self.pin.as_str() == pin
    }

    /// Overwrite one field with a raw value, applying the same rules as `open`.
    /// Nothing is written if the value is rejected.
    pub fn update_field(&mut self, field: AccountField, new_value: &str) -> Result<(), RuleViolation> {
        match field {
            AccountField::Name => {
                validate_name(new_value)?;
                self.name = new_value.to_string();
            }
            AccountField::Age => {
                let age = new_value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| RuleViolation::InvalidAge(new_value.to_string()))?;
                validate_age(age)?;
                self.age = age;
            }
            AccountField::Email => self.email = new_value.to_string(),
            AccountField::Pin => self.pin = Pin::parse(new_value)?,
        }
        Ok(())
    }

    /// Check the invariants every persisted account must hold.
    pub fn check_invariants(&self) -> Result<(), RuleViolation> {
        validate_name(&self.name)?;
        validate_age(self.age)?;
        if self.balance < 0 {
            return Err(RuleViolation::NegativeBalance {
                balance: self.balance,
            });
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RuleViolation> {
    if name.trim().is_empty() {
        return Err(RuleViolation::EmptyName);
    }
    Ok(())
}

fn validate_age(age: u32) -> Result<(), RuleViolation> {
    if age < MINIMUM_AGE {
        return Err(RuleViolation::Underage { age });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::open(
            "Ada".into(),
            30,
            "ada@example.com".into(),
            "ab1234567890c!".into(),
            Pin::parse("0420").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_starts_at_zero() {
        let account = sample();
        assert_eq!(account.balance, 0);
        assert_eq!(account.pin.as_str(), "0420");
    }

    #[test]
    fn test_open_rejects_underage() {
        let result = Account::open(
            "Kid".into(),
            17,
            "kid@example.com".into(),
            "ab1234567890c!".into(),
            Pin::parse("1234").unwrap(),
        );
        assert_eq!(result, Err(RuleViolation::Underage { age: 17 }));
    }

    #[test]
    fn test_open_rejects_blank_name() {
        let result = Account::open(
            "   ".into(),
            40,
            "x@example.com".into(),
            "ab1234567890c!".into(),
            Pin::parse("1234").unwrap(),
        );
        assert_eq!(result, Err(RuleViolation::EmptyName));
    }

    #[test]
    fn test_pin_parse() {
        assert!(Pin::parse("1234").is_ok());
        assert!(Pin::parse("0000").is_ok());
        assert_eq!(Pin::parse("12345"), Err(RuleViolation::InvalidPin));
        assert_eq!(Pin::parse("123"), Err(RuleViolation::InvalidPin));
        assert_eq!(Pin::parse("12a4"), Err(RuleViolation::InvalidPin));
        assert_eq!(Pin::parse(" 1234"), Err(RuleViolation::InvalidPin));
        assert_eq!(Pin::parse("1234 "), Err(RuleViolation::InvalidPin));
        assert_eq!(Pin::parse("１２３４"), Err(RuleViolation::InvalidPin));
    }

    #[test]
    fn test_pin_debug_is_masked() {
        let pin = Pin::parse("9876").unwrap();
        assert_eq!(format!("{:?}", pin), "Pin(****)");
    }

    #[test]
    fn test_pin_serializes_as_string() {
        let json = serde_json::to_string(&Pin::parse("0042").unwrap()).unwrap();
        assert_eq!(json, "\"0042\"");

        let bad: Result<Pin, _> = serde_json::from_str("\"42\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_field_roundtrip() {
        for field in [
            AccountField::Name,
            AccountField::Age,
            AccountField::Email,
            AccountField::Pin,
        ] {
            assert_eq!(AccountField::from_str(field.as_str()), Some(field));
        }
        assert_eq!(AccountField::from_str("Balance"), None);
        assert_eq!(AccountField::from_str("PIN"), Some(AccountField::Pin));
    }

    #[test]
    fn test_update_field_validates() {
        let mut account = sample();

        assert_eq!(
            account.update_field(AccountField::Age, "16"),
            Err(RuleViolation::Underage { age: 16 })
        );
        assert!(matches!(
            account.update_field(AccountField::Age, "old"),
            Err(RuleViolation::InvalidAge(_))
        ));
        assert_eq!(
            account.update_field(AccountField::Pin, "99999"),
            Err(RuleViolation::InvalidPin)
        );
        assert_eq!(account, sample());

        account.update_field(AccountField::Age, "45").unwrap();
        account.update_field(AccountField::Pin, "1111").unwrap();
        account.update_field(AccountField::Email, "new@example.com").unwrap();
        assert_eq!(account.age, 45);
        assert!(account.matches("ab1234567890c!", "1111"));
        assert_eq!(account.email, "new@example.com");
    }

    #[test]
    fn test_matches_requires_both_credentials() {
        let account = sample();
        assert!(account.matches("ab1234567890c!", "0420"));
        assert!(!account.matches("ab1234567890c!", "0421"));
        assert!(!account.matches("zz1234567890c!", "0420"));
    }

    #[test]
    fn test_check_invariants_flags_negative_balance() {
        let mut account = sample();
        account.balance = -1;
        assert_eq!(
            account.check_invariants(),
            Err(RuleViolation::NegativeBalance { balance: -1 })
        );
    }
}
