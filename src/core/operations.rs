//! Account operations
//!
//! Pure balance arithmetic over in-memory account snapshots. Nothing here reads
//! or writes a store, and nothing here touches the record's version: advancing
//! the version is exclusively the write path's job.

use crate::types::{Account, AccountError};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Credit an account snapshot
///
/// Returns a copy of `account` with `amount` added to the balance.
///
/// # Errors
///
/// - `InvalidArgument` if `amount` is not strictly positive
/// - `ArithmeticOverflow` if the new balance cannot be represented
pub fn credit(account: &Account, amount: Decimal) -> Result<Account, AccountError> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::invalid_argument("credit", amount));
    }

    let balance = account
        .balance
        .checked_add(amount)
        .ok_or_else(|| AccountError::arithmetic_overflow("credit", account.id))?;

    Ok(Account {
        balance,
        ..account.clone()
    })
}

/// Debit an account snapshot
///
/// Returns a copy of `account` with `amount` subtracted from the balance.
/// Overdraft is not checked: the balance may go negative.
///
/// # Errors
///
/// - `InvalidArgument` if `amount` is not strictly positive
/// - `ArithmeticOverflow` if the new balance cannot be represented
pub fn debit(account: &Account, amount: Decimal) -> Result<Account, AccountError> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::invalid_argument("debit", amount));
    }

    let balance = account
        .balance
        .checked_sub(amount)
        .ok_or_else(|| AccountError::arithmetic_overflow("debit", account.id))?;

    Ok(Account {
        balance,
        ..account.clone()
    })
}

/// A single balance mutation to apply to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOperation {
    /// Add funds
    Credit(Decimal),

    /// Remove funds
    Debit(Decimal),
}

impl AccountOperation {
    /// Apply the operation to an account snapshot
    pub fn apply(&self, account: &Account) -> Result<Account, AccountError> {
        match *self {
            AccountOperation::Credit(amount) => credit(account, amount),
            AccountOperation::Debit(amount) => debit(account, amount),
        }
    }

    /// Signed change this operation makes to a balance
    pub fn delta(&self) -> Decimal {
        match *self {
            AccountOperation::Credit(amount) => amount,
            AccountOperation::Debit(amount) => -amount,
        }
    }
}

impl fmt::Display for AccountOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountOperation::Credit(amount) => write!(f, "credit:{}", amount),
            AccountOperation::Debit(amount) => write!(f, "debit:{}", amount),
        }
    }
}

impl FromStr for AccountOperation {
    type Err = String;

    /// Parse `credit:<amount>` or `debit:<amount>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, amount_str) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("Invalid operation '{}': expected <credit|debit>:<amount>", s))?;

        let amount = Decimal::from_str(amount_str.trim())
            .map_err(|_| format!("Invalid amount '{}' in operation '{}'", amount_str, s))?;

        if amount <= Decimal::ZERO {
            return Err(format!("Amount in operation '{}' must be positive", s));
        }

        match kind.trim().to_lowercase().as_str() {
            "credit" => Ok(AccountOperation::Credit(amount)),
            "debit" => Ok(AccountOperation::Debit(amount)),
            _ => Err(format!("Invalid operation type '{}' in '{}'", kind, s)),
        }
    }
}
