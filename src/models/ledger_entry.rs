use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, Result};

/// Entry type for double-entry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry - increases assets/expenses, decreases liabilities/revenue.
    Debit,
    /// Credit entry - decreases assets/expenses, increases liabilities/revenue.
    Credit,
}

impl EntryType {
    pub fn opposite(&self) -> Self {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }
}

/// One proposed side of a journal entry, as submitted by a caller.
/// Becomes a durable [`LedgerEntry`] only through a validated posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInput {
    pub account: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// A persisted ledger row. Created only by a journal posting, immutable
/// thereafter; the ledger exposes no update or delete.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    /// Store-assigned, orderable identity.
    pub id: i64,
    pub account: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Always positive; direction is carried by `entry_type`.
    pub amount: Decimal,
    pub description: String,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed amount: positive for debit, negative for credit.
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }
}

/// Validates a proposed journal entry and splits it into its debit and
/// credit sides. Checks run in a fixed order, each a distinct rejection,
/// before any write happens:
/// exactly two entries, one of each type, positive and equal amounts.
pub fn validate_journal_entries(entries: &[EntryInput]) -> Result<(&EntryInput, &EntryInput)> {
    if entries.len() != 2 {
        return Err(AppError::Validation(
            "Must provide one debit and one credit entry".to_string(),
        ));
    }

    let debit = entries.iter().find(|e| e.entry_type == EntryType::Debit);
    let credit = entries.iter().find(|e| e.entry_type == EntryType::Credit);

    let (debit, credit) = match (debit, credit) {
        (Some(d), Some(c)) => (d, c),
        _ => {
            return Err(AppError::Validation(
                "Both debit and credit required".to_string(),
            ))
        }
    };

    if debit.amount != credit.amount {
        return Err(AppError::Validation(
            "Debit and credit amounts must match".to_string(),
        ));
    }

    if debit.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Entry amounts must be positive".to_string(),
        ));
    }

    Ok((debit, credit))
}
