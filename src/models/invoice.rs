use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{EntryInput, EntryType};

/// Posting status of an invoice, distinct from its free-text payment status.
///
/// `Pending Posting` is the initial state; the only transition is to
/// `Posted`, once the ledger service accepts the derived journal entry.
/// A failed posting leaves the invoice in `Pending Posting` until a
/// reconciliation repost succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status")]
pub enum InvoiceStatus {
    #[serde(rename = "Pending Posting")]
    #[sqlx(rename = "Pending Posting")]
    PendingPosting,
    #[serde(rename = "Posted")]
    #[sqlx(rename = "Posted")]
    Posted,
}

/// A payable obligation. The identifier is caller-supplied and unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: String,
    pub vendor_name: String,
    pub vendor_email: String,
    pub vendor_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub created_by: String,
    pub status: InvoiceStatus,
    pub expense_account: String,
    pub payable_account: String,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-provided invoice fields, before the orchestrator stamps creator
/// identity and posting status.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_id: String,
    pub vendor_name: String,
    pub vendor_email: String,
    pub vendor_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_status: String,
    pub expense_account: String,
    pub payable_account: String,
    pub project_id: Option<String>,
}

impl NewInvoice {
    /// Builds the stored record: `Pending Posting`, stamped with the caller.
    pub fn into_invoice(self, created_by: &str) -> Invoice {
        Invoice {
            invoice_id: self.invoice_id,
            vendor_name: self.vendor_name,
            vendor_email: self.vendor_email,
            vendor_number: self.vendor_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            amount: self.amount,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            created_by: created_by.to_string(),
            status: InvoiceStatus::PendingPosting,
            expense_account: self.expense_account,
            payable_account: self.payable_account,
            project_id: self.project_id,
            created_at: Utc::now(),
        }
    }
}

impl Invoice {
    /// Derives the balanced journal entry for this invoice: a debit against
    /// the expense account and a credit against the payable account, both
    /// for the invoice amount and carrying its project reference.
    pub fn journal_lines(&self) -> [EntryInput; 2] {
        [
            EntryInput {
                account: self.expense_account.clone(),
                entry_type: EntryType::Debit,
                amount: self.amount,
                description: format!("Invoice {} expense", self.invoice_id),
                project_id: self.project_id.clone(),
            },
            EntryInput {
                account: self.payable_account.clone(),
                entry_type: EntryType::Credit,
                amount: self.amount,
                description: format!("Invoice {} payable", self.invoice_id),
                project_id: self.project_id.clone(),
            },
        ]
    }
}
