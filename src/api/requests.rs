use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::NewInvoice;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Request to create a new invoice. Creator identity and posting status are
/// server-assigned, not accepted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl CreateInvoiceRequest {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.invoice_id.trim().is_empty() {
            errors.push(ValidationError {
                field: "invoice_id".to_string(),
                message: "invoice_id cannot be empty".to_string(),
            });
        }
        if self.vendor_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "vendor_name".to_string(),
                message: "vendor_name cannot be empty".to_string(),
            });
        }
        if !self.vendor_email.contains('@') {
            errors.push(ValidationError {
                field: "vendor_email".to_string(),
                message: "vendor_email must be a valid email address".to_string(),
            });
        }
        if self.amount <= Decimal::ZERO {
            errors.push(ValidationError {
                field: "amount".to_string(),
                message: "Amount must be greater than 0".to_string(),
            });
        }
        if self.expense_account.trim().is_empty() {
            errors.push(ValidationError {
                field: "expense_account".to_string(),
                message: "expense_account cannot be empty".to_string(),
            });
        }
        if self.payable_account.trim().is_empty() {
            errors.push(ValidationError {
                field: "payable_account".to_string(),
                message: "payable_account cannot be empty".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_new_invoice(self) -> NewInvoice {
        NewInvoice {
            invoice_id: self.invoice_id,
            vendor_name: self.vendor_name,
            vendor_email: self.vendor_email,
            vendor_number: self.vendor_number,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            amount: self.amount,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            expense_account: self.expense_account,
            payable_account: self.payable_account,
            project_id: self.project_id,
        }
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Query parameters for listing invoices.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListInvoicesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListInvoicesQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Query parameters for listing ledger entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListEntriesQuery {
    pub account: Option<String>,
    pub project_id: Option<String>,
}

/// Query parameters for the project transactions view.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TransactionsQuery {
    pub project_id: Option<String>,
}
