use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::auth::Claims;
use crate::clients::{JournalEntryRequest, LedgerApi, LedgerClientError};
use crate::error::{AppError, Result};
use crate::models::{Invoice, InvoiceStatus, NewInvoice};
use crate::observability::{get_metrics, LatencyTimer};
use crate::repositories::{InvoiceFilter, InvoiceStore};

/// Outcome of an invoice creation or reposting attempt.
///
/// A ledger failure is not a hard failure: the invoice row is already
/// committed, so the caller gets a partial-success outcome describing it.
#[derive(Debug)]
pub enum InvoiceOutcome {
    /// Ledger accepted the journal entry; the invoice is `Posted`.
    Posted(Invoice),
    /// Invoice committed but the ledger call failed; status stays
    /// `Pending Posting` and no rollback happens.
    PendingLedger {
        invoice: Invoice,
        error: LedgerClientError,
    },
}

/// Orchestrates invoice creation and the corresponding journal posting.
///
/// The invoice insert and the ledger append live in two independently owned
/// databases with no shared transaction. The sequence is a deliberate
/// two-phase intent: commit the invoice as `Pending Posting`, post to the
/// ledger, then finalize to `Posted`. A failed posting leaves a durable
/// `Pending Posting` row for [`InvoiceService::retry_posting`] to pick up.
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    ledger: Arc<dyn LedgerApi>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>, ledger: Arc<dyn LedgerApi>) -> Self {
        Self { store, ledger }
    }

    /// Creates an invoice and attempts to post its journal entry.
    pub async fn create_invoice(&self, claims: &Claims, input: NewInvoice) -> Result<InvoiceOutcome> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Amount must be greater than 0".to_string(),
            ));
        }

        let created_by = claims.principal()?;
        let invoice = self.store.insert(input.into_invoice(created_by)).await?;
        get_metrics().record_invoice_created();
        info!(invoice_id = %invoice.invoice_id, "invoice created, posting journal entry");

        self.post_and_finalize(invoice).await
    }

    /// Fetches one invoice. A `User` may only read their own records.
    pub async fn get_invoice(&self, claims: &Claims, invoice_id: &str) -> Result<Invoice> {
        let invoice = self
            .store
            .get(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invoice '{invoice_id}' not found")))?;

        if self.restricted_to_own(claims) && invoice.created_by != claims.principal()? {
            return Err(AppError::Forbidden(
                "Not permitted to view this invoice".to_string(),
            ));
        }

        Ok(invoice)
    }

    /// Lists invoices with pagination, applying role-based visibility.
    pub async fn list_invoices(
        &self,
        claims: &Claims,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Invoice>> {
        let created_by = if self.restricted_to_own(claims) {
            Some(claims.principal()?.to_string())
        } else {
            None
        };

        self.store
            .list(InvoiceFilter {
                created_by,
                status: None,
                skip,
                limit,
            })
            .await
    }

    /// Invoices whose journal entry never made it to the ledger.
    /// This is the reconciliation worklist; nothing retries automatically.
    pub async fn list_pending_posting(&self, claims: &Claims) -> Result<Vec<Invoice>> {
        self.require_elevated(claims)?;
        self.store
            .list(InvoiceFilter {
                created_by: None,
                status: Some(InvoiceStatus::PendingPosting),
                skip: 0,
                limit: i64::MAX,
            })
            .await
    }

    /// Re-derives and re-posts the journal entry for a stuck invoice.
    /// Reposting an already `Posted` invoice is a no-op.
    pub async fn retry_posting(&self, claims: &Claims, invoice_id: &str) -> Result<InvoiceOutcome> {
        self.require_elevated(claims)?;

        let invoice = self
            .store
            .get(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invoice '{invoice_id}' not found")))?;

        if invoice.status == InvoiceStatus::Posted {
            return Ok(InvoiceOutcome::Posted(invoice));
        }

        self.post_and_finalize(invoice).await
    }

    async fn post_and_finalize(&self, invoice: Invoice) -> Result<InvoiceOutcome> {
        let timer = LatencyTimer::new();
        let request = JournalEntryRequest {
            entries: invoice.journal_lines().to_vec(),
        };

        match self.ledger.post_journal_entry(request).await {
            Ok(receipt) => {
                get_metrics().record_ledger_call_latency(timer.elapsed_ms(), true);
                let posted = self
                    .store
                    .update_status(&invoice.invoice_id, InvoiceStatus::Posted)
                    .await?;
                get_metrics().record_invoice_posted();
                info!(
                    invoice_id = %posted.invoice_id,
                    entry_ids = ?receipt.entry_ids,
                    "journal entry posted, invoice finalized"
                );
                Ok(InvoiceOutcome::Posted(posted))
            }
            Err(error) => {
                get_metrics().record_ledger_call_latency(timer.elapsed_ms(), false);
                get_metrics().record_ledger_post_failure(error.cause());
                warn!(
                    invoice_id = %invoice.invoice_id,
                    error = %error,
                    "journal posting failed, invoice stays Pending Posting"
                );
                Ok(InvoiceOutcome::PendingLedger { invoice, error })
            }
        }
    }

    fn restricted_to_own(&self, claims: &Claims) -> bool {
        if claims.is_service() {
            return false;
        }
        // Unknown or missing roles get the least privilege.
        !claims.role().map(|r| r.is_elevated()).unwrap_or(false)
    }

    fn require_elevated(&self, claims: &Claims) -> Result<()> {
        if claims.is_service() || claims.role().map(|r| r.is_elevated()).unwrap_or(false) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Requires an elevated role".to_string(),
            ))
        }
    }
}
