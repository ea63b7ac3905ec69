pub mod invoice_repository;
pub mod ledger_repository;

pub use invoice_repository::PgInvoiceStore;
pub use ledger_repository::PgLedgerStore;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::{EntryInput, Invoice, InvoiceStatus, LedgerEntry};

/// Database connection pool type alias.
pub type DbPool = PgPool;

/// Filter for ledger reads.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub account: Option<String>,
    pub project_id: Option<String>,
}

/// Filter and pagination for invoice reads.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// When set, only invoices created by this principal are returned.
    pub created_by: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub skip: i64,
    pub limit: i64,
}

/// Append-only store of ledger entries, owned exclusively by the ledger
/// posting service. Corrections are new offsetting entries, never updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durably persists both rows as one atomic unit.
    async fn append_pair(
        &self,
        debit: EntryInput,
        credit: EntryInput,
    ) -> Result<(LedgerEntry, LedgerEntry)>;

    /// Returns matching entries in insertion order.
    async fn list(&self, filter: LedgerFilter) -> Result<Vec<LedgerEntry>>;
}

/// Store of invoice records, owned exclusively by the invoice orchestrator.
/// Uniqueness of the invoice identifier is enforced here; a duplicate insert
/// fails with a conflict distinct from other errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn insert(&self, invoice: Invoice) -> Result<Invoice>;

    async fn get(&self, invoice_id: &str) -> Result<Option<Invoice>>;

    async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>>;

    async fn update_status(&self, invoice_id: &str, status: InvoiceStatus) -> Result<Invoice>;
}
