use std::sync::Arc;

use tracing::info;

use crate::auth::{authorize_ledger_access, Claims};
use crate::error::Result;
use crate::models::{validate_journal_entries, EntryInput, LedgerEntry};
use crate::observability::get_metrics;
use crate::repositories::{LedgerFilter, LedgerStore};

/// Validates and atomically commits balanced journal entries.
///
/// All validation happens before any write; a rejected posting leaves the
/// ledger store untouched. Posting the same journal entry twice creates two
/// independent row pairs; there is no deduplication key.
pub struct LedgerPostingService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerPostingService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Posts a journal entry: exactly one debit and one credit of equal,
    /// positive amount, committed as one atomic pair. Returns both persisted
    /// rows so callers can correlate the posting to its ledger rows.
    pub async fn post_journal_entry(
        &self,
        claims: &Claims,
        entries: &[EntryInput],
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        authorize_ledger_access(claims)?;

        let (debit, credit) = validate_journal_entries(entries)?;

        let (debit_row, credit_row) = self
            .store
            .append_pair(debit.clone(), credit.clone())
            .await?;

        get_metrics().record_journal_posted();
        info!(
            debit_id = debit_row.id,
            credit_id = credit_row.id,
            debit_account = %debit_row.account,
            credit_account = %credit_row.account,
            amount = %debit_row.amount,
            "journal entry posted"
        );

        Ok((debit_row, credit_row))
    }

    /// Lists ledger entries, optionally filtered by account or project.
    pub async fn list_entries(
        &self,
        claims: &Claims,
        filter: LedgerFilter,
    ) -> Result<Vec<LedgerEntry>> {
        authorize_ledger_access(claims)?;
        self.store.list(filter).await
    }
}
