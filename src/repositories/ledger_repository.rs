use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::{EntryInput, LedgerEntry};
use crate::repositories::{LedgerFilter, LedgerStore};

/// Postgres-backed ledger store.
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_one(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &EntryInput,
    ) -> Result<LedgerEntry> {
        let row = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (account, entry_type, amount, description, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account, entry_type, amount, description, project_id, created_at
            "#,
        )
        .bind(&entry.account)
        .bind(entry.entry_type)
        .bind(entry.amount)
        .bind(&entry.description)
        .bind(&entry.project_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn append_pair(
        &self,
        debit: EntryInput,
        credit: EntryInput,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let debit_row = Self::insert_one(&mut tx, &debit).await?;
        let credit_row = Self::insert_one(&mut tx, &credit).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((debit_row, credit_row))
    }

    async fn list(&self, filter: LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, account, entry_type, amount, description, project_id, created_at
            FROM ledger_entries
            WHERE ($1::text IS NULL OR account = $1)
              AND ($2::text IS NULL OR project_id = $2)
            ORDER BY id
            "#,
        )
        .bind(&filter.account)
        .bind(&filter.project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }
}
