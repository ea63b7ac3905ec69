use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::{Invoice, InvoiceStatus};
use crate::repositories::{InvoiceFilter, InvoiceStore};

const INVOICE_COLUMNS: &str = "invoice_id, vendor_name, vendor_email, vendor_number, invoice_date, \
     due_date, amount, payment_method, payment_status, created_by, status, \
     expense_account, payable_account, project_id, created_at";

/// Postgres-backed invoice store.
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> Result<Invoice> {
        let query = format!(
            r#"
            INSERT INTO invoices ({INVOICE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Invoice>(&query)
            .bind(&invoice.invoice_id)
            .bind(&invoice.vendor_name)
            .bind(&invoice.vendor_email)
            .bind(&invoice.vendor_number)
            .bind(invoice.invoice_date)
            .bind(invoice.due_date)
            .bind(invoice.amount)
            .bind(&invoice.payment_method)
            .bind(&invoice.payment_status)
            .bind(&invoice.created_by)
            .bind(invoice.status)
            .bind(&invoice.expense_account)
            .bind(&invoice.payable_account)
            .bind(&invoice.project_id)
            .bind(invoice.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict("Invoice ID already exists".to_string())
                }
                _ => AppError::Database(e),
            })?;

        Ok(row)
    }

    async fn get(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        let query = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE invoice_id = $1
            "#
        );

        let row = sqlx::query_as::<_, Invoice>(&query)
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>> {
        let query = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ($1::text IS NULL OR created_by = $1)
              AND ($2::invoice_status IS NULL OR status = $2)
            ORDER BY created_at
            OFFSET $3 LIMIT $4
            "#
        );

        let rows = sqlx::query_as::<_, Invoice>(&query)
            .bind(&filter.created_by)
            .bind(filter.status)
            .bind(filter.skip)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows)
    }

    async fn update_status(&self, invoice_id: &str, status: InvoiceStatus) -> Result<Invoice> {
        let query = format!(
            r#"
            UPDATE invoices
            SET status = $2
            WHERE invoice_id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, Invoice>(&query)
            .bind(invoice_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.ok_or_else(|| AppError::NotFound(format!("Invoice '{invoice_id}' not found")))
    }
}
