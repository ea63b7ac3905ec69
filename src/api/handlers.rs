use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::requests::{
    CreateInvoiceRequest, ListEntriesQuery, ListInvoicesQuery, TransactionsQuery,
};
use crate::api::responses::{
    ApiError, HealthResponse, InvoiceOutcomeResponse, JournalEntryPostedResponse,
    ValidationErrorDetail,
};
use crate::api::routes::{InfraState, LedgerState, PayablesState};
use crate::auth::extract_bearer;
use crate::clients::JournalEntryRequest;
use crate::models::{Invoice, LedgerEntry};
use crate::repositories::LedgerFilter;

// ============================================================================
// Ledger Handlers
// ============================================================================

/// Post a balanced journal entry: one debit, one credit, equal amounts.
pub async fn post_journal_entry(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Json(body): Json<JournalEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntryPostedResponse>), ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;

    let (debit, credit) = state
        .posting
        .post_journal_entry(&claims, &body.entries)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JournalEntryPostedResponse::new(debit.id, credit.id)),
    ))
}

/// List ledger entries, optionally filtered by account or project.
pub async fn list_journal_entries(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;

    let entries = state
        .posting
        .list_entries(
            &claims,
            LedgerFilter {
                account: query.account,
                project_id: query.project_id,
            },
        )
        .await?;

    Ok(Json(entries))
}

/// Project transactions view: ledger entries filtered by project.
pub async fn list_transactions(
    State(state): State<LedgerState>,
    headers: HeaderMap,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;

    let entries = state
        .posting
        .list_entries(
            &claims,
            LedgerFilter {
                account: None,
                project_id: query.project_id,
            },
        )
        .await?;

    Ok(Json(entries))
}

// ============================================================================
// Invoice Handlers
// ============================================================================

/// Create an invoice and post its journal entry to the ledger service.
///
/// Returns 201 with the full invoice when the ledger accepted the posting,
/// and 201 with `{invoice_id, message, error}` when the invoice row was
/// committed but the ledger call failed.
pub async fn create_invoice(
    State(state): State<PayablesState>,
    headers: HeaderMap,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceOutcomeResponse>), ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;

    if let Err(errors) = request.validate() {
        let details: Vec<ValidationErrorDetail> = errors
            .iter()
            .map(|e| ValidationErrorDetail {
                field: e.field.clone(),
                message: e.message.clone(),
            })
            .collect();
        return Err(ApiError::validation_details(details));
    }

    let outcome = state
        .invoices
        .create_invoice(&claims, request.into_new_invoice())
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Get a single invoice. `User` role callers may only read their own.
pub async fn get_invoice(
    State(state): State<PayablesState>,
    headers: HeaderMap,
    Path(invoice_id): Path<String>,
) -> Result<Json<Invoice>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;
    let invoice = state.invoices.get_invoice(&claims, &invoice_id).await?;
    Ok(Json(invoice))
}

/// List invoices with skip/limit pagination and role-based visibility.
pub async fn list_invoices(
    State(state): State<PayablesState>,
    headers: HeaderMap,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;

    let invoices = state
        .invoices
        .list_invoices(&claims, query.skip(), query.limit())
        .await?;

    Ok(Json(invoices))
}

/// Invoices stuck in `Pending Posting`, the reconciliation worklist.
pub async fn list_pending_posting(
    State(state): State<PayablesState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;
    let invoices = state.invoices.list_pending_posting(&claims).await?;
    Ok(Json(invoices))
}

/// Re-post the journal entry for a stuck invoice.
pub async fn retry_posting(
    State(state): State<PayablesState>,
    headers: HeaderMap,
    Path(invoice_id): Path<String>,
) -> Result<Json<InvoiceOutcomeResponse>, ApiError> {
    let claims = state.verifier.verify(extract_bearer(&headers)?)?;
    let outcome = state.invoices.retry_posting(&claims, &invoice_id).await?;
    Ok(Json(outcome.into()))
}

// ============================================================================
// Infra Handlers
// ============================================================================

/// Health check endpoint.
pub async fn health_check(State(infra): State<InfraState>) -> Json<HealthResponse> {
    let db_healthy = match &infra.pool {
        Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
        None => false,
    };

    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        service: infra.service.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database: db_healthy,
    })
}

/// Readiness check endpoint.
pub async fn readiness_check(State(infra): State<InfraState>) -> StatusCode {
    let db_healthy = match &infra.pool {
        Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
        None => false,
    };

    if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness check endpoint.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint(State(infra): State<InfraState>) -> String {
    infra
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
