#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use ngo_fms::api::{ledger_router, payables_router, InfraState, LedgerState, PayablesState};
use ngo_fms::auth::{mint_service_token, Claims, JwtVerifier, Role};
use ngo_fms::clients::{JournalEntryRequest, LedgerApi, LedgerClientError, PostingReceipt};
use ngo_fms::error::{AppError, Result};
use ngo_fms::models::{EntryInput, Invoice, InvoiceStatus, LedgerEntry};
use ngo_fms::repositories::{InvoiceFilter, InvoiceStore, LedgerFilter, LedgerStore};
use ngo_fms::services::{InvoiceService, LedgerPostingService};

pub const USER_SECRET: &str = "test-user-secret";
pub const SERVICE_SECRET: &str = "test-service-secret";

// ============================================================================
// In-memory stores
// ============================================================================

/// Append-only in-memory ledger store with sequential ids.
#[derive(Default)]
pub struct MemoryLedgerStore {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().unwrap().clone()
    }

    fn persist(entries: &mut Vec<LedgerEntry>, input: EntryInput) -> LedgerEntry {
        let entry = LedgerEntry {
            id: entries.len() as i64 + 1,
            account: input.account,
            entry_type: input.entry_type,
            amount: input.amount,
            description: input.description,
            project_id: input.project_id,
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        entry
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn append_pair(
        &self,
        debit: EntryInput,
        credit: EntryInput,
    ) -> Result<(LedgerEntry, LedgerEntry)> {
        let mut entries = self.entries.lock().unwrap();
        let debit_row = Self::persist(&mut entries, debit);
        let credit_row = Self::persist(&mut entries, credit);
        Ok((debit_row, credit_row))
    }

    async fn list(&self, filter: LedgerFilter) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| {
                filter
                    .account
                    .as_ref()
                    .map(|a| &e.account == a)
                    .unwrap_or(true)
                    && filter
                        .project_id
                        .as_ref()
                        .map(|p| e.project_id.as_ref() == Some(p))
                        .unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

/// In-memory invoice store enforcing identifier uniqueness.
#[derive(Default)]
pub struct MemoryInvoiceStore {
    invoices: Mutex<Vec<Invoice>>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.invoices.lock().unwrap().len()
    }

    pub fn get_sync(&self, invoice_id: &str) -> Option<Invoice> {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.invoice_id == invoice_id)
            .cloned()
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> Result<Invoice> {
        let mut invoices = self.invoices.lock().unwrap();
        if invoices.iter().any(|i| i.invoice_id == invoice.invoice_id) {
            return Err(AppError::Conflict("Invoice ID already exists".to_string()));
        }
        invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn get(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        Ok(self.get_sync(invoice_id))
    }

    async fn list(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>> {
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices
            .iter()
            .filter(|i| {
                filter
                    .created_by
                    .as_ref()
                    .map(|c| &i.created_by == c)
                    .unwrap_or(true)
                    && filter.status.map(|s| i.status == s).unwrap_or(true)
            })
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.clamp(0, i64::from(u32::MAX)) as usize)
            .cloned()
            .collect())
    }

    async fn update_status(&self, invoice_id: &str, status: InvoiceStatus) -> Result<Invoice> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.invoice_id == invoice_id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice '{invoice_id}' not found")))?;
        invoice.status = status;
        Ok(invoice.clone())
    }
}

// ============================================================================
// In-process ledger client
// ============================================================================

/// Ledger client that routes through a real posting service over the
/// in-memory store, with injectable failures for the unreachable cases.
pub struct InProcessLedger {
    posting: LedgerPostingService,
    fail_with: Mutex<Option<LedgerClientError>>,
}

impl InProcessLedger {
    pub fn new(store: Arc<MemoryLedgerStore>) -> Self {
        Self {
            posting: LedgerPostingService::new(store),
            fail_with: Mutex::new(None),
        }
    }

    /// Makes every subsequent call fail with the given error.
    pub fn fail_with(&self, error: LedgerClientError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    /// Restores normal operation.
    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }
}

#[async_trait]
impl LedgerApi for InProcessLedger {
    async fn post_journal_entry(
        &self,
        request: JournalEntryRequest,
    ) -> std::result::Result<PostingReceipt, LedgerClientError> {
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }

        let claims = service_claims();
        match self.posting.post_journal_entry(&claims, &request.entries).await {
            Ok((debit, credit)) => Ok(PostingReceipt {
                status: "success".to_string(),
                message: "Journal entry posted".to_string(),
                entry_ids: vec![debit.id, credit.id],
            }),
            Err(AppError::Validation(detail)) => Err(LedgerClientError::Rejected {
                status: 400,
                detail,
            }),
            Err(other) => Err(LedgerClientError::Other(other.to_string())),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestHarness {
    pub ledger_store: Arc<MemoryLedgerStore>,
    pub invoice_store: Arc<MemoryInvoiceStore>,
    pub ledger: Arc<InProcessLedger>,
    pub invoices: Arc<InvoiceService>,
    pub posting: Arc<LedgerPostingService>,
}

pub fn harness() -> TestHarness {
    let ledger_store = Arc::new(MemoryLedgerStore::new());
    let invoice_store = Arc::new(MemoryInvoiceStore::new());
    let ledger = Arc::new(InProcessLedger::new(ledger_store.clone()));
    let invoices = Arc::new(InvoiceService::new(invoice_store.clone(), ledger.clone()));
    let posting = Arc::new(LedgerPostingService::new(ledger_store.clone()));

    TestHarness {
        ledger_store,
        invoice_store,
        ledger,
        invoices,
        posting,
    }
}

pub fn payables_app(harness: &TestHarness) -> Router {
    payables_router(
        PayablesState {
            invoices: harness.invoices.clone(),
            verifier: Arc::new(JwtVerifier::new(USER_SECRET)),
        },
        InfraState::detached("payables"),
    )
}

pub fn ledger_app(harness: &TestHarness) -> Router {
    ledger_router(
        LedgerState {
            posting: harness.posting.clone(),
            verifier: Arc::new(JwtVerifier::new(SERVICE_SECRET)),
        },
        InfraState::detached("ledger"),
    )
}

// ============================================================================
// Credentials
// ============================================================================

pub fn user_claims(sub: &str, role: &str) -> Claims {
    Claims {
        sub: Some(sub.to_string()),
        service: None,
        role_name: Some(role.to_string()),
        exp: (Utc::now() + Duration::minutes(30)).timestamp(),
    }
}

pub fn service_claims() -> Claims {
    Claims {
        sub: None,
        service: Some(serde_json::Value::Bool(true)),
        role_name: Some(Role::Accountant.as_str().to_string()),
        exp: (Utc::now() + Duration::minutes(5)).timestamp(),
    }
}

pub fn user_token(sub: &str, role: &str) -> String {
    sign(&user_claims(sub, role), USER_SECRET)
}

pub fn expired_user_token(sub: &str, role: &str) -> String {
    let mut claims = user_claims(sub, role);
    claims.exp = (Utc::now() - Duration::minutes(10)).timestamp();
    sign(&claims, USER_SECRET)
}

pub fn service_token() -> String {
    mint_service_token(SERVICE_SECRET, Role::Accountant, Duration::minutes(5)).unwrap()
}

pub fn user_token_for_ledger(sub: &str, role: &str) -> String {
    sign(&user_claims(sub, role), SERVICE_SECRET)
}

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

pub fn invoice_body(invoice_id: &str, amount: &str) -> serde_json::Value {
    serde_json::json!({
        "invoice_id": invoice_id,
        "vendor_name": "Acme Supplies",
        "vendor_email": "billing@acme.example",
        "vendor_number": "V-042",
        "invoice_date": "2026-08-01",
        "due_date": "2026-09-01",
        "amount": amount.parse::<f64>().unwrap(),
        "payment_method": "Bank Transfer",
        "payment_status": "Unpaid",
        "expense_account": "EXP",
        "payable_account": "AP"
    })
}
