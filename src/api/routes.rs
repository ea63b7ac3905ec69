use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::auth::TokenVerifier;
use crate::repositories::DbPool;
use crate::services::{InvoiceService, LedgerPostingService};

/// State for the ledger service routes.
#[derive(Clone)]
pub struct LedgerState {
    pub posting: Arc<LedgerPostingService>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// State for the payables service routes.
#[derive(Clone)]
pub struct PayablesState {
    pub invoices: Arc<InvoiceService>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// State for the health and metrics routes each service exposes.
#[derive(Clone)]
pub struct InfraState {
    pub service: &'static str,
    pub pool: Option<DbPool>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl InfraState {
    /// Infra state without a database or metrics recorder, for tests.
    pub fn detached(service: &'static str) -> Self {
        Self {
            service,
            pool: None,
            metrics_handle: None,
        }
    }
}

/// Creates the ledger service router.
pub fn ledger_router(state: LedgerState, infra: InfraState) -> Router {
    Router::new()
        .route(
            "/api/v1/ledger/journal-entries",
            post(handlers::post_journal_entry).get(handlers::list_journal_entries),
        )
        .route(
            "/api/v1/ledger/transactions",
            get(handlers::list_transactions),
        )
        .with_state(state)
        .merge(infra_router(infra))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Creates the payables service router.
pub fn payables_router(state: PayablesState, infra: InfraState) -> Router {
    Router::new()
        .route(
            "/invoices",
            post(handlers::create_invoice).get(handlers::list_invoices),
        )
        .route(
            "/invoices/pending-posting",
            get(handlers::list_pending_posting),
        )
        .route("/invoices/:id", get(handlers::get_invoice))
        .route(
            "/invoices/:id/retry-posting",
            post(handlers::retry_posting),
        )
        .with_state(state)
        .merge(infra_router(infra))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn infra_router(infra: InfraState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/live", get(handlers::liveness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .with_state(infra)
}
