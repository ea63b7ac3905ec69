use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use ngo_fms::api::{ledger_router, payables_router, InfraState, LedgerState, PayablesState};
use ngo_fms::auth::JwtVerifier;
use ngo_fms::clients::HttpLedgerClient;
use ngo_fms::config::{DatabaseSettings, Settings};
use ngo_fms::observability::{init_logging, init_metrics};
use ngo_fms::repositories::{PgInvoiceStore, PgLedgerStore};
use ngo_fms::services::{InvoiceService, LedgerPostingService};

async fn connect(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.pool_size)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.url)
        .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    init_logging(&settings.application);
    let metrics_handle = init_metrics();
    info!("Configuration loaded");

    let payables_pool = connect(&settings.payables_database).await?;
    let ledger_pool = connect(&settings.ledger_database).await?;
    info!("Database connections established");

    sqlx::migrate!("./migrations/payables")
        .run(&payables_pool)
        .await?;
    sqlx::migrate!("./migrations/ledger").run(&ledger_pool).await?;
    info!("Migrations applied");

    // The ledger service verifies service-secret tokens; the payables
    // service verifies end-user tokens issued by the auth service.
    let ledger_state = LedgerState {
        posting: Arc::new(LedgerPostingService::new(Arc::new(PgLedgerStore::new(
            ledger_pool.clone(),
        )))),
        verifier: Arc::new(JwtVerifier::new(&settings.auth.service_secret)),
    };
    let ledger_app = ledger_router(
        ledger_state,
        InfraState {
            service: "ledger",
            pool: Some(ledger_pool),
            metrics_handle: Some(metrics_handle.clone()),
        },
    );

    let ledger_client = Arc::new(HttpLedgerClient::new(
        &settings.ledger_client,
        &settings.auth,
    )?);
    let payables_state = PayablesState {
        invoices: Arc::new(InvoiceService::new(
            Arc::new(PgInvoiceStore::new(payables_pool.clone())),
            ledger_client,
        )),
        verifier: Arc::new(JwtVerifier::new(&settings.auth.jwt_secret)),
    };
    let payables_app = payables_router(
        payables_state,
        InfraState {
            service: "payables",
            pool: Some(payables_pool),
            metrics_handle: Some(metrics_handle),
        },
    );

    let ledger_addr = SocketAddr::from(([0, 0, 0, 0], settings.application.ledger_port));
    let payables_addr = SocketAddr::from(([0, 0, 0, 0], settings.application.payables_port));

    let ledger_listener = tokio::net::TcpListener::bind(ledger_addr).await?;
    let payables_listener = tokio::net::TcpListener::bind(payables_addr).await?;
    info!(%ledger_addr, %payables_addr, "Serving ledger and payables services");

    let ledger_srv = tokio::spawn(async move { axum::serve(ledger_listener, ledger_app).await });
    let payables_srv =
        tokio::spawn(async move { axum::serve(payables_listener, payables_app).await });

    let (ledger_result, payables_result) = tokio::try_join!(ledger_srv, payables_srv)?;
    ledger_result?;
    payables_result?;

    Ok(())
}
