pub mod handlers;
pub mod requests;
pub mod responses;
pub mod routes;

pub use routes::{ledger_router, payables_router, InfraState, LedgerState, PayablesState};
