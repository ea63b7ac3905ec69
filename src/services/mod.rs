pub mod invoice_service;
pub mod posting_service;

pub use invoice_service::{InvoiceOutcome, InvoiceService};
pub use posting_service::LedgerPostingService;
