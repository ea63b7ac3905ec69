pub mod invoice;
pub mod ledger_entry;

pub use invoice::{Invoice, InvoiceStatus, NewInvoice};
pub use ledger_entry::{validate_journal_entries, EntryInput, EntryType, LedgerEntry};
