pub mod ledger;

pub use ledger::{
    HttpLedgerClient, JournalEntryRequest, LedgerApi, LedgerClientError, PostingReceipt,
};

#[cfg(test)]
pub use ledger::MockLedgerApi;
