use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::{mint_service_token, Role};
use crate::config::{AuthSettings, LedgerClientSettings};
use crate::error::AppError;
use crate::models::EntryInput;

/// Wire request for `POST /api/v1/ledger/journal-entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryRequest {
    pub entries: Vec<EntryInput>,
}

/// Wire response for a successful posting. The store-assigned row ids are
/// returned so the caller can correlate its record to the ledger rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingReceipt {
    pub status: String,
    pub message: String,
    pub entry_ids: Vec<i64>,
}

/// Failure causes of an outbound ledger call, kept distinct so the
/// orchestrator can report what actually went wrong.
#[derive(Debug, Clone, Error)]
pub enum LedgerClientError {
    #[error("Ledger Service timeout")]
    Timeout,

    #[error("Could not connect to Ledger Service")]
    Connection,

    #[error("Ledger Service rejected the posting ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Ledger Service call failed: {0}")]
    Other(String),
}

impl LedgerClientError {
    /// Stable label for metrics.
    pub fn cause(&self) -> &'static str {
        match self {
            LedgerClientError::Timeout => "timeout",
            LedgerClientError::Connection => "connection",
            LedgerClientError::Rejected { .. } => "rejected",
            LedgerClientError::Other(_) => "other",
        }
    }
}

/// Client interface for posting journal entries to the ledger service.
/// The invoice orchestrator never touches the ledger store directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn post_journal_entry(
        &self,
        request: JournalEntryRequest,
    ) -> std::result::Result<PostingReceipt, LedgerClientError>;
}

/// HTTP implementation. Each call mints a fresh short-lived service token
/// scoped to that call.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
    service_secret: String,
    token_ttl: chrono::Duration,
}

impl HttpLedgerClient {
    pub fn new(
        client_settings: &LedgerClientSettings,
        auth_settings: &AuthSettings,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(client_settings.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            base_url: client_settings.base_url.trim_end_matches('/').to_string(),
            service_secret: auth_settings.service_secret.clone(),
            token_ttl: chrono::Duration::minutes(auth_settings.service_token_ttl_minutes),
        })
    }

    fn classify(error: reqwest::Error) -> LedgerClientError {
        if error.is_timeout() {
            LedgerClientError::Timeout
        } else if error.is_connect() {
            LedgerClientError::Connection
        } else {
            LedgerClientError::Other(error.to_string())
        }
    }
}

#[async_trait]
impl LedgerApi for HttpLedgerClient {
    async fn post_journal_entry(
        &self,
        request: JournalEntryRequest,
    ) -> std::result::Result<PostingReceipt, LedgerClientError> {
        let token = mint_service_token(&self.service_secret, Role::Accountant, self.token_ttl)
            .map_err(|e| LedgerClientError::Other(e.to_string()))?;

        let url = format!("{}/api/v1/ledger/journal-entries", self.base_url);
        debug!(url = %url, "posting journal entry to ledger service");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LedgerClientError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<PostingReceipt>()
            .await
            .map_err(|e| LedgerClientError::Other(format!("invalid ledger response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_journal_request_wire_shape() {
        let request = JournalEntryRequest {
            entries: vec![
                EntryInput {
                    account: "EXP".to_string(),
                    entry_type: EntryType::Debit,
                    amount: dec!(100),
                    description: "Invoice INV-1 expense".to_string(),
                    project_id: None,
                },
                EntryInput {
                    account: "AP".to_string(),
                    entry_type: EntryType::Credit,
                    amount: dec!(100),
                    description: "Invoice INV-1 payable".to_string(),
                    project_id: None,
                },
            ],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["entries"][0]["type"], "debit");
        assert_eq!(json["entries"][1]["type"], "credit");
        assert_eq!(json["entries"][0]["account"], "EXP");
    }

    #[test]
    fn test_error_messages_distinguish_causes() {
        assert_eq!(
            LedgerClientError::Timeout.to_string(),
            "Ledger Service timeout"
        );
        assert_eq!(
            LedgerClientError::Connection.to_string(),
            "Could not connect to Ledger Service"
        );
        let rejected = LedgerClientError::Rejected {
            status: 400,
            detail: "Debit and credit amounts must match".to_string(),
        };
        assert!(rejected.to_string().contains("400"));
    }
}
