use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::LedgerClientError;
use crate::error::AppError;
use crate::models::Invoice;
use crate::services::InvoiceOutcome;

/// Error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Validation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// An error already shaped for the HTTP surface.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn validation_details(details: Vec<ValidationErrorDetail>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                .with_details(details),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let (status, code) = match &error {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::LedgerUnavailable(LedgerClientError::Timeout) => {
                (StatusCode::GATEWAY_TIMEOUT, "LEDGER_TIMEOUT")
            }
            AppError::LedgerUnavailable(_) => (StatusCode::BAD_GATEWAY, "LEDGER_UNAVAILABLE"),
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!("internal error: {}", error);
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred"),
                };
            }
        };

        Self {
            status,
            body: ErrorResponse::new(code, error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Response for a successful journal posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntryPostedResponse {
    pub status: String,
    pub message: String,
    /// Ids of the two new ledger rows, debit first.
    pub entry_ids: Vec<i64>,
}

impl JournalEntryPostedResponse {
    pub fn new(debit_id: i64, credit_id: i64) -> Self {
        Self {
            status: "success".to_string(),
            message: "Journal entry posted".to_string(),
            entry_ids: vec![debit_id, credit_id],
        }
    }
}

/// Partial-success response: the invoice row exists but its journal entry
/// never reached the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicePendingResponse {
    pub invoice_id: String,
    pub message: String,
    pub error: String,
}

/// Body of a create/repost invoice response: the full record when the
/// posting went through, the partial shape when it did not.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InvoiceOutcomeResponse {
    Invoice(Invoice),
    Pending(InvoicePendingResponse),
}

impl From<InvoiceOutcome> for InvoiceOutcomeResponse {
    fn from(outcome: InvoiceOutcome) -> Self {
        match outcome {
            InvoiceOutcome::Posted(invoice) => InvoiceOutcomeResponse::Invoice(invoice),
            InvoiceOutcome::PendingLedger { invoice, error } => {
                InvoiceOutcomeResponse::Pending(InvoicePendingResponse {
                    invoice_id: invoice.invoice_id,
                    message: "Invoice created, but failed to post journal entry.".to_string(),
                    error: error.to_string(),
                })
            }
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_400() {
        let api_error = ApiError::from(AppError::Conflict("Invoice ID already exists".into()));
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.body.code, "CONFLICT");
    }

    #[test]
    fn test_auth_errors_distinct_from_validation() {
        let unauthorized = ApiError::from(AppError::Unauthorized("Token has expired".into()));
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);

        let forbidden = ApiError::from(AppError::Forbidden("Unauthorized service or user".into()));
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let validation = ApiError::from(AppError::Validation("bad".into()));
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let api_error = ApiError::from(AppError::Internal("secret detail".into()));
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api_error.body.message.contains("secret"));
    }

    #[test]
    fn test_ledger_timeout_maps_to_504() {
        let api_error =
            ApiError::from(AppError::LedgerUnavailable(LedgerClientError::Timeout));
        assert_eq!(api_error.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_pending_response_shape() {
        let response = InvoicePendingResponse {
            invoice_id: "INV-1".to_string(),
            message: "Invoice created, but failed to post journal entry.".to_string(),
            error: "Ledger Service timeout".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["invoice_id"], "INV-1");
        assert!(json.get("status").is_none());
    }
}
