//! Request and response types for the Monnify API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// Standard response envelope wrapping every processor payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the processor considered the request successful.
    #[serde(default)]
    pub request_successful: Option<bool>,
    /// Human-readable message.
    #[serde(default)]
    pub response_message: Option<String>,
    /// Processor response code (`"0"` on success).
    #[serde(default)]
    pub response_code: Option<String>,
    /// The payload.
    pub response_body: T,
}

/// Token returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// Bearer token value.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// A bank supported for collections and disbursements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// Bank name.
    pub name: String,
    /// Bank code.
    pub code: String,
    /// USSD dial template, if the bank has one.
    #[serde(default)]
    pub ussd_template: Option<String>,
    /// Base USSD code, if the bank has one.
    #[serde(default)]
    pub base_ussd_code: Option<String>,
}

/// Disbursement wallet balance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    /// Balance available for transfers.
    pub available_balance: f64,
    /// Ledger balance.
    pub ledger_balance: f64,
}

/// Status of a single collection, as reported by the processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus {
    /// Processor transaction reference.
    pub transaction_reference: String,
    /// Merchant payment reference.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Payment status (`PAID`, `PENDING`, `OVERPAID`, ...).
    pub payment_status: String,
    /// Amount paid, as sent by the processor.
    #[serde(default)]
    pub amount_paid: Option<Value>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Payment method used.
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Build an upstream failure from a non-success response body.
///
/// The message is `responseMessage` when present, otherwise
/// `Path '<path>' <error>`; the code is `responseCode`, then `status`, then
/// the HTTP status.
pub(crate) fn upstream_failure(status: u16, body: &Value) -> ClientError {
    let message = body
        .get("responseMessage")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| {
            let path = body.get("path").and_then(Value::as_str);
            let error = body.get("error").and_then(Value::as_str);
            match (path, error) {
                (None, None) => format!("HTTP {status}"),
                (path, error) => {
                    format!("Path '{}' {}", path.unwrap_or_default(), error.unwrap_or_default())
                }
            }
        });

    let code = body
        .get("responseCode")
        .or_else(|| body.get("status"))
        .and_then(scalar_to_string)
        .unwrap_or_else(|| status.to_string());

    ClientError::Upstream {
        status,
        code,
        message,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
