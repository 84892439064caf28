//! The external payment gateway seam.

use super::models::{Money, Party};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Credentials a gateway call is made with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCredentials {
    /// Gateway environment (e.g. "sandbox").
    pub environment: String,
    /// Merchant account ID.
    pub merchant_id: String,
    /// Public API key.
    pub public_key: String,
    /// Private API key.
    pub private_key: String,
}

/// Billing address sent with a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Street address.
    pub street_address: String,
    /// Additional address line.
    pub extended_address: String,
    /// City.
    pub locality: String,
    /// State or region.
    pub region: String,
    /// Postal code.
    pub postal_code: String,
    /// ISO country code.
    pub country_code_alpha2: String,
}

impl From<&Party> for AddressRequest {
    fn from(party: &Party) -> Self {
        Self {
            first_name: party.first_name.clone(),
            last_name: party.last_name.clone(),
            street_address: party.address1.clone(),
            extended_address: party.address2.clone(),
            locality: party.city.clone(),
            region: party.state_code.clone(),
            postal_code: party.zip_postal_code.clone(),
            country_code_alpha2: party.country_code.clone(),
        }
    }
}

/// A sale request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Amount to authorize.
    pub amount: Money,
    /// Payment method token.
    pub payment_method_nonce: String,
    /// Billing address, if known.
    pub billing_address: Option<AddressRequest>,
    /// Whether to settle immediately.
    pub submit_for_settlement: bool,
}

/// Card details of an approved transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Masked card number.
    pub masked_number: Option<String>,
    /// Card brand.
    pub card_type: Option<String>,
    /// Expiry month as reported by the gateway.
    pub expiration_month: Option<String>,
    /// Expiry year as reported by the gateway.
    pub expiration_year: Option<String>,
}

/// An approved transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: String,
    /// Transaction status.
    pub status: Option<String>,
    /// Instrument used.
    pub payment_instrument_type: Option<String>,
    /// Card details, for card payments.
    pub credit_card: Option<CreditCard>,
}

/// A validation problem reported with a decline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayIssue {
    /// Numeric gateway code.
    pub code: i32,
    /// Message.
    pub message: String,
}

/// Result of a sale the gateway processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GatewayOutcome {
    /// The sale was approved.
    Approved(Transaction),
    /// The sale was declined or failed validation.
    Declined {
        /// Summary message.
        message: String,
        /// Individual issues.
        errors: Vec<GatewayIssue>,
    },
}

impl GatewayOutcome {
    /// Formats a decline as `"<message> Error: <code> - <message>\n..."`.
    #[must_use]
    pub fn decline_details(&self) -> Option<String> {
        match self {
            Self::Approved(_) => None,
            Self::Declined { message, errors } => {
                let issues: String = errors
                    .iter()
                    .map(|issue| format!("Error: {} - {}\n", issue.code, issue.message))
                    .collect();
                Some(format!("{message} {issues}"))
            }
        }
    }
}

/// Errors raised while talking to the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The connection could not be established or was dropped.
    #[error("Gateway connection failed: {0}")]
    Connection(String),

    /// The gateway did not answer in time.
    #[error("Gateway request timed out: {0}")]
    Timeout(String),

    /// The HTTP exchange failed.
    #[error("Gateway HTTP request failed with status {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response message.
        message: String,
    },

    /// The credentials were rejected.
    #[error("Gateway authentication failed: {0}")]
    Authentication(String),

    /// The gateway rejected the request.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A transport I/O error.
    #[error("Gateway I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything the gateway client did not expect.
    #[error("Unexpected gateway failure: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Returns true for connectivity failures worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Http { .. }
        )
    }

    /// Returns true for errors raised by the gateway itself.
    #[must_use]
    pub fn is_gateway_failure(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}

/// An external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes a sale.
    ///
    /// Declines are a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the gateway could not process the
    /// request.
    async fn sale(
        &self,
        credentials: &GatewayCredentials,
        request: &TransactionRequest,
    ) -> Result<GatewayOutcome, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decline_details_format() {
        let outcome = GatewayOutcome::Declined {
            message: "Do Not Honor".to_string(),
            errors: vec![
                GatewayIssue {
                    code: 2000,
                    message: "Do Not Honor".to_string(),
                },
                GatewayIssue {
                    code: 81_715,
                    message: "Credit card number is invalid.".to_string(),
                },
            ],
        };

        assert_eq!(
            outcome.decline_details().unwrap(),
            "Do Not Honor Error: 2000 - Do Not Honor\nError: 81715 - Credit card number is invalid.\n"
        );
        assert!(GatewayOutcome::Approved(Transaction::default())
            .decline_details()
            .is_none());
    }

    #[test]
    fn test_error_kinds() {
        assert!(GatewayError::Timeout("30s".to_string()).is_transient());
        assert!(GatewayError::Http {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!GatewayError::Authentication("bad key".to_string()).is_transient());
        assert!(!GatewayError::Unexpected("x".to_string()).is_gateway_failure());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(GatewayOutcome::Declined {
            message: "no".to_string(),
            errors: vec![],
        })
        .unwrap();
        assert_eq!(json["outcome"], "declined");
    }

    #[test]
    fn test_address_from_party() {
        let party = Party {
            first_name: "Ada".to_string(),
            city: "London".to_string(),
            country_code: "GB".to_string(),
            ..Party::default()
        };
        let address = AddressRequest::from(&party);
        assert_eq!(address.locality, "London");
        assert_eq!(address.country_code_alpha2, "GB");
    }
}
