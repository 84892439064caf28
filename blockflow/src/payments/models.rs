//! Argument types for the payment pipelines.

use serde::{Deserialize, Serialize};

/// An amount in a currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// The amount.
    pub amount: f64,
    /// ISO currency code.
    pub currency_code: String,
}

impl Money {
    /// Creates a new amount.
    #[must_use]
    pub fn new(amount: f64, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }
}

/// A billing or shipping party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Street address.
    pub address1: String,
    /// Additional address line.
    #[serde(default)]
    pub address2: String,
    /// City.
    pub city: String,
    /// State or region code.
    #[serde(default)]
    pub state_code: String,
    /// Postal code.
    pub zip_postal_code: String,
    /// ISO country code.
    pub country_code: String,
    /// Phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

/// A payment settled through an external gateway.
///
/// The transaction fields are filled in once the gateway approves the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedPaymentComponent {
    /// Component ID.
    pub id: String,
    /// Amount to charge.
    pub amount: Money,
    /// One-time token identifying the shopper's payment method.
    #[serde(default)]
    pub payment_method_nonce: String,
    /// Billing party, if collected.
    #[serde(default)]
    pub billing_party: Option<Party>,
    /// Gateway transaction ID.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Gateway transaction status.
    #[serde(default)]
    pub transaction_status: Option<String>,
    /// Instrument used (e.g. "credit_card").
    #[serde(default)]
    pub payment_instrument_type: Option<String>,
    /// Masked card number.
    #[serde(default)]
    pub masked_number: Option<String>,
    /// Card brand.
    #[serde(default)]
    pub card_type: Option<String>,
    /// Card expiry month.
    #[serde(default)]
    pub expires_month: Option<u32>,
    /// Card expiry year.
    #[serde(default)]
    pub expires_year: Option<u32>,
}

impl FederatedPaymentComponent {
    /// Creates a payment awaiting a gateway transaction.
    #[must_use]
    pub fn new(id: impl Into<String>, amount: Money, payment_method_nonce: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount,
            payment_method_nonce: payment_method_nonce.into(),
            billing_party: None,
            transaction_id: None,
            transaction_status: None,
            payment_instrument_type: None,
            masked_number: None,
            card_type: None,
            expires_month: None,
            expires_year: None,
        }
    }

    /// Sets the billing party.
    #[must_use]
    pub fn with_billing_party(mut self, party: Party) -> Self {
        self.billing_party = Some(party);
        self
    }
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: String,
    /// The federated payment, if one was added.
    #[serde(default)]
    pub federated_payment: Option<FederatedPaymentComponent>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            federated_payment: None,
        }
    }

    /// Attaches a federated payment.
    #[must_use]
    pub fn with_federated_payment(mut self, payment: FederatedPaymentComponent) -> Self {
        self.federated_payment = Some(payment);
        self
    }
}

/// Argument of the order creation pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEmailArgument {
    /// The cart being ordered, if resolved.
    pub cart: Option<Cart>,
    /// Shopper email.
    pub email: String,
}

impl CartEmailArgument {
    /// Creates a new argument.
    #[must_use]
    pub fn new(cart: Option<Cart>, email: impl Into<String>) -> Self {
        Self {
            cart,
            email: email.into(),
        }
    }

    /// Returns the cart's federated payment, if any.
    #[must_use]
    pub fn federated_payment(&self) -> Option<&FederatedPaymentComponent> {
        self.cart.as_ref().and_then(|cart| cart.federated_payment.as_ref())
    }
}

/// A plugin reported by the registered plugins pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredPluginModel {
    /// Plugin name.
    pub name: String,
    /// Name of the block that registered the plugin.
    pub registered_by: String,
}

impl RegisteredPluginModel {
    /// Creates a new plugin entry.
    #[must_use]
    pub fn new(name: impl Into<String>, registered_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registered_by: registered_by.into(),
        }
    }
}
