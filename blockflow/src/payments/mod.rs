//! Payment gateway blocks.
//!
//! [`CreateFederatedPaymentBlock`] authorizes a cart's federated payment
//! through a [`PaymentGateway`], retrying connectivity failures with the
//! retryer registered by [`add_transient_fault_handling_for_gateway`].

pub mod constants;
mod create_payment;
mod gateway;
mod models;
mod policy;
mod registered_plugin;
mod transient;

pub use create_payment::CreateFederatedPaymentBlock;
pub use gateway::{
    AddressRequest, CreditCard, GatewayCredentials, GatewayError, GatewayIssue, GatewayOutcome,
    PaymentGateway, Transaction, TransactionRequest,
};
pub use models::{
    Cart, CartEmailArgument, FederatedPaymentComponent, Money, Party, RegisteredPluginModel,
};
pub use policy::GatewayClientPolicy;
pub use registered_plugin::RegisteredPluginBlock;
pub use transient::{
    add_transient_fault_handling_for_gateway, gateway_error_classifier, is_transient_gateway_error,
};
