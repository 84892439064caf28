//! Names shared by the payment blocks.

/// The create federated payment block name.
pub const CREATE_FEDERATED_PAYMENT_BLOCK: &str = "Payments.block.CreateFederatedPayment";

/// The registered plugin block name.
pub const REGISTERED_PLUGIN_BLOCK: &str = "Payments.block.RegisteredPlugin";

/// The plugin name reported by [`super::RegisteredPluginBlock`].
pub const PAYMENTS_PLUGIN_NAME: &str = "Blockflow.Payments";

/// The retryer the payment gateway calls run under.
pub const GATEWAY_RETRYER_NAME: &str = "GatewayRetryer";

/// Term key for a missing or invalid argument property.
pub const INVALID_OR_MISSING_PROPERTY_VALUE_TERM_KEY: &str = "InvalidOrMissingPropertyValue";

/// Term key for an incomplete gateway client policy.
pub const INVALID_CLIENT_POLICY_TERM_KEY: &str = "InvalidClientPolicy";

/// Term key for a declined or failed gateway call.
pub const CREATE_PAYMENT_FAILED_TERM_KEY: &str = "CreatePaymentFailed";

/// Term key for an unexpected payment processing fault.
pub const PAYMENT_PROCESSING_FAILED_TERM_KEY: &str = "PaymentProcessingFailed";
