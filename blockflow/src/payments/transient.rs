//! Retry registration for gateway calls.

use super::constants::GATEWAY_RETRYER_NAME;
use super::gateway::GatewayError;
use crate::retry::{
    RetryStrategy, TransientErrorClassifier, TransientFaultHandlingBuilder, CONNECTIVITY_IO_KINDS,
};
use std::error::Error as StdError;

/// Returns true for connectivity failures of a gateway call.
///
/// Matches connection, timeout and HTTP transport errors, and I/O errors of
/// connectivity kinds anywhere in the source chain.
pub fn is_transient_gateway_error(error: &(dyn StdError + 'static)) -> bool {
    gateway_error_classifier().is_transient(error)
}

/// Builds the classifier used by the gateway retryer.
#[must_use]
pub fn gateway_error_classifier() -> TransientErrorClassifier {
    TransientErrorClassifier::new()
        .or_matching::<GatewayError, _>(GatewayError::is_transient)
        .or_io_kinds(CONNECTIVITY_IO_KINDS)
}

/// Registers the gateway retryer with `strategy`.
#[must_use]
pub fn add_transient_fault_handling_for_gateway(
    builder: TransientFaultHandlingBuilder,
    strategy: impl RetryStrategy + 'static,
) -> TransientFaultHandlingBuilder {
    builder.add_retryer(GATEWAY_RETRYER_NAME, gateway_error_classifier(), strategy)
}
