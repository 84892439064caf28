//! Creates the gateway transaction for a cart's federated payment.

use super::constants::{
    CREATE_FEDERATED_PAYMENT_BLOCK, CREATE_PAYMENT_FAILED_TERM_KEY, GATEWAY_RETRYER_NAME,
    INVALID_OR_MISSING_PROPERTY_VALUE_TERM_KEY, PAYMENT_PROCESSING_FAILED_TERM_KEY,
};
use super::gateway::{
    AddressRequest, GatewayOutcome, PaymentGateway, Transaction, TransactionRequest,
};
use super::models::{CartEmailArgument, FederatedPaymentComponent};
use super::policy::GatewayClientPolicy;
use crate::blocks::PipelineBlock;
use crate::context::{MessageSeverity, PipelineExecutionContext};
use crate::errors::{BlockError, BlockflowError};
use crate::retry::{RetryError, Retryer, RetryerRegistry};
use async_trait::async_trait;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authorizes a cart's federated payment with the gateway.
///
/// Expected failures never escape the block: a missing nonce, a decline
/// and gateway errors abort the context with an error message instead.
pub struct CreateFederatedPaymentBlock {
    retryer: Arc<Retryer>,
    gateway: Arc<dyn PaymentGateway>,
}

impl fmt::Debug for CreateFederatedPaymentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateFederatedPaymentBlock")
            .field("retryer", &self.retryer.name())
            .finish_non_exhaustive()
    }
}

impl CreateFederatedPaymentBlock {
    /// Creates the block.
    ///
    /// # Errors
    ///
    /// Returns [`BlockflowError::RetryerNotRegistered`] if no retryer named
    /// [`GATEWAY_RETRYER_NAME`] is registered.
    pub fn new(
        registry: &RetryerRegistry,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, BlockflowError> {
        let retryer = registry.get(GATEWAY_RETRYER_NAME)?;
        Ok(Self { retryer, gateway })
    }

    fn fail(ctx: &mut PipelineExecutionContext, term_key: &str, args: Vec<serde_json::Value>, text: String) {
        let message = ctx.add_message(MessageSeverity::Error, term_key, args, text);
        ctx.abort(message);
    }

    fn build_request(payment: &FederatedPaymentComponent) -> TransactionRequest {
        TransactionRequest {
            amount: payment.amount.clone(),
            payment_method_nonce: payment.payment_method_nonce.clone(),
            billing_address: payment.billing_party.as_ref().map(AddressRequest::from),
            submit_for_settlement: false,
        }
    }
}

/// Copies an approved transaction onto the payment.
///
/// Expiry values the gateway reports in an unexpected format leave the
/// previous values in place.
fn apply_transaction(payment: &mut FederatedPaymentComponent, transaction: Transaction) {
    payment.transaction_id = Some(transaction.id);
    payment.transaction_status = transaction.status;
    payment.payment_instrument_type = transaction.payment_instrument_type;

    let card = transaction.credit_card.unwrap_or_default();
    payment.masked_number = card.masked_number;
    payment.card_type = card.card_type;
    if let Some(month) = parse_lenient(card.expiration_month.as_deref()) {
        payment.expires_month = Some(month);
    }
    if let Some(year) = parse_lenient(card.expiration_year.as_deref()) {
        payment.expires_year = Some(year);
    }
}

fn parse_lenient(value: Option<&str>) -> Option<u32> {
    value.and_then(|raw| raw.trim().parse().ok())
}

#[async_trait]
impl PipelineBlock<CartEmailArgument> for CreateFederatedPaymentBlock {
    fn name(&self) -> &str {
        CREATE_FEDERATED_PAYMENT_BLOCK
    }

    async fn run(
        &self,
        mut arg: CartEmailArgument,
        ctx: &mut PipelineExecutionContext,
    ) -> Result<CartEmailArgument, BlockError> {
        let Some(payment) = arg.federated_payment() else {
            return Ok(arg);
        };

        if payment.payment_method_nonce.trim().is_empty() {
            Self::fail(
                ctx,
                INVALID_OR_MISSING_PROPERTY_VALUE_TERM_KEY,
                vec![json!("PaymentMethodNonce")],
                "Invalid or missing value for property 'PaymentMethodNonce'.".to_string(),
            );
            return Ok(arg);
        }

        let policy = ctx.get_policy::<GatewayClientPolicy>();
        if !policy.is_valid(ctx) {
            return Ok(arg);
        }

        let credentials = policy.credentials();
        let request = Self::build_request(payment);
        let cancel = ctx.cancellation().clone();

        debug!(
            block = CREATE_FEDERATED_PAYMENT_BLOCK,
            payment_id = %payment.id,
            correlation_id = %ctx.identity().correlation_id,
            "Submitting sale to gateway"
        );
        let result = self
            .retryer
            .execute(|| self.gateway.sale(&credentials, &request), &cancel)
            .await;

        match result {
            Ok(GatewayOutcome::Approved(transaction)) => {
                info!(
                    block = CREATE_FEDERATED_PAYMENT_BLOCK,
                    transaction_id = %transaction.id,
                    "Sale approved"
                );
                if let Some(payment) = arg
                    .cart
                    .as_mut()
                    .and_then(|cart| cart.federated_payment.as_mut())
                {
                    apply_transaction(payment, transaction);
                }
            }
            Ok(outcome @ GatewayOutcome::Declined { .. }) => {
                let details = outcome.decline_details().unwrap_or_default();
                warn!(block = CREATE_FEDERATED_PAYMENT_BLOCK, details = %details, "Sale declined");
                Self::fail(
                    ctx,
                    CREATE_PAYMENT_FAILED_TERM_KEY,
                    vec![json!("PaymentMethodNonce")],
                    format!("{CREATE_FEDERATED_PAYMENT_BLOCK}. Create payment failed :{details}"),
                );
            }
            Err(RetryError::Rejected(error) | RetryError::Exhausted { error, .. })
                if error.is_gateway_failure() =>
            {
                warn!(block = CREATE_FEDERATED_PAYMENT_BLOCK, error = %error, "Gateway call failed");
                Self::fail(
                    ctx,
                    CREATE_PAYMENT_FAILED_TERM_KEY,
                    vec![json!("PaymentMethodNonce"), json!(error.to_string())],
                    format!("{CREATE_FEDERATED_PAYMENT_BLOCK}. Create payment failed."),
                );
            }
            Err(other) => {
                warn!(block = CREATE_FEDERATED_PAYMENT_BLOCK, error = %other, "Payment processing failed");
                Self::fail(
                    ctx,
                    PAYMENT_PROCESSING_FAILED_TERM_KEY,
                    vec![json!(other.to_string())],
                    format!("{CREATE_FEDERATED_PAYMENT_BLOCK}. Payment processing failed."),
                );
            }
        }

        Ok(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::payments::gateway::{CreditCard, GatewayError};
    use crate::payments::models::{Cart, Money};
    use crate::payments::transient::add_transient_fault_handling_for_gateway;
    use crate::retry::{FixedInterval, TransientFaultHandlingBuilder};
    use crate::testing::ScriptedGateway;
    use std::time::Duration;

    fn registry() -> RetryerRegistry {
        add_transient_fault_handling_for_gateway(
            TransientFaultHandlingBuilder::new(),
            FixedInterval::new("fast", 3, Duration::from_millis(1)),
        )
        .build()
        .unwrap()
    }

    fn valid_policy() -> GatewayClientPolicy {
        GatewayClientPolicy {
            environment: "sandbox".to_string(),
            merchant_id: "merchant".to_string(),
            public_key: "pk".to_string(),
            private_key: "sk".to_string(),
        }
    }

    fn argument(nonce: &str) -> CartEmailArgument {
        let payment = FederatedPaymentComponent::new("pay-1", Money::new(25.0, "USD"), nonce);
        CartEmailArgument::new(
            Some(Cart::new("cart-1").with_federated_payment(payment)),
            "shopper@example.com",
        )
    }

    fn approved() -> GatewayOutcome {
        GatewayOutcome::Approved(Transaction {
            id: "tx-1".to_string(),
            status: Some("authorized".to_string()),
            payment_instrument_type: Some("credit_card".to_string()),
            credit_card: Some(CreditCard {
                masked_number: Some("411111******1111".to_string()),
                card_type: Some("Visa".to_string()),
                expiration_month: Some("09".to_string()),
                expiration_year: Some("20x8".to_string()),
            }),
        })
    }

    #[test]
    fn test_requires_registered_retryer() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let err = CreateFederatedPaymentBlock::new(&RetryerRegistry::default(), gateway).unwrap_err();
        assert!(matches!(err, BlockflowError::RetryerNotRegistered { .. }));
    }

    #[tokio::test]
    async fn test_cart_without_payment_passes_through() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let arg = CartEmailArgument::new(Some(Cart::new("c")), "e");
        let mut ctx = PipelineExecutionContext::default();

        let out = block.run(arg.clone(), &mut ctx).await.unwrap();
        assert_eq!(out, arg);
        assert_eq!(gateway.calls(), 0);
        assert!(!ctx.is_aborted());
    }

    #[tokio::test]
    async fn test_missing_nonce_aborts() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        block.run(argument(""), &mut ctx).await.unwrap();
        assert!(ctx.is_aborted());
        assert!(ctx.has_message(INVALID_OR_MISSING_PROPERTY_VALUE_TERM_KEY));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_policy_returns_without_abort() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let mut ctx = PipelineExecutionContext::default();

        block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert!(!ctx.is_aborted());
        assert!(ctx.has_message("InvalidClientPolicy"));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_approval_copies_transaction() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(approved())]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        let out = block.run(argument("nonce"), &mut ctx).await.unwrap();
        let payment = out.federated_payment().unwrap();
        assert_eq!(payment.transaction_id.as_deref(), Some("tx-1"));
        assert_eq!(payment.card_type.as_deref(), Some("Visa"));
        assert_eq!(payment.expires_month, Some(9));
        assert_eq!(payment.expires_year, None);
        assert!(!ctx.is_aborted());
        assert_eq!(gateway.requests()[0].payment_method_nonce, "nonce");
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GatewayError::Timeout("slow".to_string())),
            Err(GatewayError::Connection("reset".to_string())),
            Ok(approved()),
        ]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        let out = block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert_eq!(gateway.calls(), 3);
        assert!(out.federated_payment().unwrap().transaction_id.is_some());
    }

    #[tokio::test]
    async fn test_decline_aborts_with_details() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(GatewayOutcome::Declined {
            message: "Declined".to_string(),
            errors: vec![],
        })]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert!(ctx.is_aborted());
        assert!(ctx.has_message(CREATE_PAYMENT_FAILED_TERM_KEY));
        assert!(ctx.abort_reason().unwrap().contains("Declined"));
    }

    #[tokio::test]
    async fn test_gateway_error_is_not_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Authentication(
            "bad key".to_string(),
        ))]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert_eq!(gateway.calls(), 1);
        assert!(ctx.has_message(CREATE_PAYMENT_FAILED_TERM_KEY));
    }

    #[tokio::test]
    async fn test_unexpected_error_becomes_processing_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::Unexpected(
            "null reference".to_string(),
        ))]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway).unwrap();
        let mut ctx = PipelineExecutionContext::default().with_policy(valid_policy());

        block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert!(ctx.is_aborted());
        assert!(ctx.has_message(PAYMENT_PROCESSING_FAILED_TERM_KEY));
    }

    #[tokio::test]
    async fn test_cancelled_run_is_processing_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(approved())]));
        let block = CreateFederatedPaymentBlock::new(&registry(), gateway.clone()).unwrap();
        let token = CancellationToken::new();
        token.cancel("shutdown");
        let mut ctx = PipelineExecutionContext::default()
            .with_policy(valid_policy())
            .with_cancellation(token);

        block.run(argument("nonce"), &mut ctx).await.unwrap();
        assert_eq!(gateway.calls(), 0);
        assert!(ctx.has_message(PAYMENT_PROCESSING_FAILED_TERM_KEY));
    }
}
