//! Scripted payment gateway.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::payments::{
    GatewayCredentials, GatewayError, GatewayOutcome, PaymentGateway, TransactionRequest,
};

/// A gateway that replays a fixed script of responses.
///
/// Once the script runs out every call fails with
/// [`GatewayError::Unexpected`].
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<GatewayOutcome, GatewayError>>>,
    requests: Mutex<Vec<TransactionRequest>>,
}

impl ScriptedGateway {
    /// Creates a gateway answering with `script` in order.
    #[must_use]
    pub fn new(script: Vec<Result<GatewayOutcome, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of sale calls.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns the requests received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<TransactionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn sale(
        &self,
        _credentials: &GatewayCredentials,
        request: &TransactionRequest,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.requests.lock().push(request.clone());
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(GatewayError::Unexpected(
                "scripted gateway has no more responses".to_string(),
            ))
        })
    }
}
