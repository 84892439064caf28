//! Gateway client credentials policy.

use super::constants::INVALID_CLIENT_POLICY_TERM_KEY;
use super::gateway::GatewayCredentials;
use crate::context::{MessageSeverity, PipelineExecutionContext, Policy};
use serde::{Deserialize, Serialize};

/// Credentials for the payment gateway, set on the context per environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayClientPolicy {
    /// Gateway environment (e.g. "sandbox").
    pub environment: String,
    /// Merchant account ID.
    pub merchant_id: String,
    /// Public API key.
    pub public_key: String,
    /// Private API key.
    pub private_key: String,
}

impl Policy for GatewayClientPolicy {
    fn policy_name() -> &'static str {
        "GatewayClientPolicy"
    }
}

impl GatewayClientPolicy {
    /// Returns the names of the settings left empty.
    #[must_use]
    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("Environment", &self.environment),
            ("MerchantId", &self.merchant_id),
            ("PublicKey", &self.public_key),
            ("PrivateKey", &self.private_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Checks the policy, recording an error message on `ctx` for each
    /// missing setting. The run is not aborted.
    pub fn is_valid(&self, ctx: &mut PipelineExecutionContext) -> bool {
        let missing = self.missing_settings();
        for setting in &missing {
            ctx.add_message(
                MessageSeverity::Error,
                INVALID_CLIENT_POLICY_TERM_KEY,
                vec![serde_json::json!(Self::policy_name()), serde_json::json!(setting)],
                format!("Invalid '{setting}' setting in '{}'.", Self::policy_name()),
            );
        }
        missing.is_empty()
    }

    /// Returns the credentials for a gateway call.
    #[must_use]
    pub fn credentials(&self) -> GatewayCredentials {
        GatewayCredentials {
            environment: self.environment.clone(),
            merchant_id: self.merchant_id.clone(),
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_reported() {
        let policy = GatewayClientPolicy {
            environment: "sandbox".to_string(),
            merchant_id: "m".to_string(),
            ..GatewayClientPolicy::default()
        };
        let mut ctx = PipelineExecutionContext::default();

        assert!(!policy.is_valid(&mut ctx));
        assert_eq!(policy.missing_settings(), vec!["PublicKey", "PrivateKey"]);
        assert_eq!(ctx.messages().len(), 2);
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn test_complete_policy_is_valid() {
        let policy = GatewayClientPolicy {
            environment: "sandbox".to_string(),
            merchant_id: "m".to_string(),
            public_key: "pk".to_string(),
            private_key: "sk".to_string(),
        };
        let mut ctx = PipelineExecutionContext::default();

        assert!(policy.is_valid(&mut ctx));
        assert!(ctx.messages().is_empty());
        assert_eq!(policy.credentials().merchant_id, "m");
    }
}
