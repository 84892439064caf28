//! Run identity for correlating pipeline executions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one pipeline run and the caller it runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// Correlation ID shared by every block invoked in this run.
    pub correlation_id: Uuid,

    /// The session the run belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,

    /// The shopper the run acts for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_id: Option<String>,

    /// The environment the run executes in (e.g. "HabitatShops").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunIdentity {
    /// Creates a new run identity with a generated correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            session_id: None,
            shopper_id: None,
            environment: None,
        }
    }

    /// Creates a run identity with a specific correlation ID.
    #[must_use]
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            ..Self::new()
        }
    }

    /// Sets the session ID.
    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Sets the shopper ID.
    #[must_use]
    pub fn with_shopper_id(mut self, shopper_id: impl Into<String>) -> Self {
        self.shopper_id = Some(shopper_id.into());
        self
    }

    /// Sets the environment name.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Returns an identity for a nested run: same session, shopper and
    /// environment, fresh correlation ID.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}
