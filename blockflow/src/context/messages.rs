//! Diagnostic messages accumulated during a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageSeverity {
    /// The run could not do what was asked.
    Error,
    /// Something unexpected that did not stop the run.
    Warning,
    /// Informational.
    Information,
    /// Caller input was invalid.
    ValidationError,
}

impl MessageSeverity {
    /// Returns the result code used for this severity.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Information => "Information",
            Self::ValidationError => "ValidationError",
        }
    }

    /// Returns true for severities that represent a failure.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::ValidationError)
    }
}

impl std::fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A structured diagnostic added by a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Message severity.
    pub severity: MessageSeverity,
    /// Stable term key (e.g. "InvalidOrMissingPropertyValue").
    pub term_key: String,
    /// Arguments for localizing the message.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    /// Default text.
    pub text: String,
    /// When the message was recorded.
    pub created_at: DateTime<Utc>,
}

impl CommandMessage {
    /// Creates a new message stamped with the current time.
    #[must_use]
    pub fn new(
        severity: MessageSeverity,
        term_key: impl Into<String>,
        args: Vec<serde_json::Value>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            term_key: term_key.into(),
            args,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_codes() {
        assert_eq!(MessageSeverity::Error.to_string(), "Error");
        assert_eq!(MessageSeverity::ValidationError.code(), "ValidationError");
        assert!(MessageSeverity::Error.is_failure());
        assert!(!MessageSeverity::Warning.is_failure());
    }

    #[test]
    fn test_message_serialization() {
        let message = CommandMessage::new(
            MessageSeverity::Error,
            "InvalidOrMissingPropertyValue",
            vec![serde_json::json!("PaymentMethodNonce")],
            "Invalid or missing value for property 'PaymentMethodNonce'.",
        );

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["severity"], "Error");
        assert_eq!(json["args"][0], "PaymentMethodNonce");

        let back: CommandMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
