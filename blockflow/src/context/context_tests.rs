//! Tests for the execution context.

#[cfg(test)]
mod tests {
    use crate::context::{
        MessageSeverity, PipelineExecutionContext, Policy, PolicyKey, RunIdentity,
        POLICY_KEYS_HEADER,
    };
    use crate::events::{CollectingEventSink, EventKind};
    use std::sync::Arc;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct CurrencyPolicy {
        code: String,
    }

    impl Policy for CurrencyPolicy {}

    #[test]
    fn test_context_creation() {
        let ctx = PipelineExecutionContext::default();
        assert!(!ctx.is_aborted());
        assert!(ctx.abort_reason().is_none());
        assert!(ctx.messages().is_empty());
        assert!(ctx.headers().is_empty());
        assert!(!ctx.cancellation().is_cancelled());
    }

    #[test]
    fn test_abort_keeps_first_reason() {
        let mut ctx = PipelineExecutionContext::default();
        ctx.abort("declined");
        ctx.abort("second");

        assert!(ctx.is_aborted());
        assert_eq!(ctx.abort_reason(), Some("declined"));
    }

    #[test]
    fn test_add_message_returns_text() {
        let mut ctx = PipelineExecutionContext::default();
        let text = ctx.add_message(
            MessageSeverity::Error,
            "CreatePaymentFailed",
            vec![serde_json::json!("PaymentId")],
            "Payment failed",
        );

        assert_eq!(text, "Payment failed");
        assert_eq!(ctx.messages().len(), 1);
        assert!(ctx.has_message("CreatePaymentFailed"));
        assert!(!ctx.has_message("Other"));
    }

    #[test]
    fn test_policy_defaults_and_override() {
        let mut ctx = PipelineExecutionContext::default();
        assert_eq!(ctx.get_policy::<CurrencyPolicy>(), CurrencyPolicy::default());

        ctx.set_policy(CurrencyPolicy {
            code: "USD".to_string(),
        });
        assert_eq!(ctx.get_policy::<CurrencyPolicy>().code, "USD");
        assert!(ctx.try_get_policy::<CurrencyPolicy>().is_some());
    }

    #[test]
    fn test_policy_keys_through_context() {
        let mut ctx = PipelineExecutionContext::default();
        ctx.add_policy_keys(["IgnoreLocalizeEntity"]);
        assert!(ctx.has_policy_key(&PolicyKey::new("ignorelocalizeentity")));

        ctx.remove_policy_keys(["IgnoreLocalizeEntity"]);
        assert!(!ctx.has_policy_key(&PolicyKey::new("IgnoreLocalizeEntity")));
    }

    #[test]
    fn test_fork_clean_strips_policy_keys() {
        let identity = RunIdentity::new().with_shopper_id("shopper-1");
        let mut parent = PipelineExecutionContext::new(identity)
            .with_header("Language", "en-US")
            .with_policy(CurrencyPolicy {
                code: "EUR".to_string(),
            });
        parent.add_policy_keys(["IgnoreSampleData"]);
        parent.add_message(MessageSeverity::Warning, "w", vec![], "warn");
        parent.abort("stop");

        let child = parent.fork_clean();

        assert_eq!(child.header("language"), Some("en-US"));
        assert!(child.header(POLICY_KEYS_HEADER).is_none());
        assert_eq!(child.get_policy::<CurrencyPolicy>().code, "EUR");
        assert!(child.messages().is_empty());
        assert!(!child.is_aborted());
        assert_ne!(
            child.identity().correlation_id,
            parent.identity().correlation_id
        );
        assert_eq!(child.identity().shopper_id.as_deref(), Some("shopper-1"));

        // Parent untouched.
        assert!(parent.header(POLICY_KEYS_HEADER).is_some());
    }

    #[test]
    fn test_try_emit_event_uses_injected_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = PipelineExecutionContext::default().with_event_sink(sink.clone());

        ctx.try_emit_event(EventKind::BlockCompleted, "checkout", Some("a"), None);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block.as_deref(), Some("a"));
        assert_eq!(events[0].correlation_id, ctx.identity().correlation_id);
    }
}
