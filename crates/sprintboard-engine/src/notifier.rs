use async_trait::async_trait;
use sprintboard_core::SprintboardResult;
use sprintboard_domain::SprintEvent;

/// Outbound notification channel for committed sprint events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &SprintEvent) -> SprintboardResult<()>;
}

/// Notifier that only writes events to the log
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, event: &SprintEvent) -> SprintboardResult<()> {
        tracing::info!(
            sprint_id = %event.sprint_id(),
            recipients = event.recipients().len(),
            "{}: {}",
            event.kind(),
            event.message()
        );
        Ok(())
    }
}

/// Deliver events in order. Failures are logged and never propagated; the
/// unit of work that raised them has already committed.
pub async fn dispatch_events(notifier: &dyn Notifier, events: &[SprintEvent]) {
    for event in events {
        if let Err(e) = notifier.notify(event).await {
            tracing::warn!(
                "Failed to deliver {} for sprint {}: {}",
                event.kind(),
                event.sprint_id(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintboard_core::SprintboardError;
    use uuid::Uuid;

    fn published() -> SprintEvent {
        SprintEvent::Published {
            project_id: Uuid::new_v4(),
            sprint_id: Uuid::new_v4(),
            sprint_name: "Sprint 1".to_string(),
            recipients: vec![Uuid::new_v4()],
            locale: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_later_events() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(2)
            .returning(|_| Err(SprintboardError::Internal("mail relay down".into())));

        dispatch_events(&notifier, &[published(), published()]).await;
    }

    #[tokio::test]
    async fn test_logging_notifier_accepts_everything() {
        assert!(LoggingNotifier.notify(&published()).await.is_ok());
    }
}
