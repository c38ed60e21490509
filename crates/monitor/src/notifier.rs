use async_trait::async_trait;
use log::{info, warn};
use priceguard_core::{ChangeKind, ChangeSet, ProviderId, UserId};
use priceguard_ports::{FailureSignal, NotifyError, Notifier};

/// Notifier that writes change sets and failures to the log
///
/// Used by the runner when no chat front end is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(
        &self,
        user: UserId,
        provider: ProviderId,
        changes: &ChangeSet,
    ) -> Result<(), NotifyError> {
        let summary = changes.summary();
        info!(
            "[{} / {}] {} new, {} updated, {} ended",
            user, provider, summary.new, summary.updated, summary.ended
        );

        for record in changes.records() {
            let title = record.promotion().map(|p| p.title.as_str()).unwrap_or("");
            match record.kind() {
                ChangeKind::New => info!("  + {} {}", record.promotion_id(), title),
                ChangeKind::Updated => info!(
                    "  ~ {} {} ({})",
                    record.promotion_id(),
                    title,
                    record.changed_fields().join(", ")
                ),
                ChangeKind::Ended => info!("  - {} {}", record.promotion_id(), title),
            }
        }
        Ok(())
    }

    async fn report_failure(
        &self,
        user: UserId,
        provider: ProviderId,
        signal: FailureSignal,
    ) -> Result<(), NotifyError> {
        match signal {
            FailureSignal::CredentialInvalid => {
                warn!("[{} / {}] API keys rejected, new keys required", user, provider)
            }
            FailureSignal::CredentialUnavailable => {
                warn!("[{} / {}] no API keys on file", user, provider)
            }
            FailureSignal::Transient { reason } => {
                warn!("[{} / {}] check failed, will retry later: {}", user, provider, reason)
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new();
        let empty = ChangeSet::new(ProviderId::Ozon, Utc::now(), Vec::new());

        assert!(notifier.deliver(UserId::new(1), ProviderId::Ozon, &empty).await.is_ok());
        assert!(
            notifier
                .report_failure(UserId::new(1), ProviderId::Ozon, FailureSignal::CredentialInvalid)
                .await
                .is_ok()
        );
    }
}
