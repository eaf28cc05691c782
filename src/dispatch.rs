use std::time::Instant;

use tracing::{info, warn};

use crate::handlers::HandlerRegistry;
use crate::models::audit::AuditRecord;
use crate::models::notification::NotificationItem;
use crate::models::status::{Acknowledgement, ItemDisposition};
use crate::wire::parse_notification_batch;

/// Wire-level outcome plus the per-item audit trail for one inbound batch.
#[derive(Debug)]
pub struct DispatchReport {
    pub acknowledgement: Acknowledgement,
    pub records: Vec<AuditRecord>,
}

/// Drives parsing, per-item handler selection, fault isolation and audit
/// logging for inbound notification batches.
///
/// The gateway retries at the envelope level, so once a batch parses it is
/// acknowledged unconditionally; individual item failures are a domain
/// concern, recorded in the audit trail and never surfaced on the wire.
pub struct NotificationDispatcher {
    registry: HandlerRegistry,
}

impl NotificationDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub async fn dispatch(&self, raw: &str) -> DispatchReport {
        let items = match parse_notification_batch(raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Rejecting notification batch that failed to parse");

                return DispatchReport {
                    acknowledgement: Acknowledgement::Error,
                    records: Vec::new(),
                };
            }
        };

        info!(item_count = items.len(), "Processing notification batch");

        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            records.push(self.process_item(item).await);
        }

        DispatchReport {
            acknowledgement: Acknowledgement::Accepted,
            records,
        }
    }

    async fn process_item(&self, item: &NotificationItem) -> AuditRecord {
        let started = Instant::now();

        let record = match self.registry.select(item) {
            None => {
                warn!(
                    event_code = %item.event_code,
                    psp_reference = %item.psp_reference,
                    "No handler claims notification item"
                );

                AuditRecord::new(item, ItemDisposition::Unmatched)
            }
            Some(handler) => match handler.handle(item).await {
                Ok(()) => AuditRecord::new(item, ItemDisposition::Handled),
                Err(e) => {
                    warn!(
                        handler = handler.name(),
                        event_code = %item.event_code,
                        psp_reference = %item.psp_reference,
                        error = %e,
                        "Handler failed on notification item"
                    );

                    AuditRecord::new(item, ItemDisposition::Failed).with_error(e.to_string())
                }
            },
        };

        let record = record.with_elapsed(started.elapsed().as_millis() as u64);

        info!(
            event_code = %record.event_code,
            psp_reference = %record.psp_reference,
            original_reference = record.original_reference.as_deref().unwrap_or(""),
            success = record.success,
            reason = record.reason.as_deref().unwrap_or(""),
            merchant_reference = %record.merchant_reference,
            merchant_account_code = %record.merchant_account_code,
            disposition = %record.disposition,
            errored = record.error_message.is_some(),
            elapsed_ms = record.elapsed_ms,
            "Notification item audited"
        );

        record
    }
}
