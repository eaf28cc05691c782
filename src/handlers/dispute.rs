use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::warn;

use crate::handlers::NotificationHandler;
use crate::models::notification::NotificationItem;

const DISPUTE_EVENTS: [&str; 4] = [
    "CHARGEBACK",
    "CHARGEBACK_REVERSED",
    "NOTIFICATION_OF_CHARGEBACK",
    "REQUEST_FOR_INFORMATION",
];

/// Routes chargeback and dispute events into the billing domain. Every
/// dispute stage always warrants operator attention, so these are logged at
/// warn level whatever the success flag says.
pub struct DisputeHandler;

#[async_trait]
impl NotificationHandler for DisputeHandler {
    fn name(&self) -> &'static str {
        "dispute"
    }

    fn can_handle(&self, item: &NotificationItem) -> bool {
        DISPUTE_EVENTS.contains(&item.event_code.as_str())
    }

    async fn handle(&self, item: &NotificationItem) -> Result<(), Error> {
        let Some(disputed_payment) = item.original_reference.as_deref() else {
            return Err(anyhow!(
                "Dispute notification {} does not reference the disputed payment",
                item.psp_reference
            ));
        };

        warn!(
            event_code = %item.event_code,
            psp_reference = %item.psp_reference,
            disputed_payment,
            merchant_reference = %item.merchant_reference,
            merchant_account_code = %item.merchant_account_code,
            reason = item.reason.as_deref().unwrap_or("unspecified"),
            "Dispute stage recorded"
        );

        Ok(())
    }
}
