use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::handlers::NotificationHandler;
use crate::models::notification::NotificationItem;

const PAYMENT_EVENTS: [&str; 4] = ["AUTHORISATION", "CAPTURE", "CANCELLATION", "REFUND"];

/// Routes payment lifecycle outcomes into the billing domain.
pub struct PaymentLifecycleHandler;

#[async_trait]
impl NotificationHandler for PaymentLifecycleHandler {
    fn name(&self) -> &'static str {
        "payment_lifecycle"
    }

    fn can_handle(&self, item: &NotificationItem) -> bool {
        PAYMENT_EVENTS.contains(&item.event_code.as_str())
    }

    async fn handle(&self, item: &NotificationItem) -> Result<(), Error> {
        // A refund is meaningless without the payment it refunds.
        if item.event_code == "REFUND" && item.original_reference.is_none() {
            return Err(anyhow!(
                "Refund notification {} does not reference the refunded payment",
                item.psp_reference
            ));
        }

        if item.success {
            info!(
                event_code = %item.event_code,
                psp_reference = %item.psp_reference,
                merchant_reference = %item.merchant_reference,
                merchant_account_code = %item.merchant_account_code,
                "Payment state advanced"
            );
        } else {
            warn!(
                event_code = %item.event_code,
                psp_reference = %item.psp_reference,
                merchant_reference = %item.merchant_reference,
                reason = item.reason.as_deref().unwrap_or("unspecified"),
                "Gateway refused payment operation"
            );
        }

        Ok(())
    }
}
