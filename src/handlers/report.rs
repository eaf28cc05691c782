use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::info;

use crate::handlers::NotificationHandler;
use crate::models::notification::NotificationItem;

/// Announces gateway-generated reports. The gateway delivers the download
/// location in the reason field.
pub struct ReportAvailableHandler;

#[async_trait]
impl NotificationHandler for ReportAvailableHandler {
    fn name(&self) -> &'static str {
        "report_available"
    }

    fn can_handle(&self, item: &NotificationItem) -> bool {
        item.event_code == "REPORT_AVAILABLE"
    }

    async fn handle(&self, item: &NotificationItem) -> Result<(), Error> {
        let Some(location) = item.reason.as_deref() else {
            return Err(anyhow!(
                "Report notification {} carries no download location",
                item.psp_reference
            ));
        };

        info!(
            psp_reference = %item.psp_reference,
            merchant_account_code = %item.merchant_account_code,
            location,
            "Gateway report available"
        );

        Ok(())
    }
}
