use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{notification::NotificationItem, status::ItemDisposition};

/// One audit record per processed notification item, whatever the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub event_code: String,
    pub psp_reference: String,
    pub original_reference: Option<String>,
    pub success: bool,
    pub reason: Option<String>,
    pub merchant_reference: String,
    pub merchant_account_code: String,
    pub disposition: ItemDisposition,
    pub error_message: Option<String>,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(item: &NotificationItem, disposition: ItemDisposition) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_code: item.event_code.clone(),
            psp_reference: item.psp_reference.clone(),
            original_reference: item.original_reference.clone(),
            success: item.success,
            reason: item.reason.clone(),
            merchant_reference: item.merchant_reference.clone(),
            merchant_account_code: item.merchant_account_code.clone(),
            disposition,
            error_message: None,
            elapsed_ms: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error_message = Some(error);
        self
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }
}
