use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One asynchronous event pushed by the payment gateway. Immutable once
/// parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItem {
    pub event_code: String,
    pub psp_reference: String,
    pub original_reference: Option<String>,
    pub success: bool,
    pub reason: Option<String>,
    pub merchant_reference: String,
    pub merchant_account_code: String,

    #[serde(default)]
    pub additional_data: HashMap<String, String>,
}
