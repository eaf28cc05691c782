use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// Outcome recorded on a single notification item after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemDisposition {
    Handled,
    Failed,
    Unmatched,
}

/// Batch-level acknowledgment sent back to the gateway. The gateway reads
/// the wire token, not the HTTP status, to decide whether to resend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Accepted,
    Error,
}

impl Acknowledgement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acknowledgement::Accepted => "[accepted]",
            Acknowledgement::Error => "error",
        }
    }
}

impl Display for ItemDisposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ItemDisposition::Handled => write!(f, "handled"),
            ItemDisposition::Failed => write!(f, "failed"),
            ItemDisposition::Unmatched => write!(f, "unmatched"),
        }
    }
}

impl Display for Acknowledgement {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}
