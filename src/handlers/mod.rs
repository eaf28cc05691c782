pub mod dispute;
pub mod payment;
pub mod report;

use anyhow::{Error, Result};
use async_trait::async_trait;
use tracing::info;

use crate::models::notification::NotificationItem;

/// A domain handler for gateway notification items.
///
/// Implementations must be safe for concurrent invocation; distinct batches
/// may be dispatched on separate tasks.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this handler claims the item. For a correctly configured
    /// registry at most one handler claims any given item.
    fn can_handle(&self, item: &NotificationItem) -> bool;

    async fn handle(&self, item: &NotificationItem) -> Result<(), Error>;
}

/// Handlers in fixed registration order, established once at composition
/// time. Selection is a linear first-match scan; handler counts are small
/// and fixed, so no keyed registry is kept.
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn NotificationHandler>>,
}

impl HandlerRegistry {
    pub fn new(handlers: Vec<Box<dyn NotificationHandler>>) -> Self {
        info!(handler_count = handlers.len(), "Handler registry composed");

        Self { handlers }
    }

    pub fn select(&self, item: &NotificationItem) -> Option<&dyn NotificationHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.can_handle(item))
            .map(|handler| handler.as_ref())
    }
}

/// The service's standard handler set, in registration order.
pub fn default_handlers() -> Vec<Box<dyn NotificationHandler>> {
    vec![
        Box::new(payment::PaymentLifecycleHandler),
        Box::new(dispute::DisputeHandler),
        Box::new(report::ReportAvailableHandler),
    ]
}
