use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::model::OrgId;

pub const ATTENDANCE_UPDATE: &str = "attendance_update";
pub const ADVANCE_UPDATE: &str = "advance_update";
pub const SALARY_UPDATE: &str = "salary_update";

/// Receiver of domain events for real-time broadcast.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, org: OrgId, event: &str, payload: Value) -> anyhow::Result<()>;
}

/// Publishes on a detached task. A slow or failing port is logged and never
/// holds up the caller.
pub fn publish_best_effort(port: Arc<dyn NotificationPort>, org: OrgId, event: &'static str, payload: Value) {
    actix_web::rt::spawn(async move {
        if let Err(e) = port.publish(org, event, payload).await {
            warn!(error = %e, org, event, "Notification publish failed");
        }
    });
}
