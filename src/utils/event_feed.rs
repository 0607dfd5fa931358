use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::model::OrgId;
use crate::service::notification::NotificationPort;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DomainEvent {
    pub seq: u64,
    #[schema(example = "salary_update")]
    pub event: String,
    #[schema(value_type = Object)]
    pub payload: Value,
    #[schema(example = "2026-01-31T18:00:00Z", format = "date-time", value_type = String)]
    pub published_at: DateTime<Utc>,
}

/// Expiring, process-scoped buffer of recent domain events per organization.
///
/// Shared through `web::Data`; entries fall out after the TTL or once the
/// capacity is exceeded.
pub struct EventFeed {
    seq: AtomicU64,
    events: Cache<(OrgId, u64), DomainEvent>,
}

impl EventFeed {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            seq: AtomicU64::new(0),
            events: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Newest first, at most `limit` events.
    pub fn recent(&self, org: OrgId, limit: usize) -> Vec<DomainEvent> {
        let mut events: Vec<DomainEvent> = self
            .events
            .iter()
            .filter(|(key, _)| key.0 == org)
            .map(|(_, event)| event)
            .collect();
        events.sort_by(|a, b| b.seq.cmp(&a.seq));
        events.truncate(limit);
        events
    }
}

#[async_trait]
impl NotificationPort for EventFeed {
    async fn publish(&self, org: OrgId, event: &str, payload: Value) -> anyhow::Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.events
            .insert(
                (org, seq),
                DomainEvent {
                    seq,
                    event: event.to_string(),
                    payload,
                    published_at: Utc::now(),
                },
            )
            .await;
        tracing::debug!(org, seq, event, "Domain event published");
        Ok(())
    }
}
