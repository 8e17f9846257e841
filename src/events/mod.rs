//! Domain event bus
//!
//! The engines publish events here; delivery to external consumers is out of
//! scope, so the only built-in subscriber is a logging relay installed at
//! startup. The bus is created once in main and injected into the services
//! that emit.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::FundingSource;

/// Events emitted by the core engines
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type")]
pub enum DomainEvent {
    SaleSettled {
        payment_id: Uuid,
        seller_id: Uuid,
        plan_id: Uuid,
        quantity: i32,
        total: i64,
    },
    WalletFunded {
        transaction_id: Uuid,
        seller_id: Uuid,
        amount: i64,
        source: FundingSource,
    },
    FundingReversed {
        transaction_id: Uuid,
        seller_id: Uuid,
        amount: i64,
    },
    AccountDeactivated {
        account_id: Uuid,
    },
    HoldsReaped {
        units_released: u64,
        locks_cleared: u64,
    },
}

/// Broadcast channel for domain events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { tx }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DomainEvent) {
        // send only fails when nobody is subscribed
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No event subscribers: {}", e);
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that logs every domain event
pub async fn event_relay(bus: EventBus) {
    tracing::info!("Starting event relay");

    let mut rx = bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(event = %json, "Domain event"),
                Err(e) => tracing::error!("Failed to serialize domain event: {}", e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event relay lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, relay exiting");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let account_id = Uuid::new_v4();
        bus.publish(DomainEvent::AccountDeactivated { account_id });

        match rx.recv().await.unwrap() {
            DomainEvent::AccountDeactivated { account_id: got } => {
                assert_eq!(got, account_id);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(DomainEvent::HoldsReaped {
            units_released: 3,
            locks_cleared: 1,
        });
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DomainEvent::WalletFunded {
            transaction_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            amount: 500,
            source: FundingSource::Provider,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"WalletFunded\""));
        assert!(json.contains("\"amount\":500"));
    }
}
