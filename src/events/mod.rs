use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Coupon lifecycle events published after the store has been updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Validation found the coupon past its expiry and marked it expired.
    CouponExpired { code: String },
    /// `from_orders` lists every order that lost the coupon, including
    /// holders released during validation.
    CouponTransferred {
        coupon_id: i32,
        from_orders: Vec<i32>,
        to_order: Option<i32>,
    },
    CouponApplied { coupon_id: i32, order_id: i32 },
}

/// Drains `rx`, recording each event in the log.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::CouponExpired { code } => info!("Coupon {} expired", code),
            Event::CouponTransferred {
                coupon_id,
                from_orders,
                to_order,
            } => info!(
                coupon_id,
                ?from_orders,
                ?to_order,
                "Coupon transferred"
            ),
            Event::CouponApplied {
                coupon_id,
                order_id,
            } => info!(coupon_id, order_id, "Coupon applied"),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::CouponApplied {
                coupon_id: 1,
                order_id: 2,
            })
            .await
            .unwrap();
        assert_eq!(
            rx.recv().await,
            Some(Event::CouponApplied {
                coupon_id: 1,
                order_id: 2
            })
        );
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let err = sender
            .send(Event::CouponExpired {
                code: "ABCT-123F-XYQV".into(),
            })
            .await
            .unwrap_err();
        assert!(err.starts_with("Failed to send event"));
    }
}
