use super::registry::Registry;
use crate::ipc::message::OutboundMessage;

use chrono::Local;
use std::{sync::Arc, time::Duration};
use tokio::time::interval;

const BROADCAST_INTERVAL: Duration = Duration::from_secs(1);
const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Push the current local time to every connection, once per second, for
/// the whole process lifetime. Delivery failures are already isolated by
/// the registry; anything else is logged and the cadence continues.
pub async fn start_datetime_broadcaster(registry: Arc<Registry>) {
    log::info!("Start datetime broadcaster");

    let mut ticker = interval(BROADCAST_INTERVAL);
    loop {
        ticker.tick().await;

        let message = OutboundMessage::Datetime {
            datetime: Local::now().format(DATETIME_FORMAT).to_string(),
        };

        match registry.broadcast(&message).await {
            Ok(delivered) if delivered > 0 => log::debug!("Datetime sent to {delivered} clients"),
            Ok(_) => {}
            Err(e) => log::error!("Datetime broadcast failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::{sync::mpsc, time::timeout};

    #[tokio::test]
    async fn registered_client_receives_a_datetime_frame() {
        let registry = Arc::new(Registry::new());
        let (sink, mut rx) = mpsc::unbounded_channel();
        registry.register(sink).await;

        let task = tokio::spawn(start_datetime_broadcaster(registry.clone()));

        let frame = timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("no broadcast within 3s")
            .unwrap();
        task.abort();

        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "datetime");
        assert!(value["datetime"].is_string());
    }

    #[tokio::test]
    async fn broadcaster_survives_a_dead_recipient() {
        let registry = Arc::new(Registry::new());
        let (dead_sink, dead_rx) = mpsc::unbounded_channel();
        let (live_sink, mut live_rx) = mpsc::unbounded_channel();
        registry.register(dead_sink).await;
        registry.register(live_sink).await;
        drop(dead_rx);

        let task = tokio::spawn(start_datetime_broadcaster(registry.clone()));

        // The live client keeps receiving across several ticks.
        for _ in 0..2 {
            timeout(Duration::from_secs(3), live_rx.recv())
                .await
                .expect("cadence stopped")
                .unwrap();
        }
        task.abort();

        assert_eq!(registry.count(), 1);
    }
}
