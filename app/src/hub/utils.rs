use crate::{
    error::{HubError, HubResult},
    ipc::{connect_to_socket, send_and_receive},
    opts::ServerCommand,
};

use once_cell::sync::Lazy;
use std::env;

pub static HUB_SOCKET: Lazy<String> = Lazy::new(|| {
    env::var("SOCKHUB_SOCKET").unwrap_or_else(|_| {
        env::var("XDG_RUNTIME_DIR")
            .map(|value| format!("{value}/sockhub.sock"))
            .unwrap_or_else(|_| "/tmp/sockhub.sock".to_string())
    })
});

pub static AUDIT_DB: Lazy<String> = Lazy::new(|| {
    env::var("SOCKHUB_AUDIT_DB").unwrap_or_else(|_| "/tmp/sockhub.db".to_string())
});

pub(super) async fn ping_daemon() -> HubResult<()> {
    if std::fs::metadata(HUB_SOCKET.as_str()).is_err() {
        log::info!("Server is not running");
        return Err(HubError::NoDaemon);
    }

    let stream = connect_to_socket(&HUB_SOCKET, 3, 100)
        .await
        .map_err(|_| HubError::NoDaemon)?;

    let response = send_and_receive(stream, &serde_json::to_string(&ServerCommand::Ping)?).await?;
    if response != "Pong" {
        return Err(HubError::InvalidResponse);
    }

    log::info!("Response from server: {response}");

    Ok(())
}
