use super::{HubReadSock, HubWriteSock};
use crate::error::{HubError, HubResult};

use std::time::Duration;
use tokio::{io::BufReader, net::UnixStream, time::sleep};

pub async fn connect_to_socket(
    socket_path: &str,
    max_attempt: u8,
    delay: u64,
) -> HubResult<UnixStream> {
    for attempt in 0..max_attempt {
        if let Ok(stream) = UnixStream::connect(socket_path).await {
            return Ok(stream);
        }
        log::debug!("Try connect: {} | Attempt: {}", socket_path, attempt + 1);
        sleep(Duration::from_millis(delay)).await;
    }

    log::warn!("Failed to connect to socket: {socket_path}");
    Err(HubError::IpcError)
}

/// One-shot request over a fresh connection: write a frame, wait for the
/// single reply frame.
pub async fn send_and_receive(mut stream: UnixStream, payload: &str) -> HubResult<String> {
    stream.write_frame(payload).await?;

    let mut reader = BufReader::new(stream);
    reader
        .read_frame()
        .await?
        .ok_or(HubError::InvalidResponse)
}
