use crate::error::HubResult;

/// Write one newline-delimited UTF-8 frame.
pub trait HubWriteSock {
    async fn write_frame(&mut self, payload: &str) -> HubResult<()>;
}

/// Read one newline-delimited UTF-8 frame. `None` means the peer closed the
/// channel.
pub trait HubReadSock {
    async fn read_frame(&mut self) -> HubResult<Option<String>>;
}
