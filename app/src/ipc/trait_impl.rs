use super::{HubReadSock, HubWriteSock};
use crate::error::HubResult;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        unix::{OwnedReadHalf, OwnedWriteHalf},
        UnixStream,
    },
};

impl HubWriteSock for UnixStream {
    async fn write_frame(&mut self, payload: &str) -> HubResult<()> {
        self.write_all(payload.as_bytes()).await?;
        self.write_all(b"\n").await?;
        self.flush().await?;
        log::debug!("{} bytes were written.", payload.len() + 1);
        Ok(())
    }
}

impl HubWriteSock for OwnedWriteHalf {
    async fn write_frame(&mut self, payload: &str) -> HubResult<()> {
        self.write_all(payload.as_bytes()).await?;
        self.write_all(b"\n").await?;
        self.flush().await?;
        log::debug!("{} bytes were written.", payload.len() + 1);
        Ok(())
    }
}

impl HubReadSock for BufReader<OwnedReadHalf> {
    async fn read_frame(&mut self) -> HubResult<Option<String>> {
        read_trimmed_line(self).await
    }
}

impl HubReadSock for BufReader<UnixStream> {
    async fn read_frame(&mut self) -> HubResult<Option<String>> {
        read_trimmed_line(self).await
    }
}

async fn read_trimmed_line<R>(reader: &mut R) -> HubResult<Option<String>>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }

    Ok(Some(line))
}
