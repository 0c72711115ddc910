use super::{
    audit::AuditLog,
    broadcaster::start_datetime_broadcaster,
    registry::Registry,
    router,
    utils::{ping_daemon, AUDIT_DB, HUB_SOCKET},
};
use crate::{
    error::{HubError, HubResult},
    ipc::{
        message::{OutboundMessage, SessionHello},
        HubReadSock, HubWriteSock,
    },
    opts::ServerCommand,
};

use chrono::Local;
use std::{fs, sync::Arc, time::Duration};
use tokio::{
    io::BufReader,
    net::{
        unix::{OwnedReadHalf, OwnedWriteHalf},
        UnixListener, UnixStream,
    },
    sync::mpsc,
    time::sleep,
};

pub async fn start_server() -> HubResult<()> {
    if ping_daemon().await.is_ok() {
        return Err(HubError::DaemonRunning);
    }

    if fs::metadata(HUB_SOCKET.as_str()).is_ok() {
        fs::remove_file(HUB_SOCKET.as_str())?;
        log::debug!("Removed: {}", HUB_SOCKET.as_str());
    }

    let registry = match AuditLog::open(AUDIT_DB.as_str()).await {
        Ok(audit) => Registry::with_audit(audit),
        Err(e) => {
            log::warn!("Audit log unavailable, running without it: {e}");
            Registry::new()
        }
    };

    log::info!("---------- START SOCKHUB DAEMON ----------");

    run_server(HUB_SOCKET.as_str(), Arc::new(registry)).await
}

/// Bind, start the broadcaster, then accept forever. Split from
/// `start_server` so the daemon plumbing (stale socket, audit log, ping
/// check) stays out of the way of integration tests.
pub async fn run_server(socket_path: &str, registry: Arc<Registry>) -> HubResult<()> {
    log::info!("Try to bind on socket: {socket_path}");
    let listener = UnixListener::bind(socket_path)?;
    log::info!("Success");

    tokio::spawn(start_datetime_broadcaster(registry.clone()));

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(handle_connection(stream, registry.clone()));
    }
    Ok(())
}

/// The first frame decides what a connection is: an operator command is
/// answered and the connection closed, a session hello starts a client
/// session. Anything else gets dropped.
async fn handle_connection(stream: UnixStream, registry: Arc<Registry>) -> HubResult<()> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let first_frame = reader.read_frame().await?.ok_or(HubError::InvalidMessage)?;
    log::debug!("First frame from client: {first_frame}");

    if let Some(command) = serde_json::from_str(&first_frame).unwrap_or(None) {
        return process_server_command(write_half, command, &registry).await;
    }

    if let Some(hello) = serde_json::from_str::<Option<SessionHello>>(&first_frame).unwrap_or(None)
    {
        return run_session(reader, write_half, hello, registry).await;
    }

    log::warn!("Dropping connection with unrecognized first frame");
    Err(HubError::InvalidMessage)
}

async fn process_server_command(
    mut write_half: OwnedWriteHalf,
    command: ServerCommand,
    registry: &Registry,
) -> HubResult<()> {
    match command {
        ServerCommand::Ping => {
            write_half.write_frame("Pong").await?;
        }
        ServerCommand::Kill => {
            let shutdown_message = "Server is shutting down...";
            log::info!("{shutdown_message}");
            write_half.write_frame(shutdown_message).await?;
            sleep(Duration::from_millis(100)).await;
            std::process::exit(0);
        }
        ServerCommand::Status => {
            let status = serde_json::json!({
                "status": "ok",
                "clients_online": registry.count(),
                "timestamp": Local::now().to_rfc3339(),
            });
            write_half.write_frame(&status.to_string()).await?;
        }
    }
    Ok(())
}

/// One client session: register, greet, route frames until the peer goes
/// away, unregister. Outbound traffic runs through a dedicated writer task
/// so a slow socket never stalls the registry.
async fn run_session(
    mut reader: BufReader<OwnedReadHalf>,
    write_half: OwnedWriteHalf,
    hello: SessionHello,
    registry: Arc<Registry>,
) -> HubResult<()> {
    let (sink, outbox) = mpsc::unbounded_channel();
    tokio::spawn(drain_outbox(write_half, outbox));

    let id = registry.register(sink).await;
    log::info!("Client pid {} connected as {}", hello.process_id, id);

    if let Err(e) = registry.send_to(&id, &OutboundMessage::welcome(&id)).await {
        log::warn!("Failed to greet {id}: {e}");
    }

    loop {
        let frame = match reader.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                log::debug!("Read error from {id}: {e}");
                break;
            }
        };

        match router::dispatch(&frame) {
            Ok(reply) => {
                if let Err(e) = registry.send_to(&id, &reply).await {
                    log::debug!("Reply to {id} failed: {e}");
                    break;
                }
            }
            Err(e) => log::debug!("Dropped frame from {id}: {e}"),
        }
    }

    registry.unregister(&id).await;
    log::info!("Client {id} disconnected.");

    Ok(())
}

async fn drain_outbox(mut write_half: OwnedWriteHalf, mut outbox: mpsc::UnboundedReceiver<String>) {
    while let Some(payload) = outbox.recv().await {
        if let Err(e) = write_half.write_frame(&payload).await {
            log::debug!("Writer closed: {e}");
            break;
        }
    }
}
