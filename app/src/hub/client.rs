use super::utils::HUB_SOCKET;
use crate::{
    error::{HubError, HubResult},
    ipc::{
        connect_to_socket,
        message::{OutboundMessage, SessionHello},
        send_and_receive, HubReadSock, HubWriteSock,
    },
    opts::{ClientOpts, ServerCommand},
};

use tokio::io::BufReader;

/// Fire one operator command at the daemon and print its reply.
pub async fn send_command(command: &ServerCommand) -> HubResult<()> {
    let stream = connect_to_socket(&HUB_SOCKET, 3, 100)
        .await
        .map_err(|_| HubError::NoDaemon)?;

    log::info!("Send command to server: {command}");

    let response = send_and_receive(stream, &serde_json::to_string(command)?).await?;
    println!("{response}");

    Ok(())
}

/// Companion client: join the hub as a regular session and print what it
/// sends. `fib` additionally requests one computation and exits once the
/// answer (or a validation error) arrives.
pub async fn start_client(action: &ClientOpts) -> HubResult<()> {
    let stream = connect_to_socket(&HUB_SOCKET, 3, 100)
        .await
        .map_err(|_| HubError::NoDaemon)?;
    let (read_half, mut write_half) = stream.into_split();

    write_half
        .write_frame(&serde_json::to_string(&SessionHello::new())?)
        .await?;

    let one_shot = if let ClientOpts::Fib { n } = action {
        let request = serde_json::json!({ "type": "fibonacci", "input": n });
        write_half.write_frame(&request.to_string()).await?;
        true
    } else {
        false
    };

    let mut reader = BufReader::new(read_half);
    while let Some(frame) = reader.read_frame().await? {
        let message: OutboundMessage = match serde_json::from_str(&frame) {
            Ok(message) => message,
            Err(_) => {
                println!("{frame}");
                continue;
            }
        };

        println!("{}", render(&message));

        if one_shot
            && matches!(
                message,
                OutboundMessage::Fibonacci { .. } | OutboundMessage::Error { .. }
            )
        {
            break;
        }
    }

    Ok(())
}

fn render(message: &OutboundMessage) -> String {
    match message {
        OutboundMessage::Welcome { message, .. } => format!("Server: {message}"),
        OutboundMessage::Fibonacci { input, result } => format!("Fibonacci({input}) = {result}"),
        OutboundMessage::Error { message } => format!("Server error: {message}"),
        OutboundMessage::Echo { message } => format!("Echo: {message}"),
        OutboundMessage::Datetime { datetime } => format!("Server time: {datetime}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_covers_every_kind() {
        let lines = [
            render(&OutboundMessage::welcome("user_3")),
            render(&OutboundMessage::Fibonacci {
                input: 10,
                result: 55,
            }),
            render(&OutboundMessage::error("nope")),
            render(&OutboundMessage::Echo {
                message: json!({"type": "chat"}),
            }),
            render(&OutboundMessage::Datetime {
                datetime: "01/01/2026 00:00:00".into(),
            }),
        ];

        assert_eq!(lines[0], "Server: Welcome! You are user_3");
        assert_eq!(lines[1], "Fibonacci(10) = 55");
        assert_eq!(lines[2], "Server error: nope");
        assert!(lines[3].starts_with("Echo: "));
        assert_eq!(lines[4], "Server time: 01/01/2026 00:00:00");
    }
}
