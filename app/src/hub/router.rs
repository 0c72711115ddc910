use crate::{
    error::HubResult,
    handlers::{self, MAX_FIBONACCI_INPUT},
    ipc::message::{InboundMessage, OutboundMessage},
};

/// Turn one inbound frame into the reply for its sender. Pure; the caller
/// owns delivery. `ParseError` means no reply at all: malformed frames are
/// dropped on purpose so garbage never starts a reply loop.
pub fn dispatch(raw: &str) -> HubResult<OutboundMessage> {
    let reply = match InboundMessage::parse(raw)? {
        InboundMessage::Fibonacci { input } => {
            if input < 0 {
                OutboundMessage::error("Please send only positive numbers")
            } else {
                match handlers::fibonacci(input as u64) {
                    Some(result) => OutboundMessage::Fibonacci { input, result },
                    None => OutboundMessage::error(format!(
                        "Fibonacci input must be at most {MAX_FIBONACCI_INPUT}"
                    )),
                }
            }
        }
        InboundMessage::Other(value) => OutboundMessage::Echo { message: value },
    };

    Ok(reply)
}
