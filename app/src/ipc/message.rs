use crate::error::{HubError, HubResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process;

/// First frame of a client session. Anything else on a fresh connection is
/// either an operator command or gets the connection dropped.
#[derive(Debug, Deserialize, Serialize)]
pub struct SessionHello {
    pub process_id: u32,
}

impl SessionHello {
    pub fn new() -> Self {
        SessionHello {
            process_id: process::id(),
        }
    }
}

impl Default for SessionHello {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed request frame. Only `fibonacci` is dispatched to a handler;
/// every other JSON object is kept whole for echoing.
#[derive(Debug, PartialEq)]
pub enum InboundMessage {
    Fibonacci { input: i64 },
    Other(Value),
}

impl InboundMessage {
    /// Parse a raw frame. Anything that is not a JSON object is a
    /// `ParseError`; a missing or non-integer `input` defaults to 0.
    pub fn parse(raw: &str) -> HubResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|_| HubError::ParseError)?;
        if !value.is_object() {
            return Err(HubError::ParseError);
        }

        match value.get("type").and_then(Value::as_str) {
            Some("fibonacci") => Ok(InboundMessage::Fibonacci {
                input: value.get("input").and_then(Value::as_i64).unwrap_or(0),
            }),
            _ => Ok(InboundMessage::Other(value)),
        }
    }
}

/// Every frame the hub sends. The `type` tag is the stable discriminator
/// clients key on.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Welcome { message: String, client_id: String },
    Fibonacci { input: i64, result: u64 },
    Error { message: String },
    Echo { message: Value },
    Datetime { datetime: String },
}

impl OutboundMessage {
    pub fn welcome(client_id: &str) -> Self {
        OutboundMessage::Welcome {
            message: format!("Welcome! You are {client_id}"),
            client_id: client_id.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_fibonacci_request() {
        let message = InboundMessage::parse(r#"{"type": "fibonacci", "input": 10}"#).unwrap();
        assert_eq!(message, InboundMessage::Fibonacci { input: 10 });
    }

    #[test]
    fn parse_fibonacci_without_input_defaults_to_zero() {
        let message = InboundMessage::parse(r#"{"type": "fibonacci"}"#).unwrap();
        assert_eq!(message, InboundMessage::Fibonacci { input: 0 });
    }

    #[test]
    fn parse_unknown_kind_keeps_payload() {
        let message = InboundMessage::parse(r#"{"type": "chat", "text": "hi"}"#).unwrap();
        assert_eq!(
            message,
            InboundMessage::Other(json!({"type": "chat", "text": "hi"}))
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            InboundMessage::parse("not json at all"),
            Err(HubError::ParseError)
        ));
    }

    #[test]
    fn parse_rejects_non_object_json() {
        assert!(matches!(
            InboundMessage::parse("[1, 2, 3]"),
            Err(HubError::ParseError)
        ));
        assert!(matches!(
            InboundMessage::parse("42"),
            Err(HubError::ParseError)
        ));
    }

    #[test]
    fn outbound_tags_are_stable() {
        let cases = [
            (
                serde_json::to_value(OutboundMessage::welcome("user_1")).unwrap(),
                "welcome",
            ),
            (
                serde_json::to_value(OutboundMessage::Fibonacci {
                    input: 10,
                    result: 55,
                })
                .unwrap(),
                "fibonacci",
            ),
            (
                serde_json::to_value(OutboundMessage::error("nope")).unwrap(),
                "error",
            ),
            (
                serde_json::to_value(OutboundMessage::Echo {
                    message: json!({"a": 1}),
                })
                .unwrap(),
                "echo",
            ),
            (
                serde_json::to_value(OutboundMessage::Datetime {
                    datetime: "01/01/2026 00:00:00".into(),
                })
                .unwrap(),
                "datetime",
            ),
        ];

        for (value, tag) in cases {
            assert_eq!(value["type"], tag);
        }
    }

    #[test]
    fn welcome_carries_the_client_id() {
        let value = serde_json::to_value(OutboundMessage::welcome("user_7")).unwrap();
        assert_eq!(value["client_id"], "user_7");
        assert_eq!(value["message"], "Welcome! You are user_7");
    }
}
