//! Phoenix channel frames: `{topic, event, payload, ref}`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::live::LiveMessage;

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const HEARTBEAT_TOPIC: &str = "phoenix";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    fn control(topic: &str, event: &str, reference: u64) -> Self {
        Self {
            topic: topic.to_string(),
            event: event.to_string(),
            payload: Value::Object(Map::new()),
            reference: Some(reference.to_string()),
        }
    }

    pub fn join(topic: &str, reference: u64) -> Self {
        Self::control(topic, EVENT_JOIN, reference)
    }

    pub fn leave(topic: &str, reference: u64) -> Self {
        Self::control(topic, EVENT_LEAVE, reference)
    }

    pub fn heartbeat(reference: u64) -> Self {
        Self::control(HEARTBEAT_TOPIC, EVENT_HEARTBEAT, reference)
    }
}

/// What an inbound frame on the joined topic means for the page
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Live(LiveMessage),
    JoinRejected(String),
    Closed,
    Ignore,
}

pub fn classify(frame: Frame) -> Inbound {
    match frame.event.as_str() {
        EVENT_REPLY => classify_reply(frame.payload),
        EVENT_CLOSE | EVENT_ERROR => Inbound::Closed,
        _ => match frame.payload {
            Value::Object(fields) if !fields.is_empty() => Inbound::Live(LiveMessage::Partial(fields)),
            _ => Inbound::Ignore,
        },
    }
}

fn classify_reply(payload: Value) -> Inbound {
    let status = payload.get("status").and_then(Value::as_str).unwrap_or_default();
    if status != "ok" {
        let reason = payload
            .get("response")
            .and_then(|r| r.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or(status);
        return Inbound::JoinRejected(reason.to_string());
    }
    match payload.get("response") {
        Some(Value::Object(fields)) if !fields.is_empty() => {
            Inbound::Live(LiveMessage::Snapshot(fields.clone()))
        }
        _ => Inbound::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: Value) -> Frame {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_join_frame_shape() {
        let encoded = serde_json::to_value(Frame::join("blocks:42", 1)).unwrap();
        assert_eq!(
            encoded,
            json!({"topic": "blocks:42", "event": "phx_join", "payload": {}, "ref": "1"})
        );
        assert_eq!(Frame::heartbeat(7).topic, "phoenix");
    }

    #[test]
    fn test_join_reply_is_snapshot() {
        let inbound = classify(frame(json!({
            "topic": "blocks:42",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {"number": 42, "finalize_state": "committed"}},
            "ref": "1"
        })));
        match inbound {
            Inbound::Live(LiveMessage::Snapshot(fields)) => {
                assert_eq!(fields.get("number"), Some(&json!(42)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_reply_is_ignored() {
        let inbound = classify(frame(json!({
            "topic": "blocks:42",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {}},
            "ref": "2"
        })));
        assert_eq!(inbound, Inbound::Ignore);
    }

    #[test]
    fn test_rejected_join() {
        let inbound = classify(frame(json!({
            "topic": "blocks:42",
            "event": "phx_reply",
            "payload": {"status": "error", "response": {"reason": "unmatched topic"}},
            "ref": "1"
        })));
        assert_eq!(inbound, Inbound::JoinRejected("unmatched topic".into()));
    }

    #[test]
    fn test_push_is_partial() {
        let inbound = classify(frame(json!({
            "topic": "blocks:42",
            "event": "refresh",
            "payload": {"finalize_state": "finalized"},
            "ref": null
        })));
        assert!(matches!(inbound, Inbound::Live(LiveMessage::Partial(_))));
        assert_eq!(
            classify(frame(json!({"topic": "blocks:42", "event": "phx_close", "payload": {}}))),
            Inbound::Closed
        );
    }
}
