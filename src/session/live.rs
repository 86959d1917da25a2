//! Live patch receiver: typed channel messages and the reducer that applies them

use crate::domain::{EntityState, Fields, PageKind};

use super::store::ViewState;

/// A message pushed on an entity channel
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    /// Complete replacement of the entity fields
    Snapshot(Fields),
    /// Subset of fields; nulls mean "not part of this update"
    Partial(Fields),
}

/// Apply one message to the view state. Last write wins per field.
pub fn reduce(state: &mut ViewState, message: LiveMessage) {
    match message {
        LiveMessage::Snapshot(fields) => state.replace(fields),
        LiveMessage::Partial(fields) => {
            let present: Fields = fields.into_iter().filter(|(_, v)| !v.is_null()).collect();
            state.apply_partial(&present);
        }
    }
}

/// Channel topic prefixes per entity kind. `None` disables live updates for that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPrefixes {
    pub account: Option<String>,
    pub block: Option<String>,
    pub token: Option<String>,
}

impl Default for ChannelPrefixes {
    fn default() -> Self {
        Self {
            account: None,
            block: Some("blocks:".to_string()),
            token: None,
        }
    }
}

impl ChannelPrefixes {
    fn prefix(&self, kind: PageKind) -> Option<&str> {
        match kind {
            PageKind::Account => self.account.as_deref(),
            PageKind::Block => self.block.as_deref(),
            PageKind::Token => self.token.as_deref(),
        }
        .filter(|p| !p.is_empty())
    }

    /// `${prefix}${id}` for the entity, if its kind has a channel
    pub fn topic_for(&self, entity: &EntityState) -> Option<String> {
        let prefix = self.prefix(entity.kind())?;
        let id = entity.identifier()?;
        Some(format!("{prefix}{id}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    Keep,
    Subscribe(String),
    Resubscribe { from: String, to: String },
    Unsubscribe(String),
}

/// Tracks the one live subscription a page holds
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    current: Option<String>,
}

impl SubscriptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_current(&self, topic: &str) -> bool {
        self.current.as_deref() == Some(topic)
    }

    /// Move to the desired topic and report what the transport must do
    pub fn sync(&mut self, desired: Option<String>) -> SubscriptionChange {
        let change = match (self.current.take(), desired.clone()) {
            (None, None) => SubscriptionChange::Keep,
            (None, Some(to)) => SubscriptionChange::Subscribe(to),
            (Some(from), None) => SubscriptionChange::Unsubscribe(from),
            (Some(from), Some(to)) if from == to => SubscriptionChange::Keep,
            (Some(from), Some(to)) => SubscriptionChange::Resubscribe { from, to },
        };
        self.current = desired;
        change
    }

    /// Tear down on page exit
    pub fn teardown(&mut self) -> Option<String> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn block(value: Value) -> ViewState {
        ViewState::new(EntityState::new(PageKind::Block, fields(value)))
    }

    #[test]
    fn test_partial_ignores_nulls() {
        let mut state = block(json!({"number": 5, "l1_block": 100, "tx_hash": "0xaa"}));
        reduce(
            &mut state,
            LiveMessage::Partial(fields(json!({"l1_block": null, "tx_hash": "0xbb"}))),
        );
        assert_eq!(state.entity().get("l1_block"), Some(&json!(100)));
        assert_eq!(state.entity().get("tx_hash"), Some(&json!("0xbb")));
    }

    #[test]
    fn test_partial_finalize_state() {
        let mut state = block(json!({"number": 5, "timestamp": "2022-04-15T05:20:00Z"}));
        reduce(
            &mut state,
            LiveMessage::Partial(fields(json!({"finalize_state": "finalized"}))),
        );
        let entity = state.entity();
        assert_eq!(entity.fields().len(), 3);
        assert_eq!(entity.get("number"), Some(&json!(5)));
        assert_eq!(entity.get("finalize_state"), Some(&json!("finalized")));
    }

    #[test]
    fn test_snapshot_replaces() {
        let mut state = block(json!({"number": 5, "extra": 1}));
        reduce(
            &mut state,
            LiveMessage::Snapshot(fields(json!({"number": 5, "hash": "0x1"}))),
        );
        assert_eq!(state.entity().get("extra"), None);
        assert_eq!(state.entity().get("hash"), Some(&json!("0x1")));
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = block(json!({"number": 5}));
        for value in ["committed", "finalized"] {
            reduce(
                &mut state,
                LiveMessage::Partial(fields(json!({"finalize_state": value}))),
            );
        }
        assert_eq!(state.entity().get("finalize_state"), Some(&json!("finalized")));
    }

    #[test]
    fn test_topics() {
        let prefixes = ChannelPrefixes::default();
        let entity = EntityState::new(PageKind::Block, fields(json!({"number": 42})));
        assert_eq!(prefixes.topic_for(&entity).as_deref(), Some("blocks:42"));

        let account = EntityState::new(PageKind::Account, fields(json!({"eth_address": "0x1"})));
        assert_eq!(prefixes.topic_for(&account), None);

        let custom = ChannelPrefixes {
            account: Some("accounts:".into()),
            ..ChannelPrefixes::default()
        };
        assert_eq!(custom.topic_for(&account).as_deref(), Some("accounts:0x1"));
    }

    #[test]
    fn test_tracker_transitions() {
        let mut tracker = SubscriptionTracker::new();
        assert_eq!(tracker.sync(None), SubscriptionChange::Keep);
        assert_eq!(
            tracker.sync(Some("blocks:1".into())),
            SubscriptionChange::Subscribe("blocks:1".into())
        );
        assert_eq!(tracker.sync(Some("blocks:1".into())), SubscriptionChange::Keep);
        assert_eq!(
            tracker.sync(Some("blocks:2".into())),
            SubscriptionChange::Resubscribe {
                from: "blocks:1".into(),
                to: "blocks:2".into()
            }
        );
        assert!(tracker.is_current("blocks:2"));
        assert!(!tracker.is_current("blocks:1"));
        assert_eq!(
            tracker.sync(None),
            SubscriptionChange::Unsubscribe("blocks:2".into())
        );
        assert_eq!(tracker.teardown(), None);
    }
}
