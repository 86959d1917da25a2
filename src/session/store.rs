//! View-state store: the displayed entity and how updates land in it

use crate::domain::{EntityState, Fields};

/// Overwrite every field present in `partial`, keep everything else.
///
/// Unknown fields are accepted and stored. Nothing is ever removed.
pub fn merge(current: &EntityState, partial: &Fields) -> EntityState {
    let mut next = current.clone();
    for (key, value) in partial {
        next.fields_mut().insert(key.clone(), value.clone());
    }
    next
}

/// The entity for one open page plus a revision counter bumped on every change
#[derive(Debug, Clone)]
pub struct ViewState {
    entity: EntityState,
    revision: u64,
}

impl ViewState {
    pub fn new(entity: EntityState) -> Self {
        Self {
            entity,
            revision: 0,
        }
    }

    pub fn entity(&self) -> &EntityState {
        &self.entity
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Merge a partial update (refetch result or live patch)
    pub fn apply_partial(&mut self, partial: &Fields) {
        if partial.is_empty() {
            return;
        }
        self.entity = merge(&self.entity, partial);
        self.revision += 1;
    }

    /// Replace all fields at once (live snapshot)
    pub fn replace(&mut self, fields: Fields) {
        self.entity = EntityState::new(self.entity.kind(), fields);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageKind;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_merge_overwrites_present_and_keeps_absent() {
        let cases = [
            (json!({"a": 1, "b": 2}), json!({"b": 3})),
            (json!({"a": 1}), json!({"c": "new"})),
            (json!({"a": 1, "b": {"x": 1}}), json!({"b": {"y": 2}, "a": null})),
            (json!({}), json!({"a": [1, 2]})),
            (json!({"a": 1}), json!({})),
        ];

        for (current, partial) in cases {
            let current = EntityState::new(PageKind::Block, fields(current));
            let partial = fields(partial);
            let result = merge(&current, &partial);

            for (key, value) in &partial {
                assert_eq!(result.get(key), Some(value), "field {key} from partial");
            }
            for (key, value) in current.fields() {
                if !partial.contains_key(key) {
                    assert_eq!(result.get(key), Some(value), "field {key} kept");
                }
            }
            assert_eq!(result.kind(), PageKind::Block);
        }
    }

    #[test]
    fn test_live_finalize_patch_keeps_immutable_fields() {
        let mut state = ViewState::new(EntityState::new(
            PageKind::Block,
            fields(json!({"number": 5, "timestamp": 1_650_000_000, "finalize_state": "committed"})),
        ));
        state.apply_partial(&fields(json!({"finalize_state": "finalized"})));

        let entity = state.entity();
        assert_eq!(entity.get("number"), Some(&json!(5)));
        assert_eq!(entity.get("timestamp"), Some(&json!(1_650_000_000)));
        assert_eq!(entity.get("finalize_state"), Some(&json!("finalized")));
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_empty_partial_is_no_op() {
        let mut state = ViewState::new(EntityState::new(PageKind::Token, Fields::new()));
        state.apply_partial(&Fields::new());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_replace_drops_old_fields() {
        let mut state = ViewState::new(EntityState::new(
            PageKind::Block,
            fields(json!({"number": 5, "stale": true})),
        ));
        state.replace(fields(json!({"number": 5, "hash": "0x1"})));
        assert!(state.entity().get("stale").is_none());
        assert_eq!(state.entity().kind(), PageKind::Block);
    }
}
