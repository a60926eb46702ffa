//! Property tests over randomised store/delete/reopen sequences.

use logdb::{Entity, Error, Id, Store};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct Widget {
    #[serde(skip)]
    id: String,
    value: String,
}

impl Entity for Widget {
    fn species_id() -> Id {
        Id::new("widget")
    }

    fn id(&self) -> Id {
        Id::new(&self.id)
    }

    fn set_id(&mut self, id: Id) {
        self.id = id.as_str().to_string();
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|e| Error::ContractViolation(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::corrupt(None, e))
    }
}

#[derive(Debug, Clone)]
enum Op {
    Store { id: String, value: String },
    Delete { id: String },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let id = "[a-e]";
    let value = "[a-z]{1,6}";
    prop_oneof![
        (id, value).prop_map(|(id, value)| Op::Store { id, value }),
        id.prop_map(|id| Op::Delete { id }),
    ]
}

proptest! {
    /// A stored entity, if not later overwritten or deleted, loads back
    /// byte-for-byte identical to what was stored: last writer wins and
    /// nothing but the most recent write for an id is ever observable.
    #[test]
    fn last_write_wins_across_random_sequences(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("widgets.data")).unwrap();

        let mut model: std::collections::HashMap<String, String> = std::collections::HashMap::new();

        for op in &ops {
            match op {
                Op::Store { id, value } => {
                    let w = Widget { id: id.clone(), value: value.clone() };
                    store.store(&w).unwrap();
                    model.insert(id.clone(), value.clone());
                }
                Op::Delete { id } => {
                    let outcome = store.delete::<Widget>(&Id::new(id));
                    if model.remove(id).is_some() {
                        prop_assert!(outcome.is_ok());
                    } else {
                        prop_assert!(matches!(outcome, Err(Error::NotFound)));
                    }
                }
            }
        }

        for (id, value) in &model {
            let loaded: Widget = store.load(&Id::new(id)).unwrap();
            prop_assert_eq!(&loaded.value, value);
        }

        for id in ["a", "b", "c", "d", "e"] {
            if !model.contains_key(id) {
                prop_assert!(matches!(store.load::<Widget>(&Id::new(id)), Err(Error::NotFound)));
            }
        }
    }

    /// `size()` always equals the sum of currently-live payload lengths, and
    /// `wasted()` always equals file bytes no longer reachable from the
    /// directory — both track the model exactly, never drifting.
    #[test]
    fn size_and_wasted_counters_match_the_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("widgets.data")).unwrap();

        let mut model: std::collections::HashMap<String, u64> = std::collections::HashMap::new();
        let mut wasted_total = 0u64;

        for op in &ops {
            match op {
                Op::Store { id, value } => {
                    let w = Widget { id: id.clone(), value: value.clone() };
                    let payload_len = serde_json::to_vec(&w).unwrap().len() as u64;
                    store.store(&w).unwrap();
                    if let Some(prior_len) = model.insert(id.clone(), payload_len) {
                        wasted_total += prior_len;
                    }
                }
                Op::Delete { id } => {
                    if store.delete::<Widget>(&Id::new(id)).is_ok() {
                        wasted_total += model.remove(id).unwrap();
                    }
                }
            }
        }

        let expected_size: u64 = model.values().sum();
        prop_assert_eq!(store.size(), expected_size);
        prop_assert_eq!(store.wasted(), wasted_total);
    }

    /// Compaction never changes what a subsequent `load` returns, regardless
    /// of the history that produced the current state.
    #[test]
    fn compaction_preserves_observable_state(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.data");
        let store = Store::open(&path).unwrap();

        let mut model: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        for op in &ops {
            match op {
                Op::Store { id, value } => {
                    store.store(&Widget { id: id.clone(), value: value.clone() }).unwrap();
                    model.insert(id.clone(), value.clone());
                }
                Op::Delete { id } => {
                    if store.delete::<Widget>(&Id::new(id)).is_ok() {
                        model.remove(id);
                    }
                }
            }
        }

        store.compact().unwrap();
        prop_assert_eq!(store.wasted(), 0);

        for (id, value) in &model {
            let loaded: Widget = store.load(&Id::new(id)).unwrap();
            prop_assert_eq!(&loaded.value, value);
        }
    }
}
