//! Property tests for document path resolution and merging

use emr_launcher_core::ConfigDocument;
use proptest::prelude::*;
use serde_json::{Map, Value};

fn key() -> impl Strategy<Value = String> {
    "[A-Za-z]{1,6}"
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9]{0,8}".prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn mapping() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key(), tree(), 0..5).prop_map(|m| m.into_iter().collect())
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(key(), 1..4).prop_map(|segments| segments.join("."))
}

/// Reference resolver: strict descent through mappings only
fn resolve<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut node: Option<&Value> = None;
    for segment in path.split('.') {
        node = match node {
            None => root.get(segment),
            Some(Value::Object(map)) => map.get(segment),
            Some(_) => return None,
        };
        node?;
    }
    node
}

proptest! {
    #[test]
    fn prop_get_nested_node_is_deterministic(root in mapping(), path in path()) {
        let document = ConfigDocument::from_map(root.clone());
        let first = document.get_nested_node(&path).cloned();
        let second = document.get_nested_node(&path).cloned();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.as_ref(), resolve(&root, &path));
    }

    #[test]
    fn prop_override_with_self_is_identity(root in mapping()) {
        let mut document = ConfigDocument::from_map(root.clone());
        document.override_with(root.clone());
        prop_assert_eq!(document.into_map(), root);
    }

    #[test]
    fn prop_override_sets_every_top_level_leaf(root in mapping(), incoming in mapping()) {
        let mut document = ConfigDocument::from_map(root);
        document.override_with(incoming.clone());
        for (key, value) in &incoming {
            if !value.is_object() {
                prop_assert_eq!(document.get(key), Some(value));
            }
        }
    }

    #[test]
    fn prop_insert_then_get(root in mapping(), key in key(), value in leaf()) {
        let mut document = ConfigDocument::from_map(root.clone());
        let occupied = !matches!(root.get(&key), None | Some(Value::Null));
        let result = document.insert_nested_node(&key, value.clone());

        if occupied {
            prop_assert!(result.is_err());
            prop_assert_eq!(document.into_map(), root);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(document.get_nested_node(&key), Some(&value));
        }
    }
}
