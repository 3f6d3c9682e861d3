//! Recursive merge of dynamic document trees

use serde_yaml::Value;

/// Join two trees, `overlay` taking precedence. Mappings merge key by key,
/// recursively; any other kind of node is replaced wholesale.
pub fn deep_join(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let joined = match base_map.remove(&key) {
                    Some(base_value) => deep_join(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, joined);
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_disjoint_keys_union() {
        let joined = deep_join(value("a: 1"), value("b: 2"));
        assert_eq!(joined, value("a: 1\nb: 2"));
    }

    #[test]
    fn test_overlay_wins_on_conflict() {
        let joined = deep_join(value("a: 1"), value("a: 2"));
        assert_eq!(joined, value("a: 2"));
    }

    #[test]
    fn test_nested_mappings_merge() {
        let base = value("outer:\n  a: 1\n  b: 1");
        let overlay = value("outer:\n  b: 2\n  c: 3");
        assert_eq!(
            deep_join(base, overlay),
            value("outer:\n  a: 1\n  b: 2\n  c: 3")
        );
    }

    #[test]
    fn test_sequences_replace_not_merge() {
        let joined = deep_join(value("a: [1, 2, 3]"), value("a: [4]"));
        assert_eq!(joined, value("a: [4]"));
    }
}
