use serde_json::{Map, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have an object for the same key, recurse.
/// A `null` in `overlay` keeps the base value; anything else replaces it,
/// arrays included.
pub fn deep_merge(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Object(base_obj)), Value::Object(overlay_obj)) => {
                base.insert(key, Value::Object(deep_merge(base_obj, overlay_obj)));
            }
            (Some(base_val), Value::Null) => {
                base.insert(key, base_val);
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn disjoint_keys_merge() {
        let base = object(json!({"host": "localhost"}));
        let overlay = object(json!({"port": 3000}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["host"], "localhost");
        assert_eq!(merged["port"], 3000);
    }

    #[test]
    fn same_scalar_key_overlay_wins() {
        let merged = deep_merge(object(json!({"port": 8080})), object(json!({"port": 3000})));
        assert_eq!(merged["port"], 3000);
    }

    #[test]
    fn nested_objects_recurse() {
        let base = object(json!({"database": {"url": "postgres://old", "pool_size": 5}}));
        let overlay = object(json!({"database": {"pool_size": 20}}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["database"]["url"], "postgres://old");
        assert_eq!(merged["database"]["pool_size"], 20);
    }

    #[test]
    fn overlay_scalar_replaces_object() {
        let base = object(json!({"database": {"url": "x"}}));
        let overlay = object(json!({"database": "flat_string"}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["database"], "flat_string");
    }

    #[test]
    fn arrays_replace() {
        let base = object(json!({"tags": ["a", "b"]}));
        let overlay = object(json!({"tags": ["c"]}));
        assert_eq!(deep_merge(base, overlay)["tags"], json!(["c"]));
    }

    #[test]
    fn null_keeps_base() {
        let base = object(json!({"port": 8080, "name": "svc"}));
        let overlay = object(json!({"port": null}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["port"], 8080);
        assert_eq!(merged["name"], "svc");
    }

    #[test]
    fn null_for_missing_key_is_kept() {
        let merged = deep_merge(Map::new(), object(json!({"count": null})));
        assert_eq!(merged["count"], Value::Null);
    }

    #[test]
    fn empty_overlay_returns_base() {
        let base = object(json!({"port": 8080}));
        assert_eq!(deep_merge(base.clone(), Map::new()), base);
    }

    #[test]
    fn deeply_nested_three_levels() {
        let base = object(json!({"a": {"b": {"c": {"val": 1, "other": "keep"}}}}));
        let overlay = object(json!({"a": {"b": {"c": {"val": 99}}}}));
        let merged = deep_merge(base, overlay);
        assert_eq!(merged["a"]["b"]["c"]["val"], 99);
        assert_eq!(merged["a"]["b"]["c"]["other"], "keep");
    }

    #[test]
    fn multiple_sequential_merges() {
        let a = object(json!({"host": "a"}));
        let b = object(json!({"port": 1000}));
        let c = object(json!({"host": "c"}));
        let merged = deep_merge(deep_merge(a, b), c);
        assert_eq!(merged["host"], "c");
        assert_eq!(merged["port"], 1000);
    }
}
