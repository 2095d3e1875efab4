//! JSON merge primitives
//!
//! Shared by configuration extras and the layered settings loader:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (overlay wins entirely)
//! - Scalars and null: overlay wins

use serde_json::{Map, Value};

/// Merge `overlay` into `base` in place. Returns whether `base` changed.
pub fn deep_merge_into(base: &mut Value, overlay: &Value) -> bool {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            merge_maps(base_map, overlay_map)
        }
        (base, overlay) => {
            if *base == *overlay {
                false
            } else {
                *base = overlay.clone();
                true
            }
        }
    }
}

/// Merge every key of `overlay` into `base`. Returns whether `base` changed.
pub fn merge_maps(base: &mut Map<String, Value>, overlay: &Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, overlay_value) in overlay {
        match base.get_mut(key) {
            Some(base_value) => changed |= deep_merge_into(base_value, overlay_value),
            None => {
                base.insert(key.clone(), overlay_value.clone());
                changed = true;
            }
        }
    }
    changed
}

/// Owned variant of [`deep_merge_into`]
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    deep_merge_into(&mut base, &overlay);
    base
}

/// Merge layers in order; the last layer has the highest precedence
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge_by_key() {
        let base = json!({"theme": {"accent": "blue", "contrast": "normal"}});
        let overlay = json!({"theme": {"accent": "red"}});

        let merged = deep_merge(base, overlay);

        assert_eq!(merged["theme"]["accent"], "red");
        assert_eq!(merged["theme"]["contrast"], "normal");
    }

    #[test]
    fn test_arrays_are_replaced() {
        let base = json!({"locales": ["en", "fr", "de"]});
        let overlay = json!({"locales": ["ja"]});

        let merged = deep_merge(base, overlay);

        assert_eq!(merged["locales"], json!(["ja"]));
    }

    #[test]
    fn test_null_overrides() {
        let merged = deep_merge(json!({"font_scale": 1.3}), json!({"font_scale": null}));
        assert!(merged["font_scale"].is_null());
    }

    #[test]
    fn test_change_detection() {
        let mut base = json!({"a": 1, "b": {"c": [1, 2]}});
        assert!(!deep_merge_into(&mut base, &json!({"a": 1})));
        assert!(!deep_merge_into(&mut base, &json!({"b": {"c": [1, 2]}})));
        assert!(deep_merge_into(&mut base, &json!({"b": {"d": true}})));
        assert_eq!(base["b"]["d"], true);
    }

    #[test]
    fn test_scalar_replaced_by_object() {
        let mut base = json!({"a": 1});
        assert!(deep_merge_into(&mut base, &json!({"a": {"nested": 2}})));
        assert_eq!(base["a"]["nested"], 2);
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"dump": {"level": "trim"}, "output": {"format": "json"}});
        let host = json!({"dump": {"level": "all"}});
        let cli = json!({"output": {"format": "human"}});

        let merged = merge_layers(vec![builtin, host, cli]);

        assert_eq!(merged["dump"]["level"], "all");
        assert_eq!(merged["output"]["format"], "human");
    }

    #[test]
    fn test_merge_layers_empty() {
        assert!(merge_layers(Vec::new()).is_null());
    }
}
