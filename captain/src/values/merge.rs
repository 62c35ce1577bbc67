//! Deep merge of value trees

use serde_json::Value;

use helm_crds::Values;

/// Merge `overrides` on top of `base`
///
/// Every key of either side ends up in the result. When both sides hold a
/// mapping for a key the two are merged recursively, otherwise the override
/// replaces the base value outright. Sequences are never concatenated.
pub fn merge_values(base: &Values, overrides: &Values) -> Values {
    let mut out = base.clone();
    for (key, value) in overrides {
        let merged = match (out.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge_values(existing, incoming))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

/// Merge a sequence of layers left to right, later layers winning
pub fn merge_layers<'a, I>(layers: I) -> Values
where
    I: IntoIterator<Item = &'a Values>,
{
    layers
        .into_iter()
        .fold(Values::new(), |acc, layer| merge_values(&acc, layer))
}
