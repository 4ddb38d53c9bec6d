//! Multi-value collapsing shared by query, form and header extraction.

use signet_core::{RawData, RawValue};

/// Groups `(name, value)` pairs by name.
///
/// A name seen once maps to its value; a name seen more than once maps to
/// every value in order.
pub fn collapse<I, V>(pairs: I) -> RawData
where
    I: IntoIterator<Item = (String, V)>,
    V: Into<RawValue>,
{
    let mut data = RawData::new();
    for (name, value) in pairs {
        let value = value.into();
        match data.get_mut(&name) {
            None => {
                data.insert(name, value);
            }
            Some(RawValue::Many(values)) => values.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, RawValue::Many(Vec::new()));
                *existing = RawValue::Many(vec![first, value]);
            }
        }
    }
    data
}

/// Converts a text pair into a raw value pair.
pub(crate) fn text_pair((name, value): (String, String)) -> (String, RawValue) {
    (name, RawValue::text(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_stays_scalar() {
        let data = collapse([("a".to_string(), RawValue::text("1"))]);
        assert_eq!(data["a"], RawValue::Json(json!("1")));
    }

    #[test]
    fn test_repeated_becomes_list() {
        let data = collapse(
            [("t", "x"), ("q", "1"), ("t", "y"), ("t", "z")]
                .into_iter()
                .map(|(k, v)| text_pair((k.to_string(), v.to_string()))),
        );
        assert_eq!(
            data["t"],
            RawValue::Many(vec![
                RawValue::text("x"),
                RawValue::text("y"),
                RawValue::text("z"),
            ])
        );
        assert_eq!(data["q"], RawValue::text("1"));
        assert_eq!(data.get_index(0).map(|(k, _)| k.as_str()), Some("t"));
    }
}
