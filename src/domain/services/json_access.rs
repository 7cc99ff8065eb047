//! Optional-chaining over loosely typed listing JSON.
//!
//! Every accessor answers "absent" with `None` or an empty slice instead of
//! panicking, so extraction rules read as plain chains:
//! `record.field("compromis").first_item().path(&["status", "text"])`.

use serde_json::{Map, Value};

pub trait JsonAccess<'a>: Sized + Copy {
    /// Member `key` of an object. `None` when missing or when `self` is not an object.
    fn field(self, key: &str) -> Option<&'a Value>;

    fn path(self, keys: &[&str]) -> Option<&'a Value> {
        let (head, rest) = keys.split_first()?;
        let mut current = self.field(head)?;
        for key in rest {
            current = current.field(key)?;
        }
        Some(current)
    }

    /// The object itself when it is a non-empty object.
    fn present_object(self) -> Option<&'a Map<String, Value>>;

    /// Array elements; empty for null, missing and non-array values.
    fn items(self) -> &'a [Value];

    fn first_item(self) -> Option<&'a Value> {
        self.items().first()
    }

    /// Display text of a scalar. Strings come back verbatim, null is `None`.
    fn text(self) -> Option<String>;
}

impl<'a> JsonAccess<'a> for &'a Value {
    fn field(self, key: &str) -> Option<&'a Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    fn present_object(self) -> Option<&'a Map<String, Value>> {
        self.as_object().filter(|obj| !obj.is_empty())
    }

    fn items(self) -> &'a [Value] {
        match self {
            Value::Array(items) => items.as_slice(),
            _ => &[],
        }
    }

    fn text(self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl<'a> JsonAccess<'a> for &'a Map<String, Value> {
    fn field(self, key: &str) -> Option<&'a Value> {
        self.get(key)
    }

    fn present_object(self) -> Option<&'a Map<String, Value>> {
        Some(self).filter(|obj| !obj.is_empty())
    }

    fn items(self) -> &'a [Value] {
        &[]
    }

    fn text(self) -> Option<String> {
        None
    }
}

impl<'a> JsonAccess<'a> for Option<&'a Value> {
    fn field(self, key: &str) -> Option<&'a Value> {
        self.and_then(|v| v.field(key))
    }

    fn present_object(self) -> Option<&'a Map<String, Value>> {
        self.and_then(|v| v.present_object())
    }

    fn items(self) -> &'a [Value] {
        match self {
            Some(v) => v.items(),
            None => &[],
        }
    }

    fn text(self) -> Option<String> {
        self.and_then(|v| v.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_walks_nested_objects() {
        let record = json!({"compromis": [{"status": {"text": "Signé"}}]});
        let status = record.field("compromis").first_item().path(&["status", "text"]);
        assert_eq!(status, Some(&json!("Signé")));
    }

    #[test]
    fn test_absent_at_any_level_is_none() {
        let record = json!({"customer": null, "insee": "75056"});
        assert!(record.path(&["customer", "email"]).is_none());
        assert!(record.path(&["insee", "commune"]).is_none());
        assert!(record.path(&["nope", "deeper", "still"]).is_none());
        assert!(record.path(&[]).is_none());
    }

    #[test]
    fn test_items_tolerates_non_arrays() {
        let record = json!({"rooms": null, "themes": {"theme_name": "x"}, "photos": [1, 2]});
        assert!(record.field("rooms").items().is_empty());
        assert!(record.field("themes").items().is_empty());
        assert!(record.field("missing").items().is_empty());
        assert_eq!(record.field("photos").items().len(), 2);
    }

    #[test]
    fn test_present_object_rejects_empty() {
        let record = json!({"suivi_par": {}, "cree_par": {"email": "a@b.fr"}});
        assert!(record.field("suivi_par").present_object().is_none());
        assert!(record.field("cree_par").present_object().is_some());
    }

    #[test]
    fn test_text_of_scalars() {
        assert_eq!(json!("Salon").text(), Some("Salon".to_string()));
        assert_eq!(json!(18).text(), Some("18".to_string()));
        assert_eq!(json!(18.5).text(), Some("18.5".to_string()));
        assert_eq!(Value::Null.text(), None);
    }
}
