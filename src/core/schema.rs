//! Conversions between provider schema shapes and plain string lists.

use crate::domain::model::StringSet;
use serde_json::Value;

pub fn flatten_string_set<I>(list: I) -> StringSet
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    list.into_iter().collect()
}

pub fn flatten_string_list<I>(list: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    list.into_iter().map(|v| Value::String(v.into())).collect()
}

pub fn expand_string_set(configured: &StringSet) -> Vec<String> {
    expand_string_list(&configured.list())
}

/// Keeps the non-empty string values, in order. Anything else is dropped.
pub fn expand_string_list(configured: &[Value]) -> Vec<String> {
    configured
        .iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_string_list_keeps_order_and_duplicates() {
        let flattened = flatten_string_list(vec!["b", "a", "b"]);
        assert_eq!(flattened, vec![json!("b"), json!("a"), json!("b")]);
    }

    #[test]
    fn test_flatten_string_set_collapses_duplicates() {
        let set = flatten_string_set(vec!["sg-2".to_string(), "sg-1".to_string(), "sg-2".to_string()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("sg-1"));
        assert!(set.contains("sg-2"));
    }

    #[test]
    fn test_expand_string_list_filters_empty_and_non_strings() {
        let configured = vec![
            json!("subnet-1"),
            json!(""),
            json!(42),
            Value::Null,
            json!("subnet-2"),
        ];
        assert_eq!(expand_string_list(&configured), vec!["subnet-1", "subnet-2"]);
    }

    #[test]
    fn test_expand_string_set() {
        let set = flatten_string_set(["sg-b", "", "sg-a"]);
        assert_eq!(expand_string_set(&set), vec!["sg-a", "sg-b"]);
    }

    #[test]
    fn test_empty_inputs() {
        let none: Vec<String> = Vec::new();
        assert!(flatten_string_list(none.clone()).is_empty());
        assert!(flatten_string_set(none).is_empty());
        assert!(expand_string_list(&[]).is_empty());
    }
}
