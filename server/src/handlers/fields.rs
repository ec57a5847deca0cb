use serde_json::{Map, Value};

use crate::error::{MediaListError, Result};

pub(crate) fn optional_string(content: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match content.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(MediaListError::invalid_field(field, "a string")),
    }
}

pub(crate) fn optional_i64(content: &Map<String, Value>, field: &str) -> Result<Option<i64>> {
    match content.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(Some)
            .ok_or_else(|| MediaListError::invalid_field(field, "an integer")),
        Some(_) => Err(MediaListError::invalid_field(field, "an integer")),
    }
}

pub(crate) fn required_i64(content: &Map<String, Value>, field: &str) -> Result<i64> {
    optional_i64(content, field)?.ok_or_else(|| MediaListError::missing_field(field))
}

/// Accepts a JSON array of strings or a single comma-separated string.
pub(crate) fn optional_string_list(
    content: &Map<String, Value>,
    field: &str,
) -> Result<Option<Vec<String>>> {
    match content.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| MediaListError::invalid_field(field, "a list of strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(Value::String(joined)) => Ok(Some(
            joined
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        Some(_) => Err(MediaListError::invalid_field(field, "a list of strings")),
    }
}

pub(crate) fn non_negative<T: TryFrom<i64>>(field: &str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| MediaListError::invalid_field(field, "a non-negative integer"))
}

/// Path split on `/` with empty segments dropped.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_optional_string() {
        let content = map(json!({ "title": "Dune", "year": 1965, "none": null }));

        assert_eq!(optional_string(&content, "title").unwrap().as_deref(), Some("Dune"));
        assert_eq!(optional_string(&content, "missing").unwrap(), None);
        assert_eq!(optional_string(&content, "none").unwrap(), None);
        let err = optional_string(&content, "year").unwrap_err();
        assert_eq!(err.to_string(), "Field 'year' must be a string.");
    }

    #[test]
    fn test_integers() {
        let content = map(json!({ "value": 4, "ratio": 1.5, "text": "4" }));

        assert_eq!(required_i64(&content, "value").unwrap(), 4);
        assert!(optional_i64(&content, "ratio").is_err());
        assert!(optional_i64(&content, "text").is_err());
        assert_eq!(
            required_i64(&content, "mediaId").unwrap_err().to_string(),
            "Field 'mediaId' is required."
        );
    }

    #[test]
    fn test_string_list_accepts_array_and_csv() {
        let content = map(json!({
            "array": ["sci-fi", "drama"],
            "csv": " sci-fi, drama ,, ",
            "bad": [1, 2]
        }));

        let expected = vec!["sci-fi".to_string(), "drama".to_string()];
        assert_eq!(optional_string_list(&content, "array").unwrap(), Some(expected.clone()));
        assert_eq!(optional_string_list(&content, "csv").unwrap(), Some(expected));
        assert!(optional_string_list(&content, "bad").is_err());
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("/api/media/"), vec!["api", "media"]);
        assert_eq!(segments("/ratings/12"), vec!["ratings", "12"]);
        assert!(segments("/").is_empty());
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative::<u32>("ageRestriction", 16).unwrap(), 16);
        assert!(non_negative::<u32>("ageRestriction", -1).is_err());
    }
}
