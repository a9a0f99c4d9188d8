// SPDX-License-Identifier: GPL-3.0-or-later

//! Lenient field decoding.
//!
//! Phish.net encodes numeric columns inconsistently: the same field can be a
//! JSON number in one endpoint and a quoted string in another.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

pub(crate) fn u64_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("expected numeric string, got {s:?}"))),
        other => Err(de::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

pub(crate) fn opt_u64_from_any<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected unsigned integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected numeric string, got {s:?}"))),
        Some(other) => Err(de::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

pub(crate) fn opt_i64_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected integer, got {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected numeric string, got {s:?}"))),
        Some(other) => Err(de::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

/// Text columns sometimes come back as bare numbers (ratings, zip codes).
pub(crate) fn opt_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!("expected text, got {other}"))),
    }
}

/// Row types whose id doubles as the key of a keyed collection.
pub(crate) trait KeyedRow {
    /// Field that holds the row id.
    const ID_FIELD: &'static str;
}

/// Accepts either an object (rows keyed by id) or an array of rows.
///
/// PHP-backed endpoints encode an empty keyed collection as `[]`. When a
/// keyed row lacks its id field, the key fills it in.
pub(crate) fn rows_from_keyed_or_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + KeyedRow,
{
    let rows: Vec<Value> = match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, mut row)| {
                if let Value::Object(fields) = &mut row {
                    fields
                        .entry(T::ID_FIELD)
                        .or_insert_with(|| Value::String(key));
                }
                row
            })
            .collect(),
        Value::Array(list) => list,
        Value::Null => Vec::new(),
        other => {
            return Err(de::Error::custom(format!(
                "expected object or array of rows, got {other}"
            )))
        }
    };

    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(de::Error::custom))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "u64_from_any")]
        id: u64,
        #[serde(default, deserialize_with = "opt_u64_from_any")]
        other_id: Option<u64>,
        #[serde(default, deserialize_with = "opt_string_from_any")]
        rating: Option<String>,
    }

    impl KeyedRow for Row {
        const ID_FIELD: &'static str = "id";
    }

    #[derive(Debug, Deserialize)]
    struct Keyed {
        #[serde(deserialize_with = "rows_from_keyed_or_list")]
        data: Vec<Row>,
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let a: Row = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"id": "7", "other_id": "12"}"#).unwrap();
        assert_eq!(a.id, 7);
        assert_eq!(b.id, 7);
        assert_eq!(a.other_id, None);
        assert_eq!(b.other_id, Some(12));
    }

    #[test]
    fn blank_optional_id_is_none() {
        let row: Row = serde_json::from_str(r#"{"id": 1, "other_id": ""}"#).unwrap();
        assert_eq!(row.other_id, None);
    }

    #[test]
    fn negative_or_fractional_optional_id_is_rejected() {
        let negative: Result<Row, _> = serde_json::from_str(r#"{"id": 1, "other_id": -3}"#);
        let fractional: Result<Row, _> = serde_json::from_str(r#"{"id": 1, "other_id": 2.5}"#);
        let negative_text: Result<Row, _> =
            serde_json::from_str(r#"{"id": 1, "other_id": "-3"}"#);
        assert!(negative.is_err());
        assert!(fractional.is_err());
        assert!(negative_text.is_err());
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"id": "abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn numeric_text_column_is_stringified() {
        let row: Row = serde_json::from_str(r#"{"id": 1, "rating": 4.5}"#).unwrap();
        assert_eq!(row.rating.as_deref(), Some("4.5"));
    }

    #[test]
    fn keyed_object_and_empty_list_both_decode() {
        let keyed: Keyed =
            serde_json::from_str(r#"{"data": {"1": {"id": 1}, "2": {"id": "2"}}}"#).unwrap();
        assert_eq!(keyed.data.len(), 2);

        let empty: Keyed = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(empty.data.is_empty());
    }

    #[test]
    fn keyed_row_without_id_takes_its_key() {
        let keyed: Keyed =
            serde_json::from_str(r#"{"data": {"5": {"rating": "x"}, "9": {"id": 12}}}"#).unwrap();
        assert_eq!(keyed.data[0].id, 5);
        assert_eq!(keyed.data[0].rating.as_deref(), Some("x"));
        assert_eq!(keyed.data[1].id, 12);
    }
}
