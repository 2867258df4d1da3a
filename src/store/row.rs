//! Conversion between untyped table rows and [`ListItem`]s

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::types::{Fields, ListItem};

/// A table row as the service returns it: column name to scalar value
pub type Row = Map<String, Value>;

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Lift `id` and `created_at` out of a row; every other column becomes a field.
///
/// Returns `None` for rows without a usable id.
pub fn item_from_row(row: &Row) -> Option<ListItem> {
    let id = match row.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };

    let created_at = match row.get("created_at").and_then(Value::as_str) {
        Some(raw) => raw.parse::<Timestamp>().unwrap_or_else(|e| {
            tracing::warn!("row '{id}' has unparsable created_at '{raw}': {e}");
            Timestamp::UNIX_EPOCH
        }),
        None => {
            tracing::warn!("row '{id}' has no created_at");
            Timestamp::UNIX_EPOCH
        }
    };

    let fields = row
        .iter()
        .filter(|(k, _)| k.as_str() != "id" && k.as_str() != "created_at")
        .map(|(k, v)| (k.clone(), scalar_to_string(v)))
        .collect();

    Some(ListItem {
        id,
        fields,
        created_at,
    })
}

/// Convert rows in order, skipping rows without an id
pub fn items_from_rows(rows: &[Row]) -> Vec<ListItem> {
    rows.iter()
        .filter_map(|row| {
            let item = item_from_row(row);
            if item.is_none() {
                let row = serde_json::Value::Object(row.clone());
                tracing::warn!("skipping row without id: {row}");
            }
            item
        })
        .collect()
}

pub fn row_from_fields(fields: &Fields) -> Row {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

pub fn row_from_item(item: &ListItem) -> Row {
    let mut row = row_from_fields(&item.fields);
    row.insert("id".to_string(), Value::String(item.id.clone()));
    row.insert(
        "created_at".to_string(),
        Value::String(item.created_at.to_string()),
    );
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_item_from_row_lifts_id_and_timestamp() {
        let item = item_from_row(&row(json!({
            "id": "b6f1",
            "first_name": "Grace",
            "photo_url": null,
            "subjects": ["Rust", "Go"],
            "created_at": "2024-05-01T10:00:00Z",
        })))
        .unwrap();

        assert_eq!(item.id, "b6f1");
        assert_eq!(item.field("first_name"), "Grace");
        assert_eq!(item.field("photo_url"), "");
        assert_eq!(item.field("subjects"), "Rust, Go");
        assert!(!item.fields.contains_key("id"));
        assert_eq!(
            item.created_at,
            "2024-05-01T10:00:00Z".parse::<Timestamp>().unwrap()
        );
    }

    #[test]
    fn test_numeric_id_and_bad_timestamp() {
        let item = item_from_row(&row(json!({"id": 42, "created_at": "yesterday"}))).unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.created_at, Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let rows = vec![
            row(json!({"first_name": "nobody"})),
            row(json!({"id": "a", "created_at": "2024-01-01T00:00:00Z"})),
        ];
        let items = items_from_rows(&rows);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn test_row_from_item_keeps_identity() {
        let item = item_from_row(&row(json!({
            "id": "x",
            "email": "x@example.com",
            "created_at": "2024-01-01T00:00:00Z",
        })))
        .unwrap();
        let back = row_from_item(&item);
        assert_eq!(back["id"], json!("x"));
        assert_eq!(back["email"], json!("x@example.com"));
        assert_eq!(item_from_row(&back).unwrap(), item);
    }
}
