//! CSV decoding into dynamic JSON rows.
//!
//! Spreadsheet-backed sources (Sheets exports, nflverse release artifacts)
//! arrive untyped. Scalars are inferred conservatively: integers and floats
//! parse to numbers, everything else stays a string, and values with leading
//! zeros stay strings because they are identifiers (`"007"`, `"00-0033873"`),
//! not numbers. Empty cells become null.

use serde_json::{Map, Value};

use crate::error::ProviderError;

/// Decode CSV bytes into one JSON object per record, keyed by header.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] on malformed CSV.
pub fn rows_from_csv(bytes: &[u8]) -> Result<Vec<Value>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut obj = Map::new();
        for (i, field) in record.iter().enumerate() {
            let Some(name) = headers.get(i) else {
                continue;
            };
            obj.insert(name.to_string(), infer_scalar(field));
        }
        rows.push(Value::Object(obj));
    }
    Ok(rows)
}

/// Rename columns in place, e.g. provider-native header names to contract
/// names. Missing source columns are skipped.
pub fn rename_columns(rows: &mut [Value], renames: &[(&str, &str)]) {
    for row in rows {
        let Some(obj) = row.as_object_mut() else {
            continue;
        };
        for (from, to) in renames {
            if let Some(value) = obj.remove(*from) {
                obj.insert((*to).to_string(), value);
            }
        }
    }
}

/// Normalize object keys to `snake_case`: lowercased, runs of spaces and
/// punctuation collapsed to a single underscore. Human-edited spreadsheets
/// arrive with headers like `"Txn ID"`.
pub fn snake_case_keys(rows: &mut [Value]) {
    for row in rows {
        let Some(obj) = row.as_object_mut() else {
            continue;
        };
        let entries: Vec<(String, Value)> = std::mem::take(obj).into_iter().collect();
        for (key, value) in entries {
            obj.insert(snake_case(&key), value);
        }
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_underscore = false;
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_underscore = false;
        } else if !prev_underscore && !out.is_empty() {
            out.push('_');
            prev_underscore = true;
        }
    }
    out.trim_end_matches('_').to_string()
}

fn infer_scalar(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if has_identifier_leading_zero(field) {
        return Value::String(field.to_string());
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = field.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(field.to_string())
}

/// `"007"` and `"-012"` are identifiers; `"0"`, `"0.5"`, `"-0.5"` are numbers.
fn has_identifier_leading_zero(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_typed_rows() {
        let csv = b"player_id,week,yards,note\n00-0033873,5,102.5,solid\nXY123,6,88,\n";
        let rows = rows_from_csv(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["player_id"], json!("00-0033873"));
        assert_eq!(rows[0]["week"], json!(5));
        assert_eq!(rows[0]["yards"], json!(102.5));
        assert_eq!(rows[1]["yards"], json!(88));
        assert_eq!(rows[1]["note"], Value::Null);
    }

    #[test]
    fn leading_zero_identifiers_stay_strings() {
        let csv = b"id,count\n007,0\n";
        let rows = rows_from_csv(csv).unwrap();
        assert_eq!(rows[0]["id"], json!("007"));
        assert_eq!(rows[0]["count"], json!(0));
    }

    #[test]
    fn short_records_tolerated() {
        // flexible mode: trailing columns of a short record become absent
        let csv = b"a,b,c\n1,2\n";
        let rows = rows_from_csv(csv).unwrap();
        assert_eq!(rows[0]["a"], json!(1));
        assert_eq!(rows[0]["b"], json!(2));
        assert!(rows[0].get("c").is_none());
    }

    #[test]
    fn snake_case_spreadsheet_headers() {
        let mut rows = vec![json!({"Txn ID": "T1", "Player Name": "A", "Notes": null})];
        snake_case_keys(&mut rows);
        assert_eq!(rows[0]["txn_id"], json!("T1"));
        assert_eq!(rows[0]["player_name"], json!("A"));
        assert_eq!(rows[0]["notes"], Value::Null);
    }

    #[test]
    fn rename_maps_native_headers() {
        let mut rows = vec![json!({"gsis_id": "00-001", "display_name": "A"})];
        rename_columns(&mut rows, &[("gsis_id", "player_id"), ("display_name", "name")]);
        assert_eq!(rows[0]["player_id"], json!("00-001"));
        assert_eq!(rows[0]["name"], json!("A"));
        assert!(rows[0].get("gsis_id").is_none());
    }
}
