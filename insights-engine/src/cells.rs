//! Cell-level interpretation of raw row values.

use chrono::NaiveDate;
use serde_json::Value;

/// Absent keys, nulls, and empty strings all count as missing.
pub fn is_missing(cell: Option<&Value>) -> bool {
    match cell {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numeric view of a cell, accepting numbers and numeric strings.
pub fn as_number(cell: Option<&Value>) -> Option<f64> {
    match cell? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Whether the cell holds a boolean (JSON bool or "true"/"false").
pub fn is_bool(cell: Option<&Value>) -> bool {
    match cell {
        Some(Value::Bool(_)) => true,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "false"),
        _ => false,
    }
}

/// Whether the cell parses as a date or datetime in common formats.
pub fn is_datetime(cell: Option<&Value>) -> bool {
    let Some(Value::String(s)) = cell else {
        return false;
    };
    parse_datetime(s).is_some()
}

/// Date part of a datetime-like cell, `YYYY-MM-DD`, for time bucketing.
pub fn as_date_bucket(cell: Option<&Value>) -> Option<String> {
    let Some(Value::String(s)) = cell else {
        return None;
    };
    parse_datetime(s).map(|d| d.format("%Y-%m-%d").to_string())
}

/// String rendering of a cell for categorical counting.
pub fn as_category(cell: Option<&Value>) -> Option<String> {
    if is_missing(cell) {
        return None;
    }
    Some(match cell? {
        Value::String(s) => s.trim().to_string(),
        v => v.to_string(),
    })
}

fn parse_datetime(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_covers_null_and_blank() {
        assert!(is_missing(None));
        assert!(is_missing(Some(&Value::Null)));
        assert!(is_missing(Some(&json!("   "))));
        assert!(!is_missing(Some(&json!(0))));
        assert!(!is_missing(Some(&json!("x"))));
    }

    #[test]
    fn numbers_parse_from_json_and_strings() {
        assert_eq!(as_number(Some(&json!(3))), Some(3.0));
        assert_eq!(as_number(Some(&json!("2.5"))), Some(2.5));
        assert_eq!(as_number(Some(&json!("abc"))), None);
        assert_eq!(as_number(Some(&json!(true))), None);
    }

    #[test]
    fn datetime_formats() {
        assert!(is_datetime(Some(&json!("2025-03-01"))));
        assert!(is_datetime(Some(&json!("2025-03-01T10:20:30Z"))));
        assert!(is_datetime(Some(&json!("01/03/2025"))));
        assert!(!is_datetime(Some(&json!("not a date"))));
        assert_eq!(
            as_date_bucket(Some(&json!("2025-03-01T10:20:30Z"))),
            Some("2025-03-01".to_string())
        );
    }
}
