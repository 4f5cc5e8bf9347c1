//! SQL rendering for bulk writes.
//!
//! Frames are appended to remote tables as multi-row `INSERT` statements,
//! one statement per chunk. Literal rendering follows the value's dtype
//! unless the caller's column-type map overrides it.

use std::collections::HashMap;

use polars::prelude::{AnyValue, DataFrame};

use crate::error::HiveError;

/// Escape a string literal by doubling single quotes.
pub fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Decide quoting from a Hive type name: `Some(true)` quoted,
/// `Some(false)` bare, `None` unrecognized.
fn forced_quoting(type_name: &str) -> Option<bool> {
    let t = type_name.to_ascii_lowercase();
    const QUOTED: [&str; 5] = ["char", "string", "varchar", "date", "timestamp"];
    const BARE: [&str; 5] = ["int", "double", "float", "decimal", "boolean"];
    if QUOTED.iter().any(|k| t.contains(k)) {
        Some(true)
    } else if BARE.iter().any(|k| t.contains(k)) {
        Some(false)
    } else {
        None
    }
}

fn raw_text(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Render one cell as a SQL literal. `column_type` is the caller's declared
/// Hive type for the column, if any; it overrides dtype-based quoting.
pub fn render_value(value: &AnyValue, column_type: Option<&str>) -> String {
    if matches!(value, AnyValue::Null) {
        return "NULL".to_string();
    }
    match column_type.and_then(forced_quoting) {
        Some(true) => format!("'{}'", escape_literal(&raw_text(value))),
        Some(false) => raw_text(value),
        None => match value {
            AnyValue::Boolean(b) => b.to_string(),
            AnyValue::Int8(v) => v.to_string(),
            AnyValue::Int16(v) => v.to_string(),
            AnyValue::Int32(v) => v.to_string(),
            AnyValue::Int64(v) => v.to_string(),
            AnyValue::UInt8(v) => v.to_string(),
            AnyValue::UInt16(v) => v.to_string(),
            AnyValue::UInt32(v) => v.to_string(),
            AnyValue::UInt64(v) => v.to_string(),
            AnyValue::Float32(v) => v.to_string(),
            AnyValue::Float64(v) => v.to_string(),
            AnyValue::String(s) => format!("'{}'", escape_literal(s)),
            AnyValue::StringOwned(s) => format!("'{}'", escape_literal(s)),
            other => format!("'{}'", escape_literal(&other.to_string())),
        },
    }
}

/// Render a frame as chunked `INSERT INTO .. VALUES ..` statements,
/// preserving row order. An empty frame yields no statements.
pub fn insert_statements(
    df: &DataFrame,
    table: &str,
    column_types: &HashMap<String, String>,
    chunk_size: usize,
) -> Result<Vec<String>, HiveError> {
    let height = df.height();
    if height == 0 {
        return Ok(Vec::new());
    }
    let chunk = chunk_size.max(1);
    let names = df.get_column_names();
    let overrides: Vec<Option<&str>> = names
        .iter()
        .map(|n| column_types.get(*n).map(|s| s.as_str()))
        .collect();
    let columns = df.get_columns();

    let mut statements = Vec::with_capacity(height.div_ceil(chunk));
    let mut offset = 0;
    while offset < height {
        let end = (offset + chunk).min(height);
        let mut rows = Vec::with_capacity(end - offset);
        for row in offset..end {
            let mut cells = Vec::with_capacity(columns.len());
            for (col, series) in columns.iter().enumerate() {
                let value = series.get(row)?;
                cells.push(render_value(&value, overrides[col]));
            }
            rows.push(format!("({})", cells.join(", ")));
        }
        statements.push(format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            names.join(", "),
            rows.join(", ")
        ));
        offset = end;
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn escape_doubles_single_quotes() {
        assert_eq!(escape_literal("it's"), "it''s");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn render_null_and_scalars() {
        assert_eq!(render_value(&AnyValue::Null, None), "NULL");
        assert_eq!(render_value(&AnyValue::Int64(7), None), "7");
        assert_eq!(render_value(&AnyValue::Boolean(true), None), "true");
        assert_eq!(render_value(&AnyValue::String("o'neil"), None), "'o''neil'");
    }

    #[test]
    fn column_type_overrides_quoting() {
        assert_eq!(render_value(&AnyValue::Int64(7), Some("string")), "'7'");
        assert_eq!(render_value(&AnyValue::String("7"), Some("bigint")), "7");
        // NULL is never quoted, whatever the declared type.
        assert_eq!(render_value(&AnyValue::Null, Some("string")), "NULL");
    }

    #[test]
    fn insert_statements_chunk_in_order() {
        let frame = df![
            "id" => &[1i64, 2, 3, 4, 5],
            "name" => &["a", "b", "c", "d", "e"],
        ]
        .unwrap();
        let statements = insert_statements(&frame, "s.t", &HashMap::new(), 2).unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[0],
            "INSERT INTO s.t (id, name) VALUES (1, 'a'), (2, 'b')"
        );
        assert_eq!(statements[2], "INSERT INTO s.t (id, name) VALUES (5, 'e')");
    }

    #[test]
    fn empty_frame_yields_no_statements() {
        let frame = DataFrame::empty();
        let statements = insert_statements(&frame, "s.t", &HashMap::new(), 10).unwrap();
        assert!(statements.is_empty());
    }
}
