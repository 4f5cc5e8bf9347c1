//! ODBC backend.
//!
//! Connects through the driver manager using the DSN from [`HiveConfig`]
//! and fetches result sets through text row buffers, mapping ODBC column
//! types to a small set of Polars dtypes (integer, float, boolean, string).

use std::sync::OnceLock;

use odbc_api::{
    buffers::TextRowSet, Connection, ConnectionOptions, Cursor, DataType as OdbcDataType,
    Environment, ResultSetMetadata,
};
use polars::prelude::{DataFrame, Series};
use tracing::{debug, info};

use crate::client::HiveClient;
use crate::config::HiveConfig;
use crate::error::HiveError;

/// Rows fetched per driver round trip.
const BATCH_SIZE: usize = 1024;
/// Upper bound on the bytes buffered for a single cell.
const MAX_CELL_BYTES: usize = 4096;

// The ODBC environment must outlive every connection, so it is process-wide.
static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment, HiveError> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| HiveError::Connect(e.to_string()))?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// Map a driver error, surfacing integrity-constraint violations
/// (SQLSTATE class 23) as their own kind so callers can catch them narrowly.
fn map_error(e: odbc_api::Error) -> HiveError {
    if let odbc_api::Error::Diagnostics { record, .. } = &e {
        if record.state.0.starts_with(b"23") {
            return HiveError::Integrity(e.to_string());
        }
    }
    HiveError::Query(e.to_string())
}

/// Coarse column classification used when materializing result sets.
#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn from_odbc(data_type: OdbcDataType) -> Self {
        match data_type {
            OdbcDataType::BigInt
            | OdbcDataType::Integer
            | OdbcDataType::SmallInt
            | OdbcDataType::TinyInt => ColumnKind::Int,
            OdbcDataType::Double
            | OdbcDataType::Real
            | OdbcDataType::Float { .. }
            | OdbcDataType::Numeric { .. }
            | OdbcDataType::Decimal { .. } => ColumnKind::Float,
            OdbcDataType::Bit => ColumnKind::Bool,
            _ => ColumnKind::Text,
        }
    }
}

/// Accumulates one result column, parsing the driver's text cells into the
/// column's classified kind. Unparsable cells become nulls.
enum ColumnBuilder {
    Int { name: String, values: Vec<Option<i64>> },
    Float { name: String, values: Vec<Option<f64>> },
    Bool { name: String, values: Vec<Option<bool>> },
    Text { name: String, values: Vec<Option<String>> },
}

impl ColumnBuilder {
    fn new(name: String, kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Int => ColumnBuilder::Int { name, values: Vec::new() },
            ColumnKind::Float => ColumnBuilder::Float { name, values: Vec::new() },
            ColumnKind::Bool => ColumnBuilder::Bool { name, values: Vec::new() },
            ColumnKind::Text => ColumnBuilder::Text { name, values: Vec::new() },
        }
    }

    fn push(&mut self, raw: Option<&[u8]>) {
        let text = raw.map(|bytes| String::from_utf8_lossy(bytes));
        match self {
            ColumnBuilder::Int { values, .. } => {
                values.push(text.and_then(|t| t.trim().parse::<i64>().ok()));
            }
            ColumnBuilder::Float { values, .. } => {
                values.push(text.and_then(|t| t.trim().parse::<f64>().ok()));
            }
            ColumnBuilder::Bool { values, .. } => {
                values.push(text.and_then(|t| match t.trim() {
                    "1" | "true" | "TRUE" | "True" => Some(true),
                    "0" | "false" | "FALSE" | "False" => Some(false),
                    _ => None,
                }));
            }
            ColumnBuilder::Text { values, .. } => {
                values.push(text.map(|t| t.into_owned()));
            }
        }
    }

    fn into_series(self) -> Series {
        match self {
            ColumnBuilder::Int { name, values } => Series::new(&name, values),
            ColumnBuilder::Float { name, values } => Series::new(&name, values),
            ColumnBuilder::Bool { name, values } => Series::new(&name, values),
            ColumnBuilder::Text { name, values } => Series::new(&name, values),
        }
    }
}

/// The real backend: one ODBC connection, autocommit, no query timeout
/// (driver default), dropped on close.
pub struct OdbcClient {
    conn: Connection<'static>,
}

impl OdbcClient {
    /// Connect through the driver manager using the configured DSN and
    /// authentication parameters.
    pub fn connect(config: &HiveConfig) -> Result<Self, HiveError> {
        let env = environment()?;
        let conn = env
            .connect_with_connection_string(
                &config.connection_string(),
                ConnectionOptions::default(),
            )
            .map_err(|e| HiveError::Connect(e.to_string()))?;
        info!(dsn = %config.dsn, "connected to cluster");
        Ok(OdbcClient { conn })
    }
}

impl HiveClient for OdbcClient {
    fn execute(&mut self, sql: &str) -> Result<(), HiveError> {
        debug!(sql, "executing statement");
        self.conn.execute(sql, ()).map_err(map_error)?;
        Ok(())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<String>, HiveError> {
        debug!(sql, "executing query");
        let Some(mut cursor) = self.conn.execute(sql, ()).map_err(map_error)? else {
            return Ok(Vec::new());
        };
        let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_CELL_BYTES))
            .map_err(map_error)?;
        let mut row_sets = cursor.bind_buffer(&mut buffers).map_err(map_error)?;
        let mut rows = Vec::new();
        while let Some(batch) = row_sets.fetch().map_err(map_error)? {
            for row in 0..batch.num_rows() {
                let cells: Vec<String> = (0..batch.num_cols())
                    .map(|col| match batch.at(col, row) {
                        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                        None => "NULL".to_string(),
                    })
                    .collect();
                rows.push(cells.join(", "));
            }
        }
        Ok(rows)
    }

    fn query_frame(&mut self, sql: &str) -> Result<DataFrame, HiveError> {
        debug!(sql, "executing query for frame");
        let Some(mut cursor) = self.conn.execute(sql, ()).map_err(map_error)? else {
            return Ok(DataFrame::empty());
        };
        let names: Vec<String> = cursor
            .column_names()
            .map_err(map_error)?
            .collect::<Result<_, _>>()
            .map_err(map_error)?;
        let kinds: Vec<ColumnKind> = (0..names.len())
            .map(|i| {
                cursor
                    .col_data_type((i + 1) as u16)
                    .map(ColumnKind::from_odbc)
                    .map_err(map_error)
            })
            .collect::<Result<_, _>>()?;
        let mut builders: Vec<ColumnBuilder> = names
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| ColumnBuilder::new(name, kind))
            .collect();

        let mut buffers = TextRowSet::for_cursor(BATCH_SIZE, &mut cursor, Some(MAX_CELL_BYTES))
            .map_err(map_error)?;
        let mut row_sets = cursor.bind_buffer(&mut buffers).map_err(map_error)?;
        while let Some(batch) = row_sets.fetch().map_err(map_error)? {
            for row in 0..batch.num_rows() {
                for (col, builder) in builders.iter_mut().enumerate() {
                    builder.push(batch.at(col, row));
                }
            }
        }

        let series: Vec<Series> = builders.into_iter().map(ColumnBuilder::into_series).collect();
        Ok(DataFrame::new(series)?)
    }

    fn close(&mut self) -> Result<(), HiveError> {
        // The driver handle is released when the connection drops.
        info!("closing connection");
        Ok(())
    }
}
