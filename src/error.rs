//! Session error type.
//!
//! Use [`HiveError`] to map driver, Polars, and export errors to a single
//! type without depending on the backend's error types.

use polars::error::PolarsError;
use std::fmt;

/// Unified error type for hive-session operations.
#[derive(Debug)]
pub enum HiveError {
    /// No live connection (construction failed or the session was closed).
    NotConnected,
    /// Connection or session setup failure.
    Connect(String),
    /// Statement or query execution failure.
    Query(String),
    /// Integrity-constraint violation reported by the remote engine
    /// (e.g. inserting a duplicate of an auto-generated key).
    Integrity(String),
    /// I/O error (file not found, permission, etc.).
    Io(String),
    /// Export serialization failure (CSV or XLSX writer).
    Export(String),
    /// User-facing error (invalid input, operation out of order).
    User(String),
}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiveError::NotConnected => write!(f, "not connected to the cluster"),
            HiveError::Connect(s) => write!(f, "connect error: {s}"),
            HiveError::Query(s) => write!(f, "query error: {s}"),
            HiveError::Integrity(s) => write!(f, "integrity violation: {s}"),
            HiveError::Io(s) => write!(f, "io error: {s}"),
            HiveError::Export(s) => write!(f, "export error: {s}"),
            HiveError::User(s) => write!(f, "user error: {s}"),
        }
    }
}

impl std::error::Error for HiveError {}

impl From<PolarsError> for HiveError {
    fn from(e: PolarsError) -> Self {
        let msg = e.to_string();
        match &e {
            PolarsError::IO { .. } => HiveError::Io(msg),
            _ => HiveError::Query(msg),
        }
    }
}

impl From<std::io::Error> for HiveError {
    fn from(e: std::io::Error) -> Self {
        HiveError::Io(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for HiveError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        HiveError::Export(e.to_string())
    }
}
