//! Backend abstraction for the remote command interface.
//!
//! A [`HiveClient`] is a live handle to the cluster's query engine.
//! Statements are sent verbatim (no parameterization, no escaping of the
//! caller's SQL). The real ODBC backend is behind the `odbc` feature;
//! tests inject fakes through [`HiveSessionBuilder::client`](crate::HiveSessionBuilder::client).

use polars::prelude::DataFrame;

use crate::error::HiveError;

#[cfg(feature = "odbc")]
mod odbc;
#[cfg(feature = "odbc")]
pub use odbc::OdbcClient;

/// A live connection to the remote SQL engine.
pub trait HiveClient {
    /// Run a statement, discarding any result set.
    fn execute(&mut self, sql: &str) -> Result<(), HiveError>;

    /// Run a query and materialize every row as its string rendering,
    /// in result order. The whole result set is held in memory.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<String>, HiveError>;

    /// Run a query and materialize the full result set as a frame.
    fn query_frame(&mut self, sql: &str) -> Result<DataFrame, HiveError>;

    /// Release the underlying connection.
    fn close(&mut self) -> Result<(), HiveError>;
}
