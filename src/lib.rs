//! hive-session - a thin session facade for Hive clusters
//!
//! This library wraps an ODBC connection to a SQL-on-Hadoop cluster behind a
//! small session object: run statements, read query results into Polars
//! frames, append frames back to remote tables, and export the last result
//! to CSV or XLSX.
//!
//! The actual driver is pluggable through the [`HiveClient`] trait. The real
//! ODBC backend lives behind the `odbc` cargo feature; without it, sessions
//! can only be built with an injected client.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;
pub mod sql;

pub use client::HiveClient;
#[cfg(feature = "odbc")]
pub use client::OdbcClient;
pub use config::{AuthMechanism, HiveConfig};
pub use error::HiveError;
pub use logging::LogConfig;
pub use report::ReportPaths;
pub use session::{HiveSession, HiveSessionBuilder, SessionStatus};
