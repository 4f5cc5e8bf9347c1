//! The session facade.
//!
//! A [`HiveSession`] owns one backend connection, the last result frame,
//! and the report/export naming state. Construction never fails from the
//! caller's perspective: connection errors are logged and recorded in the
//! sticky [`SessionStatus`], matching the original facade's behavior.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, DataType};
use tracing::{error, info, warn};

use crate::client::HiveClient;
use crate::config::HiveConfig;
use crate::error::HiveError;
use crate::logging;
use crate::report::ReportPaths;
use crate::sql;

/// Sticky last-operation status, inspectable after the fact.
///
/// Only construction and [`HiveSession::read_frame`] write it; every other
/// operation reports failure through its `Result` instead. Prefer the
/// `Result`s — the flag exists for parity with the original facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ok,
    Failed,
}

impl SessionStatus {
    /// The original facade's integer flag: 0 on success, 1 on failure.
    pub fn code(self) -> u8 {
        match self {
            SessionStatus::Ok => 0,
            SessionStatus::Failed => 1,
        }
    }
}

/// Builder for a [`HiveSession`].
#[derive(Default)]
pub struct HiveSessionBuilder {
    config: HiveConfig,
    client: Option<Box<dyn HiveClient>>,
}

impl HiveSessionBuilder {
    pub fn new() -> Self {
        HiveSessionBuilder {
            config: HiveConfig::default(),
            client: None,
        }
    }

    pub fn config(mut self, config: HiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a backend instead of connecting over the DSN. Used by tests
    /// and embedders with their own driver handle.
    pub fn client(mut self, client: Box<dyn HiveClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the session. Never returns an error: any connection or setup
    /// failure is logged and recorded as [`SessionStatus::Failed`], leaving
    /// the session without a live client.
    pub fn connect(self) -> HiveSession {
        logging::init(&self.config.log);
        let HiveSessionBuilder { config, client } = self;

        let mut session = HiveSession {
            config,
            client: None,
            report: ReportPaths::new(),
            last_frame: None,
            status: SessionStatus::Failed,
        };

        let connected = match client {
            Some(client) => Ok(client),
            None => open_backend(&session.config),
        };
        match connected {
            Ok(mut client) => {
                info!("connected to cluster");
                match apply_directives(client.as_mut(), &session.config.session_directives) {
                    Ok(()) => {
                        session.client = Some(client);
                        session.status = SessionStatus::Ok;
                        info!("session setup complete");
                    }
                    Err(e) => {
                        error!("session setup failed: {e}");
                    }
                }
            }
            Err(e) => {
                error!("unable to connect to the database: {e}");
            }
        }
        session
    }
}

#[cfg(feature = "odbc")]
fn open_backend(config: &HiveConfig) -> Result<Box<dyn HiveClient>, HiveError> {
    Ok(Box::new(crate::client::OdbcClient::connect(config)?))
}

#[cfg(not(feature = "odbc"))]
fn open_backend(_config: &HiveConfig) -> Result<Box<dyn HiveClient>, HiveError> {
    Err(HiveError::Connect(
        "connecting over a DSN requires the 'odbc' feature".to_string(),
    ))
}

fn apply_directives(
    client: &mut dyn HiveClient,
    directives: &[String],
) -> Result<(), HiveError> {
    for directive in directives {
        client.execute(directive)?;
    }
    Ok(())
}

/// Session facade over one cluster connection.
pub struct HiveSession {
    config: HiveConfig,
    client: Option<Box<dyn HiveClient>>,
    report: ReportPaths,
    last_frame: Option<DataFrame>,
    status: SessionStatus,
}

impl HiveSession {
    pub fn builder() -> HiveSessionBuilder {
        HiveSessionBuilder::new()
    }

    /// The sticky status flag. No side effects.
    pub fn last_status(&self) -> SessionStatus {
        self.status
    }

    pub fn config(&self) -> &HiveConfig {
        &self.config
    }

    /// The live backend handle, if construction succeeded.
    pub fn client_mut(&mut self) -> Option<&mut (dyn HiveClient + 'static)> {
        self.client.as_deref_mut()
    }

    fn require_client(&mut self) -> Result<&mut (dyn HiveClient + 'static), HiveError> {
        self.client.as_deref_mut().ok_or(HiveError::NotConnected)
    }

    /// Run a query and eagerly materialize every row as its string
    /// rendering, in result order. Errors propagate to the caller.
    pub fn query_rows(&mut self, sql: &str) -> Result<Vec<String>, HiveError> {
        info!("executing query");
        let rows = self.require_client()?.query_rows(sql)?;
        info!(rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Run a statement with no result materialization. Errors propagate.
    pub fn execute(&mut self, sql: &str) -> Result<(), HiveError> {
        info!("executing statement");
        self.require_client()?.execute(sql)?;
        info!("statement executed");
        Ok(())
    }

    /// Run an arbitrary `INSERT` statement.
    pub fn insert(&mut self, sql: &str) -> Result<(), HiveError> {
        self.execute(sql)
    }

    /// Run an arbitrary `CREATE TABLE` statement.
    pub fn create_table(&mut self, sql: &str) -> Result<(), HiveError> {
        self.execute(sql)
    }

    /// Run an arbitrary `DROP TABLE` statement.
    pub fn drop_table(&mut self, sql: &str) -> Result<(), HiveError> {
        self.execute(sql)
    }

    /// Run a query and hold the full result set as the session's current
    /// frame. On success the status becomes `Ok` and the frame is returned;
    /// on any failure the error is logged, the status becomes `Failed`, and
    /// an empty frame is returned. Never errors.
    pub fn read_frame(&mut self, sql: &str) -> DataFrame {
        info!("reading query result into frame");
        let result = match self.client.as_deref_mut() {
            Some(client) => client.query_frame(sql),
            None => Err(HiveError::NotConnected),
        };
        match result {
            Ok(frame) => {
                info!(rows = frame.height(), "read complete");
                self.last_frame = Some(frame.clone());
                self.status = SessionStatus::Ok;
                frame
            }
            Err(e) => {
                error!("error reading frame from database: {e}");
                self.status = SessionStatus::Failed;
                DataFrame::empty()
            }
        }
    }

    /// Append a frame to the named remote table in chunked `INSERT`
    /// batches ([`HiveConfig::write_chunk_size`] rows each). `column_types`
    /// maps column names to Hive type names and overrides literal quoting
    /// for those columns.
    ///
    /// Only integrity-constraint violations are caught: they are logged and
    /// swallowed, and no further chunks are sent. Any other error
    /// propagates. Writes are not transactional across chunks; a failure
    /// partway through leaves a partial write.
    pub fn write_frame(
        &mut self,
        df: &DataFrame,
        table: &str,
        column_types: &HashMap<String, String>,
    ) -> Result<(), HiveError> {
        let qualified = self.config.qualified_table(table);
        info!(table = %qualified, rows = df.height(), "writing frame to database");
        let statements =
            sql::insert_statements(df, &qualified, column_types, self.config.write_chunk_size)?;
        let client = self.require_client()?;
        for statement in statements {
            match client.execute(&statement) {
                Ok(()) => {}
                Err(HiveError::Integrity(msg)) => {
                    warn!(
                        "could not write frame to database; the integrity error may come from \
                         inserting a key column the database auto-generates: {msg}"
                    );
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        info!("write complete");
        Ok(())
    }

    /// Column name to dtype for an already-materialized frame, in schema
    /// order. Pure; no I/O.
    pub fn frame_dtypes(df: &DataFrame) -> Vec<(String, DataType)> {
        df.get_column_names()
            .into_iter()
            .map(str::to_string)
            .zip(df.dtypes())
            .collect()
    }

    /// Close the backend connection. Errors propagate; after this the
    /// session has no live client and query operations return
    /// [`HiveError::NotConnected`].
    pub fn close(&mut self) -> Result<(), HiveError> {
        if let Some(mut client) = self.client.take() {
            client.close()?;
            info!("connection closed");
        }
        Ok(())
    }

    /// Set the report name and recompute both export paths. An empty name
    /// is logged and ignored.
    pub fn set_report_name(&mut self, name: &str) {
        self.report.set_name(name);
    }

    /// Set the save directory and recompute both export paths.
    pub fn set_save_directory(&mut self, directory: impl Into<PathBuf>) {
        self.report.set_directory(directory);
    }

    pub fn report_name(&self) -> &str {
        self.report.name()
    }

    pub fn csv_path(&self) -> &Path {
        self.report.csv_path()
    }

    pub fn xlsx_path(&self) -> &Path {
        self.report.xlsx_path()
    }

    /// Write the current result frame to the CSV path (`use_csv`) or the
    /// XLSX path, returning the path written. Errors if no read has
    /// succeeded yet.
    pub fn export_data(&mut self, use_csv: bool) -> Result<PathBuf, HiveError> {
        info!("exporting data");
        let frame = self.last_frame.as_mut().ok_or_else(|| {
            HiveError::User("no result table to export; run read_frame first".to_string())
        })?;
        if use_csv {
            self.report.write_csv(frame)?;
            info!(path = %self.report.csv_path().display(), "exported to csv");
            Ok(self.report.csv_path().to_path_buf())
        } else {
            self.report.write_xlsx(frame)?;
            info!(path = %self.report.xlsx_path().display(), "exported to xlsx");
            Ok(self.report.xlsx_path().to_path_buf())
        }
    }
}
