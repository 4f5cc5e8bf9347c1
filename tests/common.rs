//! Shared helpers for integration tests (mock backend and session setup).

use std::sync::{Arc, Mutex};

use hive_session::{HiveClient, HiveError, HiveSession, HiveSessionBuilder};
use polars::prelude::{df, DataFrame};

/// Statement log shared between a test and the client it moved into a session.
#[derive(Clone, Default)]
pub struct StatementLog(Arc<Mutex<Vec<String>>>);

impl StatementLog {
    pub fn push(&self, sql: &str) {
        self.0.lock().unwrap().push(sql.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// How the mock backend fails, if at all.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    #[default]
    None,
    /// Every query returns a query error.
    Queries,
    /// `INSERT` statements return an integrity violation.
    InsertIntegrity,
    /// `INSERT` statements return a plain query error.
    InsertQuery,
}

/// In-memory backend serving a fixed frame and recording statements.
pub struct MockClient {
    pub log: StatementLog,
    pub frame: DataFrame,
    pub failure: FailureMode,
}

impl MockClient {
    pub fn new(log: StatementLog, frame: DataFrame) -> Self {
        MockClient {
            log,
            frame,
            failure: FailureMode::None,
        }
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }
}

impl HiveClient for MockClient {
    fn execute(&mut self, sql: &str) -> Result<(), HiveError> {
        self.log.push(sql);
        if sql.starts_with("INSERT") {
            match self.failure {
                FailureMode::InsertIntegrity => {
                    return Err(HiveError::Integrity("duplicate key".to_string()))
                }
                FailureMode::InsertQuery => {
                    return Err(HiveError::Query("table not found".to_string()))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn query_rows(&mut self, sql: &str) -> Result<Vec<String>, HiveError> {
        self.log.push(sql);
        if self.failure == FailureMode::Queries {
            return Err(HiveError::Query("lost contact with the cluster".to_string()));
        }
        let mut rows = Vec::new();
        for row in 0..self.frame.height() {
            let cells: Vec<String> = self
                .frame
                .get_columns()
                .iter()
                .map(|s| s.get(row).unwrap().to_string())
                .collect();
            rows.push(cells.join(", "));
        }
        Ok(rows)
    }

    fn query_frame(&mut self, sql: &str) -> Result<DataFrame, HiveError> {
        self.log.push(sql);
        if self.failure == FailureMode::Queries {
            return Err(HiveError::Query("lost contact with the cluster".to_string()));
        }
        Ok(self.frame.clone())
    }

    fn close(&mut self) -> Result<(), HiveError> {
        self.log.push("close");
        Ok(())
    }
}

/// Small (id, age, name) fixture frame.
pub fn people_frame() -> DataFrame {
    df![
        "id" => &[1i64, 2, 3],
        "age" => &[25i64, 30, 35],
        "name" => &["Alice", "Bob", "Carol"],
    ]
    .unwrap()
}

/// A connected session backed by a mock serving `frame`.
pub fn session_with_frame(frame: DataFrame) -> (HiveSession, StatementLog) {
    let log = StatementLog::default();
    let session = HiveSessionBuilder::new()
        .client(Box::new(MockClient::new(log.clone(), frame)))
        .connect();
    (session, log)
}
