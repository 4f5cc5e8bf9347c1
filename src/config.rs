//! Session configuration.
//!
//! The original deployment hardcoded its DSN alias, target schema, Kerberos
//! parameters and tuning directives. [`HiveConfig`] externalizes them; the
//! defaults reproduce that deployment so a bare `HiveConfig::default()`
//! behaves like the historical setup.

use crate::logging::LogConfig;

/// Authentication mechanism passed to the ODBC driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMechanism {
    /// Leave authentication to the DSN definition.
    Default,
    /// Kerberos with the given service principal name.
    Kerberos { service_name: String },
}

/// Configuration for a [`HiveSession`](crate::HiveSession).
#[derive(Debug, Clone)]
pub struct HiveConfig {
    /// Named data source alias resolved by the driver manager.
    pub dsn: String,
    /// Authentication mechanism appended to the connection string.
    pub auth: AuthMechanism,
    /// Schema that qualifies table names for bulk writes. `None` leaves
    /// table names unqualified.
    pub schema: Option<String>,
    /// Statements run once against the fresh connection (queue selection,
    /// execution engine, vectorization).
    pub session_directives: Vec<String>,
    /// Rows per `INSERT` batch in [`write_frame`](crate::HiveSession::write_frame).
    pub write_chunk_size: usize,
    /// Logging setup applied when the session builder connects.
    pub log: LogConfig,
}

impl Default for HiveConfig {
    fn default() -> Self {
        HiveConfig {
            dsn: "Hive_connection".to_string(),
            auth: AuthMechanism::Kerberos {
                service_name: "hive".to_string(),
            },
            schema: Some("tda_sb_bqoe".to_string()),
            session_directives: vec![
                "set tez.queue.name=tda_adhoc;".to_string(),
                "set hive.execution.engine = tez;".to_string(),
                "set hive.vectorized.execution.reduce.enabled = true;".to_string(),
            ],
            write_chunk_size: 10_000,
            log: LogConfig::default(),
        }
    }
}

impl HiveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.dsn = dsn.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthMechanism) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_session_directives(mut self, directives: Vec<String>) -> Self {
        self.session_directives = directives;
        self
    }

    pub fn with_write_chunk_size(mut self, rows: usize) -> Self {
        self.write_chunk_size = rows;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Render the ODBC connection string for this configuration.
    pub fn connection_string(&self) -> String {
        let mut s = format!("DSN={};", self.dsn);
        if let AuthMechanism::Kerberos { service_name } = &self.auth {
            s.push_str(&format!("AuthMech=1;KrbServiceName={service_name};"));
        }
        s
    }

    /// Qualify a table name with the configured schema, if any.
    pub fn qualified_table(&self, table: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{table}"),
            None => table.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_historical_deployment() {
        let config = HiveConfig::default();
        assert_eq!(config.dsn, "Hive_connection");
        assert_eq!(config.write_chunk_size, 10_000);
        assert_eq!(config.session_directives.len(), 3);
        assert_eq!(config.schema.as_deref(), Some("tda_sb_bqoe"));
    }

    #[test]
    fn connection_string_includes_kerberos_parameters() {
        let config = HiveConfig::default();
        assert_eq!(
            config.connection_string(),
            "DSN=Hive_connection;AuthMech=1;KrbServiceName=hive;"
        );
    }

    #[test]
    fn connection_string_without_auth_is_dsn_only() {
        let config = HiveConfig::default()
            .with_dsn("other")
            .with_auth(AuthMechanism::Default);
        assert_eq!(config.connection_string(), "DSN=other;");
    }

    #[test]
    fn qualified_table_respects_schema() {
        let config = HiveConfig::default();
        assert_eq!(config.qualified_table("t"), "tda_sb_bqoe.t");
        let bare = config.with_schema(None);
        assert_eq!(bare.qualified_table("t"), "t");
    }
}
