//! SQLite log backend.
//!
//! Every record lives in one `log_data` table. Predicate values are always
//! bound through `params_from_iter`; the statement text comes from
//! [`LogQuery::to_sql`].

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection};
use tracing::{debug, trace};

use crate::error::{LogError, Result};
use crate::query::{BoundValue, LogQuery};
use crate::traits::{LogBackend, RowSet};
use crate::types::{format_timestamp, LogRecord, LogRow, RecordId};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS log_data (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant      TEXT NOT NULL,
    system      TEXT NOT NULL,
    user        TEXT NOT NULL,
    module      TEXT NOT NULL,
    task        TEXT NOT NULL,
    timestamp   TEXT NOT NULL,
    msg         TEXT NOT NULL,
    level       INTEGER NOT NULL,
    stack_trace TEXT
);
CREATE INDEX IF NOT EXISTS idx_log_data_tenant ON log_data (tenant);
CREATE INDEX IF NOT EXISTS idx_log_data_system ON log_data (system);
CREATE INDEX IF NOT EXISTS idx_log_data_user ON log_data (user);
";

const INSERT_SQL: &str = "INSERT INTO log_data \
    (tenant, system, user, module, task, timestamp, msg, level, stack_trace) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

impl ToSql for BoundValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Self::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            Self::Timestamp(value) => ToSqlOutput::Owned(Value::Text(format_timestamp(*value))),
        })
    }
}

/// Log backend over a single SQLite connection.
///
/// Statements are serialized through a mutex around the connection.
pub struct SqliteLogStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLogStore").finish_non_exhaustive()
    }
}

impl SqliteLogStore {
    /// Opens or creates a database file and ensures the schema exists.
    ///
    /// `:memory:` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Storage`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened log database");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Storage`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl LogBackend for SqliteLogStore {
    fn insert(&self, record: &LogRecord) -> Result<RecordId> {
        let conn = self.conn.lock();
        conn.execute(
            INSERT_SQL,
            params![
                record.tenant,
                record.system,
                record.user,
                record.module,
                record.task,
                format_timestamp(record.timestamp),
                record.message,
                record.level,
                record.stack_trace,
            ],
        )?;
        let id = RecordId(conn.last_insert_rowid());
        drop(conn);

        trace!(id = %id, tenant = %record.tenant, "inserted log record");
        Ok(id)
    }

    fn select(&self, query: &LogQuery) -> Result<RowSet> {
        let sql = query.to_sql();
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(query.bound_values()), |row| {
            Ok(LogRow {
                id: row.get(0)?,
                tenant: row.get(1)?,
                system: row.get(2)?,
                user: row.get(3)?,
                module: row.get(4)?,
                task: row.get(5)?,
                timestamp: row.get(6)?,
                message: row.get(7)?,
                level: row.get(8)?,
                stack_trace: row.get(9)?,
            })
        })?;

        Ok(rows
            .map(|row| row.map_err(|e| LogError::RowDecode(e.to_string())))
            .collect())
    }
}
