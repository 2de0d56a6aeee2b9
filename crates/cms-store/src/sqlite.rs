// ABOUTME: SQLite-backed DocumentStore holding JSON documents and named counters in one database file.
// ABOUTME: Unique partial indexes enforce per-collection id/slug uniqueness; counters increment atomically.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cms_core::document::{Condition, Document, ID_FIELD, INTERNAL_ID_FIELD, SLUG_FIELD};
use cms_core::{Filter, Patch};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};
use serde_json::Value;
use ulid::Ulid;

use crate::store::{DocumentStore, StoreError, unique_key};

/// Default time a statement waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase,
            ) => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Sqlite(err),
        }
    }
}

/// Translate unique-index violations into `Conflict`, everything else as usual.
fn classify(err: rusqlite::Error, collection: &str) -> StoreError {
    let field = match &err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            if msg.contains("slug") {
                Some(SLUG_FIELD)
            } else if msg.contains("app_id") {
                Some(ID_FIELD)
            } else {
                None
            }
        }
        _ => None,
    };

    match field {
        Some(field) => StoreError::Conflict {
            collection: collection.to_string(),
            field: field.to_string(),
        },
        None => StoreError::from(err),
    }
}

/// A document store persisted in a single SQLite database.
///
/// The connection is shared behind a mutex and every call runs on the
/// blocking thread pool, so each operation is serialized against the others.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a store at `path`. `busy_timeout` bounds how long a
    /// statement waits for a lock held by another connection.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                internal_id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                app_id TEXT,
                slug TEXT,
                body TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS documents_app_id
                ON documents (collection, app_id) WHERE app_id IS NOT NULL;

            CREATE UNIQUE INDEX IF NOT EXISTS documents_slug
                ON documents (collection, slug) WHERE slug IS NOT NULL;

            CREATE TABLE IF NOT EXISTS counters (
                sequence_name TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
    }
}

/// Build the `WHERE` clause for a collection plus filter, returning the SQL
/// fragment and its bound parameters.
fn where_clause(collection: &str, filter: &Filter) -> Result<(String, Vec<SqlValue>), StoreError> {
    let mut sql = String::from("collection = ?");
    let mut params = vec![SqlValue::Text(collection.to_string())];

    for condition in filter.conditions() {
        let (field, value, op) = match condition {
            Condition::Eq(field, value) => (field, value, "IS"),
            Condition::Ne(field, value) => (field, value, "IS NOT"),
        };

        if field.is_empty() || field.contains('"') {
            return Err(StoreError::InvalidField(field.clone()));
        }

        // `id` and `slug` string lookups go through the indexed columns.
        let column = match (field.as_str(), value) {
            (INTERNAL_ID_FIELD, _) => Some("internal_id"),
            (ID_FIELD, Value::String(_)) => Some("app_id"),
            (SLUG_FIELD, Value::String(_)) => Some("slug"),
            _ => None,
        };

        match column {
            Some(column) => sql.push_str(&format!(" AND {} {} ?", column, op)),
            None => {
                sql.push_str(&format!(" AND json_extract(body, ?) {} ?", op));
                params.push(SqlValue::Text(format!("$.\"{}\"", field)));
            }
        }
        params.push(to_sql(value));
    }

    Ok((sql, params))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn parse_body(body: &str) -> Result<Document, StoreError> {
    Ok(serde_json::from_str(body)?)
}

/// Locate the first matching row, returning its internal id and body.
fn find_row(
    conn: &Connection,
    collection: &str,
    filter: &Filter,
) -> Result<Option<(String, String)>, StoreError> {
    let (clause, params) = where_clause(collection, filter)?;
    let sql = format!(
        "SELECT internal_id, body FROM documents WHERE {} ORDER BY rowid LIMIT 1",
        clause
    );
    let row = conn
        .query_row(&sql, params_from_iter(params), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .optional()?;
    Ok(row)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            find_row(conn, &collection, &filter)?
                .map(|(_, body)| parse_body(&body))
                .transpose()
        })
        .await
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid")?;
            let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

            let mut docs = Vec::new();
            for row in rows {
                docs.push(parse_body(&row?)?);
            }
            Ok(docs)
        })
        .await
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, StoreError> {
        let collection = collection.to_string();
        let internal_id = Ulid::new().to_string();
        document.insert(
            INTERNAL_ID_FIELD.to_string(),
            Value::String(internal_id.clone()),
        );

        self.with_conn(move |conn| {
            let body = serde_json::to_string(&document)?;
            conn.execute(
                "INSERT INTO documents (internal_id, collection, app_id, slug, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    internal_id,
                    collection,
                    unique_key(&document, ID_FIELD),
                    unique_key(&document, SLUG_FIELD),
                    body,
                ],
            )
            .map_err(|e| classify(e, &collection))?;
            Ok(internal_id)
        })
        .await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Patch,
    ) -> Result<u64, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        let patch = patch.clone();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let Some((internal_id, body)) = find_row(&tx, &collection, &filter)? else {
                return Ok(0);
            };
            let mut document = parse_body(&body)?;
            patch.apply(&mut document);

            tx.execute(
                "UPDATE documents SET app_id = ?1, slug = ?2, body = ?3 WHERE internal_id = ?4",
                params![
                    unique_key(&document, ID_FIELD),
                    unique_key(&document, SLUG_FIELD),
                    serde_json::to_string(&document)?,
                    internal_id,
                ],
            )
            .map_err(|e| classify(e, &collection))?;

            tx.commit()?;
            Ok(1)
        })
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let (clause, params) = where_clause(&collection, &filter)?;
            let sql = format!(
                "DELETE FROM documents WHERE internal_id =
                    (SELECT internal_id FROM documents WHERE {} ORDER BY rowid LIMIT 1)",
                clause
            );
            let removed = conn.execute(&sql, params_from_iter(params))?;
            Ok(removed as u64)
        })
        .await
    }

    async fn increment_counter(&self, sequence_name: &str) -> Result<u64, StoreError> {
        let sequence_name = sequence_name.to_string();
        self.with_conn(move |conn| {
            let value: i64 = conn.query_row(
                "INSERT INTO counters (sequence_name, value) VALUES (?1, 1)
                 ON CONFLICT(sequence_name) DO UPDATE SET value = value + 1
                 RETURNING value",
                params![sequence_name],
                |row| row.get(0),
            )?;
            Ok(value as u64)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
