//! SQLite data source driven by the statements sorm generates.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row, ToSql};

use crate::sorm::{Model, SqlValue, Table};
use crate::storage::{Dao, Entity, StorageError};

/// Build a model from a `SELECT *` row.
pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(n) => ToSqlOutput::Owned(Value::Integer(*n)),
            SqlValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

/// Table of `M` in a single SQLite connection.
pub struct SqliteDataSource<M> {
    conn: Mutex<Connection>,
    schema: Table,
    _model: PhantomData<fn() -> M>,
}

impl<M> SqliteDataSource<M>
where
    M: Model + Entity + FromRow + Default,
{
    /// Open (or create) the database file and make sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let schema = Table::from_model(&M::default());
        conn.execute_batch(&schema.create_sql())?;
        tracing::debug!(table = %schema.name, "SQLite table ready");
        Ok(Self {
            conn: Mutex::new(conn),
            schema,
            _model: PhantomData,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.schema.name
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl<M> Dao<M> for SqliteDataSource<M>
where
    M: Model + Entity + FromRow + Default,
{
    /// The key column is left to SQLite; the row id becomes the entity id.
    fn add(&self, entity: M) -> Result<u64, StorageError> {
        let id = entity.id();
        if id != 0 && self.get(id)?.is_some() {
            return Err(StorageError::AlreadyExists(id));
        }
        let table = Table::from_model(&entity);
        let conn = self.conn()?;
        conn.execute(&table.insert_sql(), params_from_iter(table.insert_params()))?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn get(&self, id: u64) -> Result<Option<M>, StorageError> {
        let sql = self.schema.select_one_sql()?;
        let conn = self.conn()?;
        let found = conn
            .query_row(&sql, params_from_iter([SqlValue::from(id)]), M::from_row)
            .optional()?;
        Ok(found)
    }

    fn get_all(&self) -> Result<Vec<M>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&self.schema.select_sql("all"))?;
        let rows = stmt.query_map([], M::from_row)?;
        let all = rows.collect::<rusqlite::Result<Vec<M>>>()?;
        Ok(all)
    }

    fn set(&self, entity: M) -> Result<u64, StorageError> {
        let id = entity.id();
        if id == 0 {
            return self.add(entity);
        }
        let table = Table::from_model(&entity);
        let conn = self.conn()?;
        conn.execute(&table.replace_sql()?, params_from_iter(table.replace_params()?))?;
        Ok(id)
    }

    fn del(&self, id: u64) -> Result<(), StorageError> {
        let sql = self.schema.delete_sql()?;
        let conn = self.conn()?;
        conn.execute(&sql, params_from_iter([SqlValue::from(id)]))?;
        Ok(())
    }
}
