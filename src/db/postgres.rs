//! PostgreSQL roster store
//!
//! Multi-row stored functions return `SETOF refcursor`. Opening a query
//! starts a read-only transaction and records the cursor names; each cursor
//! is fetched only when the reader reaches its result set.

use crate::db::queries::{SqlBuilder, CURRENT_DATABASE, LIST_BASE_TABLES};
use crate::db::reader::{NamedParam, Param, ResultSetReader, RosterStore, StoreCatalog};
use crate::db::row::{ResultRow, SqlValue};
use crate::error::{coercion_error, AppError};
use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use std::collections::VecDeque;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Row;
use tracing::debug;

type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// Split named parameters into their names and driver values
fn bind(params: &[NamedParam]) -> (Vec<&'static str>, Vec<BoxedParam>) {
    params
        .iter()
        .map(|p| {
            let value: BoxedParam = match &p.value {
                Param::Text(text) => Box::new(text.clone()),
                Param::Int(n) => Box::new(*n),
            };
            (p.name, value)
        })
        .unzip()
}

fn as_refs(values: &[BoxedParam]) -> Vec<&(dyn ToSql + Sync)> {
    values
        .iter()
        .map(|v| v.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

/// Convert a driver row into a column-addressed [`ResultRow`]
fn convert_row(row: &Row) -> Result<ResultRow, AppError> {
    let mut out = ResultRow::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let mapped = |e: tokio_postgres::Error| {
            coercion_error(format!("column '{}' ({}): {}", column.name(), ty, e))
        };

        let value: SqlValue = if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx).map_err(mapped)?.map(i64::from).into()
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx).map_err(mapped)?.map(i64::from).into()
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx).map_err(mapped)?.into()
        } else if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx).map_err(mapped)?.into()
        } else if *ty == Type::FLOAT4 {
            match row.try_get::<_, Option<f32>>(idx).map_err(mapped)? {
                Some(f) => SqlValue::Float(f64::from(f)),
                None => SqlValue::Null,
            }
        } else if *ty == Type::FLOAT8 {
            match row.try_get::<_, Option<f64>>(idx).map_err(mapped)? {
                Some(f) => SqlValue::Float(f),
                None => SqlValue::Null,
            }
        } else {
            // text, varchar, bpchar, name and anything else readable as text
            row.try_get::<_, Option<String>>(idx).map_err(mapped)?.into()
        };

        out.push(column.name(), value);
    }

    Ok(out)
}

/// Roster store backed by a deadpool-postgres pool
pub struct PgRosterStore {
    pool: Pool,
}

impl PgRosterStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn open(
        &self,
        procedure: &str,
        params: &[NamedParam],
    ) -> Result<Box<dyn ResultSetReader>, AppError> {
        let client = self.pool.get().await?;
        client.batch_execute("BEGIN READ ONLY").await?;

        // From here on the reader owns the connection; an early return drops
        // it and discards the connection together with the open transaction.
        let mut reader = PgCursorReader::new(client);

        let (names, values) = bind(params);
        let sql = SqlBuilder::call_cursor_function(procedure, &names);
        let rows = reader.client()?.query(&sql, &as_refs(&values)).await?;

        reader.cursors = rows
            .iter()
            .map(|r| r.try_get::<_, String>(0))
            .collect::<Result<_, _>>()?;

        debug!(procedure, result_sets = reader.cursors.len(), "Opened roster query");
        Ok(Box::new(reader))
    }

    async fn scalar(&self, procedure: &str, params: &[NamedParam]) -> Result<Option<i64>, AppError> {
        let client = self.pool.get().await?;

        let (names, values) = bind(params);
        let sql = SqlBuilder::call_scalar_function(procedure, &names);
        let row = client.query_one(&sql, &as_refs(&values)).await?;

        Ok(row.try_get::<_, Option<i64>>(0)?)
    }

    async fn catalog(&self) -> Result<StoreCatalog, AppError> {
        let client = self.pool.get().await?;

        let database: String = client.query_one(CURRENT_DATABASE, &[]).await?.try_get(0)?;
        let tables = client
            .query(LIST_BASE_TABLES, &[])
            .await?
            .iter()
            .map(|r| r.try_get::<_, String>(0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StoreCatalog { database, tables })
    }
}

/// Forward-only reader over the refcursors of one stored function call
pub struct PgCursorReader {
    client: Option<Object>,
    cursors: Vec<String>,
    position: usize,
    buffered: VecDeque<ResultRow>,
    fetched: bool,
}

impl PgCursorReader {
    fn new(client: Object) -> Self {
        Self {
            client: Some(client),
            cursors: Vec::new(),
            position: 0,
            buffered: VecDeque::new(),
            fetched: false,
        }
    }

    fn client(&self) -> Result<&Object, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Internal("roster reader is already closed".to_string()))
    }
}

#[async_trait]
impl ResultSetReader for PgCursorReader {
    async fn next_row(&mut self) -> Result<Option<ResultRow>, AppError> {
        if self.position >= self.cursors.len() {
            return Ok(None);
        }

        if !self.fetched {
            let sql = SqlBuilder::fetch_all(&self.cursors[self.position]);
            let rows = self.client()?.query(&sql, &[]).await?;
            self.buffered = rows.iter().map(convert_row).collect::<Result<_, _>>()?;
            self.fetched = true;
        }

        Ok(self.buffered.pop_front())
    }

    async fn next_result(&mut self) -> Result<bool, AppError> {
        self.buffered.clear();

        if self.position + 1 >= self.cursors.len() {
            self.position = self.cursors.len();
            return Ok(false);
        }

        self.position += 1;
        self.fetched = false;
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), AppError> {
        self.buffered.clear();
        self.position = self.cursors.len();

        if let Some(client) = self.client.take() {
            if let Err(e) = client.batch_execute("COMMIT").await {
                drop(Object::take(client));
                return Err(e.into());
            }
        }
        Ok(())
    }
}

impl Drop for PgCursorReader {
    fn drop(&mut self) {
        // Never hand a connection with an open transaction back to the pool
        if let Some(client) = self.client.take() {
            debug!("Discarding connection of an unfinished roster read");
            drop(Object::take(client));
        }
    }
}
