//! Backing store boundary
//!
//! A stored query is opened once and its result sets are consumed strictly
//! in order through a [`ResultSetReader`]. The reader owns the underlying
//! connection for the lifetime of the execution.

use crate::db::row::ResultRow;
use crate::error::AppError;
use async_trait::async_trait;

/// Typed stored-query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(Option<String>),
    Int(i32),
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(Some(value.to_string()))
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(Some(value))
    }
}

impl From<Option<&str>> for Param {
    fn from(value: Option<&str>) -> Self {
        Param::Text(value.map(str::to_string))
    }
}

/// A parameter bound by name
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    pub name: &'static str,
    pub value: Param,
}

pub fn param(name: &'static str, value: impl Into<Param>) -> NamedParam {
    NamedParam {
        name,
        value: value.into(),
    }
}

/// Database name and base tables, used by diagnostics
#[derive(Debug, Clone, Default)]
pub struct StoreCatalog {
    pub database: String,
    pub tables: Vec<String>,
}

/// Forward-only cursor over the ordered result sets of one execution
#[async_trait]
pub trait ResultSetReader: Send {
    /// Next row of the current result set, `None` once it is exhausted
    async fn next_row(&mut self) -> Result<Option<ResultRow>, AppError>;

    /// Advance to the following result set. Unread rows of the current set
    /// are discarded. Returns `false` when no result set remains.
    async fn next_result(&mut self) -> Result<bool, AppError>;

    /// Finish the execution and release the connection.
    async fn close(&mut self) -> Result<(), AppError>;
}

/// Relational store accessed through named stored functions
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Execute a multi-row stored function and return a reader positioned
    /// at its first result set.
    async fn open(
        &self,
        procedure: &str,
        params: &[NamedParam],
    ) -> Result<Box<dyn ResultSetReader>, AppError>;

    /// Execute a scalar stored function
    async fn scalar(&self, procedure: &str, params: &[NamedParam]) -> Result<Option<i64>, AppError>;

    async fn catalog(&self) -> Result<StoreCatalog, AppError>;
}

/// Drain the remaining rows of the current result set through `map`
pub async fn collect_set<T, F>(
    reader: &mut dyn ResultSetReader,
    map: F,
) -> Result<Vec<T>, AppError>
where
    F: Fn(&ResultRow) -> Result<T, AppError>,
{
    let mut items = Vec::new();
    while let Some(row) = reader.next_row().await? {
        items.push(map(&row)?);
    }
    Ok(items)
}

/// Open `procedure`, map its single result set and close the reader
pub async fn query_set<T, F>(
    store: &dyn RosterStore,
    procedure: &str,
    params: &[NamedParam],
    map: F,
) -> Result<Vec<T>, AppError>
where
    F: Fn(&ResultRow) -> Result<T, AppError>,
{
    let mut reader = store.open(procedure, params).await?;
    let items = collect_set(reader.as_mut(), map).await?;
    reader.close().await?;
    Ok(items)
}
