//! Column-addressed result rows
//!
//! Rows coming out of the roster store are decoupled from the driver so the
//! mapping layer can be exercised without a live database. Every accessor
//! applies the null-defaulting rule for its target type.

use crate::error::{coercion_error, AppError};

/// A single column value as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value as i64)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One row of a result set, columns kept in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, SqlValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append
    #[cfg(test)]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Look a column up by name. Exact match wins; otherwise the first
    /// ASCII case-insensitive match is used.
    pub fn get(&self, column: &str) -> Result<&SqlValue, AppError> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
            })
            .map(|(_, value)| value)
            .ok_or_else(|| coercion_error(format!("column '{}' is missing", column)))
    }

    /// Text column; NULL becomes an empty string, numbers render in decimal
    pub fn text(&self, column: &str) -> Result<String, AppError> {
        Ok(self.opt_text(column)?.unwrap_or_default())
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, AppError> {
        Ok(match self.get(column)? {
            SqlValue::Null => None,
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Int(n) => Some(n.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Bool(b) => Some(b.to_string()),
        })
    }

    /// Non-nullable 32-bit integer; NULL becomes zero
    pub fn int(&self, column: &str) -> Result<i32, AppError> {
        Ok(self.opt_int(column)?.unwrap_or(0))
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i32>, AppError> {
        match self.opt_long(column)? {
            None => Ok(None),
            Some(n) => i32::try_from(n).map(Some).map_err(|_| {
                coercion_error(format!("column '{}' value {} does not fit in i32", column, n))
            }),
        }
    }

    /// Non-nullable 64-bit integer; NULL becomes zero
    pub fn long(&self, column: &str) -> Result<i64, AppError> {
        Ok(self.opt_long(column)?.unwrap_or(0))
    }

    pub fn opt_long(&self, column: &str) -> Result<Option<i64>, AppError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Int(n) => Ok(Some(*n)),
            SqlValue::Bool(b) => Ok(Some(i64::from(*b))),
            SqlValue::Text(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                coercion_error(format!("column '{}' holds non-integer text '{}'", column, s))
            }),
            SqlValue::Float(f) => Err(coercion_error(format!(
                "column '{}' holds fractional value {}",
                column, f
            ))),
        }
    }

    /// Integer-stored flag. Only the value 1 is true; NULL stays unknown.
    pub fn flag(&self, column: &str) -> Result<Option<bool>, AppError> {
        match self.get(column)? {
            SqlValue::Bool(b) => Ok(Some(*b)),
            _ => Ok(self.opt_long(column)?.map(|n| n == 1)),
        }
    }
}
