//! In-memory roster store for unit tests
//!
//! Replays deterministic row batches, one batch per result set, and records
//! what the code under test asked for.

use crate::db::reader::{NamedParam, ResultSetReader, RosterStore, StoreCatalog};
use crate::db::row::ResultRow;
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Handler =
    Box<dyn Fn(&str, &[NamedParam]) -> Result<Vec<Vec<ResultRow>>, AppError> + Send + Sync>;

/// Observations shared between the fake store and its readers
#[derive(Default)]
pub struct FakeLog {
    calls: Mutex<Vec<(String, Vec<NamedParam>)>>,
    sets_fetched: AtomicUsize,
    readers_closed: AtomicUsize,
}

impl FakeLog {
    pub fn calls(&self) -> Vec<(String, Vec<NamedParam>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Parameters of the most recent call
    pub fn last_params(&self) -> Vec<NamedParam> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, params)| params.clone())
            .unwrap_or_default()
    }

    /// Number of result sets whose rows were actually pulled
    pub fn sets_fetched(&self) -> usize {
        self.sets_fetched.load(Ordering::SeqCst)
    }

    pub fn readers_closed(&self) -> usize {
        self.readers_closed.load(Ordering::SeqCst)
    }
}

pub struct FakeStore {
    handler: Handler,
    scalar: Result<Option<i64>, String>,
    fail_after_rows: Option<usize>,
    pub log: Arc<FakeLog>,
}

impl FakeStore {
    /// Answer every call with the same result sets
    pub fn with_sets(sets: Vec<Vec<ResultRow>>) -> Self {
        Self::with_handler(move |_, _| Ok(sets.clone()))
    }

    /// Compute result sets from the procedure name and parameters
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &[NamedParam]) -> Result<Vec<Vec<ResultRow>>, AppError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            scalar: Ok(None),
            fail_after_rows: None,
            log: Arc::new(FakeLog::default()),
        }
    }

    /// Every call fails as if the server were unreachable
    pub fn failing(message: &'static str) -> Self {
        let mut store = Self::with_handler(move |_, _| Err(AppError::Internal(message.to_string())));
        store.scalar = Err(message.to_string());
        store
    }

    pub fn scalar_result(mut self, value: Option<i64>) -> Self {
        self.scalar = Ok(value);
        self
    }

    /// Make readers fault after handing out `rows` rows
    pub fn fail_after_rows(mut self, rows: usize) -> Self {
        self.fail_after_rows = Some(rows);
        self
    }

    fn record(&self, procedure: &str, params: &[NamedParam]) {
        self.log
            .calls
            .lock()
            .unwrap()
            .push((procedure.to_string(), params.to_vec()));
    }
}

#[async_trait]
impl RosterStore for FakeStore {
    async fn open(
        &self,
        procedure: &str,
        params: &[NamedParam],
    ) -> Result<Box<dyn ResultSetReader>, AppError> {
        self.record(procedure, params);
        let sets = (self.handler)(procedure, params)?;

        Ok(Box::new(FakeReader {
            sets: sets.into_iter().collect(),
            current: None,
            started: false,
            rows_served: 0,
            fail_after_rows: self.fail_after_rows,
            log: Arc::clone(&self.log),
        }))
    }

    async fn scalar(&self, procedure: &str, params: &[NamedParam]) -> Result<Option<i64>, AppError> {
        self.record(procedure, params);
        self.scalar.clone().map_err(AppError::Internal)
    }

    async fn catalog(&self) -> Result<StoreCatalog, AppError> {
        match &self.scalar {
            Err(message) => Err(AppError::Internal(message.clone())),
            Ok(_) => Ok(StoreCatalog {
                database: "roster_test".to_string(),
                tables: vec![
                    "portal_users".to_string(),
                    "student".to_string(),
                    "teacher_schedule".to_string(),
                    "users".to_string(),
                ],
            }),
        }
    }
}

struct FakeReader {
    sets: VecDeque<Vec<ResultRow>>,
    current: Option<VecDeque<ResultRow>>,
    started: bool,
    rows_served: usize,
    fail_after_rows: Option<usize>,
    log: Arc<FakeLog>,
}

#[async_trait]
impl ResultSetReader for FakeReader {
    async fn next_row(&mut self) -> Result<Option<ResultRow>, AppError> {
        if self.current.is_none() {
            if self.started {
                return Ok(None);
            }
            self.started = true;
            match self.sets.pop_front() {
                Some(rows) => {
                    self.log.sets_fetched.fetch_add(1, Ordering::SeqCst);
                    self.current = Some(rows.into_iter().collect());
                }
                None => return Ok(None),
            }
        }

        if self.fail_after_rows == Some(self.rows_served) {
            return Err(AppError::Internal("connection reset by peer".to_string()));
        }

        let row = self.current.as_mut().and_then(|rows| rows.pop_front());
        if row.is_some() {
            self.rows_served += 1;
        }
        Ok(row)
    }

    async fn next_result(&mut self) -> Result<bool, AppError> {
        // Skip the unread current set, if it was never pulled
        if !self.started {
            self.sets.pop_front();
        }
        self.current = None;
        self.started = false;
        Ok(!self.sets.is_empty())
    }

    async fn close(&mut self) -> Result<(), AppError> {
        self.sets.clear();
        self.current = None;
        self.log.readers_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
