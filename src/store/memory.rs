//! In-process table
//!
//! Behaves like the hosted service (server-assigned ids, newest-first
//! listing) and records every call it receives. Individual operations can be
//! made to fail, which is how the controller's degradation paths are driven
//! in tests.

use std::collections::HashSet;

use jiff::Timestamp;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Fields, ListItem};

use super::error::StoreApiError;
use super::row::{Row, row_from_fields, row_from_item};
use super::RemoteStore;

/// Operation kinds, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Insert,
    Update,
    Delete,
}

/// A call received by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Insert(Fields),
    Update(String, Fields),
    Delete(String),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::List => StoreOp::List,
            StoreCall::Insert(_) => StoreOp::Insert,
            StoreCall::Update(..) => StoreOp::Update,
            StoreCall::Delete(_) => StoreOp::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// (insertion sequence, row)
    rows: Vec<(u64, Row)>,
    next_seq: u64,
    failing: HashSet<StoreOp>,
    calls: Vec<StoreCall>,
}

#[derive(Debug)]
pub struct MemoryStore {
    table: String,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Pre-populate with existing items, keeping their ids and timestamps
    pub fn with_items(table: impl Into<String>, items: &[ListItem]) -> Self {
        let store = Self::new(table);
        {
            let mut inner = store.inner.lock();
            for item in items {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                inner.rows.push((seq, row_from_item(item)));
            }
        }
        store
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Make every subsequent call of `op` fail until cleared
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut inner = self.inner.lock();
        if failing {
            inner.failing.insert(op);
        } else {
            inner.failing.remove(&op);
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls other than `List`
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.op() != StoreOp::List)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().rows.is_empty()
    }

    /// Current value of one column of one row
    pub fn value(&self, id: &str, column: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .rows
            .iter()
            .find(|(_, row)| row_id(row) == Some(id))
            .and_then(|(_, row)| row.get(column))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Record the call and report whether it should fail
    fn record(&self, inner: &mut Inner, call: StoreCall) -> Result<()> {
        let op = call.op();
        inner.calls.push(call);
        if inner.failing.contains(&op) {
            return Err(StoreApiError::with_status(
                format!("{op:?} rejected"),
                self.table.clone(),
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )
            .into());
        }
        Ok(())
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn row_created_at(row: &Row) -> Timestamp {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(Timestamp::UNIX_EPOCH)
}

impl RemoteStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Row>> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, StoreCall::List)?;

        let mut rows: Vec<(Timestamp, u64, Row)> = inner
            .rows
            .iter()
            .map(|(seq, row)| (row_created_at(row), *seq, row.clone()))
            .collect();
        rows.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn insert(&self, fields: &Fields) -> Result<()> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, StoreCall::Insert(fields.clone()))?;

        let mut row = row_from_fields(fields);
        row.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
        row.insert(
            "created_at".to_string(),
            Value::String(Timestamp::now().to_string()),
        );
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.rows.push((seq, row));
        Ok(())
    }

    async fn update(&self, id: &str, patch: &Fields) -> Result<()> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, StoreCall::Update(id.to_string(), patch.clone()))?;

        // Like the hosted service, a filter matching no rows is not an error
        if let Some((_, row)) = inner.rows.iter_mut().find(|(_, r)| row_id(r) == Some(id)) {
            for (k, v) in patch {
                row.insert(k.clone(), Value::String(v.clone()));
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        self.record(&mut inner, StoreCall::Delete(id.to_string()))?;
        inner.rows.retain(|(_, r)| row_id(r) != Some(id));
        Ok(())
    }
}
