//! Remote table access.
//!
//! Each collection lives in a hosted, schema-less-to-the-client table. The
//! [`RemoteStore`] trait is the only contract the list controller depends on;
//! [`RestTable`] talks to the hosted service and [`MemoryStore`] keeps rows
//! in process.

pub mod error;
pub mod memory;
pub mod rest;
pub mod row;

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::types::Fields;

pub use error::StoreApiError;
pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use rest::RestTable;
pub use row::{Row, item_from_row, items_from_rows, row_from_fields, row_from_item};

/// Common interface for one remote collection
pub trait RemoteStore: Send + Sync {
    /// Fetch every row, newest `created_at` first
    fn list(&self) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Insert a new row; the server assigns `id` and `created_at`
    fn insert(&self, row: &Fields) -> impl Future<Output = Result<()>> + Send;

    /// Apply a patch to the row with the given id
    fn update(&self, id: &str, patch: &Fields) -> impl Future<Output = Result<()>> + Send;

    /// Delete the row with the given id
    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<S: RemoteStore> RemoteStore for Arc<S> {
    fn list(&self) -> impl Future<Output = Result<Vec<Row>>> + Send {
        (**self).list()
    }

    fn insert(&self, row: &Fields) -> impl Future<Output = Result<()>> + Send {
        (**self).insert(row)
    }

    fn update(&self, id: &str, patch: &Fields) -> impl Future<Output = Result<()>> + Send {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(id)
    }
}
