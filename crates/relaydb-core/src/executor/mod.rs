//! The executor boundary.
//!
//! An executor is the external storage engine that applies a compiled
//! plan and answers the companion pass-through calls. RelayDB never
//! implements storage itself; the `Executor` trait is the full contract,
//! and `MemoryExecutor` is the in-process reference used by tests.

mod memory;

use crate::{query::WireOp, value::Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

pub use memory::MemoryExecutor;

///
/// Executor
///
/// Async boundary to the storage engine. Every method is a single-shot
/// request/response round trip; retry policy, if any, belongs to the
/// transport behind the implementation, never to this layer.
///
/// Contract for `query`: apply the predicate filter first, then the
/// staged operations in the exact supplied order. "No rows" is an empty
/// collection, never an error.
///

#[async_trait]
pub trait Executor: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<Vec<serde_json::Value>, ExecutorError>;

    async fn get_by_key(
        &self,
        request: KeyRequest,
    ) -> Result<Option<serde_json::Value>, ExecutorError>;

    /// Insert one record; returns the stored key (assigned by the store
    /// for auto-increment keys).
    async fn insert(&self, request: RecordRequest) -> Result<Value, ExecutorError>;

    async fn insert_many(&self, request: RecordsRequest) -> Result<(), ExecutorError>;

    /// Update the record addressed by key; returns the number of rows
    /// touched (0 or 1).
    async fn update(&self, request: KeyedRecordRequest) -> Result<u32, ExecutorError>;

    async fn update_many(&self, requests: Vec<KeyedRecordRequest>) -> Result<u32, ExecutorError>;

    async fn delete(&self, request: KeyRequest) -> Result<(), ExecutorError>;

    async fn delete_many(&self, request: KeysRequest) -> Result<u32, ExecutorError>;

    async fn clear_store(&self, database: &str, store: &str) -> Result<(), ExecutorError>;

    async fn storage_estimate(&self, database: &str) -> Result<StorageEstimate, ExecutorError>;

    async fn create_database(&self, schema: DatabaseSchema) -> Result<(), ExecutorError>;

    async fn drop_database(&self, database: &str) -> Result<(), ExecutorError>;
}

///
/// QueryRequest
///
/// The compiled-plan request shape (§6 of the wire contract).
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub database: String,
    pub store: String,
    pub predicate: Option<String>,
    pub operations: Vec<WireOp>,
    pub results_unique: bool,
}

///
/// KeyRequest
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyRequest {
    pub database: String,
    pub store: String,
    pub key: Value,
}

///
/// KeysRequest
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeysRequest {
    pub database: String,
    pub store: String,
    pub keys: Vec<Value>,
}

///
/// RecordRequest
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordRequest {
    pub database: String,
    pub store: String,
    pub record: serde_json::Value,
}

///
/// RecordsRequest
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordsRequest {
    pub database: String,
    pub store: String,
    pub records: Vec<serde_json::Value>,
}

///
/// KeyedRecordRequest
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyedRecordRequest {
    pub database: String,
    pub store: String,
    pub key: Value,
    pub record: serde_json::Value,
}

///
/// StorageEstimate
/// Quota and usage in megabytes, as reported by the store.
///

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageEstimate {
    pub quota_mb: f64,
    pub usage_mb: f64,
}

///
/// DatabaseSchema
///
/// Store layout shipped to the executor at database creation time.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub name: String,
    pub version: u32,
    pub stores: Vec<StoreSchema>,
}

///
/// StoreSchema
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSchema {
    pub name: String,
    /// Primary key path in wire names; more than one entry means a
    /// compound key.
    pub key_path: Vec<String>,
    pub auto_increment: bool,
    pub unique_indexes: Vec<String>,
    pub indexes: Vec<String>,
}

///
/// ExecutorError
///
/// Boundary failures, propagated to the caller unchanged.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ExecutorError {
    #[error("executor transport failed: {message}")]
    Transport { message: String },

    #[error("executor returned malformed data: {message}")]
    Malformed { message: String },

    #[error("executor rejected the request: {message}")]
    Rejected { message: String },

    #[error("executor call was cancelled")]
    Cancelled,
}

impl ExecutorError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
