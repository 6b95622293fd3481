use crate::{
    executor::{
        DatabaseSchema, Executor, ExecutorError, KeyRequest, KeyedRecordRequest, KeysRequest,
        QueryRequest, RecordRequest, RecordsRequest, StorageEstimate, StoreSchema,
    },
    model::{
        catalog,
        key::{KeyError, extract_key},
        record::RecordModel,
    },
    query::{Query, QueryPlan, StagedOp},
    traits::RecordKind,
    value::Value,
};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::debug;

// Re-exported so downstream callers can attach tokens without depending
// on tokio-util themselves.
pub use tokio_util::sync::CancellationToken;

///
/// Session
///
/// Handle to one named database behind an executor. All typed access
/// flows through here: queries via [`Session::query`], record access via
/// the keyed operations below.
///
/// Every keyed operation validates the key shape against the record's
/// model before dispatch, so a malformed key never crosses the boundary.
///

pub struct Session {
    database: String,
    executor: Arc<dyn Executor>,
}

impl Session {
    /// Wrap an executor without touching it. Use [`Session::open`] when the
    /// executor should be told about the store layout first.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            executor,
        }
    }

    /// Open a session and create the database from every registered record
    /// model. Register models first by touching them, for example with
    /// [`catalog::describe`].
    pub async fn open(
        executor: Arc<dyn Executor>,
        database: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let session = Self::new(executor, database);
        let stores: Vec<StoreSchema> = catalog::registered_models()
            .into_iter()
            .map(store_schema)
            .collect();

        debug!(database = %session.database, stores = stores.len(), "creating database");

        session
            .executor
            .create_database(DatabaseSchema {
                name: session.database.clone(),
                version: 1,
                stores,
            })
            .await?;

        Ok(session)
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Start a typed query against `R`'s store.
    #[must_use]
    pub fn query<R: RecordKind>(&self) -> Query<'_, R> {
        catalog::describe::<R>();
        Query::new(self)
    }

    /// Fetch one record by primary key.
    pub async fn get<R: RecordKind>(
        &self,
        key: impl Into<Value>,
    ) -> Result<Option<R>, SessionError> {
        let key = key.into();
        R::MODEL.primary_key.validate(R::MODEL.record_name, &key)?;

        let row = self
            .executor
            .get_by_key(self.key_request::<R>(key))
            .await?;

        match row {
            Some(row) => Ok(Some(decode_row::<R>(row)?)),
            None => Ok(None),
        }
    }

    /// Insert one record, returning the key it is stored under.
    ///
    /// An auto-increment key may be left at its zero value; every other
    /// key must be resolvable from the record before dispatch.
    pub async fn insert<R: RecordKind>(&self, record: &R) -> Result<Value, SessionError> {
        if !R::MODEL.primary_key.auto_increment() {
            extract_key(R::MODEL, record)?;
        }

        let key = self
            .executor
            .insert(RecordRequest {
                database: self.database.clone(),
                store: R::store_name().to_string(),
                record: encode_record(record)?,
            })
            .await?;

        debug!(store = R::store_name(), %key, "inserted record");
        Ok(key)
    }

    pub async fn insert_many<R: RecordKind>(&self, records: &[R]) -> Result<(), SessionError> {
        if !R::MODEL.primary_key.auto_increment() {
            for record in records {
                extract_key(R::MODEL, record)?;
            }
        }

        let encoded = records
            .iter()
            .map(encode_record)
            .collect::<Result<Vec<_>, _>>()?;

        self.executor
            .insert_many(RecordsRequest {
                database: self.database.clone(),
                store: R::store_name().to_string(),
                records: encoded,
            })
            .await?;

        Ok(())
    }

    /// Replace the stored record with the same primary key. Returns the
    /// number of records touched (zero when the key is absent).
    pub async fn update<R: RecordKind>(&self, record: &R) -> Result<u32, SessionError> {
        let key = extract_key(R::MODEL, record)?;

        let touched = self
            .executor
            .update(KeyedRecordRequest {
                database: self.database.clone(),
                store: R::store_name().to_string(),
                key,
                record: encode_record(record)?,
            })
            .await?;

        Ok(touched)
    }

    pub async fn update_many<R: RecordKind>(&self, records: &[R]) -> Result<u32, SessionError> {
        let mut requests = Vec::with_capacity(records.len());
        for record in records {
            requests.push(KeyedRecordRequest {
                database: self.database.clone(),
                store: R::store_name().to_string(),
                key: extract_key(R::MODEL, record)?,
                record: encode_record(record)?,
            });
        }

        Ok(self.executor.update_many(requests).await?)
    }

    pub async fn delete<R: RecordKind>(&self, key: impl Into<Value>) -> Result<(), SessionError> {
        let key = key.into();
        R::MODEL.primary_key.validate(R::MODEL.record_name, &key)?;

        self.executor.delete(self.key_request::<R>(key)).await?;
        Ok(())
    }

    pub async fn delete_many<R: RecordKind>(
        &self,
        keys: Vec<Value>,
    ) -> Result<u32, SessionError> {
        for key in &keys {
            R::MODEL.primary_key.validate(R::MODEL.record_name, key)?;
        }

        let removed = self
            .executor
            .delete_many(KeysRequest {
                database: self.database.clone(),
                store: R::store_name().to_string(),
                keys,
            })
            .await?;

        Ok(removed)
    }

    pub async fn clear_store<R: RecordKind>(&self) -> Result<(), SessionError> {
        self.executor
            .clear_store(&self.database, R::store_name())
            .await?;
        Ok(())
    }

    pub async fn storage_estimate(&self) -> Result<StorageEstimate, SessionError> {
        Ok(self.executor.storage_estimate(&self.database).await?)
    }

    pub async fn drop_database(&self) -> Result<(), SessionError> {
        self.executor.drop_database(&self.database).await?;
        Ok(())
    }

    /// Ship a finished plan to the executor, racing it against the
    /// cancellation token when one is attached.
    pub(crate) async fn execute_plan(
        &self,
        plan: &QueryPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<serde_json::Value>, ExecutorError> {
        let predicate = plan
            .predicate
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| ExecutorError::malformed(format!("predicate does not encode: {err}")))?;

        let request = QueryRequest {
            database: self.database.clone(),
            store: plan.store.clone(),
            predicate,
            operations: plan.ops.iter().map(StagedOp::to_wire).collect(),
            results_unique: plan.results_unique,
        };

        match cancel {
            Some(token) if token.is_cancelled() => Err(ExecutorError::Cancelled),
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(ExecutorError::Cancelled),
                result = self.executor.query(request) => result,
            },
            None => self.executor.query(request).await,
        }
    }

    fn key_request<R: RecordKind>(&self, key: Value) -> KeyRequest {
        KeyRequest {
            database: self.database.clone(),
            store: R::store_name().to_string(),
            key,
        }
    }
}

fn store_schema(model: &'static RecordModel) -> StoreSchema {
    let key_names = model.primary_key.field_names();

    StoreSchema {
        name: model.store_name.to_string(),
        key_path: model
            .key_wire_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        auto_increment: model.primary_key.auto_increment(),
        unique_indexes: model
            .fields
            .iter()
            .filter(|field| field.unique && !key_names.contains(&field.name))
            .map(|field| field.wire_name.to_string())
            .collect(),
        indexes: model
            .fields
            .iter()
            .filter(|field| {
                field.indexed && !field.unique && !key_names.contains(&field.name)
            })
            .map(|field| field.wire_name.to_string())
            .collect(),
    }
}

fn encode_record<R: RecordKind>(record: &R) -> Result<serde_json::Value, SessionError> {
    serde_json::to_value(record).map_err(|err| SessionError::Encode {
        record: R::MODEL.record_name,
        source: err,
    })
}

fn decode_row<R: RecordKind>(row: serde_json::Value) -> Result<R, SessionError> {
    serde_json::from_value(row).map_err(|err| {
        SessionError::Executor(ExecutorError::malformed(format!(
            "row does not decode as {}: {err}",
            R::MODEL.record_name
        )))
    })
}

///
/// SessionError
///

#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("record '{record}' does not encode as JSON: {source}")]
    Encode {
        record: &'static str,
        source: serde_json::Error,
    },
}
