use crate::{
    executor::{
        DatabaseSchema, Executor, ExecutorError, KeyRequest, KeyedRecordRequest, KeysRequest,
        QueryRequest, RecordRequest, RecordsRequest, StorageEstimate,
    },
    predicate::{FieldPresence, Predicate, Row, eval},
    query::{OpCode, WireOp},
    value::{Value, from_json},
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

///
/// MemoryExecutor
///
/// In-process reference implementation of the executor contract.
///
/// Exists to pin the boundary semantics (filter first, then staged
/// operations in the exact supplied order, true `Take_Last`) and to give
/// tests and examples a storage engine without a transport. Not a
/// persistence layer.
///

#[derive(Default)]
pub struct MemoryExecutor {
    databases: RwLock<HashMap<String, MemDatabase>>,
}

#[derive(Default)]
struct MemDatabase {
    stores: HashMap<String, MemStore>,
}

struct MemStore {
    key_path: Vec<String>,
    auto_increment: bool,
    next_auto: u64,
    rows: Vec<serde_json::Value>,
}

impl MemStore {
    fn key_of(&self, row: &serde_json::Value) -> Value {
        let parts: Vec<Value> = self
            .key_path
            .iter()
            .map(|path| from_json(row.get(path).unwrap_or(&serde_json::Value::Null)))
            .collect();

        if parts.len() == 1 {
            parts.into_iter().next().unwrap_or(Value::Null)
        } else {
            Value::List(parts)
        }
    }

    fn position_of(&self, key: &Value) -> Option<usize> {
        self.rows.iter().position(|row| self.key_of(row).same_key(key))
    }
}

trait SameKey {
    fn same_key(&self, other: &Value) -> bool;
}

impl SameKey for Value {
    // Compound keys compare part-wise with family-aware equality.
    fn same_key(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
            }
            _ => self.same(other),
        }
    }
}

///
/// JsonRow
/// Adapter that lets predicate evaluation run over raw JSON rows.
///

struct JsonRow<'a>(&'a serde_json::Value);

impl Row for JsonRow<'_> {
    fn field(&self, name: &str) -> FieldPresence {
        match self.0.get(name) {
            Some(value) => FieldPresence::Present(from_json(value)),
            None => FieldPresence::Missing,
        }
    }
}

impl MemoryExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_store<T>(
        &self,
        database: &str,
        store: &str,
        f: impl FnOnce(&mut MemStore) -> Result<T, ExecutorError>,
    ) -> Result<T, ExecutorError> {
        let mut databases = self.databases.write().await;
        let db = databases
            .get_mut(database)
            .ok_or_else(|| ExecutorError::rejected(format!("unknown database '{database}'")))?;
        let mem_store = db
            .stores
            .get_mut(store)
            .ok_or_else(|| ExecutorError::rejected(format!("unknown store '{store}'")))?;

        f(mem_store)
    }

    fn insert_row(
        mem_store: &mut MemStore,
        mut record: serde_json::Value,
    ) -> Result<Value, ExecutorError> {
        if mem_store.auto_increment {
            let path = &mem_store.key_path[0];
            let missing = matches!(
                record.get(path.as_str()),
                None | Some(serde_json::Value::Null)
            );
            if missing {
                let assigned = mem_store.next_auto;
                mem_store.next_auto += 1;
                if let Some(object) = record.as_object_mut() {
                    object.insert(path.clone(), serde_json::json!(assigned));
                }
            }
        }

        let key = mem_store.key_of(&record);
        if !matches!(key, Value::Null) && mem_store.position_of(&key).is_some() {
            return Err(ExecutorError::rejected(format!(
                "key {key} already exists"
            )));
        }

        mem_store.rows.push(record);

        // Explicit numeric keys advance the generator, as IndexedDB's key
        // generator does, so later auto-assigned keys never collide.
        if mem_store.auto_increment {
            let explicit = match &key {
                Value::Uint(n) => Some(*n),
                Value::Int(n) => u64::try_from(*n).ok(),
                _ => None,
            };
            if let Some(n) = explicit {
                mem_store.next_auto = mem_store.next_auto.max(n.saturating_add(1));
            }
        }

        Ok(key)
    }

    fn apply_operations(
        rows: &mut Vec<serde_json::Value>,
        operations: &[WireOp],
    ) -> Result<(), ExecutorError> {
        for op in operations {
            match op.op {
                OpCode::OrderBy => sort_rows(rows, op, false)?,
                OpCode::OrderByDescending => sort_rows(rows, op, true)?,
                OpCode::Skip => {
                    let n = count_operand(op)?.min(rows.len());
                    rows.drain(0..n);
                }
                OpCode::Take => {
                    rows.truncate(count_operand(op)?);
                }
                OpCode::TakeLast => {
                    let n = count_operand(op)?;
                    if rows.len() > n {
                        let cut = rows.len() - n;
                        rows.drain(0..cut);
                    }
                }
                OpCode::First => rows.truncate(1),
                OpCode::Last => {
                    if rows.len() > 1 {
                        let cut = rows.len() - 1;
                        rows.drain(0..cut);
                    }
                }
            }
        }

        Ok(())
    }
}

fn count_operand(op: &WireOp) -> Result<usize, ExecutorError> {
    match &op.value {
        Some(Value::Uint(n)) => usize::try_from(*n)
            .map_err(|_| ExecutorError::malformed(format!("operand overflow for {:?}", op.op))),
        Some(Value::Int(n)) => usize::try_from(*n)
            .map_err(|_| ExecutorError::malformed(format!("operand overflow for {:?}", op.op))),
        _ => Err(ExecutorError::malformed(format!(
            "missing count operand for {:?}",
            op.op
        ))),
    }
}

fn sort_rows(
    rows: &mut [serde_json::Value],
    op: &WireOp,
    descending: bool,
) -> Result<(), ExecutorError> {
    let Some(Value::Text(field)) = &op.value else {
        return Err(ExecutorError::malformed(format!(
            "missing field operand for {:?}",
            op.op
        )));
    };

    // Stable sort; incomparable pairs keep their relative order.
    rows.sort_by(|a, b| {
        let left = from_json(a.get(field.as_str()).unwrap_or(&serde_json::Value::Null));
        let right = from_json(b.get(field.as_str()).unwrap_or(&serde_json::Value::Null));
        let ordering = left.compare(&right).unwrap_or(Ordering::Equal);
        if descending { ordering.reverse() } else { ordering }
    });

    Ok(())
}

fn dedupe_rows(rows: &mut Vec<serde_json::Value>) {
    let mut seen: Vec<String> = Vec::with_capacity(rows.len());
    rows.retain(|row| {
        let encoded = row.to_string();
        if seen.contains(&encoded) {
            false
        } else {
            seen.push(encoded);
            true
        }
    });
}

#[async_trait]
impl Executor for MemoryExecutor {
    async fn query(&self, request: QueryRequest) -> Result<Vec<serde_json::Value>, ExecutorError> {
        let predicate = match &request.predicate {
            Some(wire) => Some(
                serde_json::from_str::<Predicate>(wire)
                    .map_err(|err| ExecutorError::malformed(format!("bad predicate: {err}")))?,
            ),
            None => None,
        };

        let mut rows = self
            .with_store(&request.database, &request.store, |mem_store| {
                Ok(mem_store.rows.clone())
            })
            .await?;

        if let Some(predicate) = &predicate {
            rows.retain(|row| eval(&JsonRow(row), predicate));
        }

        Self::apply_operations(&mut rows, &request.operations)?;

        if request.results_unique {
            dedupe_rows(&mut rows);
        }

        trace!(
            store = %request.store,
            rows = rows.len(),
            "memory executor answered query"
        );

        Ok(rows)
    }

    async fn get_by_key(
        &self,
        request: KeyRequest,
    ) -> Result<Option<serde_json::Value>, ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            Ok(mem_store
                .position_of(&request.key)
                .map(|pos| mem_store.rows[pos].clone()))
        })
        .await
    }

    async fn insert(&self, request: RecordRequest) -> Result<Value, ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            Self::insert_row(mem_store, request.record)
        })
        .await
    }

    async fn insert_many(&self, request: RecordsRequest) -> Result<(), ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            for record in request.records {
                Self::insert_row(mem_store, record)?;
            }
            Ok(())
        })
        .await
    }

    async fn update(&self, request: KeyedRecordRequest) -> Result<u32, ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            match mem_store.position_of(&request.key) {
                Some(pos) => {
                    mem_store.rows[pos] = request.record;
                    Ok(1)
                }
                None => Ok(0),
            }
        })
        .await
    }

    async fn update_many(&self, requests: Vec<KeyedRecordRequest>) -> Result<u32, ExecutorError> {
        let mut touched = 0;
        for request in requests {
            touched += self.update(request).await?;
        }
        Ok(touched)
    }

    async fn delete(&self, request: KeyRequest) -> Result<(), ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            if let Some(pos) = mem_store.position_of(&request.key) {
                mem_store.rows.remove(pos);
            }
            Ok(())
        })
        .await
    }

    async fn delete_many(&self, request: KeysRequest) -> Result<u32, ExecutorError> {
        self.with_store(&request.database, &request.store, |mem_store| {
            let mut removed = 0;
            for key in &request.keys {
                if let Some(pos) = mem_store.position_of(key) {
                    mem_store.rows.remove(pos);
                    removed += 1;
                }
            }
            Ok(removed)
        })
        .await
    }

    async fn clear_store(&self, database: &str, store: &str) -> Result<(), ExecutorError> {
        self.with_store(database, store, |mem_store| {
            mem_store.rows.clear();
            Ok(())
        })
        .await
    }

    async fn storage_estimate(&self, database: &str) -> Result<StorageEstimate, ExecutorError> {
        let databases = self.databases.read().await;
        let db = databases
            .get(database)
            .ok_or_else(|| ExecutorError::rejected(format!("unknown database '{database}'")))?;

        let bytes: usize = db
            .stores
            .values()
            .flat_map(|mem_store| mem_store.rows.iter())
            .map(|row| row.to_string().len())
            .sum();

        #[allow(clippy::cast_precision_loss)]
        let usage_mb = bytes as f64 / 1_000_000.0;

        Ok(StorageEstimate {
            quota_mb: 512.0,
            usage_mb,
        })
    }

    async fn create_database(&self, schema: DatabaseSchema) -> Result<(), ExecutorError> {
        let mut databases = self.databases.write().await;
        let db = databases.entry(schema.name.clone()).or_default();

        for store_schema in schema.stores {
            db.stores
                .entry(store_schema.name.clone())
                .or_insert_with(|| MemStore {
                    key_path: store_schema.key_path,
                    auto_increment: store_schema.auto_increment,
                    next_auto: 1,
                    rows: Vec::new(),
                });
        }

        Ok(())
    }

    async fn drop_database(&self, database: &str) -> Result<(), ExecutorError> {
        let mut databases = self.databases.write().await;
        databases.remove(database);
        Ok(())
    }
}
