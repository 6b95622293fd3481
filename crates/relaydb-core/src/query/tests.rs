use crate::{
    executor::MemoryExecutor,
    predicate::Predicate,
    query::{OpCode, QueryError, QueryPlan, StagedOp},
    session::Session,
    test_fixtures::{Person, Track},
    value::Value,
};
use std::sync::Arc;

fn session() -> Session {
    Session::new(Arc::new(MemoryExecutor::new()), "app")
}

#[test]
fn chaining_never_mutates_the_receiver() {
    let session = session();
    let base = session.query::<Person>();

    let adults = base.filter(Predicate::gt("age", 18));
    let minors = base.filter(Predicate::lt("age", 18)).take(5);

    // Both branches grew from the same snapshot independently.
    assert!(base.plan().unwrap().predicate.is_none());
    assert!(base.plan().unwrap().ops.is_empty());

    let adults = adults.plan().unwrap();
    let minors = minors.plan().unwrap();
    assert_eq!(adults.predicate, Some(Predicate::gt("age", 18)));
    assert_eq!(adults.ops, vec![]);
    assert_eq!(minors.ops, vec![StagedOp::Take(5)]);
}

#[test]
fn plan_preserves_call_order() {
    let session = session();
    let plan = session
        .query::<Person>()
        .filter(Predicate::gt("age", 30))
        .order_by("age")
        .unwrap()
        .skip(1)
        .take(2)
        .take_last(1)
        .plan()
        .unwrap();

    assert_eq!(plan.store, "people");
    assert_eq!(
        plan.ops,
        vec![
            StagedOp::OrderBy("age".to_string()),
            StagedOp::Skip(1),
            StagedOp::Take(2),
            StagedOp::TakeLast(1),
        ]
    );
    assert!(plan.results_unique);
}

#[test]
fn multiple_filters_fold_into_one_conjunction() {
    let session = session();
    let plan = session
        .query::<Person>()
        .filter(Predicate::gt("age", 30))
        .filter(Predicate::starts_with("name", "a"))
        .plan()
        .unwrap();

    assert_eq!(
        plan.predicate,
        Some(Predicate::And(vec![
            Predicate::gt("age", 30),
            Predicate::starts_with("name", "a"),
        ]))
    );
}

#[test]
fn plan_rewrites_predicate_fields_to_wire_names() {
    let session = session();
    let plan = session
        .query::<Track>()
        .filter(Predicate::gt("plays", 10_u64))
        .plan()
        .unwrap();

    // Filtering and ordering must cross the boundary under the same name.
    assert_eq!(plan.predicate, Some(Predicate::gt("playCount", 10_u64)));

    let ordered = session
        .query::<Track>()
        .order_by("plays")
        .unwrap()
        .plan()
        .unwrap();
    assert_eq!(ordered.ops, vec![StagedOp::OrderBy("playCount".to_string())]);
}

#[test]
fn unknown_predicate_field_fails_at_plan_time() {
    let session = session();
    let result = session
        .query::<Person>()
        .filter(Predicate::eq("ssn", "x"))
        .plan();

    assert!(matches!(result, Err(QueryError::Predicate(_))));
}

#[test]
fn ordering_requires_an_orderable_field() {
    let session = session();
    let result = session.query::<Person>().order_by("name");

    // "name" is declared without an index, so ordering is refused before
    // anything is staged.
    assert!(matches!(
        result,
        Err(QueryError::UnorderableField { field, .. }) if field == "name"
    ));
}

#[test]
fn wire_spellings_are_stable() {
    let session = session();
    let plan = session
        .query::<Person>()
        .order_by("age")
        .unwrap()
        .order_by_desc("age")
        .unwrap()
        .skip(3)
        .take(4)
        .take_last(2)
        .plan()
        .unwrap();

    let wire = plan.serialize().unwrap();
    for spelling in [
        "\"Order_By\"",
        "\"Order_By_Descending\"",
        "\"Skip\"",
        "\"Take\"",
        "\"Take_Last\"",
    ] {
        assert!(wire.contains(spelling), "missing {spelling} in {wire}");
    }
}

#[test]
fn take_last_is_not_an_alias_for_skip() {
    let take_last = StagedOp::TakeLast(4).to_wire();
    let skip = StagedOp::Skip(4).to_wire();

    assert_eq!(take_last.op, OpCode::TakeLast);
    assert_eq!(skip.op, OpCode::Skip);
    assert_ne!(take_last.op, skip.op);
    assert_eq!(take_last.value, Some(Value::Uint(4)));
}

#[test]
fn plans_round_trip_through_the_codec() {
    let session = session();
    let plan = session
        .query::<Person>()
        .filter(Predicate::gte("age", 21))
        .order_by_desc("age")
        .unwrap()
        .take(10)
        .results_not_unique()
        .plan()
        .unwrap();

    let decoded = QueryPlan::deserialize(&plan.serialize().unwrap()).unwrap();
    assert_eq!(decoded, plan);
    assert!(!decoded.results_unique);
}

#[test]
fn codec_rejects_foreign_versions() {
    let wire = r#"{"v":99,"store":"people","predicate":null,"operations":[],"results_unique":true}"#;
    let result = QueryPlan::deserialize(wire);
    assert!(matches!(
        result,
        Err(crate::query::PlanCodecError::VersionMismatch { found: 99 })
    ));
}

mod terminals {
    use super::*;
    use crate::{
        executor::{
            DatabaseSchema, Executor, ExecutorError, KeyRequest, KeyedRecordRequest, KeysRequest,
            QueryRequest, RecordRequest, RecordsRequest, StorageEstimate,
        },
        model::catalog,
    };
    use futures::StreamExt;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    async fn seeded() -> Session {
        let session = Session::open(Arc::new(MemoryExecutor::new()), "app")
            .await
            .unwrap();
        session
            .insert_many(&[
                Person::new(1, 20, "dora"),
                Person::new(2, 35, "carol"),
                Person::new(3, 40, "bob"),
                Person::new(4, 50, "alice"),
            ])
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn staged_operations_apply_after_the_filter() {
        let session = seeded().await;
        let rows = session
            .query::<Person>()
            .filter(Predicate::gt("age", 30))
            .order_by("age")
            .unwrap()
            .skip(1)
            .take(2)
            .to_vec()
            .await
            .unwrap();

        let ages: Vec<i64> = rows.iter().map(|p| p.age).collect();
        assert_eq!(ages, [40, 50]);
    }

    #[tokio::test]
    async fn take_last_keeps_the_tail() {
        let session = seeded().await;
        let rows = session
            .query::<Person>()
            .order_by("age")
            .unwrap()
            .take_last(2)
            .to_vec()
            .await
            .unwrap();

        let ages: Vec<i64> = rows.iter().map(|p| p.age).collect();
        assert_eq!(ages, [40, 50]);
    }

    #[tokio::test]
    async fn count_matches_to_vec_length() {
        let session = seeded().await;
        let query = session.query::<Person>().filter(Predicate::lte("age", 35));

        assert_eq!(query.count().await.unwrap(), query.to_vec().await.unwrap().len());
    }

    #[tokio::test]
    async fn stream_pulls_the_materialized_rows() {
        let session = seeded().await;
        let mut names: Vec<String> = session
            .query::<Person>()
            .filter(Predicate::gte("age", 40))
            .stream()
            .await
            .unwrap()
            .map(|p| p.name)
            .collect()
            .await;
        names.sort();

        assert_eq!(names, ["alice", "bob"]);
    }

    #[tokio::test]
    async fn renamed_fields_filter_and_order_consistently() {
        catalog::describe::<Track>();
        let session = Session::open(Arc::new(MemoryExecutor::new()), "app")
            .await
            .unwrap();
        session
            .insert_many(&[Track::new(1, 5, "b-side"), Track::new(2, 25, "hit")])
            .await
            .unwrap();

        let rows = session
            .query::<Track>()
            .filter(Predicate::gt("plays", 10_u64))
            .to_vec()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "hit");

        let ordered = session
            .query::<Track>()
            .order_by_desc("plays")
            .unwrap()
            .to_vec()
            .await
            .unwrap();
        let plays: Vec<u64> = ordered.iter().map(|t| t.plays).collect();
        assert_eq!(plays, [25, 5]);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_dispatch() {
        let session = seeded().await;
        let token = CancellationToken::new();
        token.cancel();

        let result = session
            .query::<Person>()
            .with_cancellation(token)
            .to_vec()
            .await;

        assert!(matches!(
            result,
            Err(QueryError::Executor(ExecutorError::Cancelled))
        ));
    }

    /// Executor whose `query` never answers; every other entry point is
    /// unreachable in these tests.
    struct StallExecutor;

    #[async_trait::async_trait]
    impl Executor for StallExecutor {
        async fn query(
            &self,
            _: QueryRequest,
        ) -> Result<Vec<serde_json::Value>, ExecutorError> {
            futures::future::pending().await
        }

        async fn get_by_key(
            &self,
            _: KeyRequest,
        ) -> Result<Option<serde_json::Value>, ExecutorError> {
            unreachable!()
        }

        async fn insert(&self, _: RecordRequest) -> Result<Value, ExecutorError> {
            unreachable!()
        }

        async fn insert_many(&self, _: RecordsRequest) -> Result<(), ExecutorError> {
            unreachable!()
        }

        async fn update(&self, _: KeyedRecordRequest) -> Result<u32, ExecutorError> {
            unreachable!()
        }

        async fn update_many(&self, _: Vec<KeyedRecordRequest>) -> Result<u32, ExecutorError> {
            unreachable!()
        }

        async fn delete(&self, _: KeyRequest) -> Result<(), ExecutorError> {
            unreachable!()
        }

        async fn delete_many(&self, _: KeysRequest) -> Result<u32, ExecutorError> {
            unreachable!()
        }

        async fn clear_store(&self, _: &str, _: &str) -> Result<(), ExecutorError> {
            unreachable!()
        }

        async fn storage_estimate(&self, _: &str) -> Result<StorageEstimate, ExecutorError> {
            unreachable!()
        }

        async fn create_database(&self, _: DatabaseSchema) -> Result<(), ExecutorError> {
            unreachable!()
        }

        async fn drop_database(&self, _: &str) -> Result<(), ExecutorError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn cancel_interrupts_an_in_flight_call() {
        let session = Session::new(Arc::new(StallExecutor), "app");
        let token = CancellationToken::new();
        let query = session.query::<Person>().with_cancellation(token.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(query.to_vec(), canceller);

        assert!(matches!(
            result,
            Err(QueryError::Executor(ExecutorError::Cancelled))
        ));
    }
}
