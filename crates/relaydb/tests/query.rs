//! End-to-end coverage of the public surface: declaring records, opening
//! a session against the in-memory executor, and driving typed queries
//! through to materialized rows.

use relaydb::prelude::*;
use relaydb::{ExecutorError, QueryError, catalog, record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Article {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    views: u64,
    title: String,
}

record! {
    Article in "articles" key [auto id] {
        @pk id,
        @index views,
        title,
    }
}

fn article(views: u64, title: &str) -> Article {
    Article {
        id: None,
        views,
        title: title.to_string(),
    }
}

async fn seeded() -> Session {
    catalog::describe::<Article>();
    let session = Session::open(Arc::new(MemoryExecutor::new()), "newsroom")
        .await
        .unwrap();
    session
        .insert_many(&[
            article(900, "launch day"),
            article(120, "quiet tuesday"),
            article(4_000, "the big one"),
            article(310, "follow-up"),
        ])
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn auto_increment_assigns_keys_in_insert_order() {
    let session = seeded().await;

    let first: Article = session.get::<Article>(1_u64).await.unwrap().unwrap();
    assert_eq!(first.title, "launch day");

    let fourth: Article = session.get::<Article>(4_u64).await.unwrap().unwrap();
    assert_eq!(fourth.title, "follow-up");
    assert_eq!(fourth.id, Some(4));
}

#[tokio::test]
async fn explicit_keys_advance_the_key_generator() {
    catalog::describe::<Article>();
    let session = Session::open(Arc::new(MemoryExecutor::new()), "newsroom")
        .await
        .unwrap();

    let pinned = Article {
        id: Some(7),
        views: 1,
        title: "pinned".to_string(),
    };
    session.insert(&pinned).await.unwrap();

    // The generator must skip past the explicit key instead of colliding.
    let key = session.insert(&article(2, "auto-keyed")).await.unwrap();
    assert!(key.same(&Value::Uint(8)));

    let auto: Article = session.get::<Article>(8_u64).await.unwrap().unwrap();
    assert_eq!(auto.title, "auto-keyed");
    assert_eq!(auto.id, Some(8));
}

#[tokio::test]
async fn filtered_ordered_window() {
    let session = seeded().await;

    let rows = session
        .query::<Article>()
        .filter(Predicate::gt("views", 200_u64))
        .order_by("views")
        .unwrap()
        .skip(1)
        .take(2)
        .to_vec()
        .await
        .unwrap();

    let titles: Vec<&str> = rows.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["launch day", "the big one"]);
}

#[tokio::test]
async fn take_last_returns_the_tail_of_the_ordered_set() {
    let session = seeded().await;

    let rows = session
        .query::<Article>()
        .order_by("views")
        .unwrap()
        .take_last(2)
        .to_vec()
        .await
        .unwrap();

    let views: Vec<u64> = rows.iter().map(|a| a.views).collect();
    assert_eq!(views, [900, 4_000]);
}

#[tokio::test]
async fn branching_from_a_shared_base_is_safe() {
    let session = seeded().await;

    let base = session
        .query::<Article>()
        .filter(Predicate::gte("views", 300_u64));
    let popular = base.filter(Predicate::gt("views", 1_000_u64));
    let titled = base.filter(Predicate::starts_with("title", "f"));

    assert_eq!(popular.count().await.unwrap(), 1);
    assert_eq!(titled.count().await.unwrap(), 1);
    assert_eq!(base.count().await.unwrap(), 3);
}

#[tokio::test]
async fn unindexed_fields_refuse_ordering() {
    let session = seeded().await;

    let result = session.query::<Article>().order_by("title");
    assert!(matches!(
        result,
        Err(QueryError::UnorderableField { field, .. }) if field == "title"
    ));
}

#[tokio::test]
async fn streams_replay_the_fetched_window() {
    use futures::StreamExt;

    let session = seeded().await;
    let views: Vec<u64> = session
        .query::<Article>()
        .order_by_desc("views")
        .unwrap()
        .take(2)
        .stream()
        .await
        .unwrap()
        .map(|a| a.views)
        .collect()
        .await;

    assert_eq!(views, [4_000, 900]);
}

#[tokio::test]
async fn cancellation_surfaces_as_an_executor_error() {
    let session = seeded().await;
    let token = CancellationToken::new();
    token.cancel();

    let result = session
        .query::<Article>()
        .with_cancellation(token)
        .to_vec()
        .await;

    assert!(matches!(
        result,
        Err(QueryError::Executor(ExecutorError::Cancelled))
    ));
}

#[tokio::test]
async fn storage_estimate_reflects_stored_rows() {
    let session = seeded().await;

    let estimate = session.storage_estimate().await.unwrap();
    assert!(estimate.usage_mb > 0.0);
    assert!(estimate.quota_mb >= estimate.usage_mb);

    session.drop_database().await.unwrap();
    let gone = session.get::<Article>(1_u64).await;
    assert!(matches!(
        gone,
        Err(relaydb::SessionError::Executor(ExecutorError::Rejected { .. }))
    ));
}
