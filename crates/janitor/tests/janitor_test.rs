//! Integration tests for the index janitor
//!
//! These run the full connect-then-clean flow against the in-memory
//! `MockIndexAdmin`.

use index_janitor::{
    execute, exit_status, CollectionOutcome, IndexJanitor, RunReport, EXIT_FAILURE, EXIT_SUCCESS,
};
use index_janitor_core::error::Result;
use index_janitor_core::{Config, JanitorConfig};
use index_janitor_storage::{IndexAdmin, MockCall, MockIndexAdmin, StorageError};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn janitor_config(collections: &[&str]) -> JanitorConfig {
    JanitorConfig {
        collections: collections.iter().map(|c| c.to_string()).collect(),
        ..JanitorConfig::default()
    }
}

fn config(collections: &[&str]) -> Config {
    let mut config = Config::default();
    config.mongodb.uri = "mongodb://localhost:27017/shop".to_string();
    config.janitor = janitor_config(collections);
    config
}

fn janitor(admin: &MockIndexAdmin, collections: &[&str]) -> IndexJanitor {
    IndexJanitor::new(
        Arc::new(admin.clone()) as Arc<dyn IndexAdmin>,
        &janitor_config(collections),
    )
}

fn names(report: &RunReport) -> Vec<String> {
    report.outcomes().iter().map(|(n, _)| n.clone()).collect()
}

#[tokio::test]
async fn test_existing_and_missing_collection() -> Result<()> {
    let admin = MockIndexAdmin::new().with_collection("products", &["sku_1", "category_1"]);

    let result = execute(
        &config(&["products", "ghost_collection"]),
        |_| async { Ok(Arc::new(admin.clone()) as Arc<dyn IndexAdmin>) },
        std::future::pending(),
    )
    .await;

    assert_eq!(exit_status(&result), EXIT_SUCCESS);
    let report = result?;
    assert_eq!(
        report.outcomes(),
        &[
            (
                "products".to_string(),
                CollectionOutcome::Cleaned {
                    dropped: vec!["sku_1".to_string(), "category_1".to_string()]
                }
            ),
            (
                "ghost_collection".to_string(),
                CollectionOutcome::SkippedNotFound
            ),
        ]
    );
    assert_eq!(admin.indexes("products"), Some(vec!["_id_".to_string()]));
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_aborts_before_any_collection() {
    let admin = MockIndexAdmin::new().with_collection("products", &["sku_1"]);
    let connects = AtomicUsize::new(0);

    let result = execute(
        &config(&["products", "orders"]),
        |_| async {
            connects.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::ConnectionFailed(
                "Server selection timeout after 5000ms".to_string(),
            ))
        },
        std::future::pending(),
    )
    .await;

    assert_eq!(exit_status(&result), EXIT_FAILURE);
    assert!(result.unwrap_err().is_connection());
    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert!(admin.calls().is_empty());
    assert_eq!(admin.indexes("products").map(|i| i.len()), Some(2));
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let admin = MockIndexAdmin::new()
        .with_collection("products", &["sku_1"])
        .with_collection("orders", &["user_1_created_at_-1", "status_1"])
        .with_collection("categories", &[]);
    let collections = ["products", "orders", "categories", "ghost_collection"];

    let first = janitor(&admin, &collections).run().await;
    assert_eq!(first.cleaned(), 2);
    assert_eq!(first.already_clean(), 1);
    assert_eq!(first.skipped(), 1);

    let second = janitor(&admin, &collections).run().await;
    for (name, outcome) in second.outcomes() {
        assert!(
            matches!(
                outcome,
                CollectionOutcome::NoIndexesToClean | CollectionOutcome::SkippedNotFound
            ),
            "unexpected outcome for {name} on second run: {outcome:?}"
        );
    }
    assert_eq!(second.failed(), 0);
    assert_eq!(
        admin.collection_names(),
        vec![
            "categories".to_string(),
            "orders".to_string(),
            "products".to_string()
        ]
    );
}

#[tokio::test]
async fn test_failure_on_one_collection_does_not_stop_the_rest() {
    let admin = MockIndexAdmin::new()
        .with_collection("users", &["email_1"])
        .with_collection("orders", &["status_1"])
        .with_collection("reviews", &["product_1"])
        .failing_drop("orders", "operation exceeded time limit");

    let report = janitor(&admin, &["users", "orders", "reviews"]).run().await;

    assert_eq!(
        report.outcome("orders"),
        Some(&CollectionOutcome::Failed {
            reason: "Storage backend error: operation exceeded time limit".to_string()
        })
    );
    assert!(matches!(
        report.outcome("users"),
        Some(CollectionOutcome::Cleaned { .. })
    ));
    assert!(matches!(
        report.outcome("reviews"),
        Some(CollectionOutcome::Cleaned { .. })
    ));
    assert_eq!(admin.drop_calls(), vec!["users", "orders", "reviews"]);
    assert!(!report.interrupted());
    assert_eq!(exit_status(&Ok(report)), EXIT_SUCCESS);
}

#[tokio::test]
async fn test_failed_existence_check_is_recorded_and_gates_removal() {
    let admin = MockIndexAdmin::new()
        .with_collection("carts", &["user_1"])
        .with_collection("coupons", &["code_1"])
        .failing_exists("carts", "not authorized on shop");

    let report = janitor(&admin, &["carts", "coupons"]).run().await;

    assert!(matches!(
        report.outcome("carts"),
        Some(CollectionOutcome::Failed { .. })
    ));
    assert_eq!(admin.drop_calls(), vec!["coupons"]);
    assert_eq!(admin.indexes("carts").map(|i| i.len()), Some(2));
}

#[tokio::test]
async fn test_missing_collections_never_reach_removal() {
    let admin = MockIndexAdmin::new().with_collection("wishlists", &["user_1"]);

    janitor(&admin, &["ghost_a", "wishlists", "ghost_b"])
        .run()
        .await;

    assert_eq!(admin.drop_calls(), vec!["wishlists"]);
    assert_eq!(
        admin.calls(),
        vec![
            MockCall::CollectionExists("ghost_a".to_string()),
            MockCall::CollectionExists("wishlists".to_string()),
            MockCall::DropSecondaryIndexes("wishlists".to_string()),
            MockCall::CollectionExists("ghost_b".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let admin = MockIndexAdmin::new()
        .with_collection("reviews", &["rating_1"])
        .with_collection("carts", &[])
        .with_collection("users", &["email_1"]);
    let collections = ["users", "ghost_collection", "reviews", "carts"];

    let report = janitor(&admin, &collections).run().await;

    assert_eq!(names(&report), collections.to_vec());
}

#[tokio::test]
async fn test_dry_run_never_drops() {
    let admin = MockIndexAdmin::new()
        .with_collection("products", &["sku_1", "name_text"])
        .with_collection("categories", &[]);
    let mut config = janitor_config(&["products", "categories", "ghost_collection"]);
    config.dry_run = true;

    let report = IndexJanitor::new(Arc::new(admin.clone()) as Arc<dyn IndexAdmin>, &config)
        .run()
        .await;

    assert_eq!(
        report.outcome("products"),
        Some(&CollectionOutcome::WouldClean {
            indexes: vec!["sku_1".to_string(), "name_text".to_string()]
        })
    );
    assert_eq!(
        report.outcome("categories"),
        Some(&CollectionOutcome::NoIndexesToClean)
    );
    assert_eq!(
        report.outcome("ghost_collection"),
        Some(&CollectionOutcome::SkippedNotFound)
    );
    assert!(admin.drop_calls().is_empty());
    assert_eq!(admin.indexes("products").map(|i| i.len()), Some(3));
    assert!(report.summary().contains("1 would be cleaned"));
}

#[tokio::test(start_paused = true)]
async fn test_hung_drop_times_out_and_loop_continues() {
    let admin = MockIndexAdmin::new()
        .with_collection("orders", &["status_1"])
        .with_collection("products", &["sku_1"])
        .hanging_drop("orders");
    let mut config = janitor_config(&["orders", "products"]);
    config.operation_timeout_secs = 5;

    let report = IndexJanitor::new(Arc::new(admin.clone()) as Arc<dyn IndexAdmin>, &config)
        .run()
        .await;

    assert_eq!(
        report.outcome("orders"),
        Some(&CollectionOutcome::Failed {
            reason: "timed out after 5s".to_string()
        })
    );
    assert_eq!(
        report.outcome("products"),
        Some(&CollectionOutcome::Cleaned {
            dropped: vec!["sku_1".to_string()]
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_stops_the_loop() {
    let admin = MockIndexAdmin::new()
        .with_collection("users", &["email_1"])
        .with_collection("orders", &["status_1"])
        .with_collection("reviews", &["rating_1"])
        .hanging_drop("orders");
    let mut config = janitor_config(&["users", "orders", "reviews"]);
    config.operation_timeout_secs = 0;

    let report = IndexJanitor::new(Arc::new(admin.clone()) as Arc<dyn IndexAdmin>, &config)
        .run_until(tokio::time::sleep(Duration::from_secs(1)))
        .await;

    assert!(report.interrupted());
    assert_eq!(names(&report), vec!["users"]);
    assert_eq!(admin.drop_calls(), vec!["users", "orders"]);
    assert_eq!(admin.indexes("reviews").map(|i| i.len()), Some(2));
    assert_eq!(exit_status(&Ok(report)), EXIT_FAILURE);
}
