mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ride_core::model::{PaymentMethod, Place, RideHistory};
use ride_core::retention::{HistorySweeper, RetentionPolicy};
use ride_core::store::HistoryStore;
use tokio::sync::oneshot;

async fn record_completed_days_ago(store: &HistoryStore, days: i64) {
    store
        .append(RideHistory {
            id: 0,
            passenger_id: 1,
            driver_id: Some(7),
            pickup: Place {
                label: "Central Station".to_string(),
                latitude: 53.1428,
                longitude: 90.4167,
            },
            dropoff: Place {
                label: "Airport".to_string(),
                latitude: 53.0901,
                longitude: 90.5333,
            },
            price: 250.0,
            distance_km: 10.0,
            payment_method: PaymentMethod::Transfer,
            completed_at: Utc::now() - chrono::Duration::days(days),
        })
        .await;
}

#[tokio::test]
async fn fourteen_day_window_keeps_thirteen_day_records() {
    support::init_tracing();
    let store = Arc::new(HistoryStore::new());
    record_completed_days_ago(&store, 13).await;
    record_completed_days_ago(&store, 15).await;

    let sweeper = HistorySweeper::new(store.clone());
    assert_eq!(sweeper.sweep_once().await, 1);
    assert_eq!(store.len().await, 1);

    // The second pass finds nothing new to delete.
    assert_eq!(sweeper.sweep_once().await, 0);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn empty_store_sweeps_are_no_ops() {
    let store = Arc::new(HistoryStore::new());
    let sweeper = HistorySweeper::new(store.clone());
    assert_eq!(sweeper.sweep_once().await, 0);
    assert_eq!(sweeper.sweep_once().await, 0);
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_sweeper_purges_on_its_own_schedule_until_shutdown() {
    let store = Arc::new(HistoryStore::new());
    record_completed_days_ago(&store, 30).await;
    record_completed_days_ago(&store, 1).await;

    let policy = RetentionPolicy {
        sweep_interval: Duration::from_millis(10),
        ..RetentionPolicy::default()
    };
    let sweeper = HistorySweeper::with_policy(store.clone(), policy);
    let (stop, shutdown) = oneshot::channel();
    let task = tokio::spawn(sweeper.run(shutdown));

    // The first sweep fires immediately on start.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.len().await, 1);

    stop.send(()).expect("sweeper should still be running");
    task.await.expect("sweeper task");

    // Stopped: a record aging past the window now stays until a restart.
    record_completed_days_ago(&store, 30).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.len().await, 2);
}
