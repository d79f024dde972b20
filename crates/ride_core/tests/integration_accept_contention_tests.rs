mod support;

use std::sync::Arc;

use ride_core::error::DispatchError;
use ride_core::model::RideStatus;
use ride_core::test_helpers::{test_lifecycle, test_trip_request, TEST_DRIVER, TEST_PASSENGER};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_assign_exactly_one_driver() {
    support::init_tracing();
    let fixture = test_lifecycle().await;
    let drivers: Vec<u64> = (100..108).collect();
    for driver in &drivers {
        fixture.directory.register_driver(*driver).await;
    }
    let ride = fixture
        .lifecycle
        .create_ride(test_trip_request(TEST_PASSENGER))
        .await
        .expect("ride");

    let order_id = ride.id;
    let barrier = Arc::new(tokio::sync::Barrier::new(drivers.len()));
    let mut handles = Vec::new();
    for driver in drivers {
        let lifecycle = fixture.lifecycle.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            (driver, lifecycle.accept_order(order_id, driver).await)
        }));
    }

    let mut winner = None;
    let mut conflicts = 0;
    for handle in handles {
        let (driver, outcome) = handle.await.expect("accept task");
        match outcome {
            Ok(()) => {
                assert!(winner.is_none(), "two drivers won the same order");
                winner = Some(driver);
            }
            Err(DispatchError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected accept error: {other:?}"),
        }
    }
    assert_eq!(conflicts, 7);
    let winner = winner.expect("one driver should win");

    let active = fixture
        .lifecycle
        .active_ride_for_driver(winner)
        .await
        .expect("winner should hold the ride");
    assert_eq!(active.id, ride.id);
    assert_eq!(active.driver_id, Some(winner));
    assert_eq!(active.status, RideStatus::Waiting);
    assert!(fixture.lifecycle.available_rides().await.is_empty());
}

#[tokio::test]
async fn accepted_order_conflicts_even_for_the_winning_driver() {
    let fixture = test_lifecycle().await;
    let ride = fixture
        .lifecycle
        .create_ride(test_trip_request(TEST_PASSENGER))
        .await
        .expect("ride");

    fixture
        .lifecycle
        .accept_order(ride.id, TEST_DRIVER)
        .await
        .expect("first accept");

    let retry = fixture.lifecycle.accept_order(ride.id, TEST_DRIVER).await;
    assert!(matches!(retry, Err(DispatchError::Conflict(_))));
}

#[tokio::test]
async fn accept_requires_existing_order_and_driver() {
    let fixture = test_lifecycle().await;
    let ride = fixture
        .lifecycle
        .create_ride(test_trip_request(TEST_PASSENGER))
        .await
        .expect("ride");

    assert_eq!(
        fixture.lifecycle.accept_order(999, TEST_DRIVER).await,
        Err(DispatchError::NotFound("order"))
    );
    assert_eq!(
        fixture.lifecycle.accept_order(ride.id, 999).await,
        Err(DispatchError::NotFound("driver"))
    );

    // Neither failure may touch the ride.
    let untouched = fixture
        .lifecycle
        .active_ride_for_passenger(TEST_PASSENGER)
        .await
        .expect("ride");
    assert_eq!(untouched.driver_id, None);
    assert_eq!(untouched.status, RideStatus::Searching);
}
