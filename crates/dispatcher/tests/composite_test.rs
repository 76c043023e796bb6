use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing_test::traced_test;

use transports_core::{DialError, DialStrategy, Dialer, OptimizerError, ResolverSettings};
use transports_dispatcher::test_utils::MockDialer;
use transports_dispatcher::{
    CompositeDialer, FirstStrategy, MinimizeDialDurationStrategy, RotateStrategy, TrackStrategy,
};

fn as_dialers(mocks: &[Arc<MockDialer>]) -> Vec<Arc<dyn Dialer>> {
    mocks
        .iter()
        .map(|mock| mock.clone() as Arc<dyn Dialer>)
        .collect()
}

fn settings(max_attempts: usize) -> ResolverSettings {
    ResolverSettings {
        max_attempts,
        attempt_timeout_ms: 200,
        ..ResolverSettings::default()
    }
}

#[test]
fn test_empty_dialer_list_is_rejected() {
    let result = CompositeDialer::new(vec![], Arc::new(FirstStrategy::new(0)), &settings(1));
    assert!(matches!(result, Err(OptimizerError::EmptyTransportList)));
}

#[tokio::test]
#[traced_test]
async fn test_single_attempt_fails_without_fallback() {
    let mocks = vec![
        Arc::new(MockDialer::failing("a")),
        Arc::new(MockDialer::succeeding("b")),
    ];
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        Arc::new(FirstStrategy::new(2)),
        &settings(1),
    )
    .unwrap();

    let err = composite.dial("example.com:80").await.err().unwrap();
    assert!(matches!(err, DialError::Io(_)));
    assert_eq!(mocks[0].dial_count(), 1);
    assert_eq!(mocks[1].dial_count(), 0);
    assert!(logs_contain("Optimizer(first) 通过 a 拨号失败"));
}

#[tokio::test]
async fn test_fallback_moves_to_next_candidate() {
    let mocks = vec![
        Arc::new(MockDialer::failing("a")),
        Arc::new(MockDialer::succeeding("b")),
    ];
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        Arc::new(FirstStrategy::new(2)),
        &settings(3),
    )
    .unwrap();

    assert!(composite.dial("example.com:80").await.is_ok());
    assert_eq!(mocks[0].dial_count(), 1);
    assert_eq!(mocks[1].dial_count(), 1);
}

#[tokio::test]
async fn test_fallback_exhausts_distinct_candidates() {
    let mocks = vec![
        Arc::new(MockDialer::failing("a")),
        Arc::new(MockDialer::failing("b")),
    ];
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        Arc::new(FirstStrategy::new(2)),
        &settings(5),
    )
    .unwrap();

    let err = composite.dial("example.com:80").await.err().unwrap();
    assert!(matches!(err, DialError::Exhausted { attempts: 2, .. }));
    assert_eq!(mocks[0].dial_count(), 1);
    assert_eq!(mocks[1].dial_count(), 1);
}

#[tokio::test]
#[traced_test]
async fn test_attempt_timeout_counts_as_failure() {
    let mocks = vec![Arc::new(
        MockDialer::succeeding("slow").with_delay(Duration::from_secs(5)),
    )];
    let strategy = Arc::new(TrackStrategy::new(1));
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        strategy.clone() as Arc<dyn DialStrategy>,
        &settings(1),
    )
    .unwrap();

    let err = composite.dial("example.com:80").await.err().unwrap();
    assert!(matches!(err, DialError::Timeout { ref dialer, .. } if dialer == "slow"));
    assert_eq!(strategy.record(0).unwrap().failures, 1);
    assert!(logs_contain("Optimizer(track) 通过 slow 拨号超时"));
}

#[tokio::test]
async fn test_cancelled_dial_records_nothing() {
    let mocks = vec![Arc::new(
        MockDialer::succeeding("slow").with_delay(Duration::from_secs(5)),
    )];
    let strategy = Arc::new(MinimizeDialDurationStrategy::new(
        1,
        0.5,
        Duration::from_secs(60),
    ));
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        strategy.clone() as Arc<dyn DialStrategy>,
        &ResolverSettings::default(),
    )
    .unwrap();

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), composite.dial("example.com:80")).await;
    assert!(cancelled.is_err());
    assert_eq!(mocks[0].dial_count(), 1);
    assert_eq!(strategy.estimate(0), None);
}

#[tokio::test]
async fn test_outcomes_feed_minimize_dial_duration() {
    let mocks = vec![
        Arc::new(MockDialer::succeeding("slow").with_delay(Duration::from_millis(60))),
        Arc::new(MockDialer::succeeding("fast")),
    ];
    let strategy = Arc::new(MinimizeDialDurationStrategy::new(
        2,
        0.5,
        Duration::from_secs(60),
    ));
    let composite = CompositeDialer::new(
        as_dialers(&mocks),
        strategy.clone() as Arc<dyn DialStrategy>,
        &settings(1),
    )
    .unwrap();

    // Two exploratory dials, then the fast one sticks.
    for _ in 0..5 {
        composite.dial("example.com:80").await.unwrap();
    }
    assert_eq!(mocks[0].dial_count(), 1);
    assert_eq!(mocks[1].dial_count(), 4);
    assert!(strategy.estimate(1).unwrap() < strategy.estimate(0).unwrap());
}

#[tokio::test]
async fn test_concurrent_rotate_dials_cover_each_dialer_once() {
    let mocks: Vec<Arc<MockDialer>> = (0..6)
        .map(|i| {
            Arc::new(MockDialer::succeeding(format!("d{i}")).with_delay(Duration::from_millis(10)))
        })
        .collect();
    let composite = Arc::new(
        CompositeDialer::new(
            as_dialers(&mocks),
            Arc::new(RotateStrategy::new(6)),
            &settings(1),
        )
        .unwrap(),
    );

    let dials = (0..6).map(|_| {
        let composite = composite.clone();
        async move { composite.dial("example.com:80").await.is_ok() }
    });
    let results = join_all(dials).await;
    assert!(results.into_iter().all(|ok| ok));

    let counts: HashSet<usize> = mocks.iter().map(|m| m.dial_count()).collect();
    assert_eq!(counts, HashSet::from([1]));
}

#[tokio::test]
async fn test_composite_nests_as_plain_dialer() {
    let inner_mocks = vec![
        Arc::new(MockDialer::failing("inner-a")),
        Arc::new(MockDialer::succeeding("inner-b")),
    ];
    let inner = CompositeDialer::new(
        as_dialers(&inner_mocks),
        Arc::new(FirstStrategy::new(2)),
        &settings(2),
    )
    .unwrap();

    let outer = CompositeDialer::new(
        vec![Arc::new(inner) as Arc<dyn Dialer>],
        Arc::new(FirstStrategy::new(1)),
        &settings(1),
    )
    .unwrap();

    assert!(outer.dial("example.com:80").await.is_ok());
    assert_eq!(inner_mocks[1].dial_count(), 1);
}

#[tokio::test]
async fn test_nested_composite_fallback_fits_outer_timeout() {
    let inner_mocks = vec![
        Arc::new(MockDialer::succeeding("hang").with_delay(Duration::from_secs(30))),
        Arc::new(MockDialer::succeeding("fast").with_delay(Duration::from_millis(5))),
    ];
    let inner_strategy = Arc::new(MinimizeDialDurationStrategy::new(
        2,
        0.5,
        Duration::from_secs(60),
    ));
    let inner = CompositeDialer::new(
        as_dialers(&inner_mocks),
        inner_strategy.clone() as Arc<dyn DialStrategy>,
        &ResolverSettings {
            max_attempts: 2,
            attempt_timeout_ms: 100,
            ..ResolverSettings::default()
        },
    )
    .unwrap();
    assert_eq!(inner.dial_budget(), Some(Duration::from_millis(200)));

    let outer = CompositeDialer::new(
        vec![Arc::new(inner) as Arc<dyn Dialer>],
        Arc::new(FirstStrategy::new(1)),
        &ResolverSettings {
            max_attempts: 1,
            attempt_timeout_ms: 100,
            ..ResolverSettings::default()
        },
    )
    .unwrap();

    assert!(outer.dial("example.com:80").await.is_ok());
    assert_eq!(inner_mocks[1].dial_count(), 1);
    // The timed-out leaf was charged, so the next dial goes straight to the fast one.
    assert!(inner_strategy.estimate(0).unwrap() >= Duration::from_secs(60));

    assert!(outer.dial("example.com:80").await.is_ok());
    assert_eq!(inner_mocks[0].dial_count(), 1);
    assert_eq!(inner_mocks[1].dial_count(), 2);
}

#[test]
fn test_composite_rejects_invalid_settings() {
    let result = CompositeDialer::new(
        as_dialers(&[Arc::new(MockDialer::succeeding("a"))]),
        Arc::new(FirstStrategy::new(1)),
        &ResolverSettings {
            attempt_timeout_ms: 0,
            ..ResolverSettings::default()
        },
    );
    assert!(matches!(result, Err(OptimizerError::Configuration(_))));
}
