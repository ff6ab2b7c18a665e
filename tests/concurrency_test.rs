//! Concurrency tests on the real clock.
//!
//! Timing on a loaded machine is unpredictable, so these only check what
//! must hold regardless of scheduling: productions never overlap, and every
//! outcome a caller sees is one the production function actually returned.

mod common;

use common::{alternating_outcome, init_logging, Failure, Probe};
use renewable::{
    CancellationToken, ManualClock, Periods, Renewable, RenewableBuilder, SoftHard, Spawner,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BUSY_THREADS: usize = 4;
const RUN_FOR: Duration = Duration::from_millis(400);

fn slow_producer(
    probe: Arc<Probe>,
) -> impl Fn(&CancellationToken) -> Result<u64, Failure> + Send + Sync + 'static {
    move |_: &CancellationToken| {
        let (n, _in_flight) = probe.enter();
        thread::sleep(Duration::from_millis(2));
        alternating_outcome(n)
    }
}

fn hammer(renewable: &dyn Renewable<u64, Failure>, probe: &Probe) {
    let stop = AtomicBool::new(false);

    thread::scope(|s| {
        for _ in 0..BUSY_THREADS {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    let outcome = renewable.get();
                    let index = match &outcome {
                        Ok(v) => v * 2,
                        Err(Failure(v)) => v * 2 + 1,
                    };
                    assert!(index < probe.calls(), "outcome was never produced");
                    assert_eq!(outcome, alternating_outcome(index));
                }
            });
        }

        thread::sleep(RUN_FOR);
        stop.store(true, Ordering::Relaxed);
    });

    assert_eq!(probe.max_in_flight(), 1, "productions overlapped");
    assert!(probe.calls() >= 2, "outcomes never expired");
}

fn short_periods() -> Periods {
    Periods::new(Duration::from_millis(10), Duration::from_millis(15))
}

#[test]
fn test_on_demand_never_overlaps_productions() {
    init_logging();
    let probe = Probe::new();
    let renewable = RenewableBuilder::new()
        .with_background_context()
        .with_producer(slow_producer(Arc::clone(&probe)))
        .on_demand(short_periods())
        .expect("valid on-demand");

    hammer(&renewable, &probe);
}

#[test]
fn test_soft_hard_equal_periods_never_overlaps_productions() {
    init_logging();
    let probe = Probe::new();
    let renewable = RenewableBuilder::new()
        .with_background_context()
        .with_producer(slow_producer(Arc::clone(&probe)))
        .soft_hard(short_periods(), short_periods())
        .expect("valid soft/hard");

    hammer(&renewable, &probe);
}

#[test]
fn test_soft_hard_background_refresh_never_overlaps_productions() {
    init_logging();
    let probe = Probe::new();
    let renewable = RenewableBuilder::new()
        .with_background_context()
        .with_producer(slow_producer(Arc::clone(&probe)))
        .soft_hard(
            short_periods(),
            Periods::new(Duration::from_millis(20), Duration::from_millis(30)),
        )
        .expect("valid soft/hard");

    hammer(&renewable, &probe);
}

#[test]
fn test_zero_periods_never_overlap_productions() {
    let probe = Probe::new();
    let renewable = RenewableBuilder::new()
        .with_background_context()
        .with_producer(slow_producer(Arc::clone(&probe)))
        .soft_hard(Periods::default(), Periods::default())
        .expect("valid soft/hard");

    hammer(&renewable, &probe);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_soft_hard_refreshes_on_tokio_blocking_pool() {
    init_logging();
    let clock = ManualClock::new();
    let probe = Probe::new();
    let renewable: Arc<SoftHard<u64, Failure>> = Arc::new(
        RenewableBuilder::new()
            .with_background_context()
            .with_clock(clock.clone())
            .with_spawner(Spawner::current())
            .with_producer(common::alternating(Arc::clone(&probe)))
            .soft_hard(
                Periods::new(Duration::from_millis(75), Duration::from_millis(100)),
                Periods::new(Duration::from_millis(150), Duration::from_millis(200)),
            )
            .expect("valid soft/hard"),
    );

    let get = |renewable: &Arc<SoftHard<u64, Failure>>| {
        let renewable = Arc::clone(renewable);
        tokio::task::spawn_blocking(move || renewable.get())
    };

    assert_eq!(get(&renewable).await.expect("join"), Ok(0));

    clock.advance(Duration::from_millis(80));
    assert_eq!(get(&renewable).await.expect("join"), Ok(0));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while renewable.is_refreshing() || probe.calls() < 2 {
        assert!(tokio::time::Instant::now() < deadline, "refresh never landed");
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    assert_eq!(get(&renewable).await.expect("join"), Err(Failure(0)));
    assert_eq!(probe.calls(), 2);
}
