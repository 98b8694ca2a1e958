// SPDX-License-Identifier: MIT

use super::*;
use crate::fake::{DurableCall, FakeDurable, FakeTask, FakeWake, FixedInterval};
use chrono::TimeDelta;
use rearm_core::FakeClock;

type TestScheduler = HybridScheduler<FakeDurable, FakeWake, FakeTask, FixedInterval>;
type PausedScheduler = HybridScheduler<FakeDurable, FakeWake, FakeTask, FixedInterval, FakeClock>;

fn scheduler(
    durable: FakeDurable,
    intervals: FixedInterval,
) -> (TestScheduler, FakeWake, FakeTask) {
    let wake = FakeWake::new();
    let task = FakeTask::new();
    let scheduler = HybridScheduler::new(
        durable,
        wake.clone(),
        task.clone(),
        intervals,
        SchedulerConfig::default(),
    );
    (scheduler, wake, task)
}

fn paused_scheduler(
    durable: FakeDurable,
    intervals: FixedInterval,
    clock: FakeClock,
) -> (PausedScheduler, FakeWake, FakeTask) {
    let wake = FakeWake::new();
    let task = FakeTask::new();
    let scheduler = HybridScheduler::with_clock(
        durable,
        wake.clone(),
        task.clone(),
        intervals,
        SchedulerConfig::default(),
        clock,
    );
    (scheduler, wake, task)
}

/// Poll until `check` passes or the budget runs out
async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn handler_only_fast_timer_fires_and_rearms() {
    let clock = FakeClock::new();
    let durable = FakeDurable::available();
    let (scheduler, wake, task) = paused_scheduler(
        durable.clone(),
        FixedInterval::new(Duration::from_secs(600)),
        clock.clone(),
    );
    scheduler.set_strategy(Strategy::HandlerOnly);

    let backend = scheduler.schedule_delayed(Duration::from_secs(5)).await;
    assert_eq!(backend, Backend::FastTimer);
    assert_eq!(task.run_count(), 0);

    clock.advance(Duration::from_secs(6));
    let looper = scheduler.clone();
    let dispatch = tokio::spawn(async move { looper.run().await });

    assert!(eventually(|| task.run_count() == 1).await);
    // One fresh entry at the full interval replaces the fired one.
    assert_eq!(scheduler.status().active_fast_timers, 1);
    assert!(durable.calls().is_empty());
    assert_eq!(wake.acquired_count(), 1);
    assert_eq!(wake.released_count(), 1);

    dispatch.abort();
}

#[tokio::test]
async fn fast_timer_backup_fire_recovers_a_dead_chain() {
    let clock = FakeClock::new();
    let (scheduler, _, task) = paused_scheduler(
        FakeDurable::rejecting(),
        FixedInterval::new(Duration::from_secs(600)),
        clock.clone(),
    );

    // With the durable backend refusing, both the primary and the backup
    // land on fast timers.
    let report = scheduler
        .run_invocation(TaskKind::Periodic, TimerId(1001))
        .await;
    assert!(!report.recovery);
    assert_eq!(report.next, Some(Backend::FastTimer));
    assert_eq!(report.backup, Some(Backend::FastTimer));
    assert_eq!(task.run_count(), 1);

    // Lose the primary without running it, as a frozen process would.
    clock.advance(Duration::from_secs(601));
    let lost = scheduler
        .inner
        .registry
        .lock()
        .unwrap()
        .poll(clock.now());
    assert_eq!(lost.len(), 1);
    assert!(!lost[0].backup);

    clock.advance(Duration::from_secs(600));
    let looper = scheduler.clone();
    let dispatch = tokio::spawn(async move { looper.run().await });

    // The backup fires, runs the task, and re-arms a full cycle.
    assert!(eventually(|| task.run_count() == 2).await);
    assert_eq!(scheduler.status().active_fast_timers, 2);

    dispatch.abort();
}

#[tokio::test]
async fn backup_invocation_reports_recovery() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    let report = scheduler
        .inner
        .run_invocation(TaskKind::Delayed, TimerId(1002), true)
        .await;

    assert!(report.recovery);
    assert_eq!(report.next, Some(Backend::Durable));
}

#[tokio::test]
async fn long_delay_under_hybrid_lands_on_durable() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    let backend = scheduler.schedule_delayed(Duration::from_secs(600)).await;

    assert_eq!(backend, Backend::Durable);
    assert_eq!(durable.calls(), vec![DurableCall::At(Duration::from_secs(600))]);
    assert_eq!(scheduler.status().active_fast_timers, 0);
}

#[tokio::test]
async fn unavailable_durable_forces_fast_timer() {
    let (scheduler, _, _) = scheduler(
        FakeDurable::unavailable(),
        FixedInterval::new(Duration::from_secs(600)),
    );

    let backend = scheduler.schedule_delayed(Duration::from_secs(600)).await;

    assert_eq!(backend, Backend::FastTimer);
    assert_eq!(scheduler.status().active_fast_timers, 1);
}

#[tokio::test]
async fn exact_scheduling_prefers_durable_for_any_strategy() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));
    scheduler.set_strategy(Strategy::HandlerOnly);

    let at = Utc::now() + TimeDelta::hours(1);
    let backend = scheduler.schedule_exact(Duration::from_secs(3600), at).await;

    assert_eq!(backend, Backend::Durable);
    assert_eq!(durable.calls(), vec![DurableCall::ExactAt(at)]);
}

#[tokio::test]
async fn exact_scheduling_falls_back_to_fast_timer() {
    let (scheduler, _, _) = scheduler(
        FakeDurable::rejecting(),
        FixedInterval::new(Duration::from_secs(600)),
    );

    let at = Utc::now() + TimeDelta::hours(1);
    let backend = scheduler.schedule_exact(Duration::from_secs(3600), at).await;

    assert_eq!(backend, Backend::FastTimer);
    assert_eq!(scheduler.status().active_fast_timers, 1);
}

#[tokio::test]
async fn past_wakeup_target_arms_nothing() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    let past = Utc::now() - TimeDelta::hours(1);
    let backend = scheduler.schedule_wakeup(past, "nightly refresh").await;

    assert_eq!(backend, None);
    assert_eq!(scheduler.status().active_fast_timers, 0);
    assert!(durable.calls().is_empty());
}

#[tokio::test]
async fn future_wakeup_routes_through_selector() {
    let (scheduler, _, _) = scheduler(
        FakeDurable::unavailable(),
        FixedInterval::new(Duration::from_secs(600)),
    );

    let target = Utc::now() + TimeDelta::hours(1);
    let backend = scheduler.schedule_wakeup(target, "nightly refresh").await;

    assert_eq!(backend, Some(Backend::FastTimer));
    assert_eq!(scheduler.status().active_fast_timers, 1);
}

#[tokio::test]
async fn cancel_all_clears_both_backends_and_is_idempotent() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));
    scheduler.set_strategy(Strategy::HandlerOnly);
    scheduler.schedule_delayed(Duration::from_secs(600)).await;
    scheduler.schedule_delayed(Duration::from_secs(900)).await;
    assert_eq!(scheduler.status().active_fast_timers, 2);

    scheduler.cancel_all().await;
    assert_eq!(scheduler.status().active_fast_timers, 0);
    assert_eq!(durable.cancel_all_count(), 1);

    scheduler.cancel_all().await;
    assert_eq!(scheduler.status().active_fast_timers, 0);
    assert_eq!(durable.cancel_all_count(), 2);
}

#[tokio::test]
async fn manual_execution_runs_once_without_rearming() {
    let durable = FakeDurable::available();
    let (scheduler, wake, task) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    scheduler.execute_manual_now();

    assert!(eventually(|| task.run_count() == 1).await);
    assert!(durable.calls().is_empty());
    assert_eq!(scheduler.status().active_fast_timers, 0);
    assert!(eventually(|| wake.released_count() == 1).await);
}

#[tokio::test]
async fn manual_burst_queues_behind_bounded_slots() {
    let durable = FakeDurable::available();
    let wake = FakeWake::new();
    let task = FakeTask::new();
    let config = SchedulerConfig {
        manual_workers: 1,
        ..SchedulerConfig::default()
    };
    let scheduler = HybridScheduler::new(
        durable.clone(),
        wake,
        task.clone(),
        FixedInterval::new(Duration::from_secs(600)),
        config,
    );

    for _ in 0..3 {
        scheduler.execute_manual_now();
    }

    // Every trigger runs; none is dropped while slots are busy.
    assert!(eventually(|| task.run_count() == 3).await);
    assert!(durable.calls().is_empty());
}

#[tokio::test]
async fn immediate_delayed_execution_resumes_the_chain() {
    let durable = FakeDurable::available();
    let (scheduler, _, task) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    scheduler.execute_delayed_now();

    assert!(eventually(|| task.run_count() == 1).await);
    assert!(eventually(|| durable.calls().len() == 2).await);
    assert_eq!(
        durable.calls(),
        vec![
            DurableCall::At(Duration::from_secs(600)),
            DurableCall::At(Duration::from_secs(1200)),
        ]
    );
}

#[tokio::test]
async fn status_reports_initialization_and_load() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));

    let before = scheduler.status();
    assert!(!before.initialized);
    assert_eq!(before.strategy, Strategy::Hybrid);
    assert_eq!(before.active_fast_timers, 0);
    assert!(before.durable_available);

    scheduler.schedule_delayed(Duration::from_secs(600)).await;

    let after = scheduler.status();
    assert!(after.initialized);

    durable.set_available(false);
    assert!(!scheduler.status().durable_available);
}

#[tokio::test]
async fn strategy_change_applies_to_next_decision() {
    let durable = FakeDurable::available();
    let (scheduler, _, _) =
        scheduler(durable.clone(), FixedInterval::new(Duration::from_secs(600)));
    assert_eq!(scheduler.strategy(), Strategy::Hybrid);

    scheduler.set_strategy(Strategy::HandlerOnly);
    assert_eq!(scheduler.strategy(), Strategy::HandlerOnly);

    let backend = scheduler.schedule_delayed(Duration::from_secs(600)).await;
    assert_eq!(backend, Backend::FastTimer);
    assert!(durable.calls().is_empty());
}

#[tokio::test]
async fn log_status_survives_any_state() {
    let (scheduler, _, _) = scheduler(
        FakeDurable::unavailable(),
        FixedInterval::unavailable(),
    );
    scheduler.log_status();
}
