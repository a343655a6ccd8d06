//! Fixed-interval scheduler for background work.
//!
//! Each tick spawns its own task and the timer never waits for it, so slow
//! ticks overlap. Mutual exclusion between ticks (and between processes) is
//! the job of the task lease, not of this scheduler.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::errors::{DomainResult, WorkerError};

/// Work invoked on every tick of a [`PeriodicWorker`].
#[async_trait]
pub trait PeriodicWork: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// One tick. An error or a panic counts the tick as failed and the
    /// loop keeps going.
    async fn periodic_work(&self) -> DomainResult<()>;

    /// Runs once before the first tick. An error is logged and the loop
    /// starts anyway.
    async fn before_work_loop(&self) -> DomainResult<()> {
        Ok(())
    }

    /// Runs once after the loop stops. Ticks still in flight are not awaited.
    async fn after_work_loop(&self) {}
}

/// Snapshot of a worker's activity.
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub running: bool,
    pub ticks_started: u64,
    pub ticks_succeeded: u64,
    pub ticks_failed: u64,
    pub last_tick: Option<Instant>,
}

/// Drives a [`PeriodicWork`] on a fixed interval until stopped.
pub struct PeriodicWorker<W: PeriodicWork> {
    work: Arc<W>,
    interval: Duration,
    started: AtomicBool,
    stop_signal: Arc<Notify>,
    status: Arc<RwLock<WorkerStatus>>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<W: PeriodicWork> PeriodicWorker<W> {
    /// Idle worker; nothing runs until [`start`](Self::start).
    pub fn new(work: Arc<W>, interval: Duration) -> Self {
        Self {
            work,
            interval,
            started: AtomicBool::new(false),
            stop_signal: Arc::new(Notify::new()),
            status: Arc::new(RwLock::new(WorkerStatus::default())),
            loop_handle: Mutex::new(None),
        }
    }

    pub fn work(&self) -> &Arc<W> {
        &self.work
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking. A worker can only be started once.
    pub async fn start(&self) -> Result<(), WorkerError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerError::AlreadyStarted);
        }

        self.status.write().await.running = true;

        let work = self.work.clone();
        let status = self.status.clone();
        let stop_signal = self.stop_signal.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            run_loop(work, period, status, stop_signal).await;
        });
        *self.loop_handle.lock().await = Some(handle);

        Ok(())
    }

    /// Stop the timer and wait for `after_work_loop`. In-flight ticks keep
    /// running to completion on their own.
    pub async fn stop(&self) {
        self.stop_signal.notify_one();

        if let Some(handle) = self.loop_handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!(worker = self.work.name(), error = %e, "worker loop terminated abnormally");
            }
        }

        self.status.write().await.running = false;
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> WorkerStatus {
        self.status.read().await.clone()
    }
}

async fn run_loop<W: PeriodicWork>(
    work: Arc<W>,
    period: Duration,
    status: Arc<RwLock<WorkerStatus>>,
    stop_signal: Arc<Notify>,
) {
    if let Err(e) = work.before_work_loop().await {
        warn!(worker = work.name(), error = %e, "before_work_loop failed");
    }

    info!(worker = work.name(), interval_ms = period.as_millis() as u64, "worker started");

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = timer.tick() => {
                spawn_tick(work.clone(), status.clone()).await;
            }
            () = stop_signal.notified() => break,
        }
    }

    work.after_work_loop().await;
    info!(worker = work.name(), "worker stopped");
}

async fn spawn_tick<W: PeriodicWork>(work: Arc<W>, status: Arc<RwLock<WorkerStatus>>) {
    let tick = {
        let mut status = status.write().await;
        status.ticks_started += 1;
        status.last_tick = Some(Instant::now());
        status.ticks_started
    };

    tokio::spawn(async move {
        debug!(worker = work.name(), tick, "tick started");
        let result = AssertUnwindSafe(work.periodic_work()).catch_unwind().await;

        let mut status = status.write().await;
        match result {
            Ok(Ok(())) => status.ticks_succeeded += 1,
            Ok(Err(e)) => {
                status.ticks_failed += 1;
                error!(worker = work.name(), tick, error = %e, "periodic work failed");
            }
            Err(_) => {
                status.ticks_failed += 1;
                error!(worker = work.name(), tick, "periodic work panicked");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use std::sync::atomic::{AtomicU32, AtomicUsize};

    #[derive(Default)]
    struct CountingWork {
        calls: AtomicU32,
        before: AtomicBool,
        after: AtomicBool,
    }

    #[async_trait]
    impl PeriodicWork for CountingWork {
        fn name(&self) -> &str {
            "counting"
        }

        async fn periodic_work(&self) -> DomainResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn before_work_loop(&self) -> DomainResult<()> {
            self.before.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn after_work_loop(&self) {
            self.after.store(true, Ordering::SeqCst);
        }
    }

    /// Fails on odd calls, panics on every fourth.
    #[derive(Default)]
    struct FlakyWork {
        calls: AtomicU32,
    }

    #[async_trait]
    impl PeriodicWork for FlakyWork {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn periodic_work(&self) -> DomainResult<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n % 4 == 0 {
                panic!("tick {n} blew up");
            }
            if n % 2 == 1 {
                return Err(DomainError::Ledger(format!("tick {n} failed")));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct SlowWork {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl PeriodicWork for SlowWork {
        fn name(&self) -> &str {
            "slow"
        }

        async fn periodic_work(&self) -> DomainResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(80)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_ticks_repeatedly_and_runs_hooks() {
        let work = Arc::new(CountingWork::default());
        let worker = PeriodicWorker::new(work.clone(), Duration::from_millis(10));

        worker.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(75)).await;
        worker.stop().await;

        assert!(work.calls.load(Ordering::SeqCst) >= 3);
        assert!(work.before.load(Ordering::SeqCst));
        assert!(work.after.load(Ordering::SeqCst));
        assert!(!worker.status().await.running);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let worker = PeriodicWorker::new(Arc::new(CountingWork::default()), Duration::from_secs(60));

        worker.start().await.unwrap();
        let err = worker.start().await.unwrap_err();

        assert_eq!(err, WorkerError::AlreadyStarted);
        assert_eq!(err.to_string(), "Worker already started");
        worker.stop().await;
    }

    #[tokio::test]
    async fn test_errors_and_panics_do_not_stop_the_timer() {
        let work = Arc::new(FlakyWork::default());
        let worker = PeriodicWorker::new(work.clone(), Duration::from_millis(10));

        worker.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        worker.stop().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let status = worker.status().await;
        assert!(work.calls.load(Ordering::SeqCst) >= 5);
        assert!(status.ticks_failed >= 3);
        assert!(status.ticks_succeeded >= 1);
    }

    #[tokio::test]
    async fn test_slow_ticks_overlap() {
        let work = Arc::new(SlowWork::default());
        let worker = PeriodicWorker::new(work.clone(), Duration::from_millis(10));

        worker.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        worker.stop().await;

        assert!(work.max_in_flight.load(Ordering::SeqCst) > 1);
    }
}
