//! Per-job run state: at most one run in flight, nothing after stop.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Default)]
pub struct RunState(AtomicU8);

impl RunState {
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        match self.0.load(Ordering::Acquire) {
            IDLE => RunPhase::Idle,
            RUNNING => RunPhase::Running,
            _ => RunPhase::Stopped,
        }
    }

    /// Move `idle -> running`. Returns `None` if a run is in flight or the
    /// job has been stopped.
    pub fn try_begin(self: &Arc<Self>) -> Option<RunPermit> {
        self.0
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                state: Arc::clone(self),
            })
    }

    /// Terminal; later ticks do nothing.
    pub fn stop(&self) {
        self.0.store(STOPPED, Ordering::Release);
    }
}

/// Held for the duration of one run. Dropping it returns the job to `idle`
/// unless it was stopped meanwhile.
#[derive(Debug)]
pub struct RunPermit {
    state: Arc<RunState>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        let _ = self
            .state
            .0
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Completed,
    Panicked,
    SkippedBusy,
    SkippedStopped,
}

/// Execute one scheduler tick for `job`.
///
/// The run happens in its own task so a panic is logged here instead of
/// reaching the scheduler.
pub async fn run_guarded<F>(job: &'static str, state: &Arc<RunState>, run: F) -> TickOutcome
where
    F: Future<Output = ()> + Send + 'static,
{
    let Some(permit) = state.try_begin() else {
        return match state.phase() {
            RunPhase::Stopped => {
                tracing::debug!(job, "scheduler: job stopped; ignoring tick");
                TickOutcome::SkippedStopped
            }
            RunPhase::Idle | RunPhase::Running => {
                tracing::warn!(job, "scheduler: previous run still in progress; skipping tick");
                TickOutcome::SkippedBusy
            }
        };
    };

    let outcome = match tokio::spawn(run).await {
        Ok(()) => TickOutcome::Completed,
        Err(e) => {
            tracing::error!(job, error = %e, "scheduler: run aborted");
            TickOutcome::Panicked
        }
    };
    drop(permit);
    outcome
}
