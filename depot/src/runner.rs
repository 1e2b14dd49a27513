//! Drives a [`ScenarioRun`] in real time.

use std::time::Duration;

use tokio::select;
use tokio::task::yield_now;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::scenario::ScenarioRun;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran and the end time was reached.
    Finished,
    /// The cancel token fired first.
    Cancelled,
}

/// Pacing of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// One step per period.
    RealTime(Duration),
    /// As fast as possible, yielding between steps.
    Fast,
}

/// Steps `run` until it finishes or `cancel_token` fires.
pub async fn drive(run: &mut ScenarioRun, pace: Pace, cancel_token: CancellationToken) -> RunOutcome {
    match pace {
        Pace::RealTime(period) => {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            while !run.is_finished() {
                select! {
                    biased;
                    () = cancel_token.cancelled() => return RunOutcome::Cancelled,
                    _ = ticker.tick() => run.step(),
                }
            }
        }
        Pace::Fast => {
            while !run.is_finished() {
                if cancel_token.is_cancelled() {
                    return RunOutcome::Cancelled;
                }
                run.step();
                yield_now().await;
            }
        }
    }
    log::info!(
        "Finished after {} steps ({} simulated)",
        run.world().cur_tick(),
        run.world().cur_time()
    );
    RunOutcome::Finished
}
