//! Periodic background tasks
//!
//! Fixed-interval loops for the retention sweeper and the limiter eviction
//! pass. Each loop carries a shutdown channel so tests can stop it
//! deterministically; in production the tasks run until process exit.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a spawned periodic loop.
///
/// Dropping the handle also stops the loop; hold it for as long as the task
/// should keep running.
pub struct PeriodicTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawns a loop that runs `tick` once per `interval`. With
    /// `run_at_start` the first tick happens immediately instead of one full
    /// interval in.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, run_at_start: bool, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            if run_at_start {
                tick().await;
            }

            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately on the first tick; push the first
            // await out a full period so run_at_start stays the only way to
            // get an immediate run.
            timer.reset();

            loop {
                tokio::select! {
                    _ = timer.tick() => tick().await,
                    _ = stopped.changed() => {
                        debug!("{} task stopping", name);
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signals the loop to exit and waits for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
