//! Shared refresh-loop runner.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Drive `refresh` forever on a fixed interval, starting immediately.
///
/// Refreshes for one store never overlap (the loop awaits each one before
/// ticking again). A failed refresh is logged and the loop proceeds to the
/// next tick; the store keeps serving its previous snapshot. The watch
/// channel is the only cancellation mechanism; tests bypass the loop and
/// call `refresh` directly for deterministic single iterations.
pub(crate) fn spawn_refresh_loop<F, Fut, E>(
    name: &'static str,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut refresh: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        info!(
            store = name,
            interval_ms = every.as_millis() as u64,
            "starting poll loop"
        );

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = refresh().await {
                        error!(
                            store = name,
                            error = %error,
                            "refresh failed, keeping previous snapshot"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!(store = name, "poll loop stopped");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn loop_survives_refresh_errors_and_stops_on_shutdown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let counter = calls.clone();
        let handle = spawn_refresh_loop(
            "test",
            Duration::from_millis(100),
            shutdown_rx,
            move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n % 2 == 0 {
                        Err("transient")
                    } else {
                        Ok(())
                    }
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(350)).await;
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen >= 3, "expected several ticks, saw {seen}");

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
