//! Periodic trigger for [`ScrapeCycle`].

use std::sync::Arc;
use std::time::Duration;

use dolarhoy_page::Renderer;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::cycle::ScrapeCycle;

/// Owns the background task that runs a cycle now and then every `period`.
///
/// Failed cycles are logged and the schedule carries on. Ticks missed while
/// a slow cycle runs are skipped rather than replayed.
pub struct Scheduler {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub fn start<R>(cycle: Arc<ScrapeCycle<R>>, period: Duration) -> Self
    where
        R: Renderer + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let period = period.max(Duration::from_secs(1));

        let task = tokio::spawn(async move {
            tracing::info!(period_secs = period.as_secs(), "Scheduler started");
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => run_scheduled(&cycle).await,
                    _ = stopped.changed() => break,
                }
            }
            tracing::info!("Scheduler stopped");
        });

        Self { stop, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the task and waits for it; an in-flight cycle finishes first.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

async fn run_scheduled<R: Renderer>(cycle: &ScrapeCycle<R>) {
    match cycle.run().await {
        Ok(record) => tracing::info!(timestamp = %record.timestamp, "Scheduled scrape finished"),
        Err(e) if e.is_busy() => {}
        Err(e) => tracing::error!(error = %e, "Scheduled scrape failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dolarhoy_page::{DomNode, Error};

    use crate::history::HistoryStore;

    /// Fails the first call, then serves a page with a blue card.
    struct FlakyRenderer {
        calls: AtomicUsize,
    }

    impl Renderer for FlakyRenderer {
        fn render(&self, _url: &str) -> impl Future<Output = Result<DomNode, Error>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    return Err(Error::ConditionNotMet);
                }
                Ok(DomNode::element(
                    "body",
                    vec![DomNode::element(
                        "div",
                        vec![
                            DomNode::element("h2", vec![DomNode::text("Dólar blue")]),
                            DomNode::element("p", vec![DomNode::text("Compra $1.420,00")]),
                            DomNode::element("p", vec![DomNode::text("Venta $1.460,00")]),
                        ],
                    )],
                ))
            }
        }
    }

    fn cycle(name: &str) -> Arc<ScrapeCycle<FlakyRenderer>> {
        let dir = std::env::temp_dir().join(format!("dolarhoy_sched_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Arc::new(ScrapeCycle::new(
            FlakyRenderer {
                calls: AtomicUsize::new(0),
            },
            "https://www.dolarhoy.com/",
            HistoryStore::new(dir.join("dolar.json")),
            "UTC",
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period_despite_failures() {
        let cycle = cycle("period");
        let scheduler = Scheduler::start(Arc::clone(&cycle), Duration::from_secs(600));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cycle.renderer().calls.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(cycle.renderer().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cycle.store().load().unwrap().len(), 1);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_schedule() {
        let cycle = cycle("stop");
        let scheduler = Scheduler::start(Arc::clone(&cycle), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        scheduler.stop().await;

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(cycle.renderer().calls.load(Ordering::SeqCst), 1);
    }
}
