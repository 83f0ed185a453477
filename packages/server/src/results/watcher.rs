use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::source::ResultsSource;
use crate::models::results::ResultsReveal;

/// Handle to a running results watcher.
///
/// The polling loop stops when the handle is dropped, so tying the handle's
/// lifetime to the consuming stream guarantees no timer outlives its viewer.
pub struct WatcherHandle {
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the polling loop immediately.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a results watcher over the given hackathons.
///
/// On start and then once per `poll_interval`, each hackathon not yet
/// revealed is queried in turn. The first non-empty result list of a pass is
/// delivered on the returned channel and that hackathon is marked checked:
/// reveals are at-most-once per watcher, and a revealed hackathon is never
/// queried again. A failed query is logged and the hackathon stays eligible
/// for the next pass. The loop ends on its own once every hackathon has been
/// revealed.
pub fn spawn(
    source: Arc<dyn ResultsSource>,
    hackathon_ids: Vec<i32>,
    poll_interval: Duration,
) -> (WatcherHandle, mpsc::Receiver<ResultsReveal>) {
    let (tx, rx) = mpsc::channel(8);

    let mut ids = hackathon_ids;
    ids.sort_unstable();
    ids.dedup();

    let task = tokio::spawn(async move {
        let mut checked: HashSet<i32> = HashSet::new();
        let mut interval = tokio::time::interval(poll_interval);

        loop {
            interval.tick().await;

            let mut revealed = None;
            for &id in &ids {
                if checked.contains(&id) {
                    continue;
                }
                match source.fetch_results(id).await {
                    Ok(results) if !results.is_empty() => {
                        checked.insert(id);
                        revealed = Some(ResultsReveal {
                            hackathon_id: id,
                            results,
                            revealed_at: Utc::now(),
                        });
                        // One reveal per pass; the rest wait for the next tick.
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(
                            hackathon_id = id,
                            error = %e,
                            "Results query failed; will retry next pass"
                        );
                    }
                }
            }

            if let Some(reveal) = revealed {
                tracing::debug!(hackathon_id = reveal.hackathon_id, "Revealing results");
                if tx.send(reveal).await.is_err() {
                    // Receiver gone; nobody is watching anymore.
                    break;
                }
            }

            if checked.len() == ids.len() {
                break;
            }
        }
    });

    (WatcherHandle { task }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::models::results::ResultEntry;

    fn entry(team_id: i32) -> ResultEntry {
        ResultEntry {
            team_id,
            team_name: format!("team-{team_id}"),
            rank: 1,
            final_score: 42.0,
        }
    }

    enum Scripted {
        Empty,
        Results,
        Fail,
    }

    /// Scripted source: pops one response per call for each hackathon and
    /// records every call. Exhausted scripts answer "no results yet".
    struct MockSource {
        scripts: Mutex<HashMap<i32, Vec<Scripted>>>,
        calls: Mutex<Vec<i32>>,
    }

    impl MockSource {
        fn new(scripts: HashMap<i32, Vec<Scripted>>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls_for(&self, id: i32) -> usize {
            self.calls.lock().unwrap().iter().filter(|&&c| c == id).count()
        }
    }

    #[async_trait]
    impl ResultsSource for MockSource {
        async fn fetch_results(&self, hackathon_id: i32) -> anyhow::Result<Vec<ResultEntry>> {
            self.calls.lock().unwrap().push(hackathon_id);
            let next = {
                let mut scripts = self.scripts.lock().unwrap();
                match scripts.get_mut(&hackathon_id) {
                    Some(script) if !script.is_empty() => script.remove(0),
                    _ => Scripted::Empty,
                }
            };
            match next {
                Scripted::Empty => Ok(vec![]),
                Scripted::Results => Ok(vec![entry(hackathon_id * 10)]),
                Scripted::Fail => Err(anyhow::anyhow!("transport failure")),
            }
        }
    }

    const INTERVAL: Duration = Duration::from_secs(60);

    async fn wait_until(source: &MockSource, id: i32, at_least: usize) {
        // Deadlock guard only. Under the paused clock the 5ms busy-poll below
        // advances virtual time in small steps, so this bound must comfortably
        // exceed the several poll intervals a pass sequence can span.
        tokio::time::timeout(INTERVAL * 100, async {
            while source.calls_for(id) < at_least {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("watcher stopped polling unexpectedly");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveals_exactly_once_and_never_requeries() {
        // Three hackathons; only B (id 2) has results, appearing on cycle 2.
        let source = MockSource::new(HashMap::from([(
            2,
            vec![Scripted::Empty, Scripted::Results],
        )]));

        let (_handle, mut rx) = spawn(source.clone(), vec![1, 2, 3], INTERVAL);

        let reveal = rx.recv().await.expect("expected a reveal for B");
        assert_eq!(reveal.hackathon_id, 2);
        assert_eq!(reveal.results.len(), 1);

        // Let several more cycles run; A and C stay eligible, B stays silent.
        wait_until(&source, 1, 5).await;
        wait_until(&source, 3, 5).await;
        assert_eq!(source.calls_for(2), 2, "B must never be re-queried");
        assert!(rx.try_recv().is_err(), "B must be revealed exactly once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_query_leaves_hackathon_eligible() {
        let source = MockSource::new(HashMap::from([(
            1,
            vec![Scripted::Fail, Scripted::Results],
        )]));

        let (_handle, mut rx) = spawn(source.clone(), vec![1], INTERVAL);

        // The first pass fails; the second reveals.
        let reveal = rx.recv().await.expect("expected a reveal after retry");
        assert_eq!(reveal.hackathon_id, 1);
        assert_eq!(source.calls_for(1), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_reveal_per_pass() {
        // Both hackathons have results immediately; they must arrive on
        // separate passes, lowest id first.
        let source = MockSource::new(HashMap::from([
            (1, vec![Scripted::Results]),
            (2, vec![Scripted::Results]),
        ]));

        let (_handle, mut rx) = spawn(source.clone(), vec![1, 2], INTERVAL);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.hackathon_id, 1);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.hackathon_id, 2);
        assert!(rx.recv().await.is_none());

        // The first pass stopped at hackathon 1, so each was queried once.
        assert_eq!(source.calls_for(1), 1);
        assert_eq!(source.calls_for(2), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ends_when_everything_is_revealed() {
        let source = MockSource::new(HashMap::from([(1, vec![Scripted::Results])]));

        let (_handle, mut rx) = spawn(source.clone(), vec![1], INTERVAL);

        assert_eq!(rx.recv().await.unwrap().hackathon_id, 1);
        // Channel closes once the loop finishes.
        assert!(rx.recv().await.is_none());
        assert_eq!(source.calls_for(1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_handle_stops_the_timer() {
        let source = MockSource::new(HashMap::new());

        let (handle, _rx) = spawn(source.clone(), vec![1], INTERVAL);
        wait_until(&source, 1, 2).await;
        drop(handle);

        // Give the abort a moment to land, then confirm polling stopped.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after = source.calls_for(1);
        tokio::time::sleep(10 * INTERVAL).await;
        assert_eq!(source.calls_for(1), after, "timer must not outlive its handle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_watch_set_finishes_immediately() {
        let source = MockSource::new(HashMap::new());
        let (_handle, mut rx) = spawn(source, vec![], INTERVAL);
        assert!(rx.recv().await.is_none());
    }
}
