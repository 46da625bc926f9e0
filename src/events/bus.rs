//! Event bus: fans each published event out to every configured sink without
//! blocking the publisher.
//!
//! One bounded queue and one worker task per sink. A slow or failing sink
//! only affects its own queue; the others keep draining. Sinks receive
//! events in publish order but persist concurrently; there is no cross-sink
//! ordering guarantee.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::event::{Event, Severity};
use crate::events::sinks::{DebugLog, Sink};

struct SinkChannel {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

pub struct EventBus {
    channels: Vec<SinkChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl EventBus {
    /// Spawn one worker per sink. Delivery failures and timeouts are recorded
    /// in the debug log and never surface to publishers.
    pub fn new(sinks: Vec<Arc<dyn Sink>>, debug: Arc<DebugLog>) -> Self {
        let mut channels = Vec::with_capacity(sinks.len());
        let mut workers = Vec::with_capacity(sinks.len());

        for sink in sinks {
            let name = sink.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sink.queue_capacity().max(1));
            let debug = Arc::clone(&debug);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let attempt = tokio::time::timeout(sink.write_timeout(), sink.deliver(&ev));
                    let failure = match attempt.await {
                        Ok(Ok(())) => None,
                        Ok(Err(e)) => Some(format!("sink '{}' delivery failed: {}", name, e)),
                        Err(_) => Some(format!(
                            "sink '{}' timed out after {:?}",
                            name,
                            sink.write_timeout()
                        )),
                    };
                    if let Some(reason) = failure {
                        tracing::warn!("{}", reason);
                        // Best effort; if the debug log itself is the broken
                        // sink there is nowhere left to report.
                        debug
                            .append(&Event::new("sink", reason).with_severity(Severity::Warning))
                            .ok();
                    }
                }
            });

            channels.push(SinkChannel { name, tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Deliver an event to every sink queue. Never blocks: a full queue drops
    /// the event for that sink only, with a warning.
    pub fn publish(&self, event: Event) {
        let ev = Arc::new(event);
        for channel in &self.channels {
            match channel.tx.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(sink = channel.name, "Dropped event: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(sink = channel.name, "Dropped event: worker closed");
                }
            }
        }
    }

    /// Close all queues and wait for the workers to drain.
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            worker.await.ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecoyError, Result};
    use crate::events::sinks::SinkConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSink {
        delivered: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Sink for CountingSink {
        async fn deliver(&self, _event: &Event) -> Result<()> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct StalledSink;

    #[async_trait]
    impl Sink for StalledSink {
        async fn deliver(&self, _event: &Event) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
        fn write_timeout(&self) -> std::time::Duration {
            Duration::from_millis(50)
        }
    }

    struct FailingSink;

    #[async_trait]
    impl Sink for FailingSink {
        async fn deliver(&self, _event: &Event) -> Result<()> {
            Err(DecoyError::Catalog("endpoint unreachable".into()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn scratch_debug() -> (tempfile::TempDir, Arc<DebugLog>) {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(DebugLog::new(dir.path().join("decoy.debug.log")));
        (dir, log)
    }

    #[tokio::test]
    async fn test_fanout_reaches_all_sinks() {
        let (_dir, debug) = scratch_debug();
        let delivered = Arc::new(AtomicUsize::new(0));
        let bus = EventBus::new(
            vec![
                Arc::new(CountingSink {
                    delivered: Arc::clone(&delivered),
                }),
                Arc::new(CountingSink {
                    delivered: Arc::clone(&delivered),
                }),
            ],
            debug,
        );

        for i in 0..5 {
            bus.publish(Event::new("supervisor", format!("ev {}", i)));
        }
        bus.shutdown().await;
        assert_eq!(delivered.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_stalled_sink_does_not_block_others() {
        let (_dir, debug) = scratch_debug();
        let delivered = Arc::new(AtomicUsize::new(0));
        let bus = EventBus::new(
            vec![
                Arc::new(StalledSink),
                Arc::new(CountingSink {
                    delivered: Arc::clone(&delivered),
                }),
            ],
            debug,
        );

        bus.publish(Event::new("supervisor", "probe"));

        // The healthy sink drains immediately while the stalled one times out.
        tokio::time::timeout(Duration::from_secs(5), async {
            while delivered.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        bus.shutdown().await;
    }

    #[tokio::test]
    async fn test_failures_are_recorded_in_debug_log() {
        let (_dir, debug) = scratch_debug();
        let bus = EventBus::new(vec![Arc::new(FailingSink)], Arc::clone(&debug));
        bus.publish(Event::new("supervisor", "probe"));
        bus.shutdown().await;

        let content = std::fs::read_to_string(debug.path()).unwrap();
        assert!(content.contains("endpoint unreachable"));
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }

    #[tokio::test]
    async fn test_concurrent_publishers_keep_log_valid() {
        let (_dir, debug) = scratch_debug();
        let sinks = crate::events::sinks::build_sinks(Arc::clone(&debug), &SinkConfig::default())
            .await
            .unwrap();
        let bus = Arc::new(EventBus::new(sinks, Arc::clone(&debug)));

        let mut handles = Vec::new();
        for worker in 0..4 {
            let bus = Arc::clone(&bus);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    bus.publish(Event::new("supervisor", format!("w{} e{}", worker, i)));
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        Arc::try_unwrap(bus).ok().unwrap().shutdown().await;

        let content = std::fs::read_to_string(debug.path()).unwrap();
        assert_eq!(content.lines().count(), 100);
        for line in content.lines() {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }
}
