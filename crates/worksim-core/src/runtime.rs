use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::events::SimEvent;
use crate::scheduler::{Clock, SystemClock};
use crate::session::ParticipantSession;

pub type SharedSession = Arc<Mutex<ParticipantSession>>;

/// Drives a [`ParticipantSession`] on a tokio interval and forwards its
/// events. Must be created inside a tokio runtime.
pub struct SimulationRuntime {
    session: SharedSession,
    clock: Arc<dyn Clock>,
    event_tx: UnboundedSender<SimEvent>,
    ticker: Option<JoinHandle<()>>,
}

impl SimulationRuntime {
    pub fn spawn(session: ParticipantSession, tick: Duration) -> (Self, UnboundedReceiver<SimEvent>) {
        Self::with_clock(session, Arc::new(SystemClock::new()), tick)
    }

    pub fn with_clock(
        session: ParticipantSession,
        clock: Arc<dyn Clock>,
        tick: Duration,
    ) -> (Self, UnboundedReceiver<SimEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Arc::new(Mutex::new(session));

        let ticker = {
            let session = session.clone();
            let clock = clock.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let mut interval = time::interval(tick);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    let events = session.lock().tick(clock.now());
                    for event in events {
                        if event_tx.send(event).is_err() {
                            debug!("event receiver dropped, stopping ticker");
                            return;
                        }
                    }
                }
            })
        };

        info!(tick_ms = tick.as_millis() as u64, "simulation runtime started");
        let runtime = Self {
            session,
            clock,
            event_tx,
            ticker: Some(ticker),
        };
        (runtime, event_rx)
    }

    /// Simulation time since the runtime started
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// Run `f` against the session at the current simulation time
    pub fn with_session<T>(&self, f: impl FnOnce(&mut ParticipantSession, Duration) -> T) -> T {
        let now = self.clock.now();
        f(&mut self.session.lock(), now)
    }

    /// Forward events produced by a direct session call to the receiver.
    /// Returns false once the receiver has been dropped.
    pub fn dispatch(&self, events: Vec<SimEvent>) -> bool {
        for event in events {
            if self.event_tx.send(event).is_err() {
                debug!("event receiver dropped, discarding dispatched events");
                return false;
            }
        }
        true
    }

    /// Stop ticking and cancel every pending timer
    pub fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            self.session.lock().teardown();
            info!("simulation runtime stopped");
        }
    }
}

impl Drop for SimulationRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::conference::PlayerEvent;
    use crate::config::SimulationTiming;
    use crate::models::ScriptLine;
    use crate::session::SessionStores;
    use crate::store::{DemoFlagStore, DemoFlags};

    fn session() -> ParticipantSession {
        let catalog = Catalog::builtin().with_script(vec![
            ScriptLine::new("A", "A", "hi"),
            ScriptLine::new("B", "B", "hello"),
        ]);
        let stores = SessionStores::in_memory(DemoFlagStore::in_memory(DemoFlags::default()));
        ParticipantSession::with_seed(catalog, SimulationTiming::default(), stores, 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_conference_ends_on_schedule() {
        let (mut runtime, mut events) = SimulationRuntime::spawn(session(), Duration::from_millis(15));
        let mounted = runtime.with_session(|s, now| s.mount_conference(now));
        runtime.dispatch(mounted);

        let mut transcript = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                SimEvent::Conference(PlayerEvent::EntryCommitted(entry)) => transcript.push(entry.content),
                SimEvent::Conference(PlayerEvent::Ended) => break,
                _ => {}
            }
        }

        assert_eq!(transcript, vec!["hi".to_string(), "hello".to_string()]);
        let elapsed = runtime.now();
        assert!(elapsed >= Duration::from_millis(1_105), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(1_105 + 15), "{:?}", elapsed);

        runtime.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_tears_down_session() {
        let (mut runtime, _events) = SimulationRuntime::spawn(session(), Duration::from_millis(15));
        runtime.with_session(|s, now| {
            s.start(now);
            s.mount_conference(now);
        });
        assert!(runtime.session().lock().next_deadline().is_some());

        runtime.shutdown();
        assert_eq!(runtime.session().lock().next_deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_reports_dropped_receiver() {
        let (mut runtime, events) = SimulationRuntime::spawn(session(), Duration::from_millis(15));
        let raised = runtime.with_session(|s, now| s.navigate("/participant/email", now));
        assert!(!raised.is_empty());

        drop(events);
        assert!(!runtime.dispatch(raised));
        assert!(runtime.dispatch(Vec::new()));

        runtime.shutdown();
    }
}
