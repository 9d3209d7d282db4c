//! Flowcap network-quiet settle wait.
//!
//! Consumes a page's request lifecycle events and resolves once the page has
//! had zero in-flight requests for a sustained quiet window, bounded by a
//! hard timeout. Streaming transports (WebSocket/EventSource) and data URIs
//! are never tracked, and requests that outlive the stall threshold are
//! swept so a hung long-poll cannot block resolution.
//!
//! There is no error outcome: the wait always resolves, and "went quiet" is
//! indistinguishable from "forced by the hard timeout" by contract. The
//! event subscription is consumed by the call, so timers and the
//! subscription are released on every exit path structurally.

pub mod config;

use std::collections::HashMap;
use std::future;

use tokio::sync::broadcast;
use tokio::time::{interval, sleep_until, Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

pub use crate::config::SettleConfig;

/// Coarse resource class of a request, as reported by the driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestKind {
    Document,
    Xhr,
    Fetch,
    Script,
    Stylesheet,
    Image,
    Media,
    Font,
    WebSocket,
    EventSource,
    Other,
}

impl RequestKind {
    /// Persistent transports never "finish" and would starve quiescence.
    pub fn is_streaming(&self) -> bool {
        matches!(self, RequestKind::WebSocket | RequestKind::EventSource)
    }
}

/// Request lifecycle events fed to [`await_settle`] by the driver.
#[derive(Clone, Debug)]
pub enum NetEvent {
    RequestStarted {
        id: String,
        url: String,
        kind: RequestKind,
    },
    RequestFinished {
        id: String,
    },
    RequestFailed {
        id: String,
    },
}

/// Broadcast sender for request lifecycle events. Each [`await_settle`] call
/// takes its own `Receiver`, so concurrent waits see the stream demultiplexed
/// per call.
pub type NetEventBus = broadcast::Sender<NetEvent>;

/// Create an event channel sized for `capacity` buffered events.
pub fn channel(capacity: usize) -> (NetEventBus, broadcast::Receiver<NetEvent>) {
    broadcast::channel(capacity)
}

/// Wait until the page has had zero in-flight requests for
/// `config.quiet_ms`, or until `config.timeout_ms` has elapsed, whichever
/// comes first.
pub async fn await_settle(mut events: broadcast::Receiver<NetEvent>, config: &SettleConfig) {
    let started = Instant::now();
    let hard_deadline = started + Duration::from_millis(config.timeout_ms);
    let quiet_window = Duration::from_millis(config.quiet_ms);
    let stall_threshold = Duration::from_millis(config.stall_threshold_ms);

    // request id -> start time; owned by this call for its whole lifetime.
    let mut inflight: HashMap<String, Instant> = HashMap::new();
    // The page may already be quiet when the wait begins.
    let mut quiet_deadline: Option<Instant> = Some(started + quiet_window);
    let mut events_open = true;

    let mut sweeper = interval(Duration::from_millis(config.sweep_interval_ms.max(1)));
    sweeper.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let quiet_at = quiet_deadline;
        let quiet_wait = async move {
            match quiet_at {
                Some(deadline) => sleep_until(deadline).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            _ = sleep_until(hard_deadline) => {
                debug!(
                    inflight = inflight.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "settle wait hit hard timeout"
                );
                return;
            }
            _ = quiet_wait => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "network settled"
                );
                return;
            }
            _ = sweeper.tick() => {
                sweep_stalled(&mut inflight, stall_threshold);
                if inflight.is_empty() {
                    quiet_deadline.get_or_insert_with(|| Instant::now() + quiet_window);
                } else {
                    quiet_deadline = None;
                }
            }
            event = events.recv(), if events_open => match event {
                Ok(NetEvent::RequestStarted { id, url, kind }) => {
                    if !is_ignored(&url, kind) {
                        inflight.insert(id, Instant::now());
                        quiet_deadline = None;
                    }
                }
                Ok(NetEvent::RequestFinished { id }) | Ok(NetEvent::RequestFailed { id }) => {
                    inflight.remove(&id);
                    sweep_stalled(&mut inflight, stall_threshold);
                    if inflight.is_empty() {
                        quiet_deadline.get_or_insert_with(|| Instant::now() + quiet_window);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "settle subscriber lagged behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // No more traffic can arrive; let the timers decide.
                    events_open = false;
                }
            }
        }
    }
}

/// Traffic that can never complete must not enter the in-flight set.
fn is_ignored(url: &str, kind: RequestKind) -> bool {
    if kind.is_streaming() {
        return true;
    }
    url.starts_with("ws://") || url.starts_with("wss://") || url.starts_with("data:")
}

fn sweep_stalled(inflight: &mut HashMap<String, Instant>, threshold: Duration) {
    let now = Instant::now();
    inflight.retain(|id, started| {
        if now.duration_since(*started) > threshold {
            debug!(%id, "sweeping stalled request out of the in-flight set");
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_and_data_urls_are_ignored() {
        assert!(is_ignored("wss://example.com/socket", RequestKind::Other));
        assert!(is_ignored("ws://example.com/socket", RequestKind::Other));
        assert!(is_ignored("data:text/plain;base64,aGk=", RequestKind::Other));
        assert!(is_ignored(
            "https://example.com/stream",
            RequestKind::EventSource
        ));
        assert!(!is_ignored("https://example.com/api", RequestKind::Xhr));
    }

    #[tokio::test]
    async fn sweep_removes_only_aged_entries() {
        let mut inflight = HashMap::new();
        let old_start = Instant::now()
            .checked_sub(Duration::from_millis(500))
            .expect("clock far enough from epoch");
        inflight.insert("old".to_string(), old_start);
        inflight.insert("young".to_string(), Instant::now());

        sweep_stalled(&mut inflight, Duration::from_millis(200));

        assert!(!inflight.contains_key("old"));
        assert!(inflight.contains_key("young"));
    }
}
