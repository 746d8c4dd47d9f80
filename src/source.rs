use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::plan::Layer;

/// Canned snapshot served by the stub source.
const STUB_SNAPSHOT: &str = include_str!("../data/layers.json");

/// Simulated latency of the stub source. A real source is a network call;
/// the app must not assume any bound either way.
pub const STUB_LATENCY: Duration = Duration::from_millis(1000);

/// Error type for snapshot fetches
#[derive(Debug)]
pub enum FetchError {
    /// The payload did not parse as a layer snapshot.
    Decode(String),
    /// The source could not be reached. The stub never produces this; real
    /// sources report transport problems through it.
    Unavailable(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Decode(e) => write!(f, "Decode error: {}", e),
            FetchError::Unavailable(e) => write!(f, "Source unavailable: {}", e),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Outcome message delivered from the fetch worker back to the UI thread.
#[derive(Debug)]
pub enum SourceResult {
    Loaded(Vec<Layer>),
    Failed(FetchError),
}

/// A provider of layer snapshots.
///
/// `fetch` blocks and therefore always runs on a worker thread (see
/// [`spawn_fetch`]), never on the UI thread.
pub trait LayerSource: Send + 'static {
    fn fetch(&self) -> Result<Vec<Layer>, FetchError>;
}

/// Stub source: sleeps the simulated latency, then decodes the canned
/// snapshot embedded at build time.
pub struct StubSource {
    latency: Duration,
    payload: &'static str,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            latency: STUB_LATENCY,
            payload: STUB_SNAPSHOT,
        }
    }

    /// Stub with a custom latency (tests use zero or near-zero).
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            payload: STUB_SNAPSHOT,
        }
    }

    /// Stub serving an arbitrary payload, for exercising the decode path.
    pub fn with_payload(payload: &'static str) -> Self {
        Self {
            latency: Duration::ZERO,
            payload,
        }
    }
}

impl Default for StubSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSource for StubSource {
    fn fetch(&self) -> Result<Vec<Layer>, FetchError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        let layers: Vec<Layer> = serde_json::from_str(self.payload)?;
        Ok(layers)
    }
}

/// Run `source.fetch()` on a background worker and deliver the outcome over
/// `sender`. Issued exactly once per app lifetime. If the receiver is gone
/// by the time the fetch resolves (panel torn down), the send is discarded
/// and the stale result is never applied.
pub fn spawn_fetch<S: LayerSource>(source: S, sender: Sender<SourceResult>) {
    rayon::spawn(move || match source.fetch() {
        Ok(layers) => {
            let _ = sender.send(SourceResult::Loaded(layers));
        }
        Err(e) => {
            let _ = sender.send(SourceResult::Failed(e));
        }
    });
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn stub_serves_the_canned_snapshot_in_order() {
        let source = StubSource::with_latency(Duration::ZERO);
        let layers = source.fetch().expect("stub fetch never fails");
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Walls", "Doors", "Furniture", "Electrical"]);
        let hidden: Vec<&str> = layers
            .iter()
            .filter(|l| !l.visible)
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(hidden, vec!["3"]);
    }

    #[test]
    fn worker_delivers_the_snapshot_over_the_channel() {
        let (sender, receiver) = mpsc::channel();
        spawn_fetch(StubSource::with_latency(Duration::from_millis(10)), sender);
        match receiver.recv_timeout(Duration::from_secs(5)) {
            Ok(SourceResult::Loaded(layers)) => assert_eq!(layers.len(), 4),
            Ok(SourceResult::Failed(e)) => panic!("stub reported failure: {}", e),
            Err(e) => panic!("worker never delivered: {}", e),
        }
    }

    #[test]
    fn worker_send_into_dropped_receiver_is_discarded() {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        // Must not panic; the worker swallows the disconnected send.
        spawn_fetch(StubSource::with_latency(Duration::ZERO), sender);
    }

    #[test]
    fn malformed_payload_reports_a_decode_error() {
        let source = StubSource::with_payload("not a snapshot");
        match source.fetch() {
            Err(FetchError::Decode(_)) => {}
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn fetch_error_display_is_readable() {
        let err = FetchError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Source unavailable: connection refused");
        let err = FetchError::Decode("expected value at line 1".to_string());
        assert!(err.to_string().starts_with("Decode error:"));
    }
}
