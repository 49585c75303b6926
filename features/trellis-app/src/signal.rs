use futures::{future::Shared, FutureExt};
use futures_channel::oneshot;

/// Trigger half of a cooperative stop signal
///
/// Dropping the handle without triggering also releases observers; tearing a
/// server down must never wedge a polling loop.
pub struct StopHandle {
    tx: oneshot::Sender<()>,
}

impl StopHandle {
    pub fn trigger(self) {
        let _ = self.tx.send(());
    }
}

/// Observable half; every clone resolves once the handle triggers or drops
///
/// The container cancels nothing on its own. Background work owned by a
/// server is expected to select on this signal and wind down cooperatively.
#[derive(Clone)]
pub struct StopSignal {
    rx: Shared<oneshot::Receiver<()>>,
}

impl StopSignal {
    pub fn new() -> (StopHandle, StopSignal) {
        let (tx, rx) = oneshot::channel();
        (StopHandle { tx }, StopSignal { rx: rx.shared() })
    }

    /// Resolves when the owning server stops
    pub async fn stopped(&self) {
        let _ = self.rx.clone().await;
    }

    pub fn is_stopped(&self) -> bool {
        self.rx.peek().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn observers_resolve_after_trigger() {
        let (handle, signal) = StopSignal::new();
        let second = signal.clone();

        assert!(!signal.is_stopped());
        handle.trigger();

        block_on(signal.stopped());
        block_on(second.stopped());
        assert!(signal.is_stopped());
    }

    #[test]
    fn dropping_the_handle_releases_observers() {
        let (handle, signal) = StopSignal::new();
        drop(handle);
        block_on(signal.stopped());
    }
}
