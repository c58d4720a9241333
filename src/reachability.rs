// src/reachability.rs
use tokio::sync::watch;

/// Monitor side: whatever observes the network pushes updates through this.
#[derive(Debug)]
pub struct Reachability {
    tx: watch::Sender<bool>,
}

/// Read side, consulted right before a refresh is issued.
#[derive(Debug, Clone)]
pub struct ReachabilitySignal {
    rx: watch::Receiver<bool>,
}

/// Create a linked monitor/signal pair starting at `initially_reachable`.
pub fn channel(initially_reachable: bool) -> (Reachability, ReachabilitySignal) {
    let (tx, rx) = watch::channel(initially_reachable);
    (Reachability { tx }, ReachabilitySignal { rx })
}

impl Reachability {
    pub fn set(&self, reachable: bool) {
        self.tx.send_replace(reachable);
    }

    pub fn signal(&self) -> ReachabilitySignal {
        ReachabilitySignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl ReachabilitySignal {
    /// A signal that never changes. The last value stays readable after the
    /// sender is gone.
    pub fn fixed(reachable: bool) -> Self {
        let (_tx, rx) = watch::channel(reachable);
        Self { rx }
    }

    pub fn is_reachable(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_are_visible_to_all_signals() {
        let (monitor, sig) = channel(true);
        let other = monitor.signal();
        assert!(sig.is_reachable());
        monitor.set(false);
        assert!(!sig.is_reachable());
        assert!(!other.is_reachable());
    }

    #[test]
    fn fixed_signal_keeps_value() {
        assert!(ReachabilitySignal::fixed(true).is_reachable());
        assert!(!ReachabilitySignal::fixed(false).is_reachable());
    }
}
