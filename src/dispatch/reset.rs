use std::time::Duration;
use tokio::time::Instant;

/// Clears a displayed result after a fixed delay.
///
/// At most one deadline is pending. Arming again replaces it; any competing
/// transition must call [`ResetTimer::cancel`] so a stale deadline cannot
/// fire against newer state.
#[derive(Debug, Clone)]
pub struct ResetTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResetTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start the countdown. A delay past the clock's range never fires.
    pub fn arm(&mut self) {
        self.deadline = Instant::now().checked_add(self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Mark the pending deadline as consumed.
    pub fn fire(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Resolves when the pending deadline passes; never resolves when none is
    /// pending.
    pub fn expired(&self) -> impl std::future::Future<Output = ()> + use<> {
        let deadline = self.deadline;
        async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        }
    }
}
