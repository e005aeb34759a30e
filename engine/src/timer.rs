use std::time::{Duration, Instant};

/// Paces real-time steps. Armed at the start of each tick; the remaining
/// time doubles as the poll timeout, so timer expiry and poll timeout
/// coincide and the input phase ends no earlier than the step deadline.
pub struct StepTimer {
    step: Duration,
    deadline: Instant,
}

impl StepTimer {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            deadline: Instant::now() + step,
        }
    }

    /// Starts the next step's countdown.
    pub fn arm(&mut self) {
        self.deadline = Instant::now() + self.step;
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time left until expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}
