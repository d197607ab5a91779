//! Armed regeneration request.

/// One-shot regeneration request owned by the caller's control loop.
///
/// Arming it asks for one rebuild; polling consumes the request. Polling a
/// disarmed trigger does nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenerateTrigger {
    armed: bool,
}

impl RegenerateTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a rebuild on the next poll.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consume the request. Returns whether a rebuild was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}
