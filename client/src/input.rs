//! Input send policy: transmit on change or at a minimum rate

use shared::{InputFlags, INPUT_SEND_INTERVAL};

/// Decides each frame whether the sampled input flags go on the wire.
///
/// An input message is sent whenever the flags changed since the last
/// send, or when the resend interval has elapsed without one — bounding
/// how stale the server's view of a held key can get. Keyboard sampling
/// itself lives with the window layer; this only sees the flags.
pub struct InputTracker {
    last_sent: Option<InputFlags>,
    since_send: f32,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            last_sent: None,
            since_send: 0.0,
        }
    }

    /// Feeds this frame's flags and delta time; returns flags to send, if any.
    pub fn update(&mut self, flags: InputFlags, dt: f32) -> Option<InputFlags> {
        self.since_send += dt;

        let changed = self.last_sent != Some(flags);
        if changed || self.since_send >= INPUT_SEND_INTERVAL {
            self.last_sent = Some(flags);
            self.since_send = 0.0;
            Some(flags)
        } else {
            None
        }
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right() -> InputFlags {
        InputFlags {
            right: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_frame_always_sends() {
        let mut tracker = InputTracker::new();
        assert_eq!(tracker.update(InputFlags::default(), 0.016), Some(InputFlags::default()));
    }

    #[test]
    fn test_change_triggers_send() {
        let mut tracker = InputTracker::new();
        tracker.update(InputFlags::default(), 0.016);

        assert_eq!(tracker.update(right(), 0.016), Some(right()));
    }

    #[test]
    fn test_unchanged_input_is_suppressed() {
        let mut tracker = InputTracker::new();
        tracker.update(right(), 0.016);

        assert_eq!(tracker.update(right(), 0.016), None);
        assert_eq!(tracker.update(right(), 0.016), None);
    }

    #[test]
    fn test_resend_after_interval() {
        let mut tracker = InputTracker::new();
        tracker.update(right(), 0.016);

        // Accumulate just past the resend interval without any change
        let frames = (INPUT_SEND_INTERVAL / 0.016) as usize + 1;
        let mut sent = 0;
        for _ in 0..frames {
            if tracker.update(right(), 0.016).is_some() {
                sent += 1;
            }
        }
        assert_eq!(sent, 1);
    }

    #[test]
    fn test_release_counts_as_change() {
        let mut tracker = InputTracker::new();
        tracker.update(right(), 0.016);

        assert_eq!(
            tracker.update(InputFlags::default(), 0.016),
            Some(InputFlags::default())
        );
    }
}
