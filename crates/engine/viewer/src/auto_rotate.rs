//! Auto-rotate debounce
//!
//! Auto-rotation stops the moment the pointer goes down and resumes a fixed
//! number of frames after it is released. A new pointer-down while the
//! countdown is running cancels it.

/// Frame-counting auto-rotate scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoRotateScheduler {
    enabled: bool,
    /// Set on pointer-up, cleared on pointer-down or when the countdown ends
    pending: bool,
    frames: u32,
    resume_after: u32,
}

impl AutoRotateScheduler {
    /// Enabled scheduler that resumes `resume_after` frames after release
    pub fn new(resume_after: u32) -> Self {
        Self {
            enabled: true,
            pending: false,
            frames: 0,
            resume_after,
        }
    }

    /// Stop rotating now and cancel any pending resume
    pub fn suspend(&mut self) {
        self.enabled = false;
        self.pending = false;
        self.frames = 0;
    }

    /// Start the countdown to resume
    pub fn schedule_resume(&mut self) {
        self.pending = true;
        self.frames = 0;
    }

    /// Advance one frame
    ///
    /// Returns `true` on the frame auto-rotate is re-enabled.
    pub fn tick(&mut self) -> bool {
        if !self.pending {
            self.frames = 0;
            return false;
        }

        self.frames += 1;
        if self.frames >= self.resume_after {
            self.enabled = true;
            self.pending = false;
            self.frames = 0;
            tracing::debug!("Auto-rotate resumed");
            return true;
        }
        false
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Frames counted since the countdown started
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_at_start() {
        let mut scheduler = AutoRotateScheduler::new(100);
        assert!(scheduler.is_enabled());
        assert!(!scheduler.tick());
        assert!(scheduler.is_enabled());
    }

    #[test]
    fn test_resumes_on_threshold_frame() {
        let mut scheduler = AutoRotateScheduler::new(100);
        scheduler.suspend();
        scheduler.schedule_resume();

        let mut transitions = Vec::new();
        for frame in 1..=150 {
            if scheduler.tick() {
                transitions.push(frame);
            }
        }

        assert_eq!(transitions, vec![100]);
        assert!(scheduler.is_enabled());
    }

    #[test]
    fn test_suspend_resets_counter() {
        let mut scheduler = AutoRotateScheduler::new(100);
        scheduler.suspend();
        scheduler.schedule_resume();
        for _ in 0..60 {
            scheduler.tick();
        }
        assert_eq!(scheduler.frames(), 60);

        scheduler.suspend();
        assert_eq!(scheduler.frames(), 0);
        for _ in 0..200 {
            assert!(!scheduler.tick());
        }
        assert!(!scheduler.is_enabled());
    }

    #[test]
    fn test_counter_stays_zero_without_pending() {
        let mut scheduler = AutoRotateScheduler::new(3);
        scheduler.suspend();
        scheduler.tick();
        scheduler.tick();
        assert_eq!(scheduler.frames(), 0);
    }
}
