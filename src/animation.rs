//! Frame-cycling state machine for GIF and video previews.
//!
//! The driver owns a one-shot deadline instead of a self-rescheduling timer.
//! The UI loop calls [`AnimationDriver::poll`] every tick; when the armed
//! deadline has passed the driver advances and re-arms for the next frame.

use crate::domain::{Frame, FrameSequence};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running { index: usize, deadline: Instant },
    Stopped,
}

#[derive(Debug)]
pub struct AnimationDriver {
    frames: FrameSequence,
    state: DriverState,
}

impl AnimationDriver {
    pub fn new(frames: FrameSequence) -> Self {
        Self {
            frames,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            DriverState::Running { index, .. } => Some(index),
            _ => None,
        }
    }

    /// idle -> running. Returns frame 0 for display. No-op in other states.
    pub fn start(&mut self, now: Instant) -> Option<&Frame> {
        if self.state != DriverState::Idle {
            return None;
        }
        self.arm(0, now);
        Some(self.frames.get(0))
    }

    /// The armed delay elapsed: advance, re-arm, return the frame to display
    pub fn elapse(&mut self, now: Instant) -> Option<&Frame> {
        let DriverState::Running { index, .. } = self.state else {
            return None;
        };
        let next = self.frames.next_index(index);
        self.arm(next, now);
        Some(self.frames.get(next))
    }

    /// Fires [`elapse`](Self::elapse) once if the deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<&Frame> {
        match self.state {
            DriverState::Running { deadline, .. } if now >= deadline => self.elapse(now),
            _ => None,
        }
    }

    /// Cancels any armed delay. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
    }

    fn arm(&mut self, index: usize, now: Instant) {
        self.state = DriverState::Running {
            index,
            deadline: now + self.frames.get(index).duration,
        };
    }
}

impl Drop for AnimationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
