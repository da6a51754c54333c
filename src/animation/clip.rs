use crate::animation::frame::AnimatedFrame;

/// A named animation clip: a finite, restartable sequence of baked frames.
///
/// The current-frame index is mutable playback state advanced externally by
/// a caller-driven [`next_frame`](Animation::next_frame) command; no internal
/// timer drives it. Advancing past the last frame wraps to frame 0.
#[derive(Debug, Clone)]
pub struct Animation {
    name: String,
    duration: f64,
    frames: Vec<AnimatedFrame>,
    current_frame: usize,
}

impl Animation {
    #[must_use]
    pub fn new(name: impl Into<String>, frames: Vec<AnimatedFrame>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            frames,
            current_frame: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    /// The frame playback currently rests on.
    ///
    /// # Panics
    /// Panics if the clip has no frames; importers reject empty clips.
    #[must_use]
    pub fn current_frame(&self) -> &AnimatedFrame {
        &self.frames[self.current_frame]
    }

    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[AnimatedFrame] {
        &self.frames
    }

    /// Steps to the next frame, wrapping to 0 past the last one.
    pub fn next_frame(&mut self) {
        let next = self.current_frame + 1;
        if next > self.frames.len().saturating_sub(1) {
            self.current_frame = 0;
        } else {
            self.current_frame = next;
        }
    }
}
