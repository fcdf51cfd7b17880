//! Animation signals consumed by the ability state machine.
//!
//! Abilities never track frames themselves. Each tick they describe the
//! animation they are playing with an [`AnimationCue`] and ask an
//! [`AnimationSignals`] implementation for the current frame and whether the
//! clip has finished one full pass.

use ashfall_common::ActorId;

use crate::timer::SimTime;

/// The clip an actor is playing for one ability stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCue {
    /// Performing actor
    pub actor: ActorId,
    /// Ability index on the weapon
    pub ability: usize,
    /// Stage index within the ability
    pub stage: usize,
    /// When the stage (re)started
    pub started_at: SimTime,
    /// Current tick time
    pub now: SimTime,
    /// Frames in the clip
    pub frame_count: u32,
    /// Duration of each frame
    pub frame_ms: u64,
}

impl AnimationCue {
    /// Milliseconds since the stage started.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.now.since(self.started_at)
    }

    /// Total clip duration.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.frame_ms.saturating_mul(self.frame_count as u64)
    }
}

/// Frame and completion source for ability stages.
pub trait AnimationSignals {
    /// Frame index currently displayed for the cue.
    fn current_frame(&self, cue: &AnimationCue) -> u32;

    /// Whether the clip has played through once since `started_at`.
    fn completed_once(&self, cue: &AnimationCue) -> bool;
}

/// Frame timing derived purely from elapsed logical time.
///
/// Used headless and in tests. A renderer with its own clips can implement
/// [`AnimationSignals`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineAnimation;

impl AnimationSignals for TimelineAnimation {
    fn current_frame(&self, cue: &AnimationCue) -> u32 {
        if cue.frame_count == 0 {
            return 0;
        }
        let frame = cue.elapsed_ms() / cue.frame_ms.max(1);
        u32::try_from(frame)
            .unwrap_or(u32::MAX)
            .min(cue.frame_count - 1)
    }

    fn completed_once(&self, cue: &AnimationCue) -> bool {
        cue.elapsed_ms() >= cue.duration_ms()
    }
}
