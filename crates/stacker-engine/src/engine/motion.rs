use std::time::Duration;

use crate::core::WorldPos;

/// Horizontal movement of the presented piece between two cell centers.
///
/// The slide is a resumable step: each [`Self::advance`] call moves it
/// forward by one tick. It is finished once `elapsed >= duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slide {
    from: WorldPos,
    to: WorldPos,
    elapsed: Duration,
    duration: Duration,
}

impl Slide {
    #[must_use]
    pub const fn new(from: WorldPos, to: WorldPos, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    #[must_use]
    pub const fn from(&self) -> WorldPos {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> WorldPos {
        self.to
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Progress in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advances by `dt` and returns `true` once the slide has finished.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    /// Interpolated position at the current progress.
    #[must_use]
    pub fn position(&self) -> WorldPos {
        self.from.lerp(self.to, self.fraction())
    }
}

/// Horizontal motion state of the active piece: `Idle -> Sliding -> Idle`.
#[derive(Debug, Default, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Motion {
    #[default]
    Idle,
    Sliding(Slide),
}

impl Motion {
    #[must_use]
    pub const fn slide(&self) -> Option<&Slide> {
        match self {
            Motion::Idle => None,
            Motion::Sliding(slide) => Some(slide),
        }
    }
}
