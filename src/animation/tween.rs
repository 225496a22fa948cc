use crate::animation::ease::Ease;

/// A scalar tween with optional delay, repeats and yoyo playback.
///
/// Times are in seconds relative to the moment the tween was started. Negative
/// durations and delays are treated as zero.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tween {
    /// Value at the start of the first iteration.
    pub from: f64,
    /// Value at the end of the first iteration.
    pub to: f64,
    /// Seconds per iteration.
    pub duration: f64,
    /// Seconds before the first iteration starts.
    pub delay: f64,
    /// Extra iterations after the first one.
    pub repeat: u32,
    /// Seconds of hold between iterations.
    pub repeat_delay: f64,
    /// Odd iterations play backwards.
    pub yoyo: bool,
    /// Curve applied to each iteration.
    pub ease: Ease,
}

/// Where a tween is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TweenState {
    /// Waiting out `delay`; the value is still `from`.
    Delayed,
    /// Inside an iteration or the hold after it.
    Active {
        /// Zero-based iteration index.
        iteration: u32,
        /// The iteration plays backwards.
        reversed: bool,
    },
    /// All iterations have finished.
    Complete,
}

/// A tween evaluated at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample {
    /// Interpolated value.
    pub value: f64,
    /// Lifetime state at that instant.
    pub state: TweenState,
}

impl Tween {
    /// `from -> to`, then back to `from`: one iteration plus one mirrored repeat.
    pub fn mirrored(from: f64, to: f64, duration: f64, delay: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            delay,
            repeat: 1,
            repeat_delay: 0.0,
            yoyo: true,
            ease,
        }
    }

    fn duration_secs(&self) -> f64 {
        self.duration.max(0.0)
    }

    fn delay_secs(&self) -> f64 {
        self.delay.max(0.0)
    }

    fn repeat_delay_secs(&self) -> f64 {
        self.repeat_delay.max(0.0)
    }

    /// Seconds from start to completion, delay included.
    pub fn total_duration(&self) -> f64 {
        let iterations = f64::from(self.repeat) + 1.0;
        self.delay_secs()
            + self.duration_secs() * iterations
            + self.repeat_delay_secs() * f64::from(self.repeat)
    }

    /// Value the tween rests on once complete.
    pub fn end_value(&self) -> f64 {
        if self.yoyo && self.repeat % 2 == 1 {
            self.from
        } else {
            self.to
        }
    }

    /// Evaluate at `elapsed` seconds since start.
    pub fn sample(&self, elapsed: f64) -> TweenSample {
        let delay = self.delay_secs();
        if elapsed < delay {
            return TweenSample {
                value: self.from,
                state: TweenState::Delayed,
            };
        }
        if elapsed >= self.total_duration() {
            return TweenSample {
                value: self.end_value(),
                state: TweenState::Complete,
            };
        }

        let duration = self.duration_secs();
        let period = duration + self.repeat_delay_secs();
        let local = elapsed - delay;
        let iteration = if period > 0.0 {
            ((local / period).floor() as u32).min(self.repeat)
        } else {
            self.repeat
        };
        let within = local - f64::from(iteration) * period;
        let progress = if duration > 0.0 {
            (within / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let reversed = self.yoyo && iteration % 2 == 1;
        let eased = if reversed {
            self.ease.apply_reversed(progress)
        } else {
            self.ease.apply(progress)
        };

        TweenSample {
            value: self.from + (self.to - self.from) * eased,
            state: TweenState::Active {
                iteration,
                reversed,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
