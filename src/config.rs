//! Engine Settings
//!
//! [`EngineConfig`] groups every tunable of the blending engine. All fields
//! are public; the `with_*` helpers exist for chained construction.
//!
//! ```rust,ignore
//! use myth_blend::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_fade_duration(0.3)
//!     .with_lunge_time_scale(2.5);
//! ```

/// Default crossfade length in seconds.
pub const DEFAULT_FADE_DURATION: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Clip played while the body moves faster than the threshold.
    pub run_clip: String,
    /// Clip played otherwise.
    pub idle_clip: String,
    /// Squared linear speed above which an NPC counts as running.
    pub run_speed_threshold_sq: f32,
    /// Fade used by the locomotion controller and forced triggers.
    pub fade_duration: f32,
    /// Fade into the melee lunge.
    pub lunge_fade_duration: f32,
    /// Playback speed multiplier of the melee lunge.
    pub lunge_time_scale: f32,
    /// Whether a triggered clip on a generic entity locks out further
    /// triggers until it finishes.
    pub lock_generic_triggers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_clip: "Run".to_string(),
            idle_clip: "Idle".to_string(),
            run_speed_threshold_sq: 0.01,
            fade_duration: DEFAULT_FADE_DURATION,
            lunge_fade_duration: 0.1,
            lunge_time_scale: 2.0,
            lock_generic_triggers: false,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_clips(mut self, idle: impl Into<String>, run: impl Into<String>) -> Self {
        self.idle_clip = idle.into();
        self.run_clip = run.into();
        self
    }

    #[must_use]
    pub fn with_run_speed_threshold_sq(mut self, threshold_sq: f32) -> Self {
        self.run_speed_threshold_sq = threshold_sq;
        self
    }

    #[must_use]
    pub fn with_fade_duration(mut self, seconds: f32) -> Self {
        self.fade_duration = seconds;
        self
    }

    #[must_use]
    pub fn with_lunge_fade_duration(mut self, seconds: f32) -> Self {
        self.lunge_fade_duration = seconds;
        self
    }

    #[must_use]
    pub fn with_lunge_time_scale(mut self, time_scale: f32) -> Self {
        self.lunge_time_scale = time_scale;
        self
    }

    #[must_use]
    pub fn with_lock_generic_triggers(mut self, enabled: bool) -> Self {
        self.lock_generic_triggers = enabled;
        self
    }
}
