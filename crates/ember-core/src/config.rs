//! Top-level configuration surface: everything the composition root tunes,
//! with `Default` impls sourced from `constants.rs` and a one-time
//! structural validation pass. Runtime entry points still clamp their own
//! inputs; validation only rejects what clamping cannot repair.

use crate::constants::ONE_SHOT_FLOOR;
use crate::error::{finite, positive, ConfigError};
use crate::gaze::{DeadZone, GazeConfig};
use crate::phase::{GrowthModel, PhaseThresholds};
use crate::soundscape::SoundscapeConfig;
use crate::visual::{FireVisualConfig, GazeVolumeConfig};

#[derive(Clone, Copy)]
pub struct EmberConfig {
    pub gaze: GazeConfig,
    pub thresholds: PhaseThresholds,
    pub growth: GrowthModel,
    pub soundscape: SoundscapeConfig,
    pub fire_visual: FireVisualConfig,
    pub gaze_volume: GazeVolumeConfig,
    /// Audibility floor for accent one-shots.
    pub one_shot_floor: f32,
}

impl Default for EmberConfig {
    fn default() -> Self {
        Self {
            gaze: GazeConfig::default(),
            thresholds: PhaseThresholds::default(),
            growth: GrowthModel::default(),
            soundscape: SoundscapeConfig::default(),
            fire_visual: FireVisualConfig::default(),
            gaze_volume: GazeVolumeConfig::default(),
            one_shot_floor: ONE_SHOT_FLOOR,
        }
    }
}

impl EmberConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("thresholds.grow_1_to_2", self.thresholds.grow_1_to_2)?;
        positive("thresholds.grow_2_to_3", self.thresholds.grow_2_to_3)?;
        positive("thresholds.shrink_3_to_2", self.thresholds.shrink_3_to_2)?;
        positive("thresholds.shrink_2_to_1", self.thresholds.shrink_2_to_1)?;

        if let GrowthModel::Continuous { split } = self.growth {
            if !(split > 0.0 && split < 1.0) {
                return Err(ConfigError::SplitOutOfRange(split));
            }
        }

        match self.gaze.dead_zone {
            DeadZone::Degrees(v) => positive("gaze.dead_zone (degrees)", v)?,
            DeadZone::ViewportRadius(v) => positive("gaze.dead_zone (viewport)", v)?,
            DeadZone::Pixels(v) => positive("gaze.dead_zone (pixels)", v)?,
        };
        finite("gaze.max_ray_distance", self.gaze.max_ray_distance)?;
        finite("gaze.anchor_bias", self.gaze.anchor_bias)?;
        if let Some(radius) = self.gaze.cast_radius {
            positive("gaze.cast_radius", radius)?;
        }

        let s = &self.soundscape;
        finite("soundscape.crossfade", s.crossfade)?;
        finite("soundscape.quick_fade", s.quick_fade)?;
        finite("soundscape.gaze_fade", s.gaze_fade)?;
        finite("soundscape.strum_fade_out", s.strum_fade_out)?;
        finite("soundscape.near_end_delay", s.near_end_delay)?;
        finite("soundscape.master", s.master)?;
        positive("soundscape.mid_strum_interval", s.mid_strum_interval)?;
        positive("soundscape.large_strum_interval", s.large_strum_interval)?;

        finite("fire_visual.smooth_speed", self.fire_visual.smooth_speed)?;
        finite("fire_visual.world_height", self.fire_visual.world_height)?;

        let v = &self.gaze_volume;
        if v.min_height > v.max_height {
            return Err(ConfigError::InvertedHeightRange {
                min: v.min_height,
                max: v.max_height,
            });
        }
        positive("gaze_volume.width", v.width)?;
        positive("gaze_volume.smooth_time", v.smooth_time)?;

        finite("one_shot_floor", self.one_shot_floor)?;
        Ok(())
    }
}
