//! Static per-phase target tables consumed by the channel binding layer.

use crate::blend::{inverse_lerp, lerp};
use crate::constants::WIND_LEVELS;
use crate::phase::Phase;

/// Visual targets for one fire stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireStage {
    pub start_size: f32,
    pub lifetime: f32,
    pub emission_rate: f32,
    pub scale: f32,
    pub light_intensity: f32,
}

impl FireStage {
    fn lerp(a: &FireStage, b: &FireStage, t: f32) -> FireStage {
        FireStage {
            start_size: lerp(a.start_size, b.start_size, t),
            lifetime: lerp(a.lifetime, b.lifetime, t),
            emission_rate: lerp(a.emission_rate, b.emission_rate, t),
            scale: lerp(a.scale, b.scale, t),
            light_intensity: lerp(a.light_intensity, b.light_intensity, t),
        }
    }
}

/// The designer-authored stage table. Static configuration; mutated only
/// through explicit setters on the owning controller.
#[derive(Debug, Clone, Copy)]
pub struct StageTable {
    pub small: FireStage,
    pub medium: FireStage,
    pub large: FireStage,
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            small: FireStage {
                start_size: 0.4,
                lifetime: 0.8,
                emission_rate: 12.0,
                scale: 0.5,
                light_intensity: 0.8,
            },
            medium: FireStage {
                start_size: 0.8,
                lifetime: 1.2,
                emission_rate: 30.0,
                scale: 1.0,
                light_intensity: 1.8,
            },
            large: FireStage {
                start_size: 1.3,
                lifetime: 1.6,
                emission_rate: 60.0,
                scale: 1.6,
                light_intensity: 3.2,
            },
        }
    }
}

impl StageTable {
    pub fn stage(&self, phase: Phase) -> &FireStage {
        match phase {
            Phase::Fireball => &self.small,
            Phase::Small => &self.medium,
            Phase::Large => &self.large,
        }
    }

    /// Piecewise-linear sample across the split: [0, split] blends
    /// small->medium, (split, 1] blends medium->large.
    pub fn sample(&self, progress: f32, split: f32) -> FireStage {
        let t = progress.clamp(0.0, 1.0);
        let split = split.clamp(0.05, 0.95);
        if t <= split {
            FireStage::lerp(&self.small, &self.medium, inverse_lerp(0.0, split, t))
        } else {
            FireStage::lerp(&self.medium, &self.large, inverse_lerp(split, 1.0, t))
        }
    }
}

/// Per-phase wind loudness, clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindProfile {
    pub phase1: f32,
    pub phase2: f32,
    pub phase3: f32,
}

impl Default for WindProfile {
    fn default() -> Self {
        Self {
            phase1: WIND_LEVELS[0],
            phase2: WIND_LEVELS[1],
            phase3: WIND_LEVELS[2],
        }
    }
}

impl WindProfile {
    pub fn new(p1: f32, p2: f32, p3: f32) -> Self {
        Self {
            phase1: p1.clamp(0.0, 1.0),
            phase2: p2.clamp(0.0, 1.0),
            phase3: p3.clamp(0.0, 1.0),
        }
    }

    pub fn level(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Fireball => self.phase1,
            Phase::Small => self.phase2,
            Phase::Large => self.phase3,
        }
    }
}
