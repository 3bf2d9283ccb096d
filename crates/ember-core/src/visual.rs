//! Visual stage mapper: drives particle, scale, and light targets from the
//! current growth progress and gaze state. Rate-based smoothing here, in
//! contrast to the duration-based crossfades on the audio side.

use glam::Vec3;

use crate::blend::{approach, inverse_lerp, lerp, move_towards, smooth_damp};
use crate::constants::{
    DIRECTIONAL_FADE_END_DEGREES, DIRECTIONAL_FADE_SPEED, DIRECTIONAL_FADE_START_DEGREES,
    GLOW_INTENSITY_MULTIPLIER, GLOW_SMOOTH_SPEED, GROWTH_SPLIT, STAGE_SMOOTH_SPEED,
    SUPPORT_FADE_SPEED, SUPPORT_MAX_EMISSION, VOLUME_MAX_HEIGHT, VOLUME_MIN_HEIGHT,
    VOLUME_PHASE_HEIGHTS, VOLUME_SMOOTH_TIME,
};
use crate::gaze::{Bounds, CameraPose};
use crate::phase::Phase;
use crate::stage::{FireStage, StageTable};

/// Host-side particle/light output for one visual channel. The core calls
/// these every frame with interpolated values; the host owns rendering.
pub trait VisualSink {
    fn set_emission_rate(&mut self, rate: f32);
    fn set_start_size(&mut self, size: f32);
    fn set_start_lifetime(&mut self, lifetime: f32);
    fn set_local_scale(&mut self, scale: Vec3);
    fn set_position(&mut self, position: Vec3);
    fn set_light_intensity(&mut self, intensity: f32);
    fn set_active(&mut self, active: bool);
    fn play(&mut self);
    fn stop_and_clear(&mut self);
    /// Live particle count, used to delay deactivation until visuals drain.
    fn live_particles(&self) -> u32 {
        0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FireVisualConfig {
    pub stages: StageTable,
    /// Exponential approach rate toward the sampled stage targets.
    pub smooth_speed: f32,
    pub glow_smooth_speed: f32,
    /// HDR-style light boost at full glow.
    pub glow_intensity_multiplier: f32,
    /// World-space center of the fire's base; growth stays planted here.
    pub base_center: Vec3,
    /// Unscaled world-space height of the fire visual.
    pub world_height: f32,
    pub split: f32,
}

impl Default for FireVisualConfig {
    fn default() -> Self {
        Self {
            stages: StageTable::default(),
            smooth_speed: STAGE_SMOOTH_SPEED,
            glow_smooth_speed: GLOW_SMOOTH_SPEED,
            glow_intensity_multiplier: GLOW_INTENSITY_MULTIPLIER,
            base_center: Vec3::ZERO,
            world_height: 1.0,
            split: GROWTH_SPLIT,
        }
    }
}

/// Continuous fire visual: samples the stage table at the current growth
/// progress and eases every parameter toward the sample each frame.
pub struct FireVisual {
    config: FireVisualConfig,
    sink: Box<dyn VisualSink>,
    current: FireStage,
    glow_level: f32,
    gaze_on: bool,
}

impl FireVisual {
    /// Starts snapped to the smallest stage so the first frame has no pop.
    pub fn new(sink: Box<dyn VisualSink>, config: FireVisualConfig) -> Self {
        let mut this = Self {
            current: config.stages.small,
            glow_level: 0.0,
            gaze_on: true,
            config,
            sink,
        };
        this.apply();
        this
    }

    pub fn current(&self) -> &FireStage {
        &self.current
    }

    pub fn glow_level(&self) -> f32 {
        self.glow_level
    }

    pub fn set_gaze(&mut self, on: bool) {
        self.gaze_on = on;
    }

    /// Instant application of a phase's stage, no smoothing. Startup path.
    pub fn snap_to_phase(&mut self, phase: Phase) {
        self.current = *self.config.stages.stage(phase);
        self.glow_level = if self.gaze_on { 1.0 } else { 0.0 };
        self.apply();
    }

    /// Eases toward the stage sampled at `progress` and pushes the result
    /// to the sink.
    pub fn tick(&mut self, progress: f32, dt: f32) {
        let target = self.config.stages.sample(progress, self.config.split);
        let k = self.config.smooth_speed;
        self.current = FireStage {
            start_size: approach(self.current.start_size, target.start_size, dt, k),
            lifetime: approach(self.current.lifetime, target.lifetime, dt, k),
            emission_rate: approach(self.current.emission_rate, target.emission_rate, dt, k),
            scale: approach(self.current.scale, target.scale, dt, k),
            light_intensity: approach(self.current.light_intensity, target.light_intensity, dt, k),
        };
        let glow_target = if self.gaze_on { 1.0 } else { 0.0 };
        self.glow_level = approach(
            self.glow_level,
            glow_target,
            dt,
            self.config.glow_smooth_speed,
        );
        self.apply();
    }

    fn apply(&mut self) {
        let s = &self.current;
        self.sink.set_start_size(s.start_size);
        self.sink.set_start_lifetime(s.lifetime);
        self.sink.set_emission_rate(s.emission_rate);
        self.sink.set_local_scale(Vec3::splat(s.scale));
        // Keep the visual base planted while only the extent grows.
        let lift = self.config.world_height * (s.scale - 1.0) / 2.0;
        self.sink
            .set_position(self.config.base_center + Vec3::Y * lift);
        let boost = lerp(1.0, self.config.glow_intensity_multiplier, self.glow_level);
        self.sink.set_light_intensity(s.light_intensity * boost);
    }
}

/// Exactly one per-phase emitter runs at a time; switching plays the new
/// one and stop-and-clears the old.
pub struct PhaseEmitters {
    sinks: [Option<Box<dyn VisualSink>>; 3],
    active: Option<Phase>,
}

impl Default for PhaseEmitters {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseEmitters {
    pub fn new() -> Self {
        Self {
            sinks: [None, None, None],
            active: None,
        }
    }

    pub fn bind(&mut self, phase: Phase, sink: Box<dyn VisualSink>) {
        self.sinks[(phase.number() - 1) as usize] = Some(sink);
    }

    pub fn active(&self) -> Option<Phase> {
        self.active
    }

    pub fn set_phase(&mut self, phase: Phase) {
        if self.active == Some(phase) {
            return;
        }
        if let Some(old) = self.active {
            if let Some(sink) = self.sinks[(old.number() - 1) as usize].as_mut() {
                sink.stop_and_clear();
                sink.set_active(false);
            }
        }
        if let Some(sink) = self.sinks[(phase.number() - 1) as usize].as_mut() {
            sink.set_active(true);
            sink.play();
        } else {
            log::warn!("[visual] no emitter bound for phase {}", phase.number());
        }
        self.active = Some(phase);
    }

    pub fn stop_all(&mut self) {
        for sink in self.sinks.iter_mut().flatten() {
            sink.stop_and_clear();
            sink.set_active(false);
        }
        self.active = None;
    }
}

/// Secondary ember emitter: rate-limited emission fade toward on/off, then
/// deactivation once the fade is done and live particles have drained.
pub struct SupportingFire {
    sink: Box<dyn VisualSink>,
    max_emission: f32,
    fade_speed: f32,
    emission: f32,
    target: f32,
    active: bool,
}

impl SupportingFire {
    pub fn new(sink: Box<dyn VisualSink>) -> Self {
        Self {
            sink,
            max_emission: SUPPORT_MAX_EMISSION,
            fade_speed: SUPPORT_FADE_SPEED,
            emission: 0.0,
            target: 0.0,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn emission(&self) -> f32 {
        self.emission
    }

    pub fn set_on(&mut self, on: bool) {
        self.target = if on { self.max_emission } else { 0.0 };
        if on && !self.active {
            self.active = true;
            self.sink.set_active(true);
            self.sink.play();
        }
    }

    /// Immediate shutdown with no drain, for teardown.
    pub fn halt(&mut self) {
        self.emission = 0.0;
        self.target = 0.0;
        if self.active {
            self.sink.stop_and_clear();
            self.sink.set_active(false);
            self.active = false;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let step = self.fade_speed * self.max_emission * dt.max(0.0);
        self.emission = move_towards(self.emission, self.target, step);
        self.sink.set_emission_rate(self.emission);
        if self.target == 0.0 && self.emission == 0.0 && self.sink.live_particles() == 0 {
            self.sink.stop_and_clear();
            self.sink.set_active(false);
            self.active = false;
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GazeVolumeConfig {
    /// Target heights per phase, before the extra offset and clamp.
    pub phase_heights: [f32; 3],
    pub extra_height: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Footprint edge length; never resized.
    pub width: f32,
    pub smooth_time: f32,
    pub base_center: Vec3,
}

impl Default for GazeVolumeConfig {
    fn default() -> Self {
        Self {
            phase_heights: VOLUME_PHASE_HEIGHTS,
            extra_height: 0.0,
            min_height: VOLUME_MIN_HEIGHT,
            max_height: VOLUME_MAX_HEIGHT,
            width: 1.0,
            smooth_time: VOLUME_SMOOTH_TIME,
            base_center: Vec3::ZERO,
        }
    }
}

/// The gaze hit volume, resized per phase with a smooth-damped height.
/// The base of the bounds stays planted on the ground.
pub struct GazeVolume {
    config: GazeVolumeConfig,
    height: f32,
    velocity: f32,
}

impl GazeVolume {
    pub fn new(config: GazeVolumeConfig) -> Self {
        let height = Self::target_height(&config, Phase::Fireball);
        Self {
            config,
            height,
            velocity: 0.0,
        }
    }

    fn target_height(config: &GazeVolumeConfig, phase: Phase) -> f32 {
        let raw = config.phase_heights[(phase.number() - 1) as usize] + config.extra_height;
        raw.clamp(config.min_height, config.max_height)
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn snap(&mut self, phase: Phase) {
        self.height = Self::target_height(&self.config, phase);
        self.velocity = 0.0;
    }

    pub fn tick(&mut self, phase: Phase, dt: f32) {
        let target = Self::target_height(&self.config, phase);
        self.height = smooth_or_snap(
            self.height,
            target,
            &mut self.velocity,
            self.config.smooth_time,
            dt,
        );
    }

    pub fn bounds(&self) -> Bounds {
        let half = self.config.width * 0.5;
        let base = self.config.base_center;
        Bounds::new(
            base + Vec3::new(-half, 0.0, -half),
            base + Vec3::new(half, self.height, half),
        )
    }
}

fn smooth_or_snap(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// View-angle ambience attenuation: full volume while the source sits
/// inside the fade-start cone, silent past the fade-end angle, rate-limited
/// steps in between.
pub struct DirectionalFade {
    pub fade_start_degrees: f32,
    pub fade_end_degrees: f32,
    pub speed: f32,
    level: f32,
}

impl Default for DirectionalFade {
    fn default() -> Self {
        Self {
            fade_start_degrees: DIRECTIONAL_FADE_START_DEGREES,
            fade_end_degrees: DIRECTIONAL_FADE_END_DEGREES,
            speed: DIRECTIONAL_FADE_SPEED,
            level: 1.0,
        }
    }
}

impl DirectionalFade {
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Advances toward the attenuation implied by the current view angle
    /// and returns the new level.
    pub fn tick(&mut self, camera: &CameraPose, source: Vec3, dt: f32) -> f32 {
        let target = match (source - camera.position).try_normalize() {
            Some(dir) => {
                let degrees = camera.forward.angle_between(dir).to_degrees();
                1.0 - inverse_lerp(self.fade_start_degrees, self.fade_end_degrees, degrees)
            }
            // Standing inside the source.
            None => 1.0,
        };
        self.level = move_towards(self.level, target, self.speed * dt.max(0.0));
        self.level
    }
}
