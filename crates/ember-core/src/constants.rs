// Shared tuning constants for the campfire controllers. Everything here is a
// designer-facing default; the config structs clamp on the way in.

// Phase timing (seconds of held/withdrawn gaze)
pub const PHASE_1_TO_2_TIME: f32 = 30.0;
pub const PHASE_2_TO_3_TIME: f32 = 30.0;
pub const PHASE_3_TO_2_TIME: f32 = 30.0;
pub const PHASE_2_TO_1_TIME: f32 = 30.0;

/// Away time burns accumulated look time at this fraction of real time
/// (continuous growth model only).
pub const AWAY_DECAY_RATE: f32 = 0.5;

/// Growth progress split between small->medium and medium->large.
pub const GROWTH_SPLIT: f32 = 0.5;

// Fades (seconds)
pub const CROSSFADE_SECONDS: f32 = 1.25;
pub const QUICK_FADE_SECONDS: f32 = 0.35;
pub const GAZE_FADE_SECONDS: f32 = 0.65;
pub const STRUM_FADE_OUT_SECONDS: f32 = 0.25;

// Accent one-shots
pub const ONE_SHOT_FLOOR: f32 = 0.15; // audibility floor for whoosh/strum
pub const STRUM_INTERVAL_SECONDS: f32 = 10.0;
pub const STRUM_MIN_INTERVAL_SECONDS: f32 = 0.1;

/// Delay before the phase-1 near-end synth fades in.
pub const NEAR_END_DELAY_SECONDS: f32 = 15.0;

// Gaze detection
pub const DEAD_ZONE_DEGREES: f32 = 8.0;
pub const MAX_RAY_DISTANCE: f32 = 50.0;
/// Bottom bias for the fallback anchor: 0 = bounds floor, 1 = bounds top.
/// The visual mass of a flame sits well below the volume's centroid.
pub const ANCHOR_HEIGHT_BIAS: f32 = 0.25;

// Ambience levels per phase
pub const WIND_LEVELS: [f32; 3] = [1.0, 0.66, 0.50];
pub const CRICKETS_LEVELS: [f32; 3] = [1.0, 0.50, 0.0];

// Visual smoothing
pub const STAGE_SMOOTH_SPEED: f32 = 5.0; // exp-approach rate toward stage targets
pub const GLOW_SMOOTH_SPEED: f32 = 3.0;
pub const GLOW_INTENSITY_MULTIPLIER: f32 = 3.0;
pub const SUPPORT_FADE_SPEED: f32 = 3.0;
pub const SUPPORT_MAX_EMISSION: f32 = 40.0;

// Gaze volume sizing (meters)
pub const VOLUME_PHASE_HEIGHTS: [f32; 3] = [0.9, 1.4, 2.0];
pub const VOLUME_MIN_HEIGHT: f32 = 1.0;
pub const VOLUME_MAX_HEIGHT: f32 = 4.0;
pub const VOLUME_SMOOTH_TIME: f32 = 0.15;

// Directional ambience attenuation (degrees / units per second)
pub const DIRECTIONAL_FADE_START_DEGREES: f32 = 45.0;
pub const DIRECTIONAL_FADE_END_DEGREES: f32 = 90.0;
pub const DIRECTIONAL_FADE_SPEED: f32 = 2.0;

/// Transient status messages clear after this long.
pub const STATUS_MESSAGE_SECONDS: f32 = 3.0;
