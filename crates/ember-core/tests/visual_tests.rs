// Visual stage mapper: stage sampling, ground-anchored growth, exclusive
// emitter switching, the supporting-fire drain, gaze-volume sizing, and
// view-angle attenuation.

mod common;

use glam::Vec3;

use common::{assert_close, mock_visual};
use ember_core::{
    Bounds, CameraPose, DirectionalFade, FireVisual, FireVisualConfig, GazeVolume,
    GazeVolumeConfig, Phase, PhaseEmitters, StageTable, SupportingFire,
};

#[test]
fn stage_sample_is_piecewise_across_the_split() {
    let table = StageTable::default();

    let at_zero = table.sample(0.0, 0.5);
    assert_eq!(at_zero, table.small);

    let at_split = table.sample(0.5, 0.5);
    assert_eq!(at_split, table.medium);

    let at_one = table.sample(1.0, 0.5);
    assert_eq!(at_one, table.large);

    // Midway through the lower segment.
    let quarter = table.sample(0.25, 0.5);
    assert_close(
        quarter.scale,
        (table.small.scale + table.medium.scale) / 2.0,
        1e-5,
    );

    // Out-of-range progress clamps instead of extrapolating.
    assert_eq!(table.sample(4.0, 0.5), table.large);
}

#[test]
fn fire_visual_eases_toward_the_sampled_stage() {
    let (sink, state) = mock_visual();
    let config = FireVisualConfig::default();
    let mut fire = FireVisual::new(sink, config);
    assert_close(fire.current().scale, config.stages.small.scale, 1e-6);

    // Long enough at full progress to converge on the large stage.
    for _ in 0..600 {
        fire.tick(1.0, 1.0 / 60.0);
    }
    assert_close(fire.current().scale, config.stages.large.scale, 1e-2);
    assert_close(state.borrow().emission, config.stages.large.emission_rate, 1.0);
}

#[test]
fn growth_stays_planted_on_the_ground_anchor() {
    let (sink, state) = mock_visual();
    let config = FireVisualConfig {
        base_center: Vec3::new(2.0, 0.0, -1.0),
        world_height: 2.0,
        ..FireVisualConfig::default()
    };
    let mut fire = FireVisual::new(sink, config);
    fire.snap_to_phase(Phase::Large);

    let scale = config.stages.large.scale;
    let expected_lift = config.world_height * (scale - 1.0) / 2.0;
    let pos = state.borrow().position;
    assert_close(pos.y, expected_lift, 1e-5);
    assert_close(pos.x, 2.0, 1e-6);
    assert_close(pos.z, -1.0, 1e-6);
}

#[test]
fn glow_boosts_light_only_while_gazing() {
    let (sink, state) = mock_visual();
    let config = FireVisualConfig::default();
    let mut fire = FireVisual::new(sink, config);
    fire.snap_to_phase(Phase::Small);
    let boosted = state.borrow().light;
    assert_close(
        boosted,
        config.stages.medium.light_intensity * config.glow_intensity_multiplier,
        1e-4,
    );

    fire.set_gaze(false);
    for _ in 0..600 {
        fire.tick(0.5, 1.0 / 60.0);
    }
    let dimmed = state.borrow().light;
    assert_close(dimmed, config.stages.medium.light_intensity, 1e-2);
}

#[test]
fn exactly_one_phase_emitter_runs_at_a_time() {
    let mut emitters = PhaseEmitters::new();
    let (s1, h1) = mock_visual();
    let (s2, h2) = mock_visual();
    let (s3, h3) = mock_visual();
    emitters.bind(Phase::Fireball, s1);
    emitters.bind(Phase::Small, s2);
    emitters.bind(Phase::Large, s3);

    emitters.set_phase(Phase::Fireball);
    assert!(h1.borrow().active);
    assert_eq!(h1.borrow().play_calls, 1);

    emitters.set_phase(Phase::Small);
    assert!(!h1.borrow().active);
    assert_eq!(h1.borrow().stop_clear_calls, 1);
    assert!(h2.borrow().active);
    assert!(!h3.borrow().active);

    // Re-entering the active phase is a no-op.
    emitters.set_phase(Phase::Small);
    assert_eq!(h2.borrow().play_calls, 1);

    emitters.stop_all();
    assert!(!h2.borrow().active);
    assert_eq!(emitters.active(), None);
}

#[test]
fn supporting_fire_drains_then_deactivates() {
    let (sink, state) = mock_visual();
    let mut support = SupportingFire::new(sink);
    assert!(!support.is_active());

    support.set_on(true);
    assert!(support.is_active());
    assert!(state.borrow().active);
    for _ in 0..120 {
        support.tick(1.0 / 60.0);
    }
    assert!(support.emission() > 0.0);

    // Fade out, but live particles keep the emitter alive until they drain.
    state.borrow_mut().live_particles = 25;
    support.set_on(false);
    for _ in 0..120 {
        support.tick(1.0 / 60.0);
    }
    assert_eq!(support.emission(), 0.0);
    assert!(support.is_active());

    state.borrow_mut().live_particles = 0;
    support.tick(1.0 / 60.0);
    assert!(!support.is_active());
    assert_eq!(state.borrow().stop_clear_calls, 1);
    assert!(!state.borrow().active);
}

#[test]
fn gaze_volume_height_tracks_the_phase_within_clamps() {
    let config = GazeVolumeConfig::default();
    let mut volume = GazeVolume::new(config);
    // Phase-1 target 0.9 clamps up to the 1.0 minimum.
    assert_close(volume.height(), 1.0, 1e-6);

    for _ in 0..300 {
        volume.tick(Phase::Large, 1.0 / 60.0);
    }
    assert_close(volume.height(), 2.0, 1e-2);

    volume.snap(Phase::Small);
    assert_close(volume.height(), 1.4, 1e-6);
}

#[test]
fn gaze_volume_bounds_stay_planted() {
    let config = GazeVolumeConfig {
        base_center: Vec3::new(1.0, 0.0, 1.0),
        width: 2.0,
        ..GazeVolumeConfig::default()
    };
    let mut volume = GazeVolume::new(config);
    volume.snap(Phase::Large);

    let b: Bounds = volume.bounds();
    assert_close(b.min.y, 0.0, 1e-6);
    assert_close(b.max.y, 2.0, 1e-6);
    assert_close(b.min.x, 0.0, 1e-6);
    assert_close(b.max.x, 2.0, 1e-6);
}

#[test]
fn extra_height_is_clamped_by_the_range() {
    let config = GazeVolumeConfig {
        extra_height: 10.0,
        ..GazeVolumeConfig::default()
    };
    let mut volume = GazeVolume::new(config);
    volume.snap(Phase::Large);
    assert_close(volume.height(), config.max_height, 1e-6);
}

#[test]
fn directional_fade_attenuates_with_view_angle() {
    let mut fade = DirectionalFade::default();
    let source = Vec3::new(0.0, 0.0, 5.0);

    // Facing the source: stays at full volume.
    let camera = CameraPose {
        position: Vec3::ZERO,
        forward: Vec3::Z,
    };
    for _ in 0..60 {
        fade.tick(&camera, source, 1.0 / 60.0);
    }
    assert_close(fade.level(), 1.0, 1e-4);

    // Facing fully away (180 degrees): beyond the fade-end angle.
    let away = CameraPose {
        position: Vec3::ZERO,
        forward: -Vec3::Z,
    };
    for _ in 0..120 {
        fade.tick(&away, source, 1.0 / 60.0);
    }
    assert_close(fade.level(), 0.0, 1e-4);

    // 67.5 degrees sits midway between the 45/90 defaults: half volume.
    let mut mid = DirectionalFade::default();
    let angle = 67.5f32.to_radians();
    let mid_camera = CameraPose {
        position: Vec3::ZERO,
        forward: Vec3::new(angle.sin(), 0.0, angle.cos()),
    };
    for _ in 0..240 {
        mid.tick(&mid_camera, source, 1.0 / 60.0);
    }
    assert_close(mid.level(), 0.5, 1e-3);
}
