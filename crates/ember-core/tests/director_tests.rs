// End-to-end frame loop: gaze feeds the machine, phase changes apply
// channel targets the same frame, and teardown leaves nothing in flight.

mod common;

use glam::Vec3;

use common::{full_mixer, mock_audio, mock_status, mock_visual};
use ember_core::{
    CameraPose, ChannelId, Director, EmberConfig, Phase, PhysicsQuery, RayHit, VisualBindings,
};

struct VolumeHit;

impl PhysicsQuery for VolumeHit {
    fn raycast(&self, origin: Vec3, direction: Vec3, _max: f32) -> Option<RayHit> {
        Some(RayHit {
            gaze_volume: true,
            point: origin + direction,
        })
    }

    fn sphere_cast(&self, origin: Vec3, direction: Vec3, _r: f32, _max: f32) -> Option<RayHit> {
        Some(RayHit {
            gaze_volume: true,
            point: origin + direction,
        })
    }
}

fn camera_on_fire() -> CameraPose {
    CameraPose {
        position: Vec3::new(0.0, 0.4, 4.0),
        forward: -Vec3::Z,
    }
}

fn make_director() -> (
    Director,
    std::rc::Rc<std::cell::RefCell<common::StatusState>>,
) {
    let (mixer, _audio) = full_mixer(0.15);
    let (fire, _fire_state) = mock_visual();
    let (e1, _) = mock_visual();
    let (e2, _) = mock_visual();
    let (e3, _) = mock_visual();
    let visuals = VisualBindings {
        fire: Some(fire),
        phase_emitters: [Some(e1), Some(e2), Some(e3)],
        supporting: None,
    };
    let (status, status_state) = mock_status();
    let director =
        Director::new(EmberConfig::default(), mixer, visuals, Some(status)).expect("valid config");
    (director, status_state)
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut config = EmberConfig::default();
    config.thresholds.grow_1_to_2 = -1.0;
    let (mixer, _audio) = full_mixer(0.15);
    let result = Director::new(config, mixer, VisualBindings::default(), None);
    assert!(result.is_err());
}

#[test]
fn held_gaze_walks_the_fire_up_and_fades_start_the_same_frame() {
    let (mut director, status) = make_director();
    director.start(Phase::Fireball);

    let camera = camera_on_fire();
    let physics = VolumeHit;
    let dt = 0.5;

    let mut frames_to_change = 0;
    for frame in 1..=70 {
        director.frame(dt, Some(&camera), Some(&physics), None);
        if director.phase() == Phase::Small {
            frames_to_change = frame;
            break;
        }
    }
    // 30s threshold at 0.5s frames: the 60th frame crosses it.
    assert_eq!(frames_to_change, 60);

    // The new phase's crossfade is already in flight this frame.
    assert!(director.soundscape().is_transitioning());
    assert!(director.soundscape().mixer().has_active_fade(ChannelId::Wind));

    let lines = &status.borrow().phase_lines;
    assert_eq!(
        lines.as_slice(),
        &["Fire: Fireball".to_string(), "Fire: Small Fire".to_string()]
    );
}

#[test]
fn missing_camera_never_grows_the_fire() {
    let (mut director, _status) = make_director();
    director.start(Phase::Fireball);

    let physics = VolumeHit;
    for _ in 0..200 {
        director.frame(0.5, None, Some(&physics), None);
    }
    assert_eq!(director.phase(), Phase::Fireball);
    assert!(!director.looking());
}

#[test]
fn gaze_loss_walks_back_down_through_phases() {
    let (mut director, _status) = make_director();
    director.start(Phase::Large);
    assert_eq!(director.phase(), Phase::Large);

    // Continuous model: forced phase 3 re-seats 60s of progress; decaying
    // at half rate takes 60s to drop below the first threshold and 120s to
    // empty out.
    for _ in 0..500 {
        director.frame(0.5, None, None, None);
    }
    assert_eq!(director.phase(), Phase::Fireball);
}

#[test]
fn force_phase_applies_targets_and_posts_a_message() {
    let (mut director, status) = make_director();
    director.start(Phase::Fireball);

    let change = director.force_phase(3).expect("phase change");
    assert_eq!(change.to, Phase::Large);
    assert_eq!(director.phase(), Phase::Large);
    assert!(director.soundscape().is_transitioning());
    assert!(status
        .borrow()
        .messages
        .iter()
        .any(|m| m.contains("Big Flames")));

    // Out-of-range forces clamp instead of erroring.
    let _ = director.force_phase(42);
    assert_eq!(director.phase(), Phase::Large);
}

#[test]
fn growth_progress_feeds_the_visual_layer() {
    let (mixer, _audio) = full_mixer(0.15);
    let (fire, fire_state) = mock_visual();
    let visuals = VisualBindings {
        fire: Some(fire),
        ..VisualBindings::default()
    };
    let mut director =
        Director::new(EmberConfig::default(), mixer, visuals, None).expect("valid config");
    director.start(Phase::Fireball);
    let small_emission = fire_state.borrow().emission;

    let camera = camera_on_fire();
    let physics = VolumeHit;
    for _ in 0..240 {
        director.frame(0.5, Some(&camera), Some(&physics), None);
    }
    assert_eq!(director.growth_progress(), 1.0);
    assert!(fire_state.borrow().emission > small_emission);
}

#[test]
fn distant_ambience_ducks_as_the_view_swings_away() {
    let (mut director, _status) = make_director();
    let (sink, state) = mock_audio();
    director.bind_distant_ambience(sink, 0.7);
    director.start(Phase::Fireball);

    assert!(state.borrow().playing);
    assert!(state.borrow().looping);
    assert_eq!(state.borrow().volume, 0.7);

    // Facing the fire keeps the source at its base level.
    let camera = camera_on_fire();
    let physics = VolumeHit;
    for _ in 0..20 {
        director.frame(0.1, Some(&camera), Some(&physics), None);
    }
    assert_eq!(director.distant_ambience_level(), 1.0);
    assert_eq!(state.borrow().volume, 0.7);

    // Turned fully away the level ramps down rather than snapping.
    let away = CameraPose {
        position: camera.position,
        forward: Vec3::Z,
    };
    director.frame(0.1, Some(&away), Some(&physics), None);
    let mid = state.borrow().volume;
    assert!(mid > 0.0 && mid < 0.7);
    for _ in 0..20 {
        director.frame(0.1, Some(&away), Some(&physics), None);
    }
    assert_eq!(state.borrow().volume, 0.0);

    director.teardown();
    assert!(state.borrow().paused);
}

#[test]
fn teardown_cancels_everything_in_flight() {
    let (mut director, _status) = make_director();
    director.start(Phase::Fireball);
    let _ = director.force_phase(2);
    assert!(director.soundscape().mixer().has_active_fade(ChannelId::Wind));

    director.teardown();
    assert!(!director.soundscape().mixer().has_active_fade(ChannelId::Wind));
    assert!(!director.soundscape().has_strum_task(Phase::Small));
}
