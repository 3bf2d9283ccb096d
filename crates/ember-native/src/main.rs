use std::collections::VecDeque;

use glam::Vec3;
use instant::Instant;
use rand::{rngs::StdRng, Rng, SeedableRng};

use ember_core::{
    tutorial_text, AudioSink, Bounds, CameraPose, ChannelId, Director, EmberConfig, Mixer, Phase,
    PhysicsQuery, RayHit, StatusSink, VisualBindings, VisualSink,
};

/// Console stand-in for a host audio source. Transport commands are logged;
/// volume writes are kept quiet to avoid drowning the log.
struct ConsoleAudioSink {
    name: &'static str,
    volume: f32,
    looping: bool,
    playing: bool,
    paused: bool,
}

impl ConsoleAudioSink {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            volume: 0.0,
            looping: false,
            playing: false,
            paused: false,
        }
    }
}

impl AudioSink for ConsoleAudioSink {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn play(&mut self) {
        log::debug!("[{}] play", self.name);
        self.playing = true;
        self.paused = false;
    }

    fn resume(&mut self) {
        log::debug!("[{}] resume", self.name);
        self.playing = true;
        self.paused = false;
    }

    fn pause(&mut self) {
        log::debug!("[{}] pause", self.name);
        self.playing = false;
        self.paused = true;
    }

    fn stop(&mut self) {
        log::debug!("[{}] stop", self.name);
        self.playing = false;
        self.paused = false;
    }

    fn play_one_shot(&mut self, volume: f32) {
        log::info!("[{}] one-shot at {:.2}", self.name, volume);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn has_position(&self) -> bool {
        self.paused
    }
}

/// Console stand-in for a particle system + light.
#[derive(Default)]
struct ConsoleVisualSink {
    name: &'static str,
    active: bool,
    emission: f32,
}

impl ConsoleVisualSink {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

impl VisualSink for ConsoleVisualSink {
    fn set_emission_rate(&mut self, rate: f32) {
        self.emission = rate;
    }
    fn set_start_size(&mut self, _size: f32) {}
    fn set_start_lifetime(&mut self, _lifetime: f32) {}
    fn set_local_scale(&mut self, _scale: Vec3) {}
    fn set_position(&mut self, _position: Vec3) {}
    fn set_light_intensity(&mut self, _intensity: f32) {}

    fn set_active(&mut self, active: bool) {
        if active != self.active {
            log::debug!("[{}] active -> {}", self.name, active);
            self.active = active;
        }
    }

    fn play(&mut self) {
        log::debug!("[{}] play", self.name);
    }

    fn stop_and_clear(&mut self) {
        log::debug!("[{}] stop+clear", self.name);
        self.emission = 0.0;
    }
}

struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn set_phase_line(&mut self, text: &str) {
        println!("  | {text}");
    }
    fn set_timer_line(&mut self, _text: &str) {}
    fn set_message(&mut self, text: &str) {
        println!("  | {text}");
    }
    fn clear_message(&mut self) {}
}

/// Ray/AABB slab test against the current gaze bounds.
struct DemoPhysics {
    bounds: Bounds,
}

fn slab_hit(origin: Vec3, direction: Vec3, max_distance: f32, bounds: &Bounds) -> Option<Vec3> {
    let inv = direction.recip();
    let a = (bounds.min - origin) * inv;
    let b = (bounds.max - origin) * inv;
    let t_enter = a.min(b).max_element().max(0.0);
    let t_exit = a.max(b).min_element();
    (t_exit >= t_enter && t_enter <= max_distance).then(|| origin + direction * t_enter)
}

impl PhysicsQuery for DemoPhysics {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        slab_hit(origin, direction, max_distance, &self.bounds).map(|point| RayHit {
            gaze_volume: true,
            point,
        })
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
    ) -> Option<RayHit> {
        let fat = Bounds::new(
            self.bounds.min - Vec3::splat(radius),
            self.bounds.max + Vec3::splat(radius),
        );
        slab_hit(origin, direction, max_distance, &fat).map(|point| RayHit {
            gaze_volume: true,
            point,
        })
    }
}

/// Scripted attention: alternating look/away windows long enough to walk
/// the fire up to phase 3 and back down, with a forced phase at the end.
fn attention_script() -> VecDeque<(f32, bool)> {
    VecDeque::from([
        (70.0, true),   // grow to phase 3
        (40.0, false),  // fall back toward phase 2
        (20.0, true),
        (45.0, false),  // all the way down
        (15.0, true),
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    println!("{}", tutorial_text());

    let config = EmberConfig::default();
    let mut mixer = Mixer::new(config.one_shot_floor);
    for ch in ChannelId::ALL {
        let native_level = match ch {
            ChannelId::Wind => 0.8,
            ChannelId::Crickets => 0.6,
            _ => 1.0,
        };
        mixer.bind(ch, Box::new(ConsoleAudioSink::new(ch.name())), native_level);
    }

    let visuals = VisualBindings {
        fire: Some(Box::new(ConsoleVisualSink::new("fire"))),
        phase_emitters: [
            Some(Box::new(ConsoleVisualSink::new("emitter-1"))),
            Some(Box::new(ConsoleVisualSink::new("emitter-2"))),
            Some(Box::new(ConsoleVisualSink::new("emitter-3"))),
        ],
        supporting: Some(Box::new(ConsoleVisualSink::new("embers"))),
    };

    let mut director = Director::new(config, mixer, visuals, Some(Box::new(ConsoleStatus)))?;
    director.bind_distant_ambience(Box::new(ConsoleAudioSink::new("stream")), 0.7);
    director.start(Phase::Fireball);

    let mut rng = StdRng::seed_from_u64(7);
    let mut script = attention_script();
    let (mut window_left, mut attending) = script.pop_front().unwrap_or((10.0, true));

    let camera_pos = Vec3::new(0.0, 1.6, 4.0);
    let dt = 1.0 / 72.0;
    let mut sim_time = 0.0f32;
    let started = Instant::now();

    while !script.is_empty() || window_left > 0.0 {
        window_left -= dt;
        if window_left <= 0.0 {
            if let Some((next_len, next_attending)) = script.pop_front() {
                window_left = next_len;
                attending = next_attending;
                log::info!(
                    "t={:.1}s attention -> {} (stream at {:.0}%)",
                    sim_time,
                    if attending { "fire" } else { "elsewhere" },
                    director.distant_ambience_level() * 100.0
                );
            }
        }

        // Aim at the fire with a little head wander, or well off to the side.
        let bounds = director.gaze_bounds();
        let aim = if attending {
            let jitter = Vec3::new(
                rng.gen_range(-0.05..0.05),
                rng.gen_range(-0.05..0.05),
                0.0,
            );
            bounds.center() + jitter - camera_pos
        } else {
            Vec3::new(1.0, 0.0, -0.3)
        };
        let camera = CameraPose {
            position: camera_pos,
            forward: aim.normalize(),
        };
        let physics = DemoPhysics { bounds };

        let before = director.phase();
        director.frame(dt, Some(&camera), Some(&physics), None);
        if director.phase() != before {
            log::info!(
                "t={:.1}s phase {} -> {}",
                sim_time,
                before.number(),
                director.phase().number()
            );
        }
        sim_time += dt;
    }

    let _ = director.force_phase(3);
    for _ in 0..(5.0 / dt) as u32 {
        let camera = CameraPose {
            position: camera_pos,
            forward: (director.gaze_bounds().center() - camera_pos).normalize(),
        };
        let physics = DemoPhysics {
            bounds: director.gaze_bounds(),
        };
        director.frame(dt, Some(&camera), Some(&physics), None);
        sim_time += dt;
    }

    director.teardown();
    log::info!(
        "simulated {:.0}s of gaze in {:.0?} wall time",
        sim_time,
        started.elapsed()
    );
    Ok(())
}
