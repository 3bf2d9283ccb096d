//! Composition root for one fire. Owns every subsystem and enforces the
//! per-frame ordering: gaze evaluation, then phase evaluation, then channel
//! target application, then fade advancement. A phase decided this frame
//! begins fading this frame.

use crate::channel::AudioSink;
use crate::config::EmberConfig;
use crate::error::ConfigError;
use crate::gaze::{anchor_point, Bounds, CameraPose, GazeTracker, PhysicsQuery, ViewProjector};
use crate::mixer::Mixer;
use crate::phase::{GrowthModel, Phase, PhaseChange, PhaseMachine};
use crate::soundscape::Soundscape;
use crate::status::{StatusBoard, StatusSink};
use crate::visual::{
    DirectionalFade, FireVisual, GazeVolume, PhaseEmitters, SupportingFire, VisualSink,
};

/// Visual outputs handed over at construction. Every slot is optional; an
/// absent sink just means that layer does not animate.
#[derive(Default)]
pub struct VisualBindings {
    pub fire: Option<Box<dyn VisualSink>>,
    /// One emitter per phase, index 0 = phase 1.
    pub phase_emitters: [Option<Box<dyn VisualSink>>; 3],
    pub supporting: Option<Box<dyn VisualSink>>,
}

/// A looping ambient source outside the campfire mix whose volume follows
/// the view angle toward the fire.
struct DistantAmbience {
    sink: Box<dyn AudioSink>,
    base_level: f32,
    fade: DirectionalFade,
}

pub struct Director {
    gaze: GazeTracker,
    machine: PhaseMachine,
    soundscape: Soundscape,
    fire_visual: Option<FireVisual>,
    emitters: PhaseEmitters,
    supporting: Option<SupportingFire>,
    gaze_volume: GazeVolume,
    distant: Option<DistantAmbience>,
    status: StatusBoard,
    looking: bool,
}

impl Director {
    /// Validates the configuration once, then assembles the subsystems.
    /// The mixer arrives with its channels already bound.
    pub fn new(
        config: EmberConfig,
        mixer: Mixer,
        visuals: VisualBindings,
        status_sink: Option<Box<dyn StatusSink>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut emitters = PhaseEmitters::new();
        for (i, sink) in visuals.phase_emitters.into_iter().enumerate() {
            if let Some(sink) = sink {
                emitters.bind(Phase::from_number(i as i32 + 1), sink);
            }
        }

        Ok(Self {
            gaze: GazeTracker::new(config.gaze),
            machine: PhaseMachine::new(config.thresholds, config.growth),
            soundscape: Soundscape::new(mixer, config.soundscape),
            fire_visual: visuals
                .fire
                .map(|sink| FireVisual::new(sink, config.fire_visual)),
            emitters,
            supporting: visuals.supporting.map(SupportingFire::new),
            gaze_volume: GazeVolume::new(config.gaze_volume),
            distant: None,
            status: StatusBoard::new(status_sink),
            looking: false,
        })
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn looking(&self) -> bool {
        self.looking
    }

    pub fn growth_progress(&self) -> f32 {
        self.machine.growth_progress()
    }

    pub fn soundscape(&self) -> &Soundscape {
        &self.soundscape
    }

    pub fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    pub fn gaze_bounds(&self) -> Bounds {
        self.gaze_volume.bounds()
    }

    /// Attenuation level of the distant ambience, 1.0 when none is bound.
    pub fn distant_ambience_level(&self) -> f32 {
        self.distant.as_ref().map_or(1.0, |d| d.fade.level())
    }

    /// Binds a looping ambient source that ducks as the view swings away
    /// from the fire. Starts it immediately at the base level.
    pub fn bind_distant_ambience(&mut self, mut sink: Box<dyn AudioSink>, base_level: f32) {
        let base_level = base_level.clamp(0.0, 1.0);
        sink.set_looping(true);
        sink.set_volume(base_level);
        sink.play();
        self.distant = Some(DistantAmbience {
            sink,
            base_level,
            fade: DirectionalFade::default(),
        });
    }

    /// Snaps every subsystem to a phase with no fades. Startup path.
    pub fn start(&mut self, phase: Phase) {
        let _ = self.machine.force_phase(phase.number() as i32);
        self.soundscape.apply_immediate(Some(phase));
        if let Some(v) = self.fire_visual.as_mut() {
            v.snap_to_phase(phase);
        }
        self.gaze_volume.snap(phase);
        self.emitters.set_phase(phase);
        if let Some(s) = self.supporting.as_mut() {
            s.set_on(phase == Phase::Large);
        }
    }

    /// Debug/manual override: forces a phase, resets the timers, and runs
    /// the same application path as a natural transition.
    pub fn force_phase(&mut self, phase: i32) -> Option<PhaseChange> {
        let change = self.machine.force_phase(phase)?;
        self.apply_phase(change.to);
        self.status
            .post_message(&format!("Fire set to {}", change.to.label()));
        Some(change)
    }

    /// One simulation frame.
    pub fn frame(
        &mut self,
        dt: f32,
        camera: Option<&CameraPose>,
        physics: Option<&dyn PhysicsQuery>,
        projector: Option<&dyn ViewProjector>,
    ) {
        let dt = dt.max(0.0);

        // 1. Gaze.
        let bounds = self.gaze_volume.bounds();
        let anchor = anchor_point(&bounds, self.gaze.config().anchor_bias);
        let looking = self.gaze.evaluate(camera, Some(anchor), physics, projector);
        if looking != self.looking {
            self.looking = looking;
            self.soundscape.set_gaze(looking);
            if let Some(v) = self.fire_visual.as_mut() {
                v.set_gaze(looking);
            }
        }

        // 2. Phase.
        if let Some(change) = self.machine.tick(looking, dt) {
            self.apply_phase(change.to);
        }

        // 3. Channel target application.
        let progress = self.machine.growth_progress();
        if let Some(v) = self.fire_visual.as_mut() {
            v.tick(progress, dt);
        }
        self.gaze_volume.tick(self.machine.phase(), dt);
        if let Some(s) = self.supporting.as_mut() {
            s.tick(dt);
        }
        if let (Some(d), Some(camera)) = (self.distant.as_mut(), camera) {
            let level = d.fade.tick(camera, bounds.center(), dt);
            d.sink.set_volume(d.base_level * level);
        }

        // 4. Fade advancement.
        self.soundscape.tick(dt);

        self.status
            .update(self.machine.phase(), self.display_timer(looking), dt);
    }

    /// Cancels every fade and scheduled task across the subsystems. Stale
    /// work must never touch a channel after this returns.
    pub fn teardown(&mut self) {
        self.soundscape.teardown();
        self.emitters.stop_all();
        if let Some(s) = self.supporting.as_mut() {
            s.halt();
        }
        if let Some(d) = self.distant.as_mut() {
            d.sink.pause();
        }
    }

    fn apply_phase(&mut self, to: Phase) {
        self.soundscape.set_phase(to);
        self.emitters.set_phase(to);
        if let Some(s) = self.supporting.as_mut() {
            s.set_on(to == Phase::Large);
        }
    }

    fn display_timer(&self, looking: bool) -> f32 {
        match self.machine.model() {
            GrowthModel::Continuous { .. } => self.machine.total_look_time(),
            GrowthModel::Discrete => {
                if looking {
                    self.machine.look_timer()
                } else {
                    self.machine.away_timer()
                }
            }
        }
    }
}
