//! Audio stage mapper: translates the current phase and gaze state into
//! per-channel fade targets on the crossfade engine.
//!
//! All scheduling (the phase transition window, the near-end delayed
//! fade-in, the periodic strums) is explicit task state polled by
//! [`Soundscape::tick`]; cancellation is dropping the task. Channel fades
//! always go through the mixer, so the cancel-and-replace discipline holds
//! everywhere.

use crate::channel::ChannelId;
use crate::constants::{
    CRICKETS_LEVELS, CROSSFADE_SECONDS, GAZE_FADE_SECONDS, NEAR_END_DELAY_SECONDS,
    QUICK_FADE_SECONDS, STRUM_FADE_OUT_SECONDS, STRUM_INTERVAL_SECONDS,
    STRUM_MIN_INTERVAL_SECONDS,
};
use crate::mixer::Mixer;
use crate::phase::Phase;
use crate::stage::WindProfile;

#[derive(Debug, Clone, Copy)]
pub struct SoundscapeConfig {
    /// Phase transition crossfade.
    pub crossfade: f32,
    /// Fast fade for designer-facing live changes (wind profile, master).
    pub quick_fade: f32,
    /// Gaze-gate fade, deliberately shorter than the phase crossfade.
    pub gaze_fade: f32,
    /// Strum silencing on gaze loss; fast but never a hard cutoff.
    pub strum_fade_out: f32,
    /// Hold time before the phase-1 near-end synth fades in.
    pub near_end_delay: f32,
    pub master: f32,
    pub wind: WindProfile,
    pub mid_strum_interval: f32,
    pub large_strum_interval: f32,
    pub mid_strum_volume: f32,
    pub large_strum_volume: f32,
}

impl Default for SoundscapeConfig {
    fn default() -> Self {
        Self {
            crossfade: CROSSFADE_SECONDS,
            quick_fade: QUICK_FADE_SECONDS,
            gaze_fade: GAZE_FADE_SECONDS,
            strum_fade_out: STRUM_FADE_OUT_SECONDS,
            near_end_delay: NEAR_END_DELAY_SECONDS,
            master: 1.0,
            wind: WindProfile::default(),
            mid_strum_interval: STRUM_INTERVAL_SECONDS,
            large_strum_interval: STRUM_INTERVAL_SECONDS,
            mid_strum_volume: 1.0,
            large_strum_volume: 1.0,
        }
    }
}

impl SoundscapeConfig {
    fn clamped(self) -> Self {
        Self {
            crossfade: self.crossfade.max(0.0),
            quick_fade: self.quick_fade.max(0.0),
            gaze_fade: self.gaze_fade.max(0.0),
            strum_fade_out: self.strum_fade_out.max(0.0),
            near_end_delay: self.near_end_delay.max(0.0),
            master: self.master.clamp(0.0, 1.0),
            mid_strum_interval: self.mid_strum_interval.max(STRUM_MIN_INTERVAL_SECONDS),
            large_strum_interval: self.large_strum_interval.max(STRUM_MIN_INTERVAL_SECONDS),
            mid_strum_volume: self.mid_strum_volume.clamp(0.0, 1.0),
            large_strum_volume: self.large_strum_volume.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Countdown toward the near-end synth fade-in. Gaze loss re-arms the full
/// delay; leaving phase 1 drops the task entirely.
#[derive(Debug, Clone, Copy)]
struct NearEndTask {
    remaining: f32,
}

/// Countdown toward the next periodic strum one-shot.
#[derive(Debug, Clone, Copy)]
struct StrumTask {
    remaining: f32,
}

pub struct Soundscape {
    config: SoundscapeConfig,
    mixer: Mixer,
    /// `None` is the ambience-only initialization pseudo-state.
    phase: Option<Phase>,
    gaze_on: bool,
    /// Remaining seconds of the phase transition window; the gaze gate is
    /// suppressed until it elapses.
    transition_remaining: f32,
    near_end: Option<NearEndTask>,
    /// The near-end delay has elapsed for the current phase-1 visit, so the
    /// gaze gate may drive the synth.
    near_end_ready: bool,
    mid_strum: Option<StrumTask>,
    large_strum: Option<StrumTask>,
}

impl Soundscape {
    /// Takes ownership of a mixer whose channels are already bound. Starts
    /// in the ambience-only state; the composition root picks the first
    /// real phase.
    pub fn new(mixer: Mixer, config: SoundscapeConfig) -> Self {
        let mut this = Self {
            config: config.clamped(),
            mixer,
            phase: None,
            gaze_on: true,
            transition_remaining: 0.0,
            near_end: None,
            near_end_ready: false,
            mid_strum: None,
            large_strum: None,
        };
        this.apply_immediate(None);
        this
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn gaze_on(&self) -> bool {
        self.gaze_on
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_remaining > 0.0
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn config(&self) -> &SoundscapeConfig {
        &self.config
    }

    pub fn has_strum_task(&self, phase: Phase) -> bool {
        match phase {
            Phase::Small => self.mid_strum.is_some(),
            Phase::Large => self.large_strum.is_some(),
            Phase::Fireball => false,
        }
    }

    /// Crossfades the whole soundscape to a new phase. No-op when already
    /// in that phase.
    pub fn set_phase(&mut self, phase: Phase) {
        if self.phase == Some(phase) {
            return;
        }
        log::info!("[soundscape] phase -> {}", phase.number());
        self.mixer.stop_all_fades();

        let xfade = self.config.crossfade;
        self.layer_fade(ChannelId::Wind, self.config.wind.level(phase), xfade);
        self.layer_fade(
            ChannelId::Crickets,
            CRICKETS_LEVELS[(phase.number() - 1) as usize],
            xfade,
        );

        self.phase = Some(phase);
        self.transition_remaining = xfade;
        self.near_end = None;
        self.near_end_ready = false;
        let gaze_unit = if self.gaze_on { 1.0 } else { 0.0 };

        match phase {
            Phase::Fireball => {
                self.layer_fade(ChannelId::LowCrackle, 1.0, xfade);
                self.silence(ChannelId::MidCrackle, xfade);
                self.silence(ChannelId::MidSynth, xfade);
                self.silence(ChannelId::MidPulse, xfade);
                self.silence(ChannelId::LargeCrackle, xfade);
                self.silence(ChannelId::LargeBuild, xfade);
                self.silence(ChannelId::LargeSynth, xfade);
                // Near-end starts silent and waits out its delay.
                self.mixer.mute_pause(ChannelId::NearEndSynth);
                self.near_end = Some(NearEndTask {
                    remaining: self.config.near_end_delay,
                });
                self.mid_strum = None;
                self.large_strum = None;
            }
            Phase::Small => {
                self.silence(ChannelId::NearEndSynth, xfade);
                self.silence(ChannelId::LowCrackle, xfade);
                self.layer_fade(ChannelId::MidCrackle, 1.0, xfade);
                self.layer_fade(ChannelId::MidSynth, gaze_unit, xfade);
                self.layer_fade(ChannelId::MidPulse, gaze_unit, xfade);
                self.silence(ChannelId::LargeCrackle, xfade);
                self.silence(ChannelId::LargeBuild, xfade);
                self.silence(ChannelId::LargeSynth, xfade);
                self.accent(ChannelId::MidWhoosh);
                self.large_strum = None;
                self.start_strum(Phase::Small);
            }
            Phase::Large => {
                self.silence(ChannelId::LowCrackle, xfade);
                self.silence(ChannelId::NearEndSynth, xfade);
                self.silence(ChannelId::MidCrackle, xfade);
                self.silence(ChannelId::MidSynth, xfade);
                self.silence(ChannelId::MidPulse, xfade);
                self.layer_fade(ChannelId::LargeCrackle, 1.0, xfade);
                self.layer_fade(ChannelId::LargeBuild, gaze_unit, xfade);
                self.layer_fade(ChannelId::LargeSynth, gaze_unit, xfade);
                self.accent(ChannelId::LargeWhoosh);
                self.mid_strum = None;
                self.start_strum(Phase::Large);
            }
        }
    }

    /// Flips the gaze gate. Gated layers get the shorter gaze fade; strums
    /// stop with their own fast fade-out rather than a hard cutoff.
    pub fn set_gaze(&mut self, on: bool) {
        self.gaze_on = on;
        if on {
            if let Some(phase) = self.phase {
                self.start_strum(phase);
            }
        } else {
            self.mid_strum = None;
            self.large_strum = None;
            let out = self.config.strum_fade_out;
            self.mixer.fade_to(ChannelId::MidStrum, 0.0, out, false);
            self.mixer.fade_to(ChannelId::LargeStrum, 0.0, out, false);
        }
        self.apply_gaze_gate();
    }

    /// Designer-facing wind profile setter; optionally re-applies the
    /// current phase level with the quick fade.
    pub fn set_wind_profile(&mut self, p1: f32, p2: f32, p3: f32, apply_now: bool) {
        self.config.wind = WindProfile::new(p1, p2, p3);
        if apply_now {
            if let Some(phase) = self.phase {
                let level = self.config.wind.level(phase);
                let quick = self.config.quick_fade;
                self.layer_fade(ChannelId::Wind, level, quick);
            }
        }
    }

    pub fn set_master_volume(&mut self, master: f32) {
        self.config.master = master.clamp(0.0, 1.0);
    }

    /// Snaps the soundscape to a phase with no fades: startup and rebind
    /// path. `None` is the ambience-only pseudo-state.
    pub fn apply_immediate(&mut self, phase: Option<Phase>) {
        self.mixer.stop_all_fades();
        self.transition_remaining = 0.0;
        self.near_end = None;
        self.near_end_ready = false;
        self.mid_strum = None;
        self.large_strum = None;
        self.phase = phase;

        let master = self.config.master;
        let wind_unit = phase.map_or(1.0, |p| self.config.wind.level(p));
        let crickets_unit = phase.map_or(1.0, |p| CRICKETS_LEVELS[(p.number() - 1) as usize]);
        self.set_unit_immediate(ChannelId::Wind, wind_unit * master);
        self.set_unit_immediate(ChannelId::Crickets, crickets_unit * master);

        let gaze_unit = if self.gaze_on { 1.0 } else { 0.0 };
        let fire_layers = [
            ChannelId::LowCrackle,
            ChannelId::NearEndSynth,
            ChannelId::MidCrackle,
            ChannelId::MidSynth,
            ChannelId::MidPulse,
            ChannelId::LargeCrackle,
            ChannelId::LargeBuild,
            ChannelId::LargeSynth,
        ];
        for ch in fire_layers {
            let unit = match (phase, ch) {
                (Some(Phase::Fireball), ChannelId::LowCrackle) => 1.0,
                (Some(Phase::Small), ChannelId::MidCrackle) => 1.0,
                (Some(Phase::Small), ChannelId::MidSynth | ChannelId::MidPulse) => gaze_unit,
                (Some(Phase::Large), ChannelId::LargeCrackle) => 1.0,
                (Some(Phase::Large), ChannelId::LargeBuild | ChannelId::LargeSynth) => gaze_unit,
                _ => 0.0,
            };
            if unit > 0.0 {
                let level = unit * self.mixer.base_level(ch) * master;
                self.mixer.set_level_immediate(ch, level, true);
            } else {
                self.mixer.mute_pause(ch);
            }
        }

        if phase == Some(Phase::Fireball) {
            self.near_end = Some(NearEndTask {
                remaining: self.config.near_end_delay,
            });
        }
        if let Some(p) = phase {
            self.start_strum(p);
        }
    }

    /// Cancels every fade and scheduled task. Disable/teardown path; stale
    /// tasks must never touch a channel afterwards.
    pub fn teardown(&mut self) {
        self.mixer.stop_all_fades();
        self.transition_remaining = 0.0;
        self.near_end = None;
        self.near_end_ready = false;
        self.mid_strum = None;
        self.large_strum = None;
    }

    /// Advances the transition window, the near-end delay, the strum
    /// timers, and every in-flight fade by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        if self.transition_remaining > 0.0 {
            self.transition_remaining -= dt;
            if self.transition_remaining <= 0.0 {
                self.transition_remaining = 0.0;
                self.apply_gaze_gate();
            }
        }

        self.tick_near_end(dt);
        self.tick_strum(Phase::Small, dt);
        self.tick_strum(Phase::Large, dt);

        self.mixer.advance(dt);
    }

    /// Applies the gaze-sensitive sub-gating for the current phase.
    /// Suppressed during a phase transition; the transition's own targets
    /// already account for gaze, and the gate re-applies once it ends.
    fn apply_gaze_gate(&mut self) {
        if self.transition_remaining > 0.0 {
            return;
        }
        let dur = self.config.gaze_fade;
        let gaze_unit = if self.gaze_on { 1.0 } else { 0.0 };
        match self.phase {
            Some(Phase::Fireball) => {
                if self.near_end_ready {
                    self.layer_fade(ChannelId::NearEndSynth, gaze_unit, dur);
                }
            }
            Some(Phase::Small) => {
                self.layer_fade(ChannelId::MidSynth, gaze_unit, dur);
                self.layer_fade(ChannelId::MidPulse, gaze_unit, dur);
                if self.gaze_on {
                    self.start_strum(Phase::Small);
                } else {
                    self.mid_strum = None;
                }
            }
            Some(Phase::Large) => {
                self.layer_fade(ChannelId::LargeBuild, gaze_unit, dur);
                self.layer_fade(ChannelId::LargeSynth, gaze_unit, dur);
                if self.gaze_on {
                    self.start_strum(Phase::Large);
                } else {
                    self.large_strum = None;
                }
            }
            None => {}
        }
    }

    fn tick_near_end(&mut self, dt: f32) {
        if self.phase != Some(Phase::Fireball) {
            self.near_end = None;
            self.near_end_ready = false;
            return;
        }
        let Some(task) = self.near_end.as_mut() else {
            return;
        };
        if !self.gaze_on {
            // A lost gaze re-arms the full delay.
            task.remaining = self.config.near_end_delay;
            return;
        }
        task.remaining -= dt;
        if task.remaining <= 0.0 {
            self.near_end = None;
            self.near_end_ready = true;
            let xfade = self.config.crossfade;
            self.layer_fade(ChannelId::NearEndSynth, 1.0, xfade);
        }
    }

    fn tick_strum(&mut self, tier: Phase, dt: f32) {
        let (channel, interval, volume_mul) = match tier {
            Phase::Small => (
                ChannelId::MidStrum,
                self.config.mid_strum_interval,
                self.config.mid_strum_volume,
            ),
            Phase::Large => (
                ChannelId::LargeStrum,
                self.config.large_strum_interval,
                self.config.large_strum_volume,
            ),
            Phase::Fireball => return,
        };
        if !self.strum_qualifies(tier, channel) {
            self.clear_strum(tier);
            return;
        }
        let task = match tier {
            Phase::Small => self.mid_strum.as_mut(),
            Phase::Large => self.large_strum.as_mut(),
            Phase::Fireball => None,
        };
        let Some(task) = task else {
            return;
        };
        task.remaining -= dt;
        if task.remaining <= 0.0 {
            task.remaining += interval;
            let volume = self.mixer.base_level(channel) * self.config.master * volume_mul;
            self.mixer.one_shot(channel, volume);
        }
    }

    /// Idempotent: an already-running strum task is left alone, and a
    /// non-qualifying state clears it.
    fn start_strum(&mut self, tier: Phase) {
        let (slot_filled, channel, interval) = match tier {
            Phase::Small => (
                self.mid_strum.is_some(),
                ChannelId::MidStrum,
                self.config.mid_strum_interval,
            ),
            Phase::Large => (
                self.large_strum.is_some(),
                ChannelId::LargeStrum,
                self.config.large_strum_interval,
            ),
            Phase::Fireball => return,
        };
        if !self.strum_qualifies(tier, channel) {
            self.clear_strum(tier);
            return;
        }
        if slot_filled {
            return;
        }
        let task = StrumTask {
            remaining: interval,
        };
        match tier {
            Phase::Small => self.mid_strum = Some(task),
            Phase::Large => self.large_strum = Some(task),
            Phase::Fireball => {}
        }
    }

    fn clear_strum(&mut self, tier: Phase) {
        match tier {
            Phase::Small => self.mid_strum = None,
            Phase::Large => self.large_strum = None,
            Phase::Fireball => {}
        }
    }

    fn strum_qualifies(&self, tier: Phase, channel: ChannelId) -> bool {
        self.phase == Some(tier) && self.gaze_on && self.mixer.is_bound(channel)
    }

    /// Fades a loop channel toward `unit * base * master`.
    fn layer_fade(&mut self, channel: ChannelId, unit: f32, duration: f32) {
        let level = unit * self.mixer.base_level(channel) * self.config.master;
        self.mixer.fade_to(channel, level, duration, true);
    }

    fn silence(&mut self, channel: ChannelId, duration: f32) {
        self.mixer
            .fade_to(channel, 0.0, duration, channel.default_looping());
    }

    fn accent(&mut self, channel: ChannelId) {
        let volume = self.mixer.base_level(channel) * self.config.master;
        self.mixer.one_shot(channel, volume);
    }

    fn set_unit_immediate(&mut self, channel: ChannelId, level: f32) {
        let level = level * self.mixer.base_level(channel);
        self.mixer.set_level_immediate(channel, level, true);
    }
}
