//! Fire intensity phases and the gaze-driven transition machine.
//!
//! Transitions are timer-accumulation driven, never single-frame edges.
//! Two growth models share the machine: discrete per-phase look/away timers
//! (reset on transition) and a continuous `total_look_time` that decays at
//! half rate while gaze is away. Either way the phase moves at most one
//! step per evaluated frame.

use crate::constants::{
    AWAY_DECAY_RATE, PHASE_1_TO_2_TIME, PHASE_2_TO_1_TIME, PHASE_2_TO_3_TIME, PHASE_3_TO_2_TIME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Fireball = 1,
    Small = 2,
    Large = 3,
}

impl Phase {
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Clamps any integer into the valid phase range.
    pub fn from_number(n: i32) -> Phase {
        match n.clamp(1, 3) {
            1 => Phase::Fireball,
            2 => Phase::Small,
            _ => Phase::Large,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Fireball => "Fireball",
            Phase::Small => "Small Fire",
            Phase::Large => "Big Flames",
        }
    }
}

/// Asymmetric up/down hold times, seconds. Clamped positive on construction.
#[derive(Debug, Clone, Copy)]
pub struct PhaseThresholds {
    pub grow_1_to_2: f32,
    pub grow_2_to_3: f32,
    pub shrink_3_to_2: f32,
    pub shrink_2_to_1: f32,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            grow_1_to_2: PHASE_1_TO_2_TIME,
            grow_2_to_3: PHASE_2_TO_3_TIME,
            shrink_3_to_2: PHASE_3_TO_2_TIME,
            shrink_2_to_1: PHASE_2_TO_1_TIME,
        }
    }
}

impl PhaseThresholds {
    fn clamped(self) -> Self {
        const MIN: f32 = 1e-3;
        Self {
            grow_1_to_2: self.grow_1_to_2.max(MIN),
            grow_2_to_3: self.grow_2_to_3.max(MIN),
            shrink_3_to_2: self.shrink_3_to_2.max(MIN),
            shrink_2_to_1: self.shrink_2_to_1.max(MIN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthModel {
    /// Per-phase look/away timers that reset on every transition.
    Discrete,
    /// Cumulative gaze investment with half-rate decay while away; the
    /// split maps accumulated time to visual growth progress.
    Continuous { split: f32 },
}

impl Default for GrowthModel {
    fn default() -> Self {
        GrowthModel::Continuous {
            split: crate::constants::GROWTH_SPLIT,
        }
    }
}

/// Emitted when (and only when) the phase actually changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

pub struct PhaseMachine {
    thresholds: PhaseThresholds,
    model: GrowthModel,
    phase: Phase,
    look_timer: f32,
    away_timer: f32,
    total_look_time: f32,
}

impl PhaseMachine {
    pub fn new(thresholds: PhaseThresholds, model: GrowthModel) -> Self {
        Self {
            thresholds: thresholds.clamped(),
            model,
            phase: Phase::Fireball,
            look_timer: 0.0,
            away_timer: 0.0,
            total_look_time: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn look_timer(&self) -> f32 {
        self.look_timer
    }

    pub fn away_timer(&self) -> f32 {
        self.away_timer
    }

    pub fn total_look_time(&self) -> f32 {
        self.total_look_time
    }

    pub fn model(&self) -> GrowthModel {
        self.model
    }

    /// Overall growth progress in [0, 1] (continuous model; in the discrete
    /// model this reports the phase floor so visuals can still follow it).
    pub fn growth_progress(&self) -> f32 {
        let t12 = self.thresholds.grow_1_to_2;
        let t23 = self.thresholds.grow_2_to_3;
        match self.model {
            GrowthModel::Continuous { split } => {
                let split = split.clamp(0.05, 0.95);
                if self.total_look_time <= t12 {
                    split * (self.total_look_time / t12)
                } else {
                    split + (1.0 - split) * ((self.total_look_time - t12) / t23).min(1.0)
                }
            }
            GrowthModel::Discrete => match self.phase {
                Phase::Fireball => 0.0,
                Phase::Small => 0.5,
                Phase::Large => 1.0,
            },
        }
    }

    /// Advances the timers by one frame and returns a change event if a
    /// threshold was crossed. At most one phase step per call.
    pub fn tick(&mut self, looking: bool, dt: f32) -> Option<PhaseChange> {
        let dt = dt.max(0.0);
        match self.model {
            GrowthModel::Discrete => self.tick_discrete(looking, dt),
            GrowthModel::Continuous { .. } => self.tick_continuous(looking, dt),
        }
    }

    /// Debug/manual override: snaps to a phase, resets both timers, and
    /// fires the same event a natural transition would.
    pub fn force_phase(&mut self, phase: i32) -> Option<PhaseChange> {
        let to = Phase::from_number(phase);
        self.look_timer = 0.0;
        self.away_timer = 0.0;
        // Re-seat accumulated time at the entered phase's lower threshold so
        // the derived phase agrees with the forced one.
        self.total_look_time = match to {
            Phase::Fireball => 0.0,
            Phase::Small => self.thresholds.grow_1_to_2,
            Phase::Large => self.thresholds.grow_1_to_2 + self.thresholds.grow_2_to_3,
        };
        if to == self.phase {
            return None;
        }
        let from = self.phase;
        self.phase = to;
        log::info!("[phase] forced {} -> {}", from.number(), to.number());
        Some(PhaseChange { from, to })
    }

    fn tick_discrete(&mut self, looking: bool, dt: f32) -> Option<PhaseChange> {
        if looking {
            self.away_timer = 0.0;
            self.look_timer += dt;
            let threshold = match self.phase {
                Phase::Fireball => Some(self.thresholds.grow_1_to_2),
                Phase::Small => Some(self.thresholds.grow_2_to_3),
                Phase::Large => None,
            };
            if let Some(t) = threshold {
                if self.look_timer >= t {
                    self.look_timer = 0.0;
                    return self.step_to(Phase::from_number(self.phase.number() as i32 + 1));
                }
            }
        } else {
            self.look_timer = 0.0;
            self.away_timer += dt;
            let threshold = match self.phase {
                Phase::Large => Some(self.thresholds.shrink_3_to_2),
                Phase::Small => Some(self.thresholds.shrink_2_to_1),
                Phase::Fireball => None,
            };
            if let Some(t) = threshold {
                if self.away_timer >= t {
                    self.away_timer = 0.0;
                    return self.step_to(Phase::from_number(self.phase.number() as i32 - 1));
                }
            }
        }
        None
    }

    fn tick_continuous(&mut self, looking: bool, dt: f32) -> Option<PhaseChange> {
        if looking {
            self.away_timer = 0.0;
            self.look_timer += dt;
            self.total_look_time += dt;
        } else {
            self.look_timer = 0.0;
            self.away_timer += dt;
            // Losing gaze costs progress at half the rate it was gained.
            self.total_look_time = (self.total_look_time - dt * AWAY_DECAY_RATE).max(0.0);
        }

        let t12 = self.thresholds.grow_1_to_2;
        let t23 = self.thresholds.grow_2_to_3;
        let derived = if self.total_look_time >= t12 + t23 {
            Phase::Large
        } else if self.total_look_time >= t12 {
            Phase::Small
        } else {
            Phase::Fireball
        };
        if derived == self.phase {
            return None;
        }
        // One step per frame even if a huge dt crossed two thresholds.
        let step = if derived > self.phase { 1 } else { -1 };
        self.step_to(Phase::from_number(self.phase.number() as i32 + step))
    }

    fn step_to(&mut self, to: Phase) -> Option<PhaseChange> {
        if to == self.phase {
            return None;
        }
        let from = self.phase;
        self.phase = to;
        log::info!(
            "[phase] {} -> {} (look {:.1}s, away {:.1}s)",
            from.number(),
            to.number(),
            self.look_timer,
            self.away_timer
        );
        Some(PhaseChange { from, to })
    }
}
