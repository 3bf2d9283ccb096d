// Shared mock sinks for the integration suites. State lives behind
// Rc<RefCell<..>> handles so tests can observe what the core pushed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use ember_core::{AudioSink, ChannelId, Mixer, StatusSink, VisualSink};

#[derive(Debug, Default, Clone)]
pub struct AudioState {
    pub volume: f32,
    pub looping: bool,
    pub playing: bool,
    pub paused: bool,
    pub play_calls: u32,
    pub resume_calls: u32,
    pub stop_calls: u32,
    pub one_shots: Vec<f32>,
}

pub struct MockAudio {
    state: Rc<RefCell<AudioState>>,
}

pub fn mock_audio() -> (Box<dyn AudioSink>, Rc<RefCell<AudioState>>) {
    let state = Rc::new(RefCell::new(AudioState::default()));
    (
        Box::new(MockAudio {
            state: Rc::clone(&state),
        }),
        state,
    )
}

impl AudioSink for MockAudio {
    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }

    fn play(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = true;
        s.paused = false;
        s.play_calls += 1;
    }

    fn resume(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = true;
        s.paused = false;
        s.resume_calls += 1;
    }

    fn pause(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.paused = true;
    }

    fn stop(&mut self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.paused = false;
        s.stop_calls += 1;
    }

    fn play_one_shot(&mut self, volume: f32) {
        self.state.borrow_mut().one_shots.push(volume);
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn has_position(&self) -> bool {
        self.state.borrow().paused
    }
}

/// A mixer with every channel bound at native level 1, plus the state
/// handles keyed by channel.
pub fn full_mixer(one_shot_floor: f32) -> (Mixer, HashMap<ChannelId, Rc<RefCell<AudioState>>>) {
    let mut mixer = Mixer::new(one_shot_floor);
    let mut handles = HashMap::new();
    for ch in ChannelId::ALL {
        let (sink, state) = mock_audio();
        mixer.bind(ch, sink, 1.0);
        handles.insert(ch, state);
    }
    (mixer, handles)
}

#[derive(Debug, Clone)]
pub struct VisualState {
    pub emission: f32,
    pub size: f32,
    pub lifetime: f32,
    pub scale: Vec3,
    pub position: Vec3,
    pub light: f32,
    pub active: bool,
    pub play_calls: u32,
    pub stop_clear_calls: u32,
    pub live_particles: u32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            emission: 0.0,
            size: 0.0,
            lifetime: 0.0,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            light: 0.0,
            active: false,
            play_calls: 0,
            stop_clear_calls: 0,
            live_particles: 0,
        }
    }
}

pub struct MockVisual {
    state: Rc<RefCell<VisualState>>,
}

pub fn mock_visual() -> (Box<dyn VisualSink>, Rc<RefCell<VisualState>>) {
    let state = Rc::new(RefCell::new(VisualState::default()));
    (
        Box::new(MockVisual {
            state: Rc::clone(&state),
        }),
        state,
    )
}

impl VisualSink for MockVisual {
    fn set_emission_rate(&mut self, rate: f32) {
        self.state.borrow_mut().emission = rate;
    }

    fn set_start_size(&mut self, size: f32) {
        self.state.borrow_mut().size = size;
    }

    fn set_start_lifetime(&mut self, lifetime: f32) {
        self.state.borrow_mut().lifetime = lifetime;
    }

    fn set_local_scale(&mut self, scale: Vec3) {
        self.state.borrow_mut().scale = scale;
    }

    fn set_position(&mut self, position: Vec3) {
        self.state.borrow_mut().position = position;
    }

    fn set_light_intensity(&mut self, intensity: f32) {
        self.state.borrow_mut().light = intensity;
    }

    fn set_active(&mut self, active: bool) {
        self.state.borrow_mut().active = active;
    }

    fn play(&mut self) {
        self.state.borrow_mut().play_calls += 1;
    }

    fn stop_and_clear(&mut self) {
        self.state.borrow_mut().stop_clear_calls += 1;
    }

    fn live_particles(&self) -> u32 {
        self.state.borrow().live_particles
    }
}

#[derive(Debug, Default, Clone)]
pub struct StatusState {
    pub phase_lines: Vec<String>,
    pub timer_lines: Vec<String>,
    pub messages: Vec<String>,
    pub clears: u32,
}

pub struct MockStatus {
    state: Rc<RefCell<StatusState>>,
}

pub fn mock_status() -> (Box<dyn StatusSink>, Rc<RefCell<StatusState>>) {
    let state = Rc::new(RefCell::new(StatusState::default()));
    (
        Box::new(MockStatus {
            state: Rc::clone(&state),
        }),
        state,
    )
}

impl StatusSink for MockStatus {
    fn set_phase_line(&mut self, text: &str) {
        self.state.borrow_mut().phase_lines.push(text.to_string());
    }

    fn set_timer_line(&mut self, text: &str) {
        self.state.borrow_mut().timer_lines.push(text.to_string());
    }

    fn set_message(&mut self, text: &str) {
        self.state.borrow_mut().messages.push(text.to_string());
    }

    fn clear_message(&mut self) {
        self.state.borrow_mut().clears += 1;
    }
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}
