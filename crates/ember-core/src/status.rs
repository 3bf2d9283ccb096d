//! Optional plain-text status boundary. Strings are pushed on change; no
//! core behavior depends on a sink being present.

use crate::constants::STATUS_MESSAGE_SECONDS;
use crate::phase::Phase;

pub trait StatusSink {
    fn set_phase_line(&mut self, text: &str);
    fn set_timer_line(&mut self, text: &str);
    fn set_message(&mut self, text: &str);
    fn clear_message(&mut self);
}

/// Tracks what was last pushed so lines only go out when they change.
pub struct StatusBoard {
    sink: Option<Box<dyn StatusSink>>,
    last_phase: Option<Phase>,
    last_timer_secs: Option<u32>,
    message_remaining: f32,
}

impl StatusBoard {
    pub fn new(sink: Option<Box<dyn StatusSink>>) -> Self {
        Self {
            sink,
            last_phase: None,
            last_timer_secs: None,
            message_remaining: 0.0,
        }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Shows a transient message that clears itself after a few seconds.
    pub fn post_message(&mut self, text: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_message(text);
            self.message_remaining = STATUS_MESSAGE_SECONDS;
        }
    }

    /// Pushes phase/timer lines when they change and ages out any
    /// transient message.
    pub fn update(&mut self, phase: Phase, timer_seconds: f32, dt: f32) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self.last_phase != Some(phase) {
            self.last_phase = Some(phase);
            sink.set_phase_line(&format!("Fire: {}", phase.label()));
        }
        let secs = timer_seconds.max(0.0) as u32;
        if self.last_timer_secs != Some(secs) {
            self.last_timer_secs = Some(secs);
            sink.set_timer_line(&format!("{secs}s"));
        }
        if self.message_remaining > 0.0 {
            self.message_remaining -= dt.max(0.0);
            if self.message_remaining <= 0.0 {
                self.message_remaining = 0.0;
                sink.clear_message();
            }
        }
    }
}

/// Intro copy shown by hosts that render text. Plain strings only.
pub fn tutorial_text() -> &'static str {
    "Keep your eyes on the fire to feed it.\n\
     Look away and it slowly settles back down."
}
