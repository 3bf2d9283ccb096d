//! Audio channel identities and the binding table.
//!
//! Channels are a closed set known at compile time; the composition root
//! binds each one to a concrete sink exactly once at startup. There is no
//! runtime name matching.

use fnv::FnvHashMap;

/// One controllable audio output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    // Always-on ambience
    Wind,
    Crickets,
    // Phase 1 layers
    LowCrackle,
    NearEndSynth,
    // Phase 2 layers
    MidCrackle,
    MidWhoosh,
    MidSynth,
    MidPulse,
    // Phase 3 layers
    LargeCrackle,
    LargeWhoosh,
    LargeBuild,
    LargeSynth,
    // Periodic accents
    MidStrum,
    LargeStrum,
}

impl ChannelId {
    pub const ALL: [ChannelId; 14] = [
        ChannelId::Wind,
        ChannelId::Crickets,
        ChannelId::LowCrackle,
        ChannelId::NearEndSynth,
        ChannelId::MidCrackle,
        ChannelId::MidWhoosh,
        ChannelId::MidSynth,
        ChannelId::MidPulse,
        ChannelId::LargeCrackle,
        ChannelId::LargeWhoosh,
        ChannelId::LargeBuild,
        ChannelId::LargeSynth,
        ChannelId::MidStrum,
        ChannelId::LargeStrum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChannelId::Wind => "wind",
            ChannelId::Crickets => "crickets",
            ChannelId::LowCrackle => "low_crackle",
            ChannelId::NearEndSynth => "near_end_synth",
            ChannelId::MidCrackle => "mid_crackle",
            ChannelId::MidWhoosh => "mid_whoosh",
            ChannelId::MidSynth => "mid_synth",
            ChannelId::MidPulse => "mid_pulse",
            ChannelId::LargeCrackle => "large_crackle",
            ChannelId::LargeWhoosh => "large_whoosh",
            ChannelId::LargeBuild => "large_build",
            ChannelId::LargeSynth => "large_synth",
            ChannelId::MidStrum => "mid_strum",
            ChannelId::LargeStrum => "large_strum",
        }
    }

    /// Accent channels are one-shot only: on fading to silence they stop
    /// and reset position. Everything else loops and pauses so a resume
    /// picks up mid-clip.
    pub fn is_accent(self) -> bool {
        matches!(
            self,
            ChannelId::MidWhoosh
                | ChannelId::LargeWhoosh
                | ChannelId::MidStrum
                | ChannelId::LargeStrum
        )
    }

    pub fn default_looping(self) -> bool {
        !self.is_accent()
    }
}

/// Boundary to the host audio subsystem. The core never decodes or mixes
/// samples; it only pushes volume/loop/transport commands.
pub trait AudioSink {
    fn set_volume(&mut self, volume: f32);
    fn set_looping(&mut self, looping: bool);
    fn play(&mut self);
    /// Resume from a paused position. Hosts without a pause position may
    /// treat this as `play`.
    fn resume(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Single playthrough at the given volume, independent of loop state.
    fn play_one_shot(&mut self, volume: f32);
    fn is_playing(&self) -> bool;
    /// True when a paused playback position exists to resume from.
    fn has_position(&self) -> bool;
}

/// Declarative channel -> sink table built once by the composition root.
#[derive(Default)]
pub struct AudioBindings {
    sinks: FnvHashMap<ChannelId, Box<dyn AudioSink>>,
}

impl AudioBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds (or re-binds, on a rebind event) a channel to a sink.
    pub fn bind(&mut self, id: ChannelId, sink: Box<dyn AudioSink>) {
        if self.sinks.insert(id, sink).is_some() {
            log::debug!("[audio] rebound channel {}", id.name());
        }
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.sinks.contains_key(&id)
    }

    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut Box<dyn AudioSink>> {
        self.sinks.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
