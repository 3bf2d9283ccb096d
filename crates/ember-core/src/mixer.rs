//! Crossfade engine: one duration-based fade per channel, cancel-and-replace
//! semantics, and the pause-vs-stop silence rule.
//!
//! Fades are explicit task objects advanced once per frame by [`Mixer::advance`];
//! there are no queued fades and no hidden control flow. Starting a new fade on
//! a channel discards the old task and begins from the channel's current level,
//! so the level trajectory stays continuous under rapid re-triggering.

use crate::blend::fade_fraction;
use crate::channel::{AudioBindings, AudioSink, ChannelId};
use fnv::{FnvHashMap, FnvHashSet};
use smallvec::SmallVec;

const SILENCE_EPSILON: f32 = 1e-4;

/// In-flight fade owned exclusively by its channel's strip.
#[derive(Debug, Clone, Copy)]
struct FadeTask {
    start_level: f32,
    target_level: f32,
    duration: f32,
    elapsed: f32,
}

#[derive(Debug)]
struct ChannelStrip {
    /// Reference volume captured at bind time, clamped to (0, 1].
    base_level: f32,
    current_level: f32,
    looping: bool,
    fade: Option<FadeTask>,
}

pub struct Mixer {
    bindings: AudioBindings,
    strips: FnvHashMap<ChannelId, ChannelStrip>,
    /// Target volumes below this floor are raised to it for one-shots.
    one_shot_floor: f32,
    warned_missing: FnvHashSet<ChannelId>,
}

impl Mixer {
    pub fn new(one_shot_floor: f32) -> Self {
        Self {
            bindings: AudioBindings::new(),
            strips: FnvHashMap::default(),
            one_shot_floor: one_shot_floor.clamp(0.0, 1.0),
            warned_missing: FnvHashSet::default(),
        }
    }

    /// Binds a channel to its sink and caches the reference level. A native
    /// level of zero or less means "unset" and defaults to full.
    pub fn bind(&mut self, id: ChannelId, mut sink: Box<dyn AudioSink>, native_level: f32) {
        let base_level = if native_level <= 0.0 {
            1.0
        } else {
            native_level.min(1.0)
        };
        sink.set_looping(id.default_looping());
        self.bindings.bind(id, sink);
        self.strips.insert(
            id,
            ChannelStrip {
                base_level,
                current_level: 0.0,
                looping: id.default_looping(),
                fade: None,
            },
        );
        self.warned_missing.remove(&id);
    }

    pub fn is_bound(&self, id: ChannelId) -> bool {
        self.bindings.contains(id)
    }

    pub fn base_level(&self, id: ChannelId) -> f32 {
        self.strips.get(&id).map_or(1.0, |s| s.base_level)
    }

    pub fn current_level(&self, id: ChannelId) -> f32 {
        self.strips.get(&id).map_or(0.0, |s| s.current_level)
    }

    pub fn has_active_fade(&self, id: ChannelId) -> bool {
        self.strips.get(&id).is_some_and(|s| s.fade.is_some())
    }

    /// Starts a linear fade from the channel's current level to
    /// `target_level` over `duration` seconds, replacing any in-flight fade.
    /// A non-positive duration completes the fade this call.
    pub fn fade_to(&mut self, id: ChannelId, target_level: f32, duration: f32, looping: bool) {
        let target_level = target_level.max(0.0);
        let duration = duration.max(0.0);
        let Some((strip, sink)) = Self::strip_and_sink(
            &mut self.strips,
            &mut self.bindings,
            &mut self.warned_missing,
            id,
        ) else {
            return;
        };

        if strip.looping != looping {
            strip.looping = looping;
            sink.set_looping(looping);
        }

        if target_level > 0.0 && !sink.is_playing() {
            if sink.has_position() {
                sink.resume();
            } else {
                sink.play();
            }
        }

        let task = FadeTask {
            start_level: strip.current_level,
            target_level,
            duration,
            elapsed: 0.0,
        };
        if duration <= 0.0 {
            strip.fade = None;
            Self::complete_fade(id, strip, sink, target_level);
        } else {
            strip.fade = Some(task);
        }
    }

    /// Plays a single accent playthrough. The computed volume is floored so
    /// accent events stay audible regardless of the phase mix; any in-flight
    /// fade on the channel is cancelled first (newest request wins).
    pub fn one_shot(&mut self, id: ChannelId, volume: f32) {
        let floor = self.one_shot_floor;
        let Some((strip, sink)) = Self::strip_and_sink(
            &mut self.strips,
            &mut self.bindings,
            &mut self.warned_missing,
            id,
        ) else {
            return;
        };
        strip.fade = None;
        strip.looping = false;
        sink.set_looping(false);
        let level = volume.max(floor);
        strip.current_level = level;
        sink.set_volume(level);
        sink.play_one_shot(level);
    }

    /// Snaps a channel to a level with no fade, starting or pausing playback
    /// as needed. Used by the immediate (startup/rebind) apply path.
    pub fn set_level_immediate(&mut self, id: ChannelId, level: f32, looping: bool) {
        let Some((strip, sink)) = Self::strip_and_sink(
            &mut self.strips,
            &mut self.bindings,
            &mut self.warned_missing,
            id,
        ) else {
            return;
        };
        strip.fade = None;
        if strip.looping != looping {
            strip.looping = looping;
            sink.set_looping(looping);
        }
        strip.current_level = level.max(0.0);
        sink.set_volume(strip.current_level);
        if strip.current_level > SILENCE_EPSILON {
            if !sink.is_playing() {
                if sink.has_position() {
                    sink.resume();
                } else {
                    sink.play();
                }
            }
        } else if id.is_accent() {
            sink.stop();
        } else if sink.is_playing() {
            sink.pause();
        }
    }

    /// Silences a channel and pauses it, keeping its playback position.
    pub fn mute_pause(&mut self, id: ChannelId) {
        let Some((strip, sink)) = Self::strip_and_sink(
            &mut self.strips,
            &mut self.bindings,
            &mut self.warned_missing,
            id,
        ) else {
            return;
        };
        strip.fade = None;
        strip.current_level = 0.0;
        sink.set_volume(0.0);
        if sink.is_playing() {
            sink.pause();
        }
    }

    /// Cancels every in-flight fade without touching levels. Teardown path.
    pub fn stop_all_fades(&mut self) {
        for strip in self.strips.values_mut() {
            strip.fade = None;
        }
    }

    /// Advances all fades by `dt` seconds and applies levels to the sinks.
    pub fn advance(&mut self, dt: f32) {
        let mut finished: SmallVec<[ChannelId; 4]> = SmallVec::new();
        for (&id, strip) in self.strips.iter_mut() {
            let Some(fade) = strip.fade.as_mut() else {
                continue;
            };
            fade.elapsed += dt;
            let k = fade_fraction(fade.elapsed, fade.duration);
            strip.current_level = fade.start_level + (fade.target_level - fade.start_level) * k;
            if fade.elapsed >= fade.duration {
                finished.push(id);
            } else if let Some(sink) = self.bindings.get_mut(id) {
                sink.set_volume(strip.current_level);
            }
        }
        for id in finished {
            if let Some(strip) = self.strips.get_mut(&id) {
                let target = strip.fade.take().map_or(strip.current_level, |f| f.target_level);
                if let Some(sink) = self.bindings.get_mut(id) {
                    Self::complete_fade(id, strip, sink, target);
                }
            }
        }
    }

    /// Terminal fade action: land exactly on the target and apply the
    /// silence end-state rule (ambient pauses, accent stops).
    fn complete_fade(
        id: ChannelId,
        strip: &mut ChannelStrip,
        sink: &mut Box<dyn AudioSink>,
        target: f32,
    ) {
        strip.current_level = target;
        sink.set_volume(target);
        if target <= SILENCE_EPSILON {
            if id.is_accent() {
                sink.stop();
            } else if sink.is_playing() {
                sink.pause();
            }
        }
    }

    fn strip_and_sink<'a>(
        strips: &'a mut FnvHashMap<ChannelId, ChannelStrip>,
        bindings: &'a mut AudioBindings,
        warned: &mut FnvHashSet<ChannelId>,
        id: ChannelId,
    ) -> Option<(&'a mut ChannelStrip, &'a mut Box<dyn AudioSink>)> {
        match (strips.get_mut(&id), bindings.get_mut(id)) {
            (Some(strip), Some(sink)) => Some((strip, sink)),
            _ => {
                if warned.insert(id) {
                    log::warn!("[audio] channel {} has no binding; skipping", id.name());
                }
                None
            }
        }
    }
}
