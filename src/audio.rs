//! Audio synthesis using the Web Audio API
//!
//! Procedurally generated sound effects - no external files needed. Every
//! effect is a short oscillator -> lowpass -> gain-envelope graph that stops
//! itself at a precomputed end time; expired voices are reaped once per
//! frame rather than via completion callbacks.
//!
//! Audio is strictly optional: if the context cannot be created or resumed
//! (no platform support, autoplay policy), every call degrades to a no-op
//! and `available()` reports false. Off wasm32 the synth is always silent.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Token picked up
    Pick,
    /// Attempt matched the target
    Correct,
    /// Attempt missed the target
    Wrong,
    /// UI interaction (menu / intro confirm)
    Click,
}

/// Synthesizer facade for the game
///
/// Owns the output graph, the live effect voices, and the long-lived ambient
/// pad. Never surfaces platform errors to callers.
pub struct AudioSynth {
    #[cfg(target_arch = "wasm32")]
    backend: Option<web::WebAudio>,
    master_volume: f32,
    muted: bool,
    ambient_on: bool,
}

impl Default for AudioSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSynth {
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        let backend = web::WebAudio::new();
        #[cfg(target_arch = "wasm32")]
        if backend.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            #[cfg(target_arch = "wasm32")]
            backend,
            master_volume: 0.8,
            muted: false,
            ambient_on: false,
        }
    }

    /// Whether the audio graph is actually producing sound
    pub fn available(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.backend.is_some()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }

    /// Opportunistic context resume; call on the first user input event
    /// (contexts commonly start suspended until a gesture)
    pub fn on_user_gesture(&mut self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(backend) = &self.backend {
            backend.resume();
            if self.ambient_on {
                backend.ramp_ambient(self.effective_volume());
            }
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        #[cfg(target_arch = "wasm32")]
        if let Some(backend) = &self.backend {
            if self.ambient_on && !muted {
                backend.ramp_ambient(self.effective_volume());
            } else {
                backend.ramp_ambient(0.0);
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play a feedback effect; no-op when audio is unavailable or muted
    pub fn play_effect(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        if let Some(backend) = &mut self.backend {
            backend.play(effect, vol);
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = effect;
    }

    /// Toggle the ambient pad. Only ever gain-ramped, never hard-stopped,
    /// so toggling cannot click.
    pub fn set_ambient(&mut self, enabled: bool) {
        self.ambient_on = enabled;
        #[cfg(target_arch = "wasm32")]
        {
            let level = if enabled { self.effective_volume() } else { 0.0 };
            if let Some(backend) = &mut self.backend {
                backend.ensure_ambient();
                backend.ramp_ambient(level);
            }
        }
    }

    pub fn ambient_enabled(&self) -> bool {
        self.ambient_on
    }

    /// Drop effect voices past their scheduled stop time. Call once per
    /// frame; ambient voices are never reaped.
    pub fn reap_expired(&mut self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(backend) = &mut self.backend {
            backend.reap_expired();
        }
    }

    /// Fast-fade every live feedback voice (restart boundary). The voices
    /// may finish their fade but can no longer be heard into the new session.
    pub fn cancel_feedback(&mut self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(backend) = &mut self.backend {
            backend.cancel_feedback();
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType, GainNode,
        OscillatorNode, OscillatorType,
    };

    use super::SoundEffect;

    /// One scheduled effect voice; reaped after `stop_at`
    struct Voice {
        gain: GainNode,
        stop_at: f64,
    }

    /// Session-lived ambient pad: detuned oscillator pair through a lowpass
    /// whose cutoff breathes under a slow LFO
    struct Ambient {
        gain: GainNode,
    }

    pub struct WebAudio {
        ctx: AudioContext,
        voices: Vec<Voice>,
        ambient: Option<Ambient>,
    }

    impl WebAudio {
        pub fn new() -> Option<Self> {
            let ctx = AudioContext::new().ok()?;
            Some(Self {
                ctx,
                voices: Vec::new(),
                ambient: None,
            })
        }

        /// Resume the context (required after user gesture)
        pub fn resume(&self) {
            if self.ctx.state() == AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
        }

        /// Build oscillator -> lowpass -> gain -> destination
        fn create_voice(
            &self,
            freq: f32,
            osc_type: OscillatorType,
            cutoff: f32,
            resonance: f32,
        ) -> Option<(OscillatorNode, BiquadFilterNode, GainNode)> {
            let osc = self.ctx.create_oscillator().ok()?;
            let filter = self.ctx.create_biquad_filter().ok()?;
            let gain = self.ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(cutoff);
            filter.q().set_value(resonance);

            osc.connect_with_audio_node(&filter).ok()?;
            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            Some((osc, filter, gain))
        }

        pub fn play(&mut self, effect: SoundEffect, vol: f32) {
            self.resume();
            match effect {
                SoundEffect::Pick => self.play_pick(vol),
                SoundEffect::Correct => self.play_correct(vol),
                SoundEffect::Wrong => self.play_wrong(vol),
                SoundEffect::Click => self.play_click(vol),
            }
        }

        /// Pick - bright rising blip
        fn play_pick(&mut self, vol: f32) {
            let Some((osc, _filter, gain)) =
                self.create_voice(660.0, OscillatorType::Sine, 2400.0, 0.8)
            else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(0.0001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.3, t + 0.01)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(660.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(880.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
            self.voices.push(Voice { gain, stop_at: t + 0.15 });
        }

        /// Correct - quick ascending chime
        fn play_correct(&mut self, vol: f32) {
            for (i, freq) in [523.0, 659.0, 784.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                let Some((osc, _filter, gain)) =
                    self.create_voice(*freq, OscillatorType::Triangle, 3200.0, 0.7)
                else {
                    continue;
                };
                let t = self.ctx.current_time() + delay;
                gain.gain().set_value_at_time(0.0001, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * 0.25, t + 0.015)
                    .ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
                self.voices.push(Voice { gain, stop_at: t + 0.35 });
            }
        }

        /// Wrong - dull descending buzz
        fn play_wrong(&mut self, vol: f32) {
            let Some((osc, filter, gain)) =
                self.create_voice(220.0, OscillatorType::Sawtooth, 900.0, 4.0)
            else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(90.0, t + 0.35)
                .ok();
            filter
                .frequency()
                .exponential_ramp_to_value_at_time(300.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.45).ok();
            self.voices.push(Voice { gain, stop_at: t + 0.45 });
        }

        /// Click - short dry tick
        fn play_click(&mut self, vol: f32) {
            let Some((osc, _filter, gain)) =
                self.create_voice(1200.0, OscillatorType::Square, 4000.0, 0.5)
            else {
                return;
            };
            let t = self.ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.05)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.07).ok();
            self.voices.push(Voice { gain, stop_at: t + 0.07 });
        }

        /// Build the ambient pad once; it lives for the whole session
        pub fn ensure_ambient(&mut self) {
            if self.ambient.is_some() {
                return;
            }
            let Some(ambient) = self.build_ambient() else {
                return;
            };
            self.ambient = Some(ambient);
        }

        fn build_ambient(&self) -> Option<Ambient> {
            let filter = self.ctx.create_biquad_filter().ok()?;
            filter.set_type(BiquadFilterType::Lowpass);
            filter.frequency().set_value(320.0);
            filter.q().set_value(1.5);

            let gain = self.ctx.create_gain().ok()?;
            gain.gain().set_value(0.0001);

            filter.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&self.ctx.destination()).ok()?;

            // Slightly detuned pair for a slow natural beat
            for freq in [110.0, 110.7] {
                let osc = self.ctx.create_oscillator().ok()?;
                osc.set_type(OscillatorType::Triangle);
                osc.frequency().set_value(freq);
                osc.connect_with_audio_node(&filter).ok()?;
                osc.start().ok()?;
            }

            // Slow LFO breathing the filter cutoff
            let lfo = self.ctx.create_oscillator().ok()?;
            let lfo_depth = self.ctx.create_gain().ok()?;
            lfo.set_type(OscillatorType::Sine);
            lfo.frequency().set_value(0.08);
            lfo_depth.gain().set_value(120.0);
            lfo.connect_with_audio_node(&lfo_depth).ok()?;
            lfo_depth.connect_with_audio_param(&filter.frequency()).ok()?;
            lfo.start().ok()?;

            Some(Ambient { gain })
        }

        /// Ramp the ambient gain toward `level` over ~1.5s (never a hard stop)
        pub fn ramp_ambient(&self, level: f32) {
            let Some(ambient) = &self.ambient else {
                return;
            };
            let t = self.ctx.current_time();
            let target = (level * 0.12).max(0.0001);
            ambient.gain.gain().cancel_scheduled_values(t).ok();
            ambient
                .gain
                .gain()
                .exponential_ramp_to_value_at_time(target, t + 1.5)
                .ok();
        }

        /// Drop voices whose scheduled stop time has passed
        pub fn reap_expired(&mut self) {
            let now = self.ctx.current_time();
            self.voices.retain(|voice| {
                if voice.stop_at > now {
                    return true;
                }
                let _ = voice.gain.disconnect();
                false
            });
        }

        /// Fast-fade all live feedback voices (restart boundary)
        pub fn cancel_feedback(&mut self) {
            let now = self.ctx.current_time();
            for voice in &mut self.voices {
                voice.gain.gain().cancel_scheduled_values(now).ok();
                voice
                    .gain
                    .gain()
                    .exponential_ramp_to_value_at_time(0.0001, now + 0.05)
                    .ok();
                voice.stop_at = voice.stop_at.min(now + 0.1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Off wasm32 the synth must be a safe no-op: no panics, no state changes
    // anywhere, available() == false. This is exactly the degraded mode the
    // game runs in when the platform has no audio.

    #[test]
    fn test_silent_backend_is_safe() {
        let mut audio = AudioSynth::new();
        assert!(!audio.available());

        for effect in [
            SoundEffect::Pick,
            SoundEffect::Correct,
            SoundEffect::Wrong,
            SoundEffect::Click,
        ] {
            audio.play_effect(effect);
        }
        audio.set_ambient(true);
        audio.set_ambient(false);
        audio.on_user_gesture();
        audio.reap_expired();
        audio.cancel_feedback();
        assert!(!audio.available());
    }

    #[test]
    fn test_mute_and_volume_bookkeeping() {
        let mut audio = AudioSynth::new();
        audio.set_master_volume(2.0);
        audio.set_muted(true);
        assert!(audio.is_muted());
        audio.play_effect(SoundEffect::Correct);
        audio.set_muted(false);
        assert!(!audio.is_muted());
    }

    #[test]
    fn test_ambient_flag_tracks_requests_even_when_silent() {
        let mut audio = AudioSynth::new();
        assert!(!audio.ambient_enabled());
        audio.set_ambient(true);
        assert!(audio.ambient_enabled());
        audio.set_ambient(false);
        assert!(!audio.ambient_enabled());
    }
}
