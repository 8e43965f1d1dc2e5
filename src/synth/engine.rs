// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The voice manager.
//!
//! Owns the control half of every sounding voice and enforces the lifecycle
//! rules: one voice per note identity, re-trigger instead of stacking, and
//! monophonic cut for samples. The generation halves live in the mixer and
//! are dropped there when they finish.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::envelope::EnvelopeParams;
use super::oscillator::Waveform;
use super::voice::{start_voice, VoiceHandle, VoicePhase};
use crate::audio::mixer::AudioMixer;
use crate::grid::Pad;
use crate::playsync::CancelHandle;
use crate::samples::LoadedSample;

/// Everything needed to sound a note besides its identity.
#[derive(Debug, Clone)]
pub struct NotePatch {
    pub frequency: f64,
    pub waveform: Waveform,
    pub envelope: EnvelopeParams,
    pub amplitude: f32,
}

/// A playing sample, tracked so a later trigger of the same identity can cut
/// it off.
struct SampleHandle {
    cancel_handle: CancelHandle,
    finished: Arc<AtomicBool>,
}

impl SampleHandle {
    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// Manages all sounding voices and samples.
pub struct SynthEngine {
    mixer: Arc<AudioMixer>,
    /// Live voices keyed by note identity. At most one entry per note.
    voices: Mutex<HashMap<String, VoiceHandle>>,
    /// Playing samples keyed by sample identity. At most one entry per
    /// sample.
    samples: Mutex<HashMap<String, SampleHandle>>,
}

impl SynthEngine {
    pub fn new(mixer: Arc<AudioMixer>) -> SynthEngine {
        SynthEngine {
            mixer,
            voices: Mutex::new(HashMap::new()),
            samples: Mutex::new(HashMap::new()),
        }
    }

    /// Sounds a note. If a voice for this note is still live (including one
    /// that is releasing), it is re-triggered rather than stacked.
    pub fn press_note(&self, note: &str, pads: Vec<Pad>, patch: &NotePatch) {
        let mut voices = self.voices.lock();
        voices.retain(|_, handle| !handle.is_finished());

        if let Some(handle) = voices.get_mut(note) {
            debug!(note, "Re-triggering live voice");
            handle.retrigger();
            return;
        }

        debug!(note, frequency = patch.frequency, "Starting voice");
        let (handle, source) = start_voice(
            note,
            pads,
            patch.waveform,
            patch.frequency,
            patch.envelope,
            patch.amplitude,
            self.mixer.sample_rate(),
        );
        self.mixer.add_source(
            Box::new(source),
            Arc::new(AtomicBool::new(false)),
            CancelHandle::new(),
        );
        voices.insert(note.to_string(), handle);
    }

    /// Begins the release ramp for a note. A release with no live voice is a
    /// no-op; pad chatter and duplicate release events are expected.
    pub fn release_note(&self, note: &str) {
        let mut voices = self.voices.lock();
        match voices.get_mut(note) {
            Some(handle) => handle.release(),
            None => debug!(note, "Release for a note with no live voice"),
        }
    }

    /// Plays a sample. Samples are monophonic per identity: a previous
    /// playback of the same sample is cut immediately.
    pub fn trigger_sample(&self, name: &str, sample: &LoadedSample, volume: f32) {
        let mut samples = self.samples.lock();
        samples.retain(|_, playback| !playback.is_finished());

        if let Some(previous) = samples.remove(name) {
            debug!(sample = name, "Cutting previous sample playback");
            previous.cancel_handle.cancel();
        }

        let finished = Arc::new(AtomicBool::new(false));
        let cancel_handle = CancelHandle::new();
        self.mixer.add_source(
            Box::new(sample.create_playback(volume)),
            finished.clone(),
            cancel_handle.clone(),
        );
        samples.insert(
            name.to_string(),
            SampleHandle {
                cancel_handle,
                finished,
            },
        );
    }

    /// The phase of the voice for a note, if one is live.
    pub fn note_phase(&self, note: &str) -> Option<VoicePhase> {
        let voices = self.voices.lock();
        voices
            .get(note)
            .map(|handle| handle.phase())
            .filter(|phase| *phase != VoicePhase::Finished)
    }

    /// The identities of all live voices.
    pub fn active_notes(&self) -> Vec<String> {
        let voices = self.voices.lock();
        voices
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(note, _)| note.clone())
            .collect()
    }

    /// The number of live voices.
    pub fn active_voice_count(&self) -> usize {
        self.active_notes().len()
    }

    /// Stops everything immediately, skipping release envelopes. Used when
    /// the output device is lost.
    pub fn force_silence(&self) {
        let mut voices = self.voices.lock();
        for handle in voices.values() {
            handle.force_stop();
        }
        voices.clear();

        let mut samples = self.samples.lock();
        for playback in samples.values() {
            playback.cancel_handle.cancel();
        }
        samples.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::samples::loader::LoadedSample;

    const SAMPLE_RATE: u32 = 1000;

    fn patch() -> NotePatch {
        NotePatch {
            frequency: 10.0,
            waveform: Waveform::Square,
            envelope: EnvelopeParams {
                attack: 0.01,
                decay: 0.01,
                sustain: 0.5,
                release: 0.02,
            },
            amplitude: 1.0,
        }
    }

    fn engine() -> (SynthEngine, Arc<AudioMixer>) {
        let mixer = Arc::new(AudioMixer::new(1, SAMPLE_RATE));
        (SynthEngine::new(mixer.clone()), mixer)
    }

    #[test]
    fn test_press_starts_voice() {
        let (engine, mixer) = engine();
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());

        assert_eq!(mixer.source_count(), 1);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Attacking));
        mixer.process_frames(30);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Held));
    }

    #[test]
    fn test_chord_voices_are_independent() {
        let (engine, mixer) = engine();
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        engine.press_note("E", vec![Pad::new(1, 0)], &patch());
        engine.press_note("G", vec![Pad::new(2, 0)], &patch());
        assert_eq!(mixer.source_count(), 3);
        assert_eq!(engine.active_voice_count(), 3);

        mixer.process_frames(30);
        engine.release_note("E");
        // Drain well past E's 20ms release.
        mixer.process_frames(100);

        let mut notes = engine.active_notes();
        notes.sort();
        assert_eq!(notes, vec!["C", "G"]);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Held));
        assert_eq!(engine.note_phase("E"), None);
        assert_eq!(mixer.source_count(), 2);
    }

    #[test]
    fn test_press_retriggers_instead_of_stacking() {
        let (engine, mixer) = engine();
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        mixer.process_frames(30);

        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        assert_eq!(mixer.source_count(), 1);
        mixer.process_frames(1);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Attacking));
    }

    #[test]
    fn test_press_during_release_retriggers() {
        let (engine, mixer) = engine();
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        mixer.process_frames(30);
        engine.release_note("C");
        mixer.process_frames(5);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Releasing));

        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        assert_eq!(mixer.source_count(), 1);
        mixer.process_frames(30);
        assert_eq!(engine.note_phase("C"), Some(VoicePhase::Held));
    }

    #[test]
    fn test_release_without_voice_is_noop() {
        let (engine, mixer) = engine();
        engine.release_note("C");
        engine.release_note("C");
        assert_eq!(mixer.source_count(), 0);
        assert_eq!(engine.active_voice_count(), 0);
    }

    #[test]
    fn test_finished_voice_reaped_on_next_press() {
        let (engine, mixer) = engine();
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        engine.release_note("C");
        mixer.process_frames(100);
        assert_eq!(mixer.source_count(), 0);

        // The next press of any note sweeps the dead entry.
        engine.press_note("D", vec![Pad::new(1, 0)], &patch());
        assert_eq!(engine.active_voice_count(), 1);
    }

    #[test]
    fn test_sample_is_monophonic() {
        let (engine, mixer) = engine();
        let sample = LoadedSample::from_data(vec![0.5; 1000], SAMPLE_RATE);

        engine.trigger_sample("kick", &sample, 1.0);
        mixer.process_frames(10);
        assert_eq!(mixer.source_count(), 1);

        // Re-triggering cuts the first playback; only one source survives the
        // next pass.
        engine.trigger_sample("kick", &sample, 1.0);
        mixer.process_frames(1);
        assert_eq!(mixer.source_count(), 1);
    }

    #[test]
    fn test_distinct_samples_overlap() {
        let (engine, mixer) = engine();
        let sample = LoadedSample::from_data(vec![0.5; 1000], SAMPLE_RATE);

        engine.trigger_sample("kick", &sample, 1.0);
        engine.trigger_sample("snare", &sample, 1.0);
        mixer.process_frames(1);
        assert_eq!(mixer.source_count(), 2);
    }

    #[test]
    fn test_force_silence() {
        let (engine, mixer) = engine();
        let sample = LoadedSample::from_data(vec![0.5; 1000], SAMPLE_RATE);
        engine.press_note("C", vec![Pad::new(0, 0)], &patch());
        engine.press_note("E", vec![Pad::new(1, 0)], &patch());
        engine.trigger_sample("kick", &sample, 1.0);
        mixer.process_frames(10);

        engine.force_silence();
        mixer.process_frames(1);
        assert_eq!(mixer.source_count(), 0);
        assert_eq!(engine.active_voice_count(), 0);
        assert_eq!(engine.note_phase("C"), None);
    }
}
