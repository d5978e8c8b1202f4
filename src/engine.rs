// src/engine.rs

use std::sync::mpsc::Sender;

use log::{debug, info};

use crate::continuity::ContinuityState;
use crate::converter::Converter;
use crate::error::{EngineError, EngineResult};
use crate::event::HopEvent;
use crate::frame_buffer::FrameBuffer;
use crate::params::{AutomationSnapshot, MAX_HOP_MULTIPLIER, MAX_WAVES};

/// Quantum size of the reference deployment.
///
/// The Web Audio spec currently fixes render quanta at 128 frames but
/// reserves the right to change; the engine therefore takes the quantum
/// size as a constructor argument and fails loudly if the host ever
/// deviates from it.
pub const DEFAULT_QUANTUM: usize = 128;

/// Real-time sine-wave-speech streaming engine.
///
/// This struct runs exclusively on the audio thread. It must be
/// deterministic and lock-free, and after construction it allocates only
/// for outbound hop events. It owns all buffered audio and all per-wave
/// continuity state; nothing else may touch them.
///
/// One quantum of mono audio goes in per callback and one comes out. Once
/// enough quanta have accumulated to fill a hop, the hop is analyzed,
/// post-processed, resynthesized, and queued for playback over the
/// following callbacks.
pub struct Engine {
    /// Declared quantum size.
    quantum: usize,

    /// Spectral capability; `None` until initialization completes, and
    /// the engine passes audio straight through until then.
    converter: Option<Box<dyn Converter + Send>>,

    /// Effective hop size in samples, a quantum multiple.
    hop_size: usize,

    /// Live wave count.
    n_waves: usize,

    /// Input samples waiting for a full hop.
    pending: FrameBuffer,

    /// Synthesized samples waiting to be played.
    playback: FrameBuffer,

    /// Previous hop's frequencies/magnitudes/phases.
    continuity: ContinuityState,

    /// Outbound per-hop events, fire-and-forget.
    events: Sender<HopEvent>,

    // Scratch storage, sized to the maxima at construction so hop cycles
    // never allocate.
    cur_frequencies: Vec<f32>,
    cur_magnitudes: Vec<f32>,
    combined_frequencies: Vec<f32>,
    combined_magnitudes: Vec<f32>,
    end_phases: Vec<f32>,
    hop_audio: Vec<f32>,
}

impl Engine {
    /// Create an engine for the given quantum size.
    ///
    /// The initial hop size and wave count come from the parameter
    /// declaration defaults; automation overrides them per callback.
    pub fn new(quantum: usize, events: Sender<HopEvent>) -> Self {
        let defaults = AutomationSnapshot::default();
        let max_hop = quantum * MAX_HOP_MULTIPLIER;
        let n_waves = defaults.wave_count();

        Self {
            quantum,
            converter: None,
            hop_size: defaults.hop_size(quantum),
            n_waves,
            pending: FrameBuffer::with_capacity(max_hop),
            playback: FrameBuffer::with_capacity(max_hop),
            continuity: ContinuityState::new(MAX_WAVES, n_waves),
            events,
            cur_frequencies: vec![0.0; MAX_WAVES],
            cur_magnitudes: vec![0.0; MAX_WAVES],
            combined_frequencies: vec![0.0; 2 * MAX_WAVES],
            combined_magnitudes: vec![0.0; 2 * MAX_WAVES],
            end_phases: vec![0.0; MAX_WAVES],
            hop_audio: vec![0.0; max_hop],
        }
    }

    /// Install the spectral capability delivered by the control context.
    ///
    /// Ends passthrough mode from the next callback on.
    pub fn install_converter(&mut self, mut converter: Box<dyn Converter + Send>) {
        converter.set_shape(self.n_waves, self.hop_size);
        self.converter = Some(converter);
        info!(
            "converter installed: {} waves, hop size {}",
            self.n_waves, self.hop_size
        );
    }

    /// Process one callback.
    ///
    /// `input_channels` and `output_channels` are the channels of the
    /// single mono input and output port. The host is expected to hand
    /// over a zero-initialized output; before the first hop completes the
    /// engine only writes the samples it has.
    ///
    /// An `Ok` return is the continuation signal to the host. Every `Err`
    /// is a fatal contract violation (see [`EngineError`]); the engine
    /// makes no attempt at partial recovery mid-callback.
    pub fn process(
        &mut self,
        input_channels: &[&[f32]],
        output_channels: &mut [&mut [f32]],
        snapshot: &AutomationSnapshot,
    ) -> EngineResult<()> {
        if output_channels.len() != 1 {
            return Err(EngineError::OutputChannels {
                got: output_channels.len(),
            });
        }
        if input_channels.is_empty() {
            // The host temporarily has no signal (e.g. a source file
            // ended). Leave the output untouched and change no state.
            return Ok(());
        }
        if input_channels.len() != 1 {
            return Err(EngineError::InputChannels {
                got: input_channels.len(),
            });
        }

        let input = input_channels[0];
        let output: &mut [f32] = &mut *output_channels[0];
        if input.len() != self.quantum {
            return Err(EngineError::QuantumSize {
                expected: self.quantum,
                got: input.len(),
            });
        }
        if output.len() != self.quantum {
            return Err(EngineError::QuantumSize {
                expected: self.quantum,
                got: output.len(),
            });
        }

        if self.converter.is_none() {
            // Still waiting for initialization; pass the audio through.
            output.copy_from_slice(input);
            return Ok(());
        }

        let snapshot = snapshot.sanitized();
        self.apply_shape(&snapshot);

        if !self.pending.push_slice(input) {
            return Err(EngineError::BufferOverflow {
                needed: self.pending.len() + input.len(),
                capacity: self.pending.capacity(),
            });
        }
        if self.pending.len() > self.hop_size {
            return Err(EngineError::HopNotQuantumAligned {
                pending: self.pending.len(),
                hop_size: self.hop_size,
            });
        }
        if self.pending.len() == self.hop_size {
            self.run_hop(&snapshot)?;
            self.pending.clear();
        }

        // Before the first hop completes this drains short; the untouched
        // tail of the output stays at the host's zero fill.
        self.playback.pop_slice(output);

        Ok(())
    }

    /// Adopt the snapshot's hop size and wave count.
    ///
    /// Any change invalidates all buffered audio and continuity state:
    /// samples framed for one shape must never be mixed with another.
    fn apply_shape(&mut self, snapshot: &AutomationSnapshot) {
        let hop_size = snapshot.hop_size(self.quantum);
        let n_waves = snapshot.wave_count();
        if hop_size == self.hop_size && n_waves == self.n_waves {
            return;
        }

        debug!(
            "shape change: hop {} -> {}, waves {} -> {}; dropping {} pending and {} queued samples",
            self.hop_size,
            hop_size,
            self.n_waves,
            n_waves,
            self.pending.len(),
            self.playback.len()
        );

        self.hop_size = hop_size;
        self.n_waves = n_waves;
        self.pending.clear();
        self.playback.clear();
        self.continuity.reset(n_waves);
        if let Some(converter) = self.converter.as_mut() {
            converter.set_shape(n_waves, hop_size);
        }
    }

    /// One hop-processing cycle: analyze the pending buffer, post-process,
    /// synthesize against the previous hop's state, and queue the result.
    fn run_hop(&mut self, snapshot: &AutomationSnapshot) -> EngineResult<()> {
        let n = self.n_waves;
        let h = self.hop_size;
        let Some(converter) = self.converter.as_mut() else {
            return Ok(());
        };

        let frequencies = &mut self.cur_frequencies[..n];
        let magnitudes = &mut self.cur_magnitudes[..n];
        converter.analyze(self.pending.as_slice(), frequencies, magnitudes);

        converter.quantize(frequencies, snapshot.quantization_strength);
        converter.add_depth(frequencies, snapshot.depth_octaves);

        let gain = snapshot.linear_gain();
        for m in magnitudes.iter_mut() {
            *m *= gain;
        }

        // Previous hop's state first, this hop's second: the synthesizer
        // sweeps from the first half to the second across the hop.
        self.combined_frequencies[..n].copy_from_slice(self.continuity.frequencies());
        self.combined_frequencies[n..2 * n].copy_from_slice(frequencies);
        self.combined_magnitudes[..n].copy_from_slice(self.continuity.magnitudes());
        self.combined_magnitudes[n..2 * n].copy_from_slice(magnitudes);

        converter.synthesize(
            &self.combined_frequencies[..2 * n],
            &self.combined_magnitudes[..2 * n],
            self.continuity.phases(),
            &mut self.hop_audio[..h],
            &mut self.end_phases[..n],
        );

        if !self.playback.is_empty() {
            return Err(EngineError::PlaybackNotDrained {
                remaining: self.playback.len(),
            });
        }
        if !self.playback.push_slice(&self.hop_audio[..h]) {
            return Err(EngineError::BufferOverflow {
                needed: h,
                capacity: self.playback.capacity(),
            });
        }

        self.continuity.commit(
            &self.cur_frequencies[..n],
            &self.cur_magnitudes[..n],
            &self.end_phases[..n],
        );

        let _ = self.events.send(HopEvent {
            frequencies: self.cur_frequencies[..n].to_vec(),
            magnitudes: self.cur_magnitudes[..n].to_vec(),
        });

        Ok(())
    }

    /// Declared quantum size.
    #[inline]
    pub fn quantum(&self) -> usize {
        self.quantum
    }

    /// Current effective hop size in samples.
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Current wave count.
    #[inline]
    pub fn wave_count(&self) -> usize {
        self.n_waves
    }

    /// Whether the spectral capability has been installed.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.converter.is_some()
    }

    /// Samples waiting for a full hop.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Synthesized samples waiting to be played.
    #[inline]
    pub fn playback_len(&self) -> usize {
        self.playback.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn engine() -> Engine {
        let (tx, _rx) = mpsc::channel();
        Engine::new(DEFAULT_QUANTUM, tx)
    }

    fn quantum_of(value: f32) -> Vec<f32> {
        vec![value; DEFAULT_QUANTUM]
    }

    #[test]
    fn passthrough_before_initialization() {
        let mut engine = engine();
        let input = quantum_of(0.5);
        let mut output = quantum_of(0.0);

        engine
            .process(&[&input], &mut [&mut output[..]], &AutomationSnapshot::default())
            .unwrap();

        assert_eq!(output, input);
        assert_eq!(engine.pending_len(), 0);
    }

    #[test]
    fn zero_input_channels_is_a_no_op() {
        let mut engine = engine();
        let mut output = quantum_of(0.0);

        engine
            .process(&[], &mut [&mut output[..]], &AutomationSnapshot::default())
            .unwrap();

        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(engine.pending_len(), 0);
    }

    #[test]
    fn rejects_multi_channel_input() {
        let mut engine = engine();
        let a = quantum_of(0.0);
        let b = quantum_of(0.0);
        let mut output = quantum_of(0.0);

        let err = engine
            .process(
                &[&a, &b],
                &mut [&mut output[..]],
                &AutomationSnapshot::default(),
            )
            .unwrap_err();
        assert_eq!(err, EngineError::InputChannels { got: 2 });
    }

    #[test]
    fn rejects_wrong_quantum_length() {
        let mut engine = engine();
        let short = vec![0.0; DEFAULT_QUANTUM - 1];
        let mut output = quantum_of(0.0);

        let err = engine
            .process(
                &[&short],
                &mut [&mut output[..]],
                &AutomationSnapshot::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::QuantumSize {
                expected: DEFAULT_QUANTUM,
                got: DEFAULT_QUANTUM - 1
            }
        );
    }

    #[test]
    fn rejects_missing_output_channel() {
        let mut engine = engine();
        let input = quantum_of(0.0);

        let err = engine
            .process(&[&input], &mut [], &AutomationSnapshot::default())
            .unwrap_err();
        assert_eq!(err, EngineError::OutputChannels { got: 0 });
    }
}
