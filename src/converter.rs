// src/converter.rs
//
// The seam between the streaming engine and the spectral engine.

/// Analysis/resynthesis capability driven by the engine once per hop.
///
/// Implementations hold the actual spectral machinery (LPC analysis,
/// frequency grids, additive synthesis). The engine only guarantees the
/// calling protocol:
///
/// - every method is called synchronously on the audio thread and must
///   stay within the real-time budget for hop sizes up to a few thousand
///   samples;
/// - `analyze` and `synthesize` must be deterministic — identical inputs
///   produce identical outputs, with no hidden state beyond the phase
///   values threaded through explicitly;
/// - output slices are sized by the caller: `n_waves` for per-wave data,
///   `hop_size` for audio.
pub trait Converter {
    /// Adopt a new wave count and hop size.
    ///
    /// Called once when the converter is installed and again whenever
    /// automation changes either value. All following calls use the new
    /// shape.
    fn set_shape(&mut self, n_waves: usize, hop_size: usize);

    /// Analyze one hop of audio into `n_waves` sine components.
    ///
    /// `hop` holds exactly the current hop size in samples; `frequencies`
    /// (radians per sample) and `magnitudes` hold `n_waves` slots each.
    fn analyze(&mut self, hop: &[f32], frequencies: &mut [f32], magnitudes: &mut [f32]);

    /// Snap frequencies toward the capability's musical grid.
    ///
    /// `strength` 0 must leave the input untouched; increasing values pull
    /// harder toward the grid. The grid itself (chromatic, pentatonic, …)
    /// is the capability's policy.
    fn quantize(&self, frequencies: &mut [f32], strength: f32);

    /// Spread frequencies downward by up to `octaves`.
    ///
    /// Lowers the first (strongest) components more than the last ones;
    /// 0 octaves is the identity.
    fn add_depth(&self, frequencies: &mut [f32], octaves: f32);

    /// Synthesize one hop of audio.
    ///
    /// `frequencies` and `magnitudes` hold `2 * n_waves` values: the
    /// previous hop's state followed by the current hop's, so the
    /// synthesizer can sweep smoothly from one to the other across the
    /// hop. Phase accumulation starts from `start_phases` (`n_waves`
    /// values) and the final oscillator phases are written to
    /// `end_phases` for the next hop to continue from.
    ///
    /// `audio` holds exactly the current hop size in samples.
    fn synthesize(
        &mut self,
        frequencies: &[f32],
        magnitudes: &[f32],
        start_phases: &[f32],
        audio: &mut [f32],
        end_phases: &mut [f32],
    );
}
