// src/params.rs
//
// Synthesis parameter declarations and the per-callback snapshot.

/// Largest wave count the engine supports.
pub const MAX_WAVES: usize = 16;

/// Largest hop size, as a multiple of the quantum size.
pub const MAX_HOP_MULTIPLIER: usize = 16;

/// Metadata describing one automatable parameter.
///
/// The host uses this to clamp values and to schedule automation curves;
/// the engine itself reads values from an [`AutomationSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    /// Stable name, exposed to the host's automation system.
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamInfo {
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    /// Clamp a value to the declared range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// How strongly analyzed frequencies are snapped to the musical grid.
/// 0 leaves them untouched.
pub const FREQUENCY_QUANTIZATION_STRENGTH: ParamInfo =
    ParamInfo::new("frequencyQuantizationStrength", 0.0, 3.0, 2.0);

/// Hop size as a multiple of the quantum size.
pub const HOP_SIZE_MULTIPLIER: ParamInfo = ParamInfo::new("hopSizeMultiplier", 1.0, 16.0, 2.0);

/// Number of sine waves extracted per hop.
pub const N_WAVES: ParamInfo = ParamInfo::new("nWaves", 1.0, 16.0, 4.0);

/// Output gain in decibels, applied to magnitudes before synthesis.
pub const GAIN_DB: ParamInfo = ParamInfo::new("gainDb", -18.0, 18.0, 0.0);

/// Pitch spread in octaves, applied to frequencies before synthesis.
pub const DEPTH_OCTAVES: ParamInfo = ParamInfo::new("depthOctaves", 0.0, 2.0, 0.0);

/// All parameters, in declaration order.
pub const SYNTHESIS_PARAMS: [ParamInfo; 5] = [
    FREQUENCY_QUANTIZATION_STRENGTH,
    HOP_SIZE_MULTIPLIER,
    N_WAVES,
    GAIN_DB,
    DEPTH_OCTAVES,
];

/// Control values read once per callback, at the first sample's time.
///
/// There is no intra-block interpolation: whatever the host's automation
/// curves hold when the callback starts applies to the whole quantum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationSnapshot {
    pub quantization_strength: f32,
    pub hop_size_multiplier: f32,
    pub n_waves: f32,
    pub gain_db: f32,
    pub depth_octaves: f32,
}

impl AutomationSnapshot {
    /// Clamp every field to its declared range.
    pub fn sanitized(self) -> Self {
        Self {
            quantization_strength: FREQUENCY_QUANTIZATION_STRENGTH.clamp(self.quantization_strength),
            hop_size_multiplier: HOP_SIZE_MULTIPLIER.clamp(self.hop_size_multiplier),
            n_waves: N_WAVES.clamp(self.n_waves),
            gain_db: GAIN_DB.clamp(self.gain_db),
            depth_octaves: DEPTH_OCTAVES.clamp(self.depth_octaves),
        }
    }

    /// Effective hop size for a given quantum size.
    ///
    /// The multiplier is integer-valued; automation curves may land
    /// between steps, so round to the nearest one.
    #[inline]
    pub fn hop_size(&self, quantum: usize) -> usize {
        quantum * (self.hop_size_multiplier.round() as usize)
    }

    /// Effective wave count.
    #[inline]
    pub fn wave_count(&self) -> usize {
        self.n_waves.round() as usize
    }

    /// Linear gain factor derived from the dB value.
    #[inline]
    pub fn linear_gain(&self) -> f32 {
        10.0f32.powf(self.gain_db / 20.0)
    }
}

impl Default for AutomationSnapshot {
    fn default() -> Self {
        Self {
            quantization_strength: FREQUENCY_QUANTIZATION_STRENGTH.default,
            hop_size_multiplier: HOP_SIZE_MULTIPLIER.default,
            n_waves: N_WAVES.default,
            gain_db: GAIN_DB.default,
            depth_octaves: DEPTH_OCTAVES.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_follow_declarations() {
        let snapshot = AutomationSnapshot::default();
        assert_eq!(snapshot.hop_size(128), 256);
        assert_eq!(snapshot.wave_count(), 4);
        assert_eq!(snapshot.gain_db, 0.0);
        assert_eq!(snapshot.quantization_strength, 2.0);
    }

    #[test]
    fn sanitize_clamps_to_declared_ranges() {
        let snapshot = AutomationSnapshot {
            quantization_strength: 5.0,
            hop_size_multiplier: 0.2,
            n_waves: 100.0,
            gain_db: -40.0,
            depth_octaves: -1.0,
        }
        .sanitized();

        assert_eq!(snapshot.quantization_strength, 3.0);
        assert_eq!(snapshot.hop_size_multiplier, 1.0);
        assert_eq!(snapshot.n_waves, 16.0);
        assert_eq!(snapshot.gain_db, -18.0);
        assert_eq!(snapshot.depth_octaves, 0.0);
    }

    #[test]
    fn linear_gain_doubles_every_six_db() {
        let snapshot = AutomationSnapshot {
            gain_db: 6.0206,
            ..AutomationSnapshot::default()
        };
        assert_relative_eq!(snapshot.linear_gain(), 2.0, epsilon = 1e-3);

        let unity = AutomationSnapshot::default();
        assert_relative_eq!(unity.linear_gain(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn param_table_matches_limits() {
        assert_eq!(N_WAVES.max as usize, MAX_WAVES);
        assert_eq!(HOP_SIZE_MULTIPLIER.max as usize, MAX_HOP_MULTIPLIER);
        assert_eq!(SYNTHESIS_PARAMS.len(), 5);
    }
}
