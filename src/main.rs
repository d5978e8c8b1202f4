// src/main.rs

use sws::{AutomationSnapshot, Converter, DEFAULT_QUANTUM, create_bridge};

/// ===============================
/// Demo converter
/// ===============================

/// A stand-in spectral capability for the sanity run: fixed per-wave
/// frequencies, input level as magnitude, one phase-continuous oscillator
/// per wave. The real analysis/synthesis engine lives behind the same
/// trait in the deployed build.
struct DemoConverter {
    n_waves: usize,
    hop_size: usize,
}

impl Converter for DemoConverter {
    fn set_shape(&mut self, n_waves: usize, hop_size: usize) {
        self.n_waves = n_waves;
        self.hop_size = hop_size;
    }

    fn analyze(&mut self, hop: &[f32], frequencies: &mut [f32], magnitudes: &mut [f32]) {
        let level = (hop.iter().map(|s| s * s).sum::<f32>() / hop.len() as f32).sqrt();
        for (i, f) in frequencies.iter_mut().enumerate() {
            *f = 0.01 * (i + 1) as f32;
        }
        magnitudes.fill(level / self.n_waves as f32);
    }

    fn quantize(&self, frequencies: &mut [f32], strength: f32) {
        if strength <= 0.0 {
            return;
        }
        for f in frequencies.iter_mut() {
            *f = (*f / 0.01).round() * 0.01;
        }
    }

    fn add_depth(&self, frequencies: &mut [f32], octaves: f32) {
        let n = frequencies.len() as f32;
        for (i, f) in frequencies.iter_mut().enumerate() {
            *f *= 2.0f32.powf(-octaves * (n - i as f32) / n);
        }
    }

    fn synthesize(
        &mut self,
        frequencies: &[f32],
        magnitudes: &[f32],
        start_phases: &[f32],
        audio: &mut [f32],
        end_phases: &mut [f32],
    ) {
        let n = self.n_waves;
        end_phases.copy_from_slice(start_phases);

        audio.fill(0.0);
        for (t, sample) in audio.iter_mut().enumerate() {
            let frac = t as f32 / self.hop_size as f32;
            for i in 0..n {
                let f = frequencies[i] + (frequencies[n + i] - frequencies[i]) * frac;
                let m = magnitudes[i] + (magnitudes[n + i] - magnitudes[i]) * frac;
                end_phases[i] += f;
                *sample += m * end_phases[i].sin();
            }
        }
    }
}

/// ===============================
/// Main
/// ===============================

fn main() {
    let quantum = DEFAULT_QUANTUM;
    let blocks = 64;
    let snapshot = AutomationSnapshot::default();

    let (control, mut engine) = create_bridge(quantum);

    // A vowel-ish test signal: two sines at fixed normalized frequencies.
    let signal: Vec<f32> = (0..blocks * quantum)
        .map(|t| {
            let t = t as f32;
            0.5 * (0.04 * t).sin() + 0.25 * (0.11 * t).sin()
        })
        .collect();

    println!("Starting engine sanity run…");

    // First two blocks run before initialization: pure passthrough.
    let mut output = vec![0.0f32; quantum];
    for block in 0..2 {
        let input = &signal[block * quantum..(block + 1) * quantum];
        output.fill(0.0);
        engine
            .process(&[input], &mut [&mut output[..]], &snapshot)
            .expect("passthrough block failed");
    }
    println!("Passthrough OK (engine not yet initialized)");

    // --------------------------------
    // Initialization handshake
    // --------------------------------

    control.initialize(Box::new(DemoConverter {
        n_waves: 4,
        hop_size: quantum * 2,
    }));

    // --------------------------------
    // Streaming
    // --------------------------------

    let mut hops = 0;
    for block in 2..blocks {
        let input = &signal[block * quantum..(block + 1) * quantum];
        output.fill(0.0);
        engine
            .process(&[input], &mut [&mut output[..]], &snapshot)
            .expect("streaming block failed");

        for hop in control.poll_hops() {
            hops += 1;
            if hops % 8 == 0 {
                println!(
                    "hop {:3}: f[0] = {:.4} rad/sample, m[0] = {:.4}",
                    hops, hop.frequencies[0], hop.magnitudes[0]
                );
            }
        }
    }

    println!(
        "Processed {} blocks, {} hops, {} samples still queued.",
        blocks,
        hops,
        engine.engine().playback_len()
    );
    println!("Sanity run completed.");
}
