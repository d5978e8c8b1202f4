//! WebAssembly bindings via wasm-bindgen for the AudioWorklet deployment.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! The crate ships no spectral math of its own, so the embedding crate
//! (the one that links a concrete [`Converter`]) constructs the processor
//! in Rust with [`WorkletProcessor::with_factory`] and re-exports these
//! bindings. The JS worklet glue then drives it:
//!
//! ```javascript
//! // In the AudioWorkletProcessor:
//! this.port.onmessage = (event) => processor.handle_message(event.data.type)
//!
//! process(inputList, outputList, parameters) {
//!   return processor.process(
//!     inputList[0][0] ?? new Float32Array(0),
//!     outputList[0][0],
//!     parameters.frequencyQuantizationStrength[0],
//!     parameters.hopSizeMultiplier[0],
//!     parameters.nWaves[0],
//!     parameters.gainDb[0],
//!     parameters.depthOctaves[0],
//!   )
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::bridge::{ControlHandle, EngineHandle, create_bridge};
use crate::converter::Converter;
use crate::error::EngineError;
use crate::event::HopEvent;
use crate::params::{AutomationSnapshot, SYNTHESIS_PARAMS};

/// Builds the spectral capability on demand. Runs on the control side of
/// the bridge, never on the audio thread.
pub type ConverterFactory = Box<dyn Fn() -> Box<dyn Converter + Send>>;

/// Initialize the wasm module. Call this once before using any other
/// functions. Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn sws_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

/// Parameter declarations for `AudioWorkletProcessor.parameterDescriptors`,
/// as a JSON array of `{ name, defaultValue, minValue, maxValue }`.
#[wasm_bindgen]
pub fn synthesis_parameter_descriptors() -> String {
    let mut out = String::from("[");
    for (i, p) in SYNTHESIS_PARAMS.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"name":"{}","defaultValue":{},"minValue":{},"maxValue":{}}}"#,
            p.name, p.default, p.min, p.max
        ));
    }
    out.push(']');
    out
}

/// Worklet-side streaming processor.
///
/// Owns both halves of the control/audio bridge: inside a worklet the
/// "control context" is the message port, which the JS glue forwards to
/// [`WorkletProcessor::handle_message`].
#[wasm_bindgen]
pub struct WorkletProcessor {
    control: ControlHandle,
    engine: EngineHandle,
    factory: ConverterFactory,
}

// Rust-side construction API for the embedding crate.
impl WorkletProcessor {
    /// Create a processor for the given quantum size.
    ///
    /// `factory` builds the spectral capability when the "initialize"
    /// message arrives.
    pub fn with_factory(quantum: usize, factory: ConverterFactory) -> Self {
        let (control, engine) = create_bridge(quantum);
        Self {
            control,
            engine,
            factory,
        }
    }
}

#[wasm_bindgen]
impl WorkletProcessor {
    /// Handle one message from the node side of the port.
    ///
    /// `"initialize"` builds and installs the converter; any other tag is
    /// a wire-protocol violation.
    pub fn handle_message(&mut self, tag: &str) -> Result<(), JsError> {
        match tag {
            "initialize" => {
                let converter = (self.factory)();
                self.control.initialize(converter);
                Ok(())
            }
            other => {
                let err = EngineError::UnknownMessage { tag: other.into() };
                log::error!("{}", err);
                Err(JsError::new(&err.to_string()))
            }
        }
    }

    /// Process one render quantum.
    ///
    /// `input` is the single input channel, or an empty slice when the
    /// host currently delivers no signal; `output` is the single output
    /// channel, zero-initialized by the host. The five parameter values
    /// are the worklet automation values at the first sample.
    ///
    /// The returned bool is the worklet's keep-alive signal; a fatal
    /// engine error is logged and stops the processor.
    #[allow(clippy::too_many_arguments)]
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        quantization_strength: f32,
        hop_size_multiplier: f32,
        n_waves: f32,
        gain_db: f32,
        depth_octaves: f32,
    ) -> bool {
        let snapshot = AutomationSnapshot {
            quantization_strength,
            hop_size_multiplier,
            n_waves,
            gain_db,
            depth_octaves,
        };

        let inputs: &[&[f32]] = if input.is_empty() { &[] } else { &[input] };
        match self.engine.process(inputs, &mut [output], &snapshot) {
            Ok(()) => true,
            Err(e) => {
                log::error!("engine error: {}", e);
                false
            }
        }
    }

    /// Drain one pending hop event, packed as
    /// `[frequencies..., magnitudes...]` for the message port.
    ///
    /// Returns `None` when no hop has completed since the last call. The
    /// JS glue typically forwards each event as a
    /// `{ type: "hop", data: ... }` message.
    pub fn poll_hop(&mut self) -> Option<Vec<f32>> {
        self.control.try_recv_hop().map(|event| pack_hop(&event))
    }

    /// Whether the converter has been installed yet.
    pub fn is_initialized(&self) -> bool {
        self.engine.engine().is_initialized()
    }
}

fn pack_hop(event: &HopEvent) -> Vec<f32> {
    let mut packed = Vec::with_capacity(event.frequencies.len() + event.magnitudes.len());
    packed.extend_from_slice(&event.frequencies);
    packed.extend_from_slice(&event.magnitudes);
    packed
}
