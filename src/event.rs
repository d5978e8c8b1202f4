// src/event.rs

use crate::converter::Converter;

/// ===============================
/// Control-side inbound messages
/// ===============================

/// A message sent from the control context to the engine.
///
/// These messages:
/// - are drained by the engine at the start of each callback, non-blocking
/// - carry everything by value; the audio thread never calls back out
pub enum EngineMessage {
    /// One-shot initialization handshake.
    ///
    /// The control context constructs the converter (including any module
    /// compilation) off the audio thread and ships the finished instance.
    /// Until this arrives the engine passes input straight through.
    Initialize {
        converter: Box<dyn Converter + Send>,
    },
}

impl std::fmt::Debug for EngineMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineMessage::Initialize { .. } => f.write_str("Initialize"),
        }
    }
}

/// ===============================
/// Engine-side outbound events
/// ===============================

/// One completed hop's analysis result, for visualization/telemetry.
///
/// Emitted fire-and-forget after each hop cycle; the engine never waits
/// for delivery. At most one event exists per hop.
#[derive(Debug, Clone, PartialEq)]
pub struct HopEvent {
    /// Post-processed frequencies, radians per sample, one per wave.
    pub frequencies: Vec<f32>,
    /// Post-processed magnitudes, one per wave.
    pub magnitudes: Vec<f32>,
}
