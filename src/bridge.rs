//! Thread-safe bridge between the control context and the audio engine.
//!
//! This module provides the communication layer that allows the control
//! thread (UI, worklet node, telemetry consumer) to safely interact with
//! the real-time streaming engine.
//!
//! # Architecture
//!
//! - **Control thread** owns [`ControlHandle`]
//! - **Audio thread** owns [`EngineHandle`] with the [`Engine`]
//! - Communication is message passing over MPSC channels in both
//!   directions; there is no shared memory and no lock
//!
//! # Usage
//!
//! ```ignore
//! let (control, mut engine) = create_bridge(128);
//!
//! // Control thread: one-shot initialization, then event polling
//! control.initialize(Box::new(converter));
//! let hops = control.poll_hops();
//!
//! // Audio thread: once per callback
//! engine.process(&[&input], &mut [&mut output], &snapshot)?;
//! ```

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::converter::Converter;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::event::{EngineMessage, HopEvent};
use crate::params::AutomationSnapshot;

/// Handle for the control thread to communicate with the engine.
///
/// All methods are safe to call from the main thread and never touch the
/// engine's buffers directly.
pub struct ControlHandle {
    /// Channel to send messages to the engine.
    message_tx: Sender<EngineMessage>,

    /// Channel to receive per-hop events.
    hop_rx: Receiver<HopEvent>,
}

/// Handle for the audio thread containing the engine and its channels.
pub struct EngineHandle {
    /// The streaming engine (owned by the audio thread).
    engine: Engine,

    /// Channel to receive messages from the control thread.
    message_rx: Receiver<EngineMessage>,
}

/// Create a linked pair of handles for control and engine communication.
///
/// The hop-event sender half is wired into the engine before it is handed
/// over, so events flow as soon as the first hop completes.
pub fn create_bridge(quantum: usize) -> (ControlHandle, EngineHandle) {
    let (message_tx, message_rx) = mpsc::channel();
    let (hop_tx, hop_rx) = mpsc::channel();

    let control = ControlHandle { message_tx, hop_rx };
    let engine = EngineHandle {
        engine: Engine::new(quantum, hop_tx),
        message_rx,
    };

    (control, engine)
}

// ═══════════════════════════════════════════════════════════════════
// ControlHandle - Control Thread API
// ═══════════════════════════════════════════════════════════════════

impl ControlHandle {
    /// Send the one-shot initialization message.
    ///
    /// The converter must be fully constructed (any module compilation
    /// done) before it is sent; the audio thread only installs it. Until
    /// the engine drains the message it keeps passing audio through.
    pub fn initialize(&self, converter: Box<dyn Converter + Send>) {
        let _ = self.message_tx.send(EngineMessage::Initialize { converter });
    }

    /// Drain all pending hop events without blocking.
    pub fn poll_hops(&self) -> Vec<HopEvent> {
        let mut events = Vec::new();
        loop {
            match self.hop_rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Receive at most one pending hop event without blocking.
    pub fn try_recv_hop(&self) -> Option<HopEvent> {
        self.hop_rx.try_recv().ok()
    }
}

// ═══════════════════════════════════════════════════════════════════
// EngineHandle - Audio Thread API
// ═══════════════════════════════════════════════════════════════════

impl EngineHandle {
    /// Process one callback.
    ///
    /// Drains inbound control messages first (non-blocking), then
    /// delegates to [`Engine::process`]. This is the only method the
    /// audio thread needs to call.
    pub fn process(
        &mut self,
        input_channels: &[&[f32]],
        output_channels: &mut [&mut [f32]],
        snapshot: &AutomationSnapshot,
    ) -> EngineResult<()> {
        self.drain_messages();
        self.engine.process(input_channels, output_channels, snapshot)
    }

    /// Apply all pending control messages without blocking.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                EngineMessage::Initialize { converter } => {
                    self.engine.install_converter(converter);
                }
            }
        }
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Get a mutable reference to the engine.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullConverter;

    impl Converter for NullConverter {
        fn set_shape(&mut self, _n_waves: usize, _hop_size: usize) {}
        fn analyze(&mut self, _hop: &[f32], frequencies: &mut [f32], magnitudes: &mut [f32]) {
            frequencies.fill(0.0);
            magnitudes.fill(0.0);
        }
        fn quantize(&self, _frequencies: &mut [f32], _strength: f32) {}
        fn add_depth(&self, _frequencies: &mut [f32], _octaves: f32) {}
        fn synthesize(
            &mut self,
            _frequencies: &[f32],
            _magnitudes: &[f32],
            _start_phases: &[f32],
            audio: &mut [f32],
            end_phases: &mut [f32],
        ) {
            audio.fill(0.0);
            end_phases.fill(0.0);
        }
    }

    #[test]
    fn initialize_message_installs_converter() {
        let (control, mut engine) = create_bridge(128);
        assert!(!engine.engine().is_initialized());

        control.initialize(Box::new(NullConverter));
        engine.drain_messages();
        assert!(engine.engine().is_initialized());
    }

    #[test]
    fn poll_hops_is_empty_before_any_hop() {
        let (control, _engine) = create_bridge(128);
        assert!(control.poll_hops().is_empty());
        assert!(control.try_recv_hop().is_none());
    }
}
