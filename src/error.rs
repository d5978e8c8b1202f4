// src/error.rs

/// Fatal errors raised by the streaming engine.
///
/// Every variant is a caller or host contract violation; none of them is
/// retried or recovered from inside the callback. Transient startup states
/// (converter not yet installed, playback buffer not yet filled) are not
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The host delivered an unexpected number of input channels.
    InputChannels { got: usize },

    /// The host delivered an unexpected number of output channels.
    OutputChannels { got: usize },

    /// The input quantum length differs from the declared one.
    QuantumSize { expected: usize, got: usize },

    /// The pending-hop buffer overran the hop size, meaning the hop size
    /// is not an integer multiple of the quantum size.
    HopNotQuantumAligned { pending: usize, hop_size: usize },

    /// A hop completed while the previous hop's audio was still queued.
    PlaybackNotDrained { remaining: usize },

    /// A fixed-capacity buffer refused a write; the configured maximum
    /// hop size does not cover the requested shape.
    BufferOverflow { needed: usize, capacity: usize },

    /// The control channel delivered a message with an unknown tag.
    UnknownMessage { tag: String },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InputChannels { got } => {
                write!(f, "expected exactly 1 input channel, got {}", got)
            }
            EngineError::OutputChannels { got } => {
                write!(f, "expected exactly 1 output channel, got {}", got)
            }
            EngineError::QuantumSize { expected, got } => {
                write!(f, "expected {} samples per quantum, got {}", expected, got)
            }
            EngineError::HopNotQuantumAligned { pending, hop_size } => {
                write!(
                    f,
                    "pending buffer holds {} samples past the hop size {}; \
                     the hop size is not a multiple of the quantum size",
                    pending, hop_size
                )
            }
            EngineError::PlaybackNotDrained { remaining } => {
                write!(
                    f,
                    "playback buffer still holds {} samples at hop completion",
                    remaining
                )
            }
            EngineError::BufferOverflow { needed, capacity } => {
                write!(
                    f,
                    "buffer overflow: {} samples needed, capacity {}",
                    needed, capacity
                )
            }
            EngineError::UnknownMessage { tag } => {
                write!(f, "unknown message type: {}", tag)
            }
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_contract_breach() {
        let err = EngineError::HopNotQuantumAligned {
            pending: 300,
            hop_size: 256,
        };
        assert!(err.to_string().contains("not a multiple of the quantum"));

        let err = EngineError::UnknownMessage {
            tag: "teardown".into(),
        };
        assert_eq!(err.to_string(), "unknown message type: teardown");
    }
}
