use thiserror::Error;

/// Errors produced while decoding wire records.
///
/// Every variant represents data that arrived over a socket and failed a
/// trust-boundary check; the owning connection is expected to be destroyed
/// in response (with the exceptions the protocol spells out, e.g. unknown
/// command opcodes are logged and ignored).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The framing header carried a message-type tag outside the known range
    #[error("unknown message type {value} in header (valid range: 0-6)")]
    UnknownMessageType { value: u32 },

    /// A command header carried an opcode outside the known range.
    /// Unknown opcodes are logged and ignored, never fatal.
    #[error("unknown command opcode {value} (valid range: 0-3)")]
    UnknownOpcode { value: u32 },

    /// A property record header carried a property kind outside the known range
    #[error("unknown property kind {value} (valid range: 0-{max})")]
    UnknownPropertyKind { value: u32, max: u32 },

    /// An entity record carried a type tag outside the known registry
    #[error("unknown entity kind {value} (valid range: 0-{max})")]
    UnknownEntityKind { value: u32, max: u32 },

    /// A property record header declared a payload length outside `[1, max)`
    #[error("property payload length {len} out of range (must be in [1, {max}))")]
    PropertyLengthOutOfRange { len: u32, max: u32 },

    /// A background announcement declared more pixels than the receiver is
    /// willing to allocate
    #[error("background of {size_x}x{size_y} pixels exceeds the {max} pixel cap")]
    BackgroundTooLarge { size_x: u32, size_y: u32, max: u64 },
}
