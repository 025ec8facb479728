//! Error types for field definition, layout and buffer writes.
//!
//! Reads never fail: a read that falls outside the current buffer yields the
//! zero value of the field's type, because layout passes are allowed to look at
//! fields before the buffer has grown to cover them.

/// Errors produced while declaring a field layout (see [crate::bitmapped::BitAllocator]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A bit field was declared with a width of zero bits.
    #[error("bit field width must be at least 1")]
    ZeroWidth,
    /// The declared bit fields no longer fit in the bitmapped unit.
    #[error("bit field at offset {offset} with width {width} exceeds the {unit_bits}-bit unit")]
    BitOverflow {
        offset: u32,
        width: u32,
        unit_bits: u32,
    },
}

/// Errors produced when writing a value into a frame buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The target range lies beyond the end of the buffer. Run layout first.
    #[error("write of {len} bytes at offset {offset} exceeds buffer of {buffer_len} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },
    /// The encoded string does not fit in its fixed-width slot.
    #[error("string of {len} bytes does not fit a {width}-byte field")]
    StringTooLong { len: usize, width: usize },
}

/// Errors produced by a layout pass ([crate::Frame::layout]).
///
/// Counts are read from the buffer, so a hostile or corrupt input can ask for
/// a record that cannot exist. Such a pass fails instead of wrapping offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Offsets past `offset` no longer fit in `usize`.
    #[error("layout size overflows past offset {offset}")]
    SizeOverflow { offset: usize },
    /// An array asked for more element objects than can be allocated.
    #[error("cannot allocate {count} array elements")]
    TooManyElements { count: usize },
    /// The frame buffer could not grow to `len` bytes.
    #[error("cannot grow frame buffer to {len} bytes")]
    BufferAllocation { len: usize },
    /// The post-layout hook failed to write.
    #[error(transparent)]
    Write(#[from] WriteError),
}
