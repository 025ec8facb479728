//! The root of a field tree: [Frame] owns the byte buffer and the byte-order
//! policy, and drives layout.

use std::io::Write;

use crate::{
    convert::Converter,
    errors::{LayoutError, WriteError},
    structure::{FieldStructure, Layout},
};

/// Byte order policy of a frame, fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Multi-byte values are stored in host order.
    #[default]
    Host,
    /// Multi-byte values are stored big-endian (network order).
    Network,
}

/// Settings used to construct a [Frame].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameConfig {
    pub byte_order: ByteOrder,
}

#[cfg(feature = "serde")]
impl From<crate::serde::ByteOrderDef> for ByteOrder {
    fn from(value: crate::serde::ByteOrderDef) -> Self {
        match value {
            crate::serde::ByteOrderDef::Host => ByteOrder::Host,
            crate::serde::ByteOrderDef::Network => ByteOrder::Network,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FrameConfigDef> for FrameConfig {
    fn from(value: crate::serde::FrameConfigDef) -> Self {
        FrameConfig {
            byte_order: value.byte_order.into(),
        }
    }
}

/// The byte buffer of a frame together with its byte-order policy.
///
/// Fields hold only offsets; every read and write goes through a `FrameBuffer`.
/// The buffer length is a lower bound on validity. Use [Frame::size] for the
/// logical extent of the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    data: Vec<u8>,
    byte_order: ByteOrder,
}

impl FrameBuffer {
    pub fn new(data: Vec<u8>, byte_order: ByteOrder) -> Self {
        Self { data, byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The live backing bytes, possibly longer than the record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a value of `size` bytes must be byte-swapped on access.
    ///
    /// True only for network order on a little-endian host, for multi-byte
    /// values whose converter is order sensitive.
    pub fn swap_required(&self, size: usize, byte_order_sensitive: bool) -> bool {
        self.byte_order == ByteOrder::Network
            && size > 1
            && cfg!(target_endian = "little")
            && byte_order_sensitive
    }

    /// Decodes the value at `offset`, or `None` if it extends past the buffer.
    pub fn read<T, C: Converter<T>>(&self, offset: usize, converter: &C) -> Option<T> {
        let size = converter.size();
        let end = offset.checked_add(size)?;
        let Some(bytes) = self.data.get(offset..end) else {
            tracing::trace!(offset, size, len = self.data.len(), "read past end of frame buffer");
            return None;
        };

        let swap = self.swap_required(size, converter.byte_order_sensitive());
        Some(converter.decode(bytes, swap))
    }

    /// Encodes `value` at `offset`. The buffer is never grown here.
    pub fn write<T, C: Converter<T>>(
        &mut self,
        offset: usize,
        converter: &C,
        value: &T,
    ) -> Result<(), WriteError> {
        let size = converter.size();
        let swap = self.swap_required(size, converter.byte_order_sensitive());
        let buffer_len = self.data.len();
        let out_of_bounds = WriteError::OutOfBounds {
            offset,
            len: size,
            buffer_len,
        };

        let end = offset.checked_add(size).ok_or(out_of_bounds.clone())?;
        let slot = self.data.get_mut(offset..end).ok_or(out_of_bounds)?;
        converter.encode(value, slot, swap)
    }

    /// Grows the buffer with zeros to exactly `len` bytes. Never shrinks.
    fn grow_to(&mut self, len: usize) -> Result<(), LayoutError> {
        if self.data.len() < len {
            tracing::debug!(from = self.data.len(), to = len, "growing frame buffer");
            self.data
                .try_reserve_exact(len - self.data.len())
                .map_err(|_| LayoutError::BufferAllocation { len })?;
            self.data.resize(len, 0);
        }
        Ok(())
    }
}

/// A binary record: a [FieldStructure] laid out over an owned buffer.
///
/// Build the field tree first, then hand it to [Frame::new] for writing or
/// [Frame::from_buffer] for reading. Both run [Frame::layout] once. Call
/// `layout` again after writing any value that other fields' sizes depend on.
///
/// ```
/// use framecraft::{ByteOrder, Field, FieldStructure, Frame, Layout};
///
/// #[derive(Debug, Default)]
/// struct Header {
///     version: Field<u8>,
///     length: Field<u16>,
/// }
///
/// impl FieldStructure for Header {
///     fn layout(&mut self, cx: &mut Layout<'_>) {
///         cx.field(&mut self.version);
///         cx.field(&mut self.length);
///     }
/// }
///
/// let mut frame = Frame::new(Header::default(), ByteOrder::Network).unwrap();
/// let (header, buf) = frame.parts_mut();
/// header.version.set(buf, 1).unwrap();
/// header.length.set(buf, 0x0203).unwrap();
/// assert_eq!(frame.as_bytes(), &[0x01, 0x02, 0x03]);
/// ```
#[derive(Debug)]
pub struct Frame<S> {
    fields: S,
    buf: FrameBuffer,
    size: usize,
}

impl<S: FieldStructure> Frame<S> {
    /// Creates a frame for writing. The buffer starts empty and grows on layout.
    pub fn new(fields: S, byte_order: ByteOrder) -> Result<Self, LayoutError> {
        Self::from_buffer(fields, Vec::new(), byte_order)
    }

    pub fn with_config(fields: S, config: FrameConfig) -> Result<Self, LayoutError> {
        Self::new(fields, config.byte_order)
    }

    /// Creates a frame for reading over `buffer`, which the frame takes ownership of.
    pub fn from_buffer(
        fields: S,
        buffer: Vec<u8>,
        byte_order: ByteOrder,
    ) -> Result<Self, LayoutError> {
        let mut frame = Self {
            fields,
            buf: FrameBuffer::new(buffer, byte_order),
            size: 0,
        };
        frame.layout()?;
        Ok(frame)
    }

    /// Recomputes every offset and size, grows the buffer to at least the new
    /// size, then runs [FieldStructure::on_layout_completed]. Returns the size.
    ///
    /// On failure the previous size and buffer are kept, but field offsets are
    /// stale until a later pass succeeds.
    pub fn layout(&mut self) -> Result<usize, LayoutError> {
        let mut cx = Layout::new(&self.buf, 0);
        self.fields.layout(&mut cx);
        let size = cx.finish()?;

        self.buf.grow_to(size)?;
        self.size = size;
        tracing::trace!(size, "frame layout completed");

        self.fields.on_layout_completed(&mut self.buf, size)?;
        Ok(size)
    }

    /// Size of the record in bytes as of the last layout.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.buf.byte_order()
    }

    pub fn fields(&self) -> &S {
        &self.fields
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buf
    }

    /// The field tree and the buffer it reads from.
    pub fn parts(&self) -> (&S, &FrameBuffer) {
        (&self.fields, &self.buf)
    }

    /// The field tree and the buffer it writes to.
    pub fn parts_mut(&mut self) -> (&S, &mut FrameBuffer) {
        (&self.fields, &mut self.buf)
    }

    /// Exactly [Frame::size] bytes: the wire representation of the record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_bytes()[..self.size]
    }

    /// Writes the record (exactly [Frame::size] bytes) to `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(self.as_bytes())
    }

    /// Replaces the backing buffer without running layout.
    ///
    /// A buffer shorter than the current size is padded with zeros.
    pub fn set_buffer(&mut self, buffer: Vec<u8>) -> Result<(), LayoutError> {
        self.buf.data = buffer;
        self.buf.grow_to(self.size)
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buf.data
    }
}
