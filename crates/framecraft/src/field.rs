//! Scalar fields: a single value bound to an offset in a frame buffer.

use std::marker::PhantomData;

use crate::{
    convert::{Converter, Native, Scalar},
    errors::WriteError,
    frame::FrameBuffer,
};

/// A fixed-size node of a field tree.
pub trait FieldNode {
    /// Places the node at `offset` and returns its size in bytes.
    fn layout(&mut self, offset: usize) -> usize;

    /// Offset just past the node, as of the last layout.
    fn end_offset(&self) -> usize;
}

/// A value of type `T` stored at a fixed offset, encoded by the converter `C`.
///
/// The field owns no storage; the value lives in the [FrameBuffer] passed to
/// [Field::get] and [Field::set]. Offsets are valid between layout passes.
#[derive(Debug, Clone)]
pub struct Field<T, C = Native> {
    offset: usize,
    converter: C,
    value: PhantomData<fn() -> T>,
}

impl<T: Scalar> Field<T> {
    pub const fn new() -> Self {
        Self::with_converter(Native)
    }
}

impl<T: Scalar> Default for Field<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Converter<T>> Field<T, C> {
    pub const fn with_converter(converter: C) -> Self {
        Self {
            offset: 0,
            converter,
            value: PhantomData,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.converter.size()
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Writes `value` at the field's offset. The buffer must already cover it.
    pub fn set(&self, buf: &mut FrameBuffer, value: T) -> Result<(), WriteError> {
        buf.write(self.offset, &self.converter, &value)
    }
}

impl<T: Default, C: Converter<T>> Field<T, C> {
    /// Reads the value, or `T::default()` if the buffer does not cover the field yet.
    pub fn get(&self, buf: &FrameBuffer) -> T {
        buf.read(self.offset, &self.converter).unwrap_or_default()
    }
}

impl<T, C: Converter<T>> FieldNode for Field<T, C> {
    fn layout(&mut self, offset: usize) -> usize {
        self.offset = offset;
        self.converter.size()
    }

    fn end_offset(&self) -> usize {
        self.offset + self.converter.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::Utf8FixedWidth,
        frame::{ByteOrder, Frame},
        structure::{FieldStructure, Layout},
    };

    #[derive(Debug)]
    struct AllScalars {
        byte: Field<u8>,
        uint16: Field<u16>,
        int16: Field<i16>,
        uint32: Field<u32>,
        int32: Field<i32>,
        uint64: Field<u64>,
        int64: Field<i64>,
        single: Field<f32>,
        double: Field<f64>,
        text: Field<String, Utf8FixedWidth>,
    }

    impl Default for AllScalars {
        fn default() -> Self {
            Self {
                byte: Field::new(),
                uint16: Field::new(),
                int16: Field::new(),
                uint32: Field::new(),
                int32: Field::new(),
                uint64: Field::new(),
                int64: Field::new(),
                single: Field::new(),
                double: Field::new(),
                text: Field::with_converter(Utf8FixedWidth::new(4)),
            }
        }
    }

    impl FieldStructure for AllScalars {
        fn layout(&mut self, cx: &mut Layout<'_>) {
            cx.field(&mut self.byte);
            cx.field(&mut self.uint16);
            cx.field(&mut self.int16);
            cx.field(&mut self.uint32);
            cx.field(&mut self.int32);
            cx.field(&mut self.uint64);
            cx.field(&mut self.int64);
            cx.field(&mut self.single);
            cx.field(&mut self.double);
            cx.field(&mut self.text);
        }
    }

    const LITTLE_ENDIAN: [u8; 45] = [
        0x01, //
        0x60, 0xea, //
        0x30, 0x75, //
        0x00, 0x28, 0x6b, 0xee, //
        0x00, 0x94, 0x35, 0x77, //
        0x00, 0x00, 0x08, 0xc5, 0xa1, 0xd8, 0xcc, 0xf9, //
        0x00, 0x00, 0x84, 0xe2, 0x50, 0x6c, 0xe6, 0x7c, //
        0x00, 0x00, 0xc8, 0x42, //
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x59, 0x40, //
        0x48, 0x65, 0x79, 0x21,
    ];

    const NETWORK_ORDER: [u8; 45] = [
        0x01, //
        0xea, 0x60, //
        0x75, 0x30, //
        0xee, 0x6b, 0x28, 0x00, //
        0x77, 0x35, 0x94, 0x00, //
        0xf9, 0xcc, 0xd8, 0xa1, 0xc5, 0x08, 0x00, 0x00, //
        0x7c, 0xe6, 0x6c, 0x50, 0xe2, 0x84, 0x00, 0x00, //
        0x42, 0xc8, 0x00, 0x00, //
        0x40, 0x59, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x48, 0x65, 0x79, 0x21,
    ];

    fn set_fields(frame: &mut Frame<AllScalars>) {
        let (f, buf) = frame.parts_mut();
        f.byte.set(buf, 1).unwrap();
        f.uint16.set(buf, 60000).unwrap();
        f.int16.set(buf, 30000).unwrap();
        f.uint32.set(buf, 4_000_000_000).unwrap();
        f.int32.set(buf, 2_000_000_000).unwrap();
        f.uint64.set(buf, 18_000_000_000_000_000_000).unwrap();
        f.int64.set(buf, 9_000_000_000_000_000_000).unwrap();
        f.single.set(buf, 100.0).unwrap();
        f.double.set(buf, 100.0).unwrap();
        f.text.set(buf, "Hey!".to_string()).unwrap();
    }

    fn check_fields(frame: &Frame<AllScalars>) {
        let (f, buf) = frame.parts();
        assert_eq!(f.byte.get(buf), 1);
        assert_eq!(f.uint16.get(buf), 60000);
        assert_eq!(f.int16.get(buf), 30000);
        assert_eq!(f.uint32.get(buf), 4_000_000_000);
        assert_eq!(f.int32.get(buf), 2_000_000_000);
        assert_eq!(f.uint64.get(buf), 18_000_000_000_000_000_000);
        assert_eq!(f.int64.get(buf), 9_000_000_000_000_000_000);
        assert_eq!(f.single.get(buf), 100.0);
        assert_eq!(f.double.get(buf), 100.0);
        assert_eq!(f.text.get(buf), "Hey!");
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_write_host_order() {
        let mut frame = Frame::new(AllScalars::default(), ByteOrder::Host).unwrap();
        set_fields(&mut frame);
        assert_eq!(frame.as_bytes(), &LITTLE_ENDIAN);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_read_host_order() {
        let frame =
            Frame::from_buffer(AllScalars::default(), LITTLE_ENDIAN.to_vec(), ByteOrder::Host)
                .unwrap();
        check_fields(&frame);
    }

    #[test]
    fn test_write_network_order() {
        let mut frame = Frame::new(AllScalars::default(), ByteOrder::Network).unwrap();
        set_fields(&mut frame);
        assert_eq!(frame.size(), 45);
        assert_eq!(frame.as_bytes(), &NETWORK_ORDER);
    }

    #[test]
    fn test_read_network_order() {
        let frame =
            Frame::from_buffer(AllScalars::default(), NETWORK_ORDER.to_vec(), ByteOrder::Network)
                .unwrap();
        check_fields(&frame);
    }

    #[test]
    fn test_offsets() {
        let frame = Frame::new(AllScalars::default(), ByteOrder::Host).unwrap();
        let f = frame.fields();
        assert_eq!(f.byte.offset(), 0);
        assert_eq!(f.byte.end_offset(), 1);
        assert_eq!(f.uint16.end_offset(), 3);
        assert_eq!(f.uint64.offset(), 13);
        assert_eq!(f.double.size(), 8);
        assert_eq!(f.text.offset(), 41);
        assert_eq!(f.text.end_offset(), 45);
    }

    #[test]
    fn test_read_past_buffer_is_zero() {
        let buf = FrameBuffer::new(vec![0xff; 3], ByteOrder::Network);
        let mut wide = Field::<u32>::new();
        wide.layout(0);
        assert_eq!(wide.get(&buf), 0);

        let mut narrow = Field::<u16>::new();
        narrow.layout(1);
        assert_eq!(narrow.get(&buf), 0xffff);

        let mut text = Field::<String, _>::with_converter(Utf8FixedWidth::new(8));
        text.layout(0);
        assert_eq!(text.get(&buf), "");
    }
}
