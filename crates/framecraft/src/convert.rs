//! Byte converters for the values stored in a frame.
//!
//! Every [Converter] has a fixed byte width. Primitive numbers use their native
//! binary representation through the [Native] converter; [Utf8FixedWidth]
//! stores NUL-padded text and is exempt from byte-order conversion.
//!
//! Types without a converter are rejected at compile time: `Field<T>` requires
//! `T: Scalar` unless an explicit converter is supplied.

use std::fmt;

use crate::errors::WriteError;

/// Converts values of type `T` to and from a fixed number of bytes.
///
/// `decode` receives exactly [Converter::size] bytes and `encode` writes exactly
/// that many. `swap` asks the converter to reverse the byte order of the value.
pub trait Converter<T> {
    /// Fixed byte width of an encoded value.
    fn size(&self) -> usize;

    fn decode(&self, bytes: &[u8], swap: bool) -> T;

    fn encode(&self, value: &T, out: &mut [u8], swap: bool) -> Result<(), WriteError>;

    /// Whether network-order conversion applies to this converter at all.
    fn byte_order_sensitive(&self) -> bool {
        true
    }
}

/// A fixed-width primitive with a native binary representation.
pub trait Scalar: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Width in bytes.
    const SIZE: usize;

    /// Reads a value from the first [Scalar::SIZE] bytes, reversing them if `swap`.
    fn read(bytes: &[u8], swap: bool) -> Self;

    /// Writes the value into the first [Scalar::SIZE] bytes, reversed if `swap`.
    fn write(self, out: &mut [u8], swap: bool);
}

macro_rules! int_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = size_of::<$ty>();

                fn read(bytes: &[u8], swap: bool) -> Self {
                    let mut raw = [0u8; size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    let value = <$ty>::from_ne_bytes(raw);
                    if swap { value.swap_bytes() } else { value }
                }

                fn write(self, out: &mut [u8], swap: bool) {
                    let value = if swap { self.swap_bytes() } else { self };
                    out[..Self::SIZE].copy_from_slice(&value.to_ne_bytes());
                }
            }
        )*
    };
}

int_scalar!(u8, i8, u16, i16, u32, i32, u64, i64);

impl Scalar for f32 {
    const SIZE: usize = 4;

    fn read(bytes: &[u8], swap: bool) -> Self {
        f32::from_bits(u32::read(bytes, swap))
    }

    fn write(self, out: &mut [u8], swap: bool) {
        self.to_bits().write(out, swap);
    }
}

impl Scalar for f64 {
    const SIZE: usize = 8;

    fn read(bytes: &[u8], swap: bool) -> Self {
        f64::from_bits(u64::read(bytes, swap))
    }

    fn write(self, out: &mut [u8], swap: bool) {
        self.to_bits().write(out, swap);
    }
}

/// The default converter for every [Scalar] type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Native;

impl<T: Scalar> Converter<T> for Native {
    fn size(&self) -> usize {
        T::SIZE
    }

    fn decode(&self, bytes: &[u8], swap: bool) -> T {
        T::read(bytes, swap)
    }

    fn encode(&self, value: &T, out: &mut [u8], swap: bool) -> Result<(), WriteError> {
        value.write(out, swap);
        Ok(())
    }
}

/// UTF-8 text in a fixed number of bytes, padded with NUL.
///
/// Trailing NUL bytes are dropped when decoding. Invalid UTF-8 is decoded lossily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8FixedWidth {
    width: usize,
}

impl Utf8FixedWidth {
    pub const fn new(width: usize) -> Self {
        Self { width }
    }

    pub const fn width(&self) -> usize {
        self.width
    }
}

impl Converter<String> for Utf8FixedWidth {
    fn size(&self) -> usize {
        self.width
    }

    fn decode(&self, bytes: &[u8], _swap: bool) -> String {
        let slot = &bytes[..self.width];
        let len = slot.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&slot[..len]).into_owned()
    }

    fn encode(&self, value: &String, out: &mut [u8], _swap: bool) -> Result<(), WriteError> {
        let text = value.as_bytes();
        if text.len() > self.width {
            return Err(WriteError::StringTooLong {
                len: text.len(),
                width: self.width,
            });
        }

        out[..text.len()].copy_from_slice(text);
        out[text.len()..self.width].fill(0);
        Ok(())
    }

    fn byte_order_sensitive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_sizes() {
        assert_eq!(<Native as Converter<u8>>::size(&Native), 1);
        assert_eq!(<Native as Converter<i16>>::size(&Native), 2);
        assert_eq!(<Native as Converter<u32>>::size(&Native), 4);
        assert_eq!(<Native as Converter<f32>>::size(&Native), 4);
        assert_eq!(<Native as Converter<i64>>::size(&Native), 8);
        assert_eq!(<Native as Converter<f64>>::size(&Native), 8);
    }

    #[test]
    fn test_native_swap_reverses_bytes() {
        let mut plain = [0u8; 4];
        let mut swapped = [0u8; 4];
        0x0102_0304u32.write(&mut plain, false);
        0x0102_0304u32.write(&mut swapped, true);

        plain.reverse();
        assert_eq!(plain, swapped);
        assert_eq!(u32::read(&swapped, true), 0x0102_0304);
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn test_float_swap() {
        let mut out = [0u8; 8];
        Native.encode(&100.0f64, &mut out, true).unwrap();
        assert_eq!(out, [0x40, 0x59, 0, 0, 0, 0, 0, 0]);
        let value: f64 = Native.decode(&out, true);
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_read_uses_leading_bytes() {
        let bytes = [0xff, 0x01, 0x02];
        assert_eq!(u8::read(&bytes, false), 0xff);
        assert_eq!(i8::read(&bytes, true), -1);
    }

    #[test]
    fn test_utf8_pads_with_nul() {
        let converter = Utf8FixedWidth::new(6);
        let mut out = [0xaau8; 6];
        converter.encode(&"Hey!".to_string(), &mut out, false).unwrap();
        assert_eq!(out, [b'H', b'e', b'y', b'!', 0, 0]);
        assert_eq!(converter.decode(&out, false), "Hey!");
    }

    #[test]
    fn test_utf8_too_long() {
        let converter = Utf8FixedWidth::new(2);
        let mut out = [0u8; 2];
        assert_eq!(
            converter.encode(&"abc".to_string(), &mut out, false),
            Err(WriteError::StringTooLong { len: 3, width: 2 })
        );
    }

    #[test]
    fn test_utf8_keeps_inner_nul() {
        let converter = Utf8FixedWidth::new(4);
        assert_eq!(converter.decode(&[b'a', 0, b'b', 0], false), "a\0b");
        assert_eq!(converter.decode(&[0, 0, 0, 0], false), "");
    }

    #[test]
    fn test_utf8_is_order_insensitive() {
        assert!(!Utf8FixedWidth::new(4).byte_order_sensitive());
        assert!(<Native as Converter<u16>>::byte_order_sensitive(&Native));
    }
}
