//! Bitmapped fields: a 1, 2 or 4 byte unit split into bit ranges.
//!
//! Bit ranges are declared in order with a [BitAllocator], starting at the least
//! significant bit of the unit. The unit is stored like any other scalar field,
//! so in network order its most significant byte comes first on the wire.
//!
//! ```
//! use framecraft::{Bit, BitAllocator, BitField, Bitmapped, BitmappedField};
//!
//! #[derive(Debug, Clone)]
//! struct Format {
//!     unit: BitmappedField<u8>,
//!     polar: Bit,
//!     range: BitField,
//! }
//!
//! impl Default for Format {
//!     fn default() -> Self {
//!         let mut bits = BitAllocator::<u8>::new();
//!         Self {
//!             polar: bits.bit(),
//!             range: bits.field(3),
//!             unit: BitmappedField::new(),
//!         }
//!     }
//! }
//!
//! impl Bitmapped for Format {
//!     type Unit = u8;
//!
//!     fn unit(&self) -> &BitmappedField<u8> {
//!         &self.unit
//!     }
//!
//!     fn unit_mut(&mut self) -> &mut BitmappedField<u8> {
//!         &mut self.unit
//!     }
//! }
//!
//! let format = Format::default();
//! assert_eq!(format.range.offset(), 1);
//! ```

use std::marker::PhantomData;

use crate::{
    bits,
    convert::Scalar,
    errors::{DefinitionError, WriteError},
    field::{Field, FieldNode},
    frame::FrameBuffer,
};

/// A scalar that can back a bitmapped field, viewed as an unsigned word.
pub trait BitUnit: Scalar {
    /// Width of the unit in bits.
    const BITS: u32;

    /// The unit's bits, zero-extended regardless of signedness.
    fn to_word(self) -> u32;

    /// Truncates `word` to the unit width.
    fn from_word(word: u32) -> Self;
}

macro_rules! bit_unit {
    ($($ty:ty => $unsigned:ty),* $(,)?) => {
        $(
            impl BitUnit for $ty {
                const BITS: u32 = <$ty>::BITS;

                fn to_word(self) -> u32 {
                    self as $unsigned as u32
                }

                fn from_word(word: u32) -> Self {
                    word as $unsigned as $ty
                }
            }
        )*
    };
}

bit_unit!(u8 => u8, u16 => u16, u32 => u32, i8 => u8, i16 => u16, i32 => u32);

/// A range of bits within a bitmapped unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    offset: u32,
    width: u32,
}

impl BitField {
    /// Bit position of the least significant bit of the range.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn mask(&self) -> u32 {
        bits::mask(self.width)
    }
}

/// A single-bit [BitField] read and written as a `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bit(BitField);

impl Bit {
    pub const fn offset(&self) -> u32 {
        self.0.offset
    }

    pub const fn field(&self) -> BitField {
        self.0
    }
}

/// Hands out consecutive, non-overlapping bit ranges of a unit `U`, lowest bits first.
#[derive(Debug, Clone)]
pub struct BitAllocator<U> {
    next: u32,
    unit: PhantomData<U>,
}

impl<U: BitUnit> BitAllocator<U> {
    pub const fn new() -> Self {
        Self {
            next: 0,
            unit: PhantomData,
        }
    }

    /// Declares the next `width` bits.
    ///
    /// # Panics
    ///
    /// If `width` is zero or the range does not fit in the unit. In a `const`
    /// context this is a compile error.
    pub const fn field(&mut self, width: u32) -> BitField {
        assert!(width > 0, "bit field width must be at least 1");
        assert!(
            width <= U::BITS && self.next <= U::BITS - width,
            "bit fields exceed the width of the bitmapped unit"
        );

        let field = BitField {
            offset: self.next,
            width,
        };
        self.next += width;
        field
    }

    /// Declares the next single bit. Panics like [BitAllocator::field].
    pub const fn bit(&mut self) -> Bit {
        Bit(self.field(1))
    }

    /// Fallible form of [BitAllocator::field].
    pub fn try_field(&mut self, width: u32) -> Result<BitField, DefinitionError> {
        if width == 0 {
            return Err(DefinitionError::ZeroWidth);
        }
        if width > U::BITS || self.next > U::BITS - width {
            return Err(DefinitionError::BitOverflow {
                offset: self.next,
                width,
                unit_bits: U::BITS,
            });
        }

        Ok(self.field(width))
    }

    /// Bits declared so far.
    pub const fn used(&self) -> u32 {
        self.next
    }

    pub const fn remaining(&self) -> u32 {
        U::BITS - self.next
    }
}

impl<U: BitUnit> Default for BitAllocator<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// A scalar unit of type `U` whose bits are addressed through [BitField]s.
#[derive(Debug, Clone)]
pub struct BitmappedField<U> {
    unit: Field<U>,
}

impl<U: BitUnit> BitmappedField<U> {
    pub const fn new() -> Self {
        Self { unit: Field::new() }
    }

    pub fn offset(&self) -> usize {
        self.unit.offset()
    }

    /// The whole unit as stored.
    pub fn raw(&self, buf: &FrameBuffer) -> U {
        self.unit.get(buf)
    }

    pub fn set_raw(&self, buf: &mut FrameBuffer, value: U) -> Result<(), WriteError> {
        self.unit.set(buf, value)
    }

    /// Reads the bits of `field` as an unsigned value.
    pub fn read(&self, buf: &FrameBuffer, field: BitField) -> u32 {
        bits::extract(self.raw(buf).to_word(), field.offset, field.width)
    }

    /// Reads the bits of `field` as a two's-complement value.
    pub fn read_signed(&self, buf: &FrameBuffer, field: BitField) -> i32 {
        bits::sign_extend(self.read(buf, field), field.width)
    }

    /// Replaces the bits of `field` with the low bits of `value`, keeping all other bits.
    pub fn write(&self, buf: &mut FrameBuffer, field: BitField, value: u32) -> Result<(), WriteError> {
        let word = bits::insert(self.raw(buf).to_word(), field.offset, field.width, value);
        self.set_raw(buf, U::from_word(word))
    }

    pub fn flag(&self, buf: &FrameBuffer, bit: Bit) -> bool {
        self.read(buf, bit.0) != 0
    }

    pub fn set_flag(&self, buf: &mut FrameBuffer, bit: Bit, on: bool) -> Result<(), WriteError> {
        self.write(buf, bit.0, u32::from(on))
    }
}

impl<U: BitUnit> Default for BitmappedField<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: BitUnit> FieldNode for BitmappedField<U> {
    fn layout(&mut self, offset: usize) -> usize {
        self.unit.layout(offset)
    }

    fn end_offset(&self) -> usize {
        self.unit.end_offset()
    }
}

/// A type built around one [BitmappedField], usually together with the
/// [BitField]s declared for it.
///
/// Composites place it with [crate::Layout::bitmapped], and it can be the
/// element type of a [crate::BitmappedFieldArray].
pub trait Bitmapped {
    type Unit: BitUnit;

    fn unit(&self) -> &BitmappedField<Self::Unit>;

    fn unit_mut(&mut self) -> &mut BitmappedField<Self::Unit>;

    fn read(&self, buf: &FrameBuffer, field: BitField) -> u32 {
        self.unit().read(buf, field)
    }

    fn write(&self, buf: &mut FrameBuffer, field: BitField, value: u32) -> Result<(), WriteError> {
        self.unit().write(buf, field, value)
    }

    fn flag(&self, buf: &FrameBuffer, bit: Bit) -> bool {
        self.unit().flag(buf, bit)
    }

    fn set_flag(&self, buf: &mut FrameBuffer, bit: Bit, on: bool) -> Result<(), WriteError> {
        self.unit().set_flag(buf, bit, on)
    }
}

impl<U: BitUnit> Bitmapped for BitmappedField<U> {
    type Unit = U;

    fn unit(&self) -> &BitmappedField<U> {
        self
    }

    fn unit_mut(&mut self) -> &mut BitmappedField<U> {
        self
    }
}
