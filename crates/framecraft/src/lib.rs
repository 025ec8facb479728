//! # framecraft
//!
//! Declarative binary frames (protocol records such as C37.118 or Modbus)
//! read and written in place over a byte buffer.
//!
//! A frame is described as a tree of typed fields: scalars, fixed-width
//! strings, bitmapped units, nested structures and dynamically sized arrays.
//! [Frame::layout] walks the tree in declaration order, assigns every field its
//! byte offset and grows the buffer. After that, field accessors read and write
//! the buffer directly; there is no intermediate object graph.
//!
//! Array lengths are decided at layout time by a [Count] provider, typically
//! another field of the same frame. Call [Frame::layout] again after changing
//! such a field.
//!
//! ## Example
//!
//! ```
//! use framecraft::{ByteOrder, Field, FieldArray, FieldStructure, Frame, Layout};
//!
//! #[derive(Debug, Default)]
//! struct Names {
//!     count: Field<u8>,
//!     ids: FieldArray<u16>,
//! }
//!
//! impl FieldStructure for Names {
//!     fn layout(&mut self, cx: &mut Layout<'_>) {
//!         cx.field(&mut self.count);
//!         cx.array(&mut self.ids, &self.count);
//!     }
//! }
//!
//! let mut frame = Frame::new(Names::default(), ByteOrder::Network).unwrap();
//! let (names, buf) = frame.parts_mut();
//! names.count.set(buf, 2).unwrap();
//! frame.layout().unwrap();
//!
//! let (names, buf) = frame.parts_mut();
//! names.ids.set(buf, 0, 0x0102).unwrap();
//! names.ids.set(buf, 1, 0x0304).unwrap();
//! assert_eq!(frame.as_bytes(), &[0x02, 0x01, 0x02, 0x03, 0x04]);
//! ```

pub mod array;
pub mod bitmapped;
pub mod bits;
pub mod convert;
pub mod errors;
pub mod field;
pub mod frame;
#[cfg(feature = "serde")]
pub mod serde;
pub mod structure;

pub use array::{BitmappedFieldArray, Count, CountFn, CountedNode, FieldArray, count_fn};
pub use bitmapped::{Bit, BitAllocator, BitField, BitUnit, Bitmapped, BitmappedField};
pub use convert::{Converter, Native, Scalar, Utf8FixedWidth};
pub use errors::{DefinitionError, LayoutError, WriteError};
pub use field::{Field, FieldNode};
pub use frame::{ByteOrder, Frame, FrameBuffer, FrameConfig};
pub use structure::{FieldStructure, FieldStructureArray, Layout, Span};
