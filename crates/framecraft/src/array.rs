//! Dynamically sized runs of homogeneous fields.
//!
//! The element count of every array is supplied by its parent at layout time
//! through a [Count] provider: usually another field of the frame, read at the
//! moment the array is placed.

use std::{marker::PhantomData, ops::Index};

use crate::{
    bitmapped::Bitmapped,
    convert::{Converter, Native, Scalar},
    errors::{LayoutError, WriteError},
    field::{Field, FieldNode},
    frame::FrameBuffer,
};

/// A node whose size depends on an element count known only at layout time.
pub trait CountedNode {
    /// Places `count` elements at `offset` and returns the total size in bytes.
    ///
    /// Fails when the run would extend past `usize::MAX` or its element objects
    /// cannot be allocated. Offsets are stale until the next successful pass.
    fn layout(
        &mut self,
        buf: &FrameBuffer,
        offset: usize,
        count: usize,
    ) -> Result<usize, LayoutError>;

    /// Offset just past the last element, as of the last layout.
    fn end_offset(&self) -> usize;
}

/// Makes room for `count` element objects without aborting on absurd counts.
pub(crate) fn reserve_elements<E>(elements: &mut Vec<E>, count: usize) -> Result<(), LayoutError> {
    let additional = count.saturating_sub(elements.len());
    elements
        .try_reserve_exact(additional)
        .map_err(|_| LayoutError::TooManyElements { count })
}

/// Provides an element count during layout.
pub trait Count {
    fn count(&self, buf: &FrameBuffer) -> usize;
}

impl Count for usize {
    fn count(&self, _buf: &FrameBuffer) -> usize {
        *self
    }
}

/// An integer field used as a count. Negative or unrepresentable values count as zero.
impl<T, C> Count for Field<T, C>
where
    T: Default + TryInto<usize>,
    C: Converter<T>,
{
    fn count(&self, buf: &FrameBuffer) -> usize {
        self.get(buf).try_into().unwrap_or(0)
    }
}

/// A count computed from the buffer by a closure. See [count_fn].
#[derive(Clone, Copy)]
pub struct CountFn<F>(F);

impl<F: Fn(&FrameBuffer) -> usize> Count for CountFn<F> {
    fn count(&self, buf: &FrameBuffer) -> usize {
        (self.0)(buf)
    }
}

/// Wraps a closure as a [Count], for counts derived from several fields.
pub fn count_fn<F: Fn(&FrameBuffer) -> usize>(f: F) -> CountFn<F> {
    CountFn(f)
}

/// A run of scalar values of type `T`, encoded by `C`.
///
/// Reads outside the laid-out run, or past the end of the buffer, yield
/// `T::default()`. Writes outside the buffer fail.
#[derive(Debug, Clone)]
pub struct FieldArray<T, C = Native> {
    offset: usize,
    len: usize,
    converter: C,
    value: PhantomData<fn() -> T>,
}

impl<T: Scalar> FieldArray<T> {
    pub const fn new() -> Self {
        Self::with_converter(Native)
    }
}

impl<T: Scalar> Default for FieldArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Converter<T>> FieldArray<T, C> {
    pub const fn with_converter(converter: C) -> Self {
        Self {
            offset: 0,
            len: 0,
            converter,
            value: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn element_size(&self) -> usize {
        self.converter.size()
    }

    fn element_offset(&self, index: usize) -> Option<usize> {
        index
            .checked_mul(self.converter.size())?
            .checked_add(self.offset)
    }

    pub fn set(&self, buf: &mut FrameBuffer, index: usize, value: T) -> Result<(), WriteError> {
        let offset = self.element_offset(index).ok_or(WriteError::OutOfBounds {
            offset: usize::MAX,
            len: self.converter.size(),
            buffer_len: buf.len(),
        })?;
        buf.write(offset, &self.converter, &value)
    }
}

impl<T: Default, C: Converter<T>> FieldArray<T, C> {
    pub fn get(&self, buf: &FrameBuffer, index: usize) -> T {
        self.element_offset(index)
            .and_then(|offset| buf.read(offset, &self.converter))
            .unwrap_or_default()
    }

    /// Iterates over the current elements. Each call starts from the first element.
    pub fn iter<'a>(&'a self, buf: &'a FrameBuffer) -> impl Iterator<Item = T> + 'a {
        (0..self.len).map(move |index| self.get(buf, index))
    }
}

impl<T, C: Converter<T>> CountedNode for FieldArray<T, C> {
    fn layout(
        &mut self,
        _buf: &FrameBuffer,
        offset: usize,
        count: usize,
    ) -> Result<usize, LayoutError> {
        self.offset = offset;
        self.len = 0;

        let size = count
            .checked_mul(self.converter.size())
            .filter(|&size| offset.checked_add(size).is_some())
            .ok_or(LayoutError::SizeOverflow { offset })?;
        self.len = count;
        Ok(size)
    }

    fn end_offset(&self) -> usize {
        self.offset + self.len * self.converter.size()
    }
}

/// A run of bitmapped units of type `B`.
///
/// Like [crate::FieldStructureArray], element objects are kept across layout
/// passes and only created or dropped when the count changes.
#[derive(Debug, Clone)]
pub struct BitmappedFieldArray<B> {
    elements: Vec<B>,
    offset: usize,
    end_offset: usize,
}

impl<B> BitmappedFieldArray<B> {
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
            offset: 0,
            end_offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&B> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, B> {
        self.elements.iter()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<B> Default for BitmappedFieldArray<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Index<usize> for BitmappedFieldArray<B> {
    type Output = B;

    fn index(&self, index: usize) -> &B {
        &self.elements[index]
    }
}

impl<'a, B> IntoIterator for &'a BitmappedFieldArray<B> {
    type Item = &'a B;
    type IntoIter = std::slice::Iter<'a, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<B: Bitmapped + Default> CountedNode for BitmappedFieldArray<B> {
    fn layout(
        &mut self,
        _buf: &FrameBuffer,
        offset: usize,
        count: usize,
    ) -> Result<usize, LayoutError> {
        if self.elements.len() != count {
            tracing::trace!(from = self.elements.len(), to = count, "resizing bitmapped array");
            reserve_elements(&mut self.elements, count)?;
            self.elements.resize_with(count, B::default);
        }

        self.offset = offset;
        self.end_offset = offset;

        let mut end = offset;
        for element in &mut self.elements {
            let size = element.unit_mut().layout(end);
            end = end
                .checked_add(size)
                .ok_or(LayoutError::SizeOverflow { offset: end })?;
        }
        self.end_offset = end;

        Ok(end - offset)
    }

    fn end_offset(&self) -> usize {
        self.end_offset
    }
}
