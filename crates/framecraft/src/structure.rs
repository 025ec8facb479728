//! Composite nodes: structures of heterogeneous fields and repeated structures.
//!
//! A structure lists its children explicitly, in declaration order, by visiting
//! them with a [Layout] cursor. There is no padding or alignment: every child
//! starts where the previous one ended. A "derived" structure embeds its base
//! as the first member and visits it first, so base fields precede its own.

use std::ops::Index;

use crate::{
    array::{Count, CountedNode, reserve_elements},
    bitmapped::Bitmapped,
    errors::{LayoutError, WriteError},
    field::FieldNode,
    frame::FrameBuffer,
};

/// A composite of fields laid out back to back.
pub trait FieldStructure {
    /// Visits every child in declaration order.
    fn layout(&mut self, cx: &mut Layout<'_>);

    /// Runs after the owning [crate::Frame] finished a layout pass and grew its
    /// buffer to `size` bytes. Only called on the root structure of a frame.
    ///
    /// Use it to write back derived values such as a total-length field. Writing
    /// a value that affects sizing here leaves the layout stale until the next pass.
    fn on_layout_completed(&self, _buf: &mut FrameBuffer, _size: usize) -> Result<(), WriteError> {
        Ok(())
    }
}

/// Placement of a nested structure as of the last layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    offset: usize,
    size: usize,
}

impl Span {
    pub const fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn end_offset(&self) -> usize {
        self.offset.saturating_add(self.size)
    }
}

/// Cursor handed to [FieldStructure::layout]. Assigns each visited child the
/// current offset and advances past it.
///
/// The buffer is readable during layout so size providers can consult values
/// of fields laid out earlier. It may not yet cover those fields; reads then
/// yield zero.
///
/// The first failure (an overflowing size, an unallocatable array) is kept and
/// every later child is skipped; [Layout::finish] reports it.
#[derive(Debug)]
pub struct Layout<'a> {
    buf: &'a FrameBuffer,
    start: usize,
    offset: usize,
    error: Option<LayoutError>,
}

impl<'a> Layout<'a> {
    pub fn new(buf: &'a FrameBuffer, start: usize) -> Self {
        Self {
            buf,
            start,
            offset: start,
            error: None,
        }
    }

    pub fn buffer(&self) -> &'a FrameBuffer {
        self.buf
    }

    /// Offset at which the next child will be placed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes laid out so far.
    pub fn size(&self) -> usize {
        self.offset - self.start
    }

    pub fn error(&self) -> Option<&LayoutError> {
        self.error.as_ref()
    }

    /// Places a fixed-size node.
    pub fn field<N: FieldNode + ?Sized>(&mut self, node: &mut N) -> usize {
        if self.error.is_some() {
            return 0;
        }
        let size = node.layout(self.offset);
        self.advance(size)
    }

    /// Places a bitmapped unit.
    pub fn bitmapped<B: Bitmapped + ?Sized>(&mut self, node: &mut B) -> usize {
        self.field(node.unit_mut())
    }

    /// Places a nested structure. Keep the returned span to know where it landed.
    pub fn structure<S: FieldStructure + ?Sized>(&mut self, node: &mut S) -> Span {
        let offset = self.offset;
        if self.error.is_some() {
            return Span::new(offset, 0);
        }

        match layout_structure(node, self.buf, offset) {
            Ok(size) => Span::new(offset, self.advance(size)),
            Err(error) => {
                self.fail(error);
                Span::new(offset, 0)
            }
        }
    }

    /// Places a dynamically sized node whose element count comes from `count`,
    /// evaluated now against the current buffer contents.
    pub fn array<N, C>(&mut self, node: &mut N, count: &C) -> usize
    where
        N: CountedNode + ?Sized,
        C: Count + ?Sized,
    {
        if self.error.is_some() {
            return 0;
        }

        let count = count.count(self.buf);
        match node.layout(self.buf, self.offset, count) {
            Ok(size) => self.advance(size),
            Err(error) => {
                self.fail(error);
                0
            }
        }
    }

    /// Ends the pass with the total size, or the first failure.
    pub fn finish(self) -> Result<usize, LayoutError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.offset - self.start),
        }
    }

    fn advance(&mut self, size: usize) -> usize {
        match self.offset.checked_add(size) {
            Some(end) => {
                self.offset = end;
                size
            }
            None => {
                self.fail(LayoutError::SizeOverflow {
                    offset: self.offset,
                });
                0
            }
        }
    }

    fn fail(&mut self, error: LayoutError) {
        tracing::debug!(%error, offset = self.offset, "layout pass failed");
        self.error.get_or_insert(error);
    }
}

/// Lays out `node` at `offset` and returns its size.
pub fn layout_structure<S: FieldStructure + ?Sized>(
    node: &mut S,
    buf: &FrameBuffer,
    offset: usize,
) -> Result<usize, LayoutError> {
    let mut cx = Layout::new(buf, offset);
    node.layout(&mut cx);
    cx.finish()
}

/// A run of structures of the same type whose count is decided at layout time.
///
/// Element objects are kept across layout passes. When the count changes the
/// run is truncated or extended with fresh elements; surviving elements keep
/// their identity. Every element is laid out again on each pass, in order, so
/// an element's size may depend on its own fields. [FieldStructureArray::span]
/// tells where each element landed.
#[derive(Debug, Clone)]
pub struct FieldStructureArray<S> {
    elements: Vec<S>,
    spans: Vec<Span>,
    offset: usize,
    end_offset: usize,
}

impl<S> FieldStructureArray<S> {
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
            spans: Vec::new(),
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

    pub fn get(&self, index: usize) -> Option<&S> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.elements.iter()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset and size of element `index` as of the last layout.
    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }
}

impl<S> Default for FieldStructureArray<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Index<usize> for FieldStructureArray<S> {
    type Output = S;

    fn index(&self, index: usize) -> &S {
        &self.elements[index]
    }
}

impl<'a, S> IntoIterator for &'a FieldStructureArray<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<S: FieldStructure + Default> CountedNode for FieldStructureArray<S> {
    fn layout(
        &mut self,
        buf: &FrameBuffer,
        offset: usize,
        count: usize,
    ) -> Result<usize, LayoutError> {
        if self.elements.len() != count {
            tracing::trace!(from = self.elements.len(), to = count, "resizing structure array");
            reserve_elements(&mut self.elements, count)?;
            self.elements.resize_with(count, S::default);
        }

        self.offset = offset;
        self.end_offset = offset;
        self.spans.clear();
        self.spans.reserve(self.elements.len());

        let mut end = offset;
        for element in &mut self.elements {
            let size = layout_structure(element, buf, end)?;
            self.spans.push(Span::new(end, size));
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
