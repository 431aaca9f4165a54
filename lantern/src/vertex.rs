//! Vertex arrays and attribute bindings.
//!
//! A [`VertexArray`] describes how the raw bytes of vertex buffers map to the per-vertex inputs
//! of a vertex shader. Each [`VertexAttrib`] associates an attribute slot (the `location` of the
//! input in the vertex stage) with a region of a buffer.
//!
//! Slot numbers are a contract with the shader program used to draw: nothing checks that they
//! match what the vertex stage declares.

use std::{error, fmt};

use crate::backend::vertex::VertexArray as VertexArrayBackend;
use crate::buffer::{Buffer, BufferKind};
use crate::context::GraphicsContext;
use crate::render::RenderError;

/// Type of the components of an attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttribType {
  /// 32-bit floating-point number.
  F32,
  /// 32-bit signed integer.
  I32,
  /// 32-bit unsigned integer.
  U32,
  /// 8-bit unsigned integer.
  U8,
}

impl AttribType {
  /// Size of one component, in bytes.
  pub fn bytes(self) -> usize {
    match self {
      AttribType::F32 | AttribType::I32 | AttribType::U32 => 4,
      AttribType::U8 => 1,
    }
  }
}

/// Attribute binding: where to find one attribute of every vertex in a buffer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttrib {
  /// Attribute slot (shader input location).
  pub slot: u32,
  /// Number of components (1 to 4).
  pub components: u8,
  /// Type of each component.
  pub ty: AttribType,
  /// Bytes between two consecutive vertices; `0` means tightly packed.
  pub stride: usize,
  /// Offset of the first component from the start of the buffer, in bytes.
  pub offset: usize,
}

impl VertexAttrib {
  pub fn new(slot: u32, components: u8, ty: AttribType, stride: usize, offset: usize) -> Self {
    VertexAttrib {
      slot,
      components,
      ty,
      stride,
      offset,
    }
  }

  /// Bytes read for one vertex.
  pub fn footprint(&self) -> usize {
    self.components as usize * self.ty.bytes()
  }

  /// Stride actually used by the GPU, resolving tight packing.
  pub fn effective_stride(&self) -> usize {
    if self.stride == 0 {
      self.footprint()
    } else {
      self.stride
    }
  }

  /// Bytes a buffer must hold so that vertices `0..vert_nb` can be read.
  pub fn required_len(&self, vert_nb: usize) -> usize {
    if vert_nb == 0 {
      0
    } else {
      self.offset + self.effective_stride() * (vert_nb - 1) + self.footprint()
    }
  }
}

/// Vertex array errors.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VertexArrayError {
  /// The backend couldn’t hand out a vertex array object.
  CreationFailed,
  /// An attribute was linked to a buffer that doesn’t hold vertex data.
  NotAVertexBuffer(BufferKind),
  /// An index buffer was set from a buffer that doesn’t hold indices.
  NotAnIndexBuffer(BufferKind),
  /// Attributes have 1 to 4 components.
  InvalidComponentCount(u8),
}

impl fmt::Display for VertexArrayError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      VertexArrayError::CreationFailed => f.write_str("cannot create vertex array"),
      VertexArrayError::NotAVertexBuffer(kind) => {
        write!(f, "cannot link an attribute to an {}", kind)
      }
      VertexArrayError::NotAnIndexBuffer(kind) => {
        write!(f, "cannot use a {} as index buffer", kind)
      }
      VertexArrayError::InvalidComponentCount(n) => {
        write!(f, "invalid attribute component count: {}", n)
      }
    }
  }
}

impl error::Error for VertexArrayError {}

// an attribute along with the length of the buffer it reads from, used to reject draws that
// would read past the end
#[derive(Clone, Copy, Debug)]
struct LinkedAttrib {
  attrib: VertexAttrib,
  buffer_len: usize,
}

/// An owned vertex array.
pub struct VertexArray<B>
where
  B: ?Sized + VertexArrayBackend,
{
  pub(crate) repr: B::VertexArrayRepr,
  attribs: Vec<LinkedAttrib>,
  index_len: Option<usize>,
}

impl<B> Drop for VertexArray<B>
where
  B: ?Sized + VertexArrayBackend,
{
  fn drop(&mut self) {
    unsafe { B::destroy_vertex_array(&mut self.repr) };
  }
}

impl<B> fmt::Debug for VertexArray<B>
where
  B: ?Sized + VertexArrayBackend,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("VertexArray")
      .field("attribs", &self.attribs)
      .field("index_len", &self.index_len)
      .finish()
  }
}

impl<B> VertexArray<B>
where
  B: ?Sized + VertexArrayBackend,
{
  /// Allocate an empty vertex array.
  pub fn new<C>(ctx: &mut C) -> Result<Self, VertexArrayError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let repr = unsafe { ctx.backend().new_vertex_array()? };

    Ok(VertexArray {
      repr,
      attribs: Vec::new(),
      index_len: None,
    })
  }

  pub fn bind(&self) {
    unsafe { B::bind_vertex_array(&self.repr) }
  }

  /// Bind the null vertex array. Harmless if nothing is bound.
  pub fn unbind(&self) {
    unsafe { B::unbind_vertex_array(&self.repr) }
  }

  /// Link an attribute slot to a region of `buffer` and enable it.
  ///
  /// Linking a slot again replaces its previous binding. The vertex array and the buffer are both
  /// bound by this call and remain bound afterwards.
  pub fn link_attrib(
    &mut self,
    buffer: &Buffer<B>,
    attrib: VertexAttrib,
  ) -> Result<(), VertexArrayError> {
    if buffer.kind() != BufferKind::Vertex {
      return Err(VertexArrayError::NotAVertexBuffer(buffer.kind()));
    }

    if !(1..=4).contains(&attrib.components) {
      return Err(VertexArrayError::InvalidComponentCount(attrib.components));
    }

    unsafe { B::link_attrib(&mut self.repr, &buffer.repr, &attrib) };

    self.attribs.retain(|linked| linked.attrib.slot != attrib.slot);
    self.attribs.push(LinkedAttrib {
      attrib,
      buffer_len: buffer.len(),
    });

    Ok(())
  }

  /// Record `buffer` as the index buffer of this vertex array.
  pub fn set_index_buffer(&mut self, buffer: &Buffer<B>) -> Result<(), VertexArrayError> {
    if buffer.kind() != BufferKind::Index {
      return Err(VertexArrayError::NotAnIndexBuffer(buffer.kind()));
    }

    unsafe { B::set_index_buffer(&mut self.repr, &buffer.repr) };
    self.index_len = Some(buffer.len());

    Ok(())
  }

  /// Attribute bindings, in the order they were linked.
  pub fn attribs(&self) -> impl Iterator<Item = &VertexAttrib> + '_ {
    self.attribs.iter().map(|linked| &linked.attrib)
  }

  /// Byte length of the index buffer, if any.
  pub fn index_len(&self) -> Option<usize> {
    self.index_len
  }

  /// Check that vertices `first..first + count` are within every linked buffer.
  pub(crate) fn check_vertex_range(&self, first: usize, count: usize) -> Result<(), RenderError> {
    for linked in &self.attribs {
      let needed = linked.attrib.required_len(first + count);

      if count > 0 && needed > linked.buffer_len {
        return Err(RenderError::VertexOverflow {
          slot: linked.attrib.slot,
          needed,
          available: linked.buffer_len,
        });
      }
    }

    Ok(())
  }

  pub fn release(self) {}
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mock::{Call, MockContext};

  #[test]
  fn required_len_accounts_for_stride_and_offset() {
    let pos = VertexAttrib::new(0, 3, AttribType::F32, 32, 0);
    let uv = VertexAttrib::new(2, 2, AttribType::F32, 32, 24);

    assert_eq!(pos.required_len(4), 3 * 32 + 12);
    assert_eq!(uv.required_len(4), 24 + 3 * 32 + 8);
    assert_eq!(uv.required_len(0), 0);
  }

  #[test]
  fn tight_packing() {
    let attrib = VertexAttrib::new(0, 4, AttribType::U8, 0, 0);

    assert_eq!(attrib.effective_stride(), 4);
    assert_eq!(attrib.required_len(3), 12);
  }

  #[test]
  fn link_attrib_binds_the_buffer_and_enables_the_slot() {
    let mut ctx = MockContext::new();
    let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 18]).unwrap();
    // uploading leaves the latest buffer bound
    let _other = Buffer::new(&mut ctx, BufferKind::Vertex, &[0; 4]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();
    ctx.clear_calls();

    vao
      .link_attrib(&vbo, VertexAttrib::new(1, 3, AttribType::F32, 24, 12))
      .unwrap();

    let calls = ctx.calls();
    assert!(matches!(calls[0], Call::BindVertexArray { .. }));
    assert!(matches!(
      calls[1],
      Call::BindBuffer {
        kind: BufferKind::Vertex,
        ..
      }
    ));
    assert!(matches!(calls[2], Call::VertexAttribPointer { attrib, .. } if attrib.slot == 1));
    assert_eq!(calls[3], Call::EnableVertexAttrib { slot: 1 });
    assert_eq!(vao.attribs().count(), 1);
  }

  #[test]
  fn relinking_a_slot_replaces_its_binding() {
    let mut ctx = MockContext::new();
    let small = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 3]).unwrap();
    let large = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 9]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();

    let pos = VertexAttrib::new(0, 3, AttribType::F32, 0, 0);
    vao.link_attrib(&small, pos).unwrap();
    vao.link_attrib(&large, pos).unwrap();

    assert_eq!(vao.attribs().count(), 1);
    assert_eq!(vao.check_vertex_range(0, 3), Ok(()));
    assert_eq!(
      vao.check_vertex_range(0, 4),
      Err(RenderError::VertexOverflow {
        slot: 0,
        needed: 48,
        available: 36,
      })
    );
  }

  #[test]
  fn link_attrib_rejects_index_buffers() {
    let mut ctx = MockContext::new();
    let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &[0u32; 3]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();

    let r = vao.link_attrib(&ebo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0));

    assert_eq!(r, Err(VertexArrayError::NotAVertexBuffer(BufferKind::Index)));
    assert_eq!(vao.attribs().count(), 0);
  }

  #[test]
  fn link_attrib_rejects_bad_component_counts() {
    let mut ctx = MockContext::new();
    let vbo = Buffer::new(&mut ctx, BufferKind::Vertex, &[0; 64]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();

    for n in [0, 5] {
      let r = vao.link_attrib(&vbo, VertexAttrib::new(0, n, AttribType::F32, 0, 0));
      assert_eq!(r, Err(VertexArrayError::InvalidComponentCount(n)));
    }
  }

  #[test]
  fn set_index_buffer_rejects_vertex_buffers() {
    let mut ctx = MockContext::new();
    let vbo = Buffer::new(&mut ctx, BufferKind::Vertex, &[0; 8]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();

    assert_eq!(
      vao.set_index_buffer(&vbo),
      Err(VertexArrayError::NotAnIndexBuffer(BufferKind::Vertex))
    );
    assert_eq!(vao.index_len(), None);
  }

  #[test]
  fn unbind_twice_is_idempotent() {
    let mut ctx = MockContext::new();
    let vao = VertexArray::new(&mut ctx).unwrap();

    vao.bind();
    assert_ne!(ctx.bindings().vertex_array(), 0);

    vao.unbind();
    let once = ctx.bindings();
    vao.unbind();

    assert_eq!(ctx.bindings(), once);
    assert_eq!(ctx.bindings().vertex_array(), 0);
  }

  #[test]
  fn releasing_the_layout_keeps_its_buffers() {
    let mut ctx = MockContext::new();
    let vbo = Buffer::new(&mut ctx, BufferKind::Vertex, &[0; 12]).unwrap();
    let mut vao = VertexArray::new(&mut ctx).unwrap();
    vao
      .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0))
      .unwrap();

    vao.release();

    assert_eq!(ctx.live_objects(), 1);
    assert_eq!(vbo.read_back().unwrap().len(), 12);
  }
}
