//! GPU buffers.
//!
//! A [`Buffer`] owns one GPU buffer object holding raw bytes: vertex data or index data, as told
//! by its [`BufferKind`]. The content is uploaded once, at creation, and never changes; if you
//! need different data, create another buffer.

use std::{error, fmt, mem};

use crate::backend::buffer::Buffer as BufferBackend;
use crate::context::GraphicsContext;

/// What a buffer is used for. This also selects the binding point it’s bound to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferKind {
  /// Vertex attribute data (array buffer).
  Vertex,
  /// Index data (element array buffer).
  Index,
}

impl fmt::Display for BufferKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      BufferKind::Vertex => f.write_str("vertex buffer"),
      BufferKind::Index => f.write_str("index buffer"),
    }
  }
}

/// Buffer errors.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum BufferError {
  /// The backend couldn’t hand out a buffer object; most likely no context is current.
  CreationFailed(BufferKind),
  /// Reading the buffer back failed.
  ReadFailed,
}

impl fmt::Display for BufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      BufferError::CreationFailed(kind) => write!(f, "cannot create {}", kind),
      BufferError::ReadFailed => f.write_str("cannot read buffer back"),
    }
  }
}

impl error::Error for BufferError {}

/// An owned GPU buffer.
///
/// The buffer is released when dropped. [`Buffer::release`] does the same, explicitly.
pub struct Buffer<B>
where
  B: ?Sized + BufferBackend,
{
  pub(crate) repr: B::BufferRepr,
  kind: BufferKind,
  len: usize,
}

impl<B> Drop for Buffer<B>
where
  B: ?Sized + BufferBackend,
{
  fn drop(&mut self) {
    unsafe { B::destroy_buffer(&mut self.repr) };
  }
}

impl<B> fmt::Debug for Buffer<B>
where
  B: ?Sized + BufferBackend,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Buffer")
      .field("kind", &self.kind)
      .field("len", &self.len)
      .finish()
  }
}

impl<B> Buffer<B>
where
  B: ?Sized + BufferBackend,
{
  /// Allocate a buffer of the given kind and upload `bytes` to it.
  pub fn new<C>(ctx: &mut C, kind: BufferKind, bytes: &[u8]) -> Result<Self, BufferError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let repr = unsafe { ctx.backend().new_buffer(kind, bytes)? };
    log::debug!("created {} ({} bytes)", kind, bytes.len());

    Ok(Buffer {
      repr,
      kind,
      len: bytes.len(),
    })
  }

  /// Allocate a buffer holding the raw bytes of a slice of plain values.
  pub fn from_slice<C, T>(ctx: &mut C, kind: BufferKind, values: &[T]) -> Result<Self, BufferError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
    T: bytemuck::Pod,
  {
    Self::new(ctx, kind, bytemuck::cast_slice(values))
  }

  /// Kind of the buffer.
  pub fn kind(&self) -> BufferKind {
    self.kind
  }

  /// Length of the buffer, in bytes.
  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Number of `T` the buffer can hold.
  pub fn len_of<T>(&self) -> usize {
    self.len / mem::size_of::<T>().max(1)
  }

  /// Make this buffer the current one for its kind.
  pub fn bind(&self) {
    unsafe { B::bind_buffer(&self.repr) }
  }

  /// Bind the null object to this buffer’s binding point.
  ///
  /// Calling this when nothing is bound is harmless.
  pub fn unbind(&self) {
    unsafe { B::unbind_buffer(&self.repr) }
  }

  /// Read the bytes held by the GPU back.
  pub fn read_back(&self) -> Result<Vec<u8>, BufferError> {
    unsafe { B::read_buffer(&self.repr) }
  }

  /// Release the GPU buffer now.
  pub fn release(self) {
    log::debug!("releasing {}", self.kind);
  }
}
