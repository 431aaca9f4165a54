//! Buffer backend interface.

use crate::buffer::{BufferError, BufferKind};

/// Buffer backend.
///
/// You want to implement that trait on your backend type to support buffers.
pub unsafe trait Buffer {
  /// The inner representation of the buffer for this backend.
  type BufferRepr;

  /// Allocate a buffer of the given kind and upload `bytes` verbatim.
  unsafe fn new_buffer(
    &mut self,
    kind: BufferKind,
    bytes: &[u8],
  ) -> Result<Self::BufferRepr, BufferError>;

  /// Bind the buffer to the binding point of its kind.
  unsafe fn bind_buffer(buffer: &Self::BufferRepr);

  /// Bind the null object to the binding point of the buffer’s kind.
  unsafe fn unbind_buffer(buffer: &Self::BufferRepr);

  /// Read the whole content of the buffer back from the GPU.
  unsafe fn read_buffer(buffer: &Self::BufferRepr) -> Result<Vec<u8>, BufferError>;

  unsafe fn destroy_buffer(buffer: &mut Self::BufferRepr);
}
