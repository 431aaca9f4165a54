//! Vertex array backend interface.

use crate::backend::buffer::Buffer;
use crate::vertex::{VertexArrayError, VertexAttrib};

/// Vertex array backend.
pub unsafe trait VertexArray: Buffer {
  /// The inner representation of the vertex array for this backend.
  type VertexArrayRepr;

  unsafe fn new_vertex_array(&mut self) -> Result<Self::VertexArrayRepr, VertexArrayError>;

  unsafe fn bind_vertex_array(vertex_array: &Self::VertexArrayRepr);

  unsafe fn unbind_vertex_array(vertex_array: &Self::VertexArrayRepr);

  /// Bind the vertex array and `buffer`, point the attribute slot at `buffer` and enable it.
  unsafe fn link_attrib(
    vertex_array: &mut Self::VertexArrayRepr,
    buffer: &Self::BufferRepr,
    attrib: &VertexAttrib,
  );

  /// Bind the vertex array and then `buffer` as element buffer, so that the vertex array
  /// records it.
  unsafe fn set_index_buffer(vertex_array: &mut Self::VertexArrayRepr, buffer: &Self::BufferRepr);

  unsafe fn destroy_vertex_array(vertex_array: &mut Self::VertexArrayRepr);
}
