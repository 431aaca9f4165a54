//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device. This crate doesn’t create contexts: backend and windowing crates do.
//!
//! # On context and threads
//!
//!   - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. Backends keep
//!     their state behind an `Rc`, so this holds automatically.
//!   - Every wrapper created from a context goes through the single binding table of that context.
//!     Draw calls see whatever the latest bind / activate calls left in that table.

use crate::backend::render::Render as RenderBackend;
use crate::backend::vertex::VertexArray as VertexArrayBackend;
use crate::render::{IndexType, Mode, RenderError};
use crate::vertex::VertexArray;

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  type Backend: ?Sized;

  fn backend(&mut self) -> &mut Self::Backend;

  /// Set the viewport, as `[x, y, width, height]` in pixels.
  fn set_viewport(&mut self, viewport: [i32; 4])
  where
    Self::Backend: RenderBackend,
  {
    unsafe { self.backend().set_viewport(viewport) }
  }

  fn set_depth_test(&mut self, enabled: bool)
  where
    Self::Backend: RenderBackend,
  {
    unsafe { self.backend().set_depth_test(enabled) }
  }

  /// Clear the framebuffer with `color`, and the depth buffer as well if `depth` is set.
  fn clear(&mut self, color: [f32; 4], depth: bool)
  where
    Self::Backend: RenderBackend,
  {
    unsafe { self.backend().clear(color, depth) }
  }

  /// Bind `vertex_array` and issue one indexed draw of `count` indices from its index buffer.
  fn draw_indexed(
    &mut self,
    vertex_array: &VertexArray<Self::Backend>,
    mode: Mode,
    count: usize,
    index_type: IndexType,
  ) -> Result<(), RenderError>
  where
    Self::Backend: RenderBackend + VertexArrayBackend,
  {
    let index_len = vertex_array
      .index_len()
      .ok_or(RenderError::NoIndexBuffer)?;
    let available = index_len / index_type.bytes();

    if count > available {
      return Err(RenderError::IndexOverflow {
        requested: count,
        available,
      });
    }

    vertex_array.bind();
    unsafe { self.backend().draw_elements(mode, count, index_type) };

    Ok(())
  }

  /// Bind `vertex_array` and draw vertices `first..first + count`.
  fn draw_arrays(
    &mut self,
    vertex_array: &VertexArray<Self::Backend>,
    mode: Mode,
    first: usize,
    count: usize,
  ) -> Result<(), RenderError>
  where
    Self::Backend: RenderBackend + VertexArrayBackend,
  {
    vertex_array.check_vertex_range(first, count)?;

    vertex_array.bind();
    unsafe { self.backend().draw_arrays(mode, first, count) };

    Ok(())
  }
}
