//! Render backend interface.
//!
//! Per-frame commands: viewport, depth test, clears and draw calls. Draw calls read whatever is
//! bound at the time they’re issued.

use crate::render::{IndexType, Mode};

pub unsafe trait Render {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]);

  unsafe fn set_depth_test(&mut self, enabled: bool);

  /// Clear the color buffer (and the depth buffer if asked to).
  unsafe fn clear(&mut self, color: [f32; 4], depth: bool);

  /// Draw `count` indices of type `index_type` from the bound element buffer, from offset 0.
  unsafe fn draw_elements(&mut self, mode: Mode, count: usize, index_type: IndexType);

  unsafe fn draw_arrays(&mut self, mode: Mode, first: usize, count: usize);
}
