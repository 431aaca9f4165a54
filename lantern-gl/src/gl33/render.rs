//! Per-frame commands.

use crate::gl33::{state::DepthTest, GL33};
use gl::types::*;
use lantern::backend::render::Render;
use lantern::render::{IndexType, Mode};

unsafe impl Render for GL33 {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]) {
    self.state.borrow_mut().set_viewport(viewport);
  }

  unsafe fn set_depth_test(&mut self, enabled: bool) {
    self
      .state
      .borrow_mut()
      .set_depth_test(DepthTest::from(enabled));
  }

  unsafe fn clear(&mut self, color: [f32; 4], depth: bool) {
    self.state.borrow_mut().set_clear_color(color);

    let depth_bit = if depth { gl::DEPTH_BUFFER_BIT } else { 0 };
    gl::Clear(gl::COLOR_BUFFER_BIT | depth_bit);
  }

  unsafe fn draw_elements(&mut self, mode: Mode, count: usize, index_type: IndexType) {
    gl::DrawElements(
      opengl_mode(mode),
      count as GLsizei,
      index_type_to_glenum(index_type),
      std::ptr::null(),
    );
  }

  unsafe fn draw_arrays(&mut self, mode: Mode, first: usize, count: usize) {
    gl::DrawArrays(opengl_mode(mode), first as GLint, count as GLsizei);
  }
}

fn opengl_mode(mode: Mode) -> GLenum {
  match mode {
    Mode::Points => gl::POINTS,
    Mode::Lines => gl::LINES,
    Mode::Triangles => gl::TRIANGLES,
    Mode::TriangleStrip => gl::TRIANGLE_STRIP,
    Mode::TriangleFan => gl::TRIANGLE_FAN,
  }
}

fn index_type_to_glenum(ty: IndexType) -> GLenum {
  match ty {
    IndexType::U8 => gl::UNSIGNED_BYTE,
    IndexType::U16 => gl::UNSIGNED_SHORT,
    IndexType::U32 => gl::UNSIGNED_INT,
  }
}
