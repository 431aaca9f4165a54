//! OpenGL vertex array implementation.

use crate::gl33::{state::GLState, GL33};
use gl::types::*;
use lantern::backend::vertex::VertexArray as VertexArrayBackend;
use lantern::state::Bind;
use lantern::vertex::{AttribType, VertexArrayError, VertexAttrib};
use std::{cell::RefCell, rc::Rc};

/// OpenGL vertex array object.
#[derive(Debug)]
pub struct VertexArray {
  handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

unsafe impl VertexArrayBackend for GL33 {
  type VertexArrayRepr = VertexArray;

  unsafe fn new_vertex_array(&mut self) -> Result<Self::VertexArrayRepr, VertexArrayError> {
    let mut handle: GLuint = 0;
    gl::GenVertexArrays(1, &mut handle);

    if handle == 0 {
      return Err(VertexArrayError::CreationFailed);
    }

    Ok(VertexArray {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn bind_vertex_array(vertex_array: &Self::VertexArrayRepr) {
    vertex_array
      .state
      .borrow_mut()
      .bind_vertex_array(vertex_array.handle, Bind::Cached);
  }

  unsafe fn unbind_vertex_array(vertex_array: &Self::VertexArrayRepr) {
    vertex_array
      .state
      .borrow_mut()
      .bind_vertex_array(0, Bind::Cached);
  }

  unsafe fn link_attrib(
    vertex_array: &mut Self::VertexArrayRepr,
    buffer: &Self::BufferRepr,
    attrib: &VertexAttrib,
  ) {
    let mut state = vertex_array.state.borrow_mut();
    state.bind_vertex_array(vertex_array.handle, Bind::Cached);
    state.bind_array_buffer(buffer.handle, Bind::Cached);

    gl::VertexAttribPointer(
      attrib.slot as GLuint,
      attrib.components as GLint,
      opengl_attrib_type(attrib.ty),
      gl::FALSE,
      attrib.stride as GLsizei,
      attrib.offset as *const GLvoid,
    );
    gl::EnableVertexAttribArray(attrib.slot as GLuint);
  }

  unsafe fn set_index_buffer(vertex_array: &mut Self::VertexArrayRepr, buffer: &Self::BufferRepr) {
    let mut state = vertex_array.state.borrow_mut();
    state.bind_vertex_array(vertex_array.handle, Bind::Cached);
    state.bind_element_array_buffer(buffer.handle, Bind::Cached);
  }

  unsafe fn destroy_vertex_array(vertex_array: &mut Self::VertexArrayRepr) {
    vertex_array
      .state
      .borrow_mut()
      .forget_vertex_array(vertex_array.handle);
    gl::DeleteVertexArrays(1, &vertex_array.handle);
  }
}

fn opengl_attrib_type(ty: AttribType) -> GLenum {
  match ty {
    AttribType::F32 => gl::FLOAT,
    AttribType::I32 => gl::INT,
    AttribType::U32 => gl::UNSIGNED_INT,
    AttribType::U8 => gl::UNSIGNED_BYTE,
  }
}
