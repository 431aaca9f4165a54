//! OpenGL buffer implementation.

use crate::gl33::{state::GLState, GL33};
use gl::types::*;
use lantern::backend::buffer::Buffer as BufferBackend;
use lantern::buffer::{BufferError, BufferKind};
use lantern::state::Bind;
use std::{cell::RefCell, rc::Rc};

/// OpenGL buffer.
#[derive(Debug)]
pub struct Buffer {
  pub(crate) handle: GLuint,
  kind: BufferKind,
  len: usize,
  state: Rc<RefCell<GLState>>,
}

unsafe impl BufferBackend for GL33 {
  type BufferRepr = Buffer;

  unsafe fn new_buffer(
    &mut self,
    kind: BufferKind,
    bytes: &[u8],
  ) -> Result<Self::BufferRepr, BufferError> {
    let mut handle: GLuint = 0;
    gl::GenBuffers(1, &mut handle);

    if handle == 0 {
      return Err(BufferError::CreationFailed(kind));
    }

    // every buffer is filled through the array buffer binding point; binding an element buffer
    // here would attach it to whatever vertex array is bound
    self
      .state
      .borrow_mut()
      .bind_array_buffer(handle, Bind::Forced);

    gl::BufferData(
      gl::ARRAY_BUFFER,
      bytes.len() as GLsizeiptr,
      bytes.as_ptr() as _,
      gl::STATIC_DRAW,
    );

    Ok(Buffer {
      handle,
      kind,
      len: bytes.len(),
      state: self.state.clone(),
    })
  }

  unsafe fn bind_buffer(buffer: &Self::BufferRepr) {
    buffer
      .state
      .borrow_mut()
      .bind_buffer(buffer.kind, buffer.handle, Bind::Cached);
  }

  unsafe fn unbind_buffer(buffer: &Self::BufferRepr) {
    buffer
      .state
      .borrow_mut()
      .bind_buffer(buffer.kind, 0, Bind::Cached);
  }

  unsafe fn read_buffer(buffer: &Self::BufferRepr) -> Result<Vec<u8>, BufferError> {
    let mut bytes = vec![0u8; buffer.len];

    buffer
      .state
      .borrow_mut()
      .bind_array_buffer(buffer.handle, Bind::Cached);

    gl::GetBufferSubData(
      gl::ARRAY_BUFFER,
      0,
      buffer.len as GLsizeiptr,
      bytes.as_mut_ptr() as _,
    );

    if gl::GetError() == gl::NO_ERROR {
      Ok(bytes)
    } else {
      Err(BufferError::ReadFailed)
    }
  }

  unsafe fn destroy_buffer(buffer: &mut Self::BufferRepr) {
    buffer.state.borrow_mut().forget_buffer(buffer.handle);
    gl::DeleteBuffers(1, &buffer.handle);
  }
}
