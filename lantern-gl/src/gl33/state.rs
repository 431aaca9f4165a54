//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

use lantern::buffer::BufferKind;
use lantern::state::{Bind, BindingTable, Cached};
use lantern::texture::TextureTarget;

use crate::gl33::texture::opengl_target;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It acts as a forward-gate
/// to the low-level API but adds a small cache layer over it to prevent from issuing the same API
/// call (with the same parameters). Bindings are tracked by a [`BindingTable`].
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  bindings: BindingTable,

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,

  // depth test
  depth_test: Cached<DepthTest>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  /// Get a `GLState` from the current OpenGL context.
  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport()?);
      let clear_color = Cached::new(get_ctx_clear_color()?);
      let depth_test = Cached::new(get_ctx_depth_test()?);

      let mut bindings = BindingTable::new();
      bindings.bind_vertex_array(get_ctx_bound_vertex_array()?, Bind::Forced);
      bindings.use_program(get_ctx_current_program()?);
      bindings.set_texture_unit(get_ctx_current_texture_unit()?);

      log::debug!("acquired OpenGL state (viewport = {:?})", viewport.get());

      Ok(GLState {
        _a: PhantomData,
        bindings,
        viewport,
        clear_color,
        depth_test,
      })
    }
  }

  /// Current bindings.
  pub fn bindings(&self) -> &BindingTable {
    &self.bindings
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, depth_test: DepthTest) {
    if self.depth_test.is_invalid(&depth_test) {
      match depth_test {
        DepthTest::On => gl::Enable(gl::DEPTH_TEST),
        DepthTest::Off => gl::Disable(gl::DEPTH_TEST),
      }

      self.depth_test.set(depth_test);
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if self.bindings.bind_array_buffer(handle, bind) {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
    }
  }

  pub(crate) unsafe fn bind_element_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if self.bindings.bind_element_array_buffer(handle, bind) {
      gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, handle);
    }
  }

  pub(crate) unsafe fn bind_buffer(&mut self, kind: BufferKind, handle: GLuint, bind: Bind) {
    match kind {
      BufferKind::Vertex => self.bind_array_buffer(handle, bind),
      BufferKind::Index => self.bind_element_array_buffer(handle, bind),
    }
  }

  /// Forget a buffer that is being destroyed.
  pub(crate) fn forget_buffer(&mut self, handle: GLuint) {
    self.bindings.forget_buffer(handle);
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if self.bindings.bind_vertex_array(handle, bind) {
      gl::BindVertexArray(handle);
    }
  }

  pub(crate) fn forget_vertex_array(&mut self, handle: GLuint) {
    self.bindings.forget_vertex_array(handle);
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.bindings.use_program(handle) {
      gl::UseProgram(handle);
    }
  }

  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    self.bindings.forget_program(handle);
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.bindings.set_texture_unit(unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit as GLenum);
    }
  }

  /// Bind a texture on a unit, selecting the unit first.
  pub(crate) unsafe fn bind_texture(&mut self, unit: u32, target: TextureTarget, handle: GLuint) {
    self.set_texture_unit(unit);

    if self.bindings.bind_texture(unit, target, handle) {
      gl::BindTexture(opengl_target(target), handle);
    }
  }

  pub(crate) fn forget_texture(&mut self, handle: GLuint) {
    self.bindings.forget_texture(handle);
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted depth test state.
  UnknownDepthTestState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownDepthTestState(ref s) => write!(f, "unknown depth test state: {}", s),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_ctx_viewport() -> Result<[GLint; 4], StateQueryError> {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_clear_color() -> Result<[GLfloat; 4], StateQueryError> {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  Ok(data)
}

unsafe fn get_ctx_depth_test() -> Result<DepthTest, StateQueryError> {
  let state = gl::IsEnabled(gl::DEPTH_TEST);

  match state {
    gl::TRUE => Ok(DepthTest::On),
    gl::FALSE => Ok(DepthTest::Off),
    _ => Err(StateQueryError::UnknownDepthTestState(state)),
  }
}

unsafe fn get_ctx_current_texture_unit() -> Result<u32, StateQueryError> {
  let mut active_texture = gl::TEXTURE0 as GLint;
  gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut active_texture);
  Ok(active_texture as GLenum - gl::TEXTURE0)
}

unsafe fn get_ctx_bound_vertex_array() -> Result<GLuint, StateQueryError> {
  let mut bound = 0 as GLint;
  gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut bound);
  Ok(bound as GLuint)
}

unsafe fn get_ctx_current_program() -> Result<GLuint, StateQueryError> {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  Ok(used as GLuint)
}

/// Whether or not depth test should be enabled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum DepthTest {
  /// The depth test is enabled.
  On,
  /// The depth test is disabled.
  Off,
}

impl From<bool> for DepthTest {
  fn from(enabled: bool) -> Self {
    if enabled {
      DepthTest::On
    } else {
      DepthTest::Off
    }
  }
}
