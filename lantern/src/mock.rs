//! Recording backend.
//!
//! [`Mock`] implements every backend trait without a GPU. It hands out handles, keeps the bytes
//! of buffers and textures on the host, drives the same [`BindingTable`] a real backend would and
//! records every driver call it would have issued in a call log. Draw calls are validated against
//! the bound objects: reading past the end of a buffer, drawing without program or vertex array,
//! or reading a deleted buffer is reported as a [`Fault`] instead of reading garbage.
//!
//! Like OpenGL, the element buffer binding is stored in the bound vertex array, and buffers are
//! uploaded through the array buffer binding point.
//!
//! [`MockContext`] is the [`GraphicsContext`] wrapping it; it also exposes inspection methods.

use std::{
  cell::{Ref, RefCell},
  collections::HashMap,
  rc::Rc,
};

use crate::backend::buffer::Buffer as BufferBackend;
use crate::backend::render::Render as RenderBackend;
use crate::backend::shader::{Shader as ShaderBackend, Uniformable};
use crate::backend::texture::{TexelUpload, Texture as TextureBackend};
use crate::backend::vertex::VertexArray as VertexArrayBackend;
use crate::buffer::{BufferError, BufferKind};
use crate::context::GraphicsContext;
use crate::pixel::{PixelFormat, PixelType};
use crate::render::{IndexType, Mode};
use crate::shader::{Program, ProgramError, StageError, StageType, Uniform};
use crate::state::{Bind, BindingTable, RawHandle};
use crate::texture::{Sampler, Texture, TextureError, TextureTarget};
use crate::vertex::{VertexArrayError, VertexAttrib};

/// A value written to a uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
  Float(f32),
  Int(i32),
  Mat44([[f32; 4]; 4]),
}

/// A driver call, as it would have been issued to the GPU.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
  CreateBuffer {
    handle: RawHandle,
    kind: BufferKind,
    len: usize,
  },
  BindBuffer {
    kind: BufferKind,
    handle: RawHandle,
  },
  ReadBuffer {
    handle: RawHandle,
  },
  DeleteBuffer {
    handle: RawHandle,
  },
  CreateVertexArray {
    handle: RawHandle,
  },
  BindVertexArray {
    handle: RawHandle,
  },
  VertexAttribPointer {
    vertex_array: RawHandle,
    buffer: RawHandle,
    attrib: VertexAttrib,
  },
  EnableVertexAttrib {
    slot: u32,
  },
  DeleteVertexArray {
    handle: RawHandle,
  },
  CompileShader {
    handle: RawHandle,
    stage: StageType,
  },
  DeleteShader {
    handle: RawHandle,
  },
  LinkProgram {
    handle: RawHandle,
  },
  UseProgram {
    handle: RawHandle,
  },
  SetUniform {
    program: RawHandle,
    location: i32,
    value: UniformValue,
  },
  DeleteProgram {
    handle: RawHandle,
  },
  CreateTexture {
    handle: RawHandle,
  },
  ActiveTexture {
    unit: u32,
  },
  BindTexture {
    target: TextureTarget,
    handle: RawHandle,
  },
  TexParameters {
    sampler: Sampler,
  },
  TexImage2D {
    size: [u32; 2],
    format: PixelFormat,
    pixel_type: PixelType,
  },
  GenerateMipmap {
    target: TextureTarget,
  },
  DeleteTexture {
    handle: RawHandle,
  },
  Viewport {
    viewport: [i32; 4],
  },
  DepthTest {
    enabled: bool,
  },
  Clear {
    color: [f32; 4],
    depth: bool,
  },
  DrawElements {
    mode: Mode,
    count: usize,
    index_type: IndexType,
  },
  DrawArrays {
    mode: Mode,
    first: usize,
    count: usize,
  },
}

/// Misuse detected by the recording backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fault {
  /// A draw call was issued with no vertex array bound.
  NoVertexArray,
  /// A draw call was issued with no program in use.
  NoProgram,
  /// An indexed draw was issued on a vertex array without index buffer.
  NoIndexBuffer,
  /// A draw call read a buffer that was deleted. `slot` is `None` for the index buffer.
  DanglingBuffer {
    slot: Option<u32>,
    buffer: RawHandle,
  },
  /// An indexed draw read more indices than the index buffer holds.
  IndexBufferOverflow { requested: usize, len: usize },
  /// A vertex attribute read past the end of its buffer.
  OutOfBounds {
    slot: u32,
    buffer: RawHandle,
    needed: usize,
    len: usize,
  },
  /// A uniform was written while another program was in use.
  UniformWithoutProgram { program: RawHandle, location: i32 },
}

#[derive(Debug, Default)]
struct VertexArrayObject {
  // enabled attributes, one per slot
  attribs: Vec<(VertexAttrib, RawHandle)>,
  element_buffer: RawHandle,
}

#[derive(Debug, Default)]
struct ProgramObject {
  // active uniforms; the location of a uniform is its index
  uniforms: Vec<String>,
  values: HashMap<i32, UniformValue>,
}

#[derive(Debug, Default)]
struct MockState {
  bindings: BindingTable,
  last_handle: RawHandle,
  buffers: HashMap<RawHandle, Vec<u8>>,
  vertex_arrays: HashMap<RawHandle, VertexArrayObject>,
  stages: HashMap<RawHandle, Vec<String>>,
  programs: HashMap<RawHandle, ProgramObject>,
  textures: HashMap<RawHandle, Vec<u8>>,
  calls: Vec<Call>,
  faults: Vec<Fault>,
  link_failure: Option<String>,
}

impl MockState {
  fn gen(&mut self) -> RawHandle {
    self.last_handle += 1;
    self.last_handle
  }

  fn record(&mut self, call: Call) {
    self.calls.push(call);
  }

  fn fault(&mut self, fault: Fault) {
    log::warn!("recording backend fault: {:?}", fault);
    self.faults.push(fault);
  }

  fn bind_buffer(&mut self, kind: BufferKind, handle: RawHandle, bind: Bind) {
    if self.bindings.bind_buffer(kind, handle, bind) {
      self.record(Call::BindBuffer { kind, handle });

      if kind == BufferKind::Index {
        let current = self.bindings.vertex_array();

        if let Some(vao) = self.vertex_arrays.get_mut(&current) {
          vao.element_buffer = handle;
        }
      }
    }
  }

  fn bind_vertex_array(&mut self, handle: RawHandle) {
    if self.bindings.bind_vertex_array(handle, Bind::Cached) {
      self.record(Call::BindVertexArray { handle });
    }
  }

  fn use_program(&mut self, handle: RawHandle) {
    if self.bindings.use_program(handle) {
      self.record(Call::UseProgram { handle });
    }
  }

  fn bind_texture(&mut self, unit: u32, target: TextureTarget, handle: RawHandle) {
    if self.bindings.set_texture_unit(unit) {
      self.record(Call::ActiveTexture { unit });
    }

    if self.bindings.bind_texture(unit, target, handle) {
      self.record(Call::BindTexture { target, handle });
    }
  }

  fn set_uniform(&mut self, program: RawHandle, location: i32, value: UniformValue) {
    if self.bindings.program() != program {
      self.fault(Fault::UniformWithoutProgram { program, location });
      return;
    }

    self.record(Call::SetUniform {
      program,
      location,
      value,
    });

    if let Some(object) = self.programs.get_mut(&program) {
      object.values.insert(location, value);
    }
  }

  fn live_objects(&self) -> usize {
    self.buffers.len()
      + self.vertex_arrays.len()
      + self.stages.len()
      + self.programs.len()
      + self.textures.len()
  }

  // faults common to every draw call, yielding the bound vertex array if any
  fn draw_faults(&self, faults: &mut Vec<Fault>) -> Option<&VertexArrayObject> {
    if self.bindings.program() == 0 || !self.programs.contains_key(&self.bindings.program()) {
      faults.push(Fault::NoProgram);
    }

    let vao = self.vertex_arrays.get(&self.bindings.vertex_array());

    if vao.is_none() {
      faults.push(Fault::NoVertexArray);
    }

    vao
  }

  fn attrib_faults(&self, vao: &VertexArrayObject, vert_nb: usize, faults: &mut Vec<Fault>) {
    for &(attrib, buffer) in &vao.attribs {
      match self.buffers.get(&buffer) {
        Some(data) => {
          let needed = attrib.required_len(vert_nb);

          if needed > data.len() {
            faults.push(Fault::OutOfBounds {
              slot: attrib.slot,
              buffer,
              needed,
              len: data.len(),
            });
          }
        }

        None => faults.push(Fault::DanglingBuffer {
          slot: Some(attrib.slot),
          buffer,
        }),
      }
    }
  }

  fn indexed_faults(&self, count: usize, index_type: IndexType) -> Vec<Fault> {
    let mut faults = Vec::new();

    let vao = match self.draw_faults(&mut faults) {
      Some(vao) => vao,
      None => return faults,
    };

    if vao.element_buffer == 0 {
      faults.push(Fault::NoIndexBuffer);
      return faults;
    }

    let indices = match self.buffers.get(&vao.element_buffer) {
      Some(indices) => indices,
      None => {
        faults.push(Fault::DanglingBuffer {
          slot: None,
          buffer: vao.element_buffer,
        });
        return faults;
      }
    };

    let bytes = count * index_type.bytes();

    if bytes > indices.len() {
      faults.push(Fault::IndexBufferOverflow {
        requested: count,
        len: indices.len() / index_type.bytes(),
      });
      return faults;
    }

    if count > 0 {
      let max_index = indices[..bytes]
        .chunks(index_type.bytes())
        .filter_map(|raw| index_type.read(raw))
        .max()
        .unwrap_or(0) as usize;

      self.attrib_faults(vao, max_index + 1, &mut faults);
    }

    faults
  }

  fn arrays_faults(&self, first: usize, count: usize) -> Vec<Fault> {
    let mut faults = Vec::new();

    if let Some(vao) = self.draw_faults(&mut faults) {
      if count > 0 {
        self.attrib_faults(vao, first + count, &mut faults);
      }
    }

    faults
  }
}

// uniforms declared as `uniform <type> <name>;`
fn declared_uniforms(src: &str) -> Vec<String> {
  src
    .lines()
    .filter_map(|line| line.trim().strip_prefix("uniform "))
    .filter_map(|decl| decl.split_whitespace().nth(1))
    .map(|name| name.trim_end_matches(';').to_owned())
    .collect()
}

/// The recording backend.
#[derive(Debug)]
pub struct Mock {
  state: Rc<RefCell<MockState>>,
}

#[derive(Debug)]
pub struct MockBuffer {
  handle: RawHandle,
  kind: BufferKind,
  state: Rc<RefCell<MockState>>,
}

#[derive(Debug)]
pub struct MockVertexArray {
  handle: RawHandle,
  state: Rc<RefCell<MockState>>,
}

#[derive(Debug)]
pub struct MockStage {
  handle: RawHandle,
  state: Rc<RefCell<MockState>>,
}

#[derive(Debug)]
pub struct MockProgram {
  handle: RawHandle,
  state: Rc<RefCell<MockState>>,
}

#[derive(Debug)]
pub struct MockTexture {
  handle: RawHandle,
  target: TextureTarget,
  unit: u32,
  state: Rc<RefCell<MockState>>,
}

unsafe impl BufferBackend for Mock {
  type BufferRepr = MockBuffer;

  unsafe fn new_buffer(
    &mut self,
    kind: BufferKind,
    bytes: &[u8],
  ) -> Result<Self::BufferRepr, BufferError> {
    let mut st = self.state.borrow_mut();
    let handle = st.gen();

    st.record(Call::CreateBuffer {
      handle,
      kind,
      len: bytes.len(),
    });
    st.bind_buffer(BufferKind::Vertex, handle, Bind::Cached);
    st.buffers.insert(handle, bytes.to_vec());

    Ok(MockBuffer {
      handle,
      kind,
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
    let mut st = buffer.state.borrow_mut();
    st.record(Call::ReadBuffer {
      handle: buffer.handle,
    });

    st.buffers
      .get(&buffer.handle)
      .cloned()
      .ok_or(BufferError::ReadFailed)
  }

  unsafe fn destroy_buffer(buffer: &mut Self::BufferRepr) {
    let mut st = buffer.state.borrow_mut();
    st.buffers.remove(&buffer.handle);
    st.bindings.forget_buffer(buffer.handle);
    st.record(Call::DeleteBuffer {
      handle: buffer.handle,
    });
  }
}

unsafe impl VertexArrayBackend for Mock {
  type VertexArrayRepr = MockVertexArray;

  unsafe fn new_vertex_array(&mut self) -> Result<Self::VertexArrayRepr, VertexArrayError> {
    let mut st = self.state.borrow_mut();
    let handle = st.gen();

    st.record(Call::CreateVertexArray { handle });
    st.vertex_arrays
      .insert(handle, VertexArrayObject::default());

    Ok(MockVertexArray {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn bind_vertex_array(vertex_array: &Self::VertexArrayRepr) {
    vertex_array
      .state
      .borrow_mut()
      .bind_vertex_array(vertex_array.handle);
  }

  unsafe fn unbind_vertex_array(vertex_array: &Self::VertexArrayRepr) {
    vertex_array.state.borrow_mut().bind_vertex_array(0);
  }

  unsafe fn link_attrib(
    vertex_array: &mut Self::VertexArrayRepr,
    buffer: &Self::BufferRepr,
    attrib: &VertexAttrib,
  ) {
    let mut st = vertex_array.state.borrow_mut();
    st.bind_vertex_array(vertex_array.handle);
    st.bind_buffer(BufferKind::Vertex, buffer.handle, Bind::Cached);

    // the attribute reads whatever array buffer is bound right now
    let bound = st.bindings.array_buffer();
    st.record(Call::VertexAttribPointer {
      vertex_array: vertex_array.handle,
      buffer: bound,
      attrib: *attrib,
    });
    st.record(Call::EnableVertexAttrib { slot: attrib.slot });

    if let Some(vao) = st.vertex_arrays.get_mut(&vertex_array.handle) {
      vao.attribs.retain(|(a, _)| a.slot != attrib.slot);
      vao.attribs.push((*attrib, bound));
    }
  }

  unsafe fn set_index_buffer(vertex_array: &mut Self::VertexArrayRepr, buffer: &Self::BufferRepr) {
    let mut st = vertex_array.state.borrow_mut();
    st.bind_vertex_array(vertex_array.handle);
    st.bind_buffer(BufferKind::Index, buffer.handle, Bind::Cached);
  }

  unsafe fn destroy_vertex_array(vertex_array: &mut Self::VertexArrayRepr) {
    let mut st = vertex_array.state.borrow_mut();
    st.vertex_arrays.remove(&vertex_array.handle);
    st.bindings.forget_vertex_array(vertex_array.handle);
    st.record(Call::DeleteVertexArray {
      handle: vertex_array.handle,
    });
  }
}

unsafe impl ShaderBackend for Mock {
  type StageRepr = MockStage;

  type ProgramRepr = MockProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    if !src.contains("main") {
      return Err(StageError::compilation_failed(
        ty,
        "0:1(1): error: no function with name 'main'",
      ));
    }

    let mut st = self.state.borrow_mut();
    let handle = st.gen();

    st.record(Call::CompileShader { handle, stage: ty });
    st.stages.insert(handle, declared_uniforms(src));

    Ok(MockStage {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    let mut st = stage.state.borrow_mut();
    st.stages.remove(&stage.handle);
    st.record(Call::DeleteShader {
      handle: stage.handle,
    });
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let mut st = self.state.borrow_mut();

    if let Some(log) = st.link_failure.take() {
      return Err(ProgramError::link_failed(log));
    }

    let mut uniforms = Vec::new();

    for stage in &[vertex.handle, fragment.handle] {
      let declared = st.stages.get(stage).ok_or(ProgramError::CreationFailed)?;

      for name in declared {
        if !uniforms.contains(name) {
          uniforms.push(name.clone());
        }
      }
    }

    let handle = st.gen();
    st.record(Call::LinkProgram { handle });
    st.programs.insert(
      handle,
      ProgramObject {
        uniforms,
        values: HashMap::new(),
      },
    );

    Ok(MockProgram {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn use_program(program: &Self::ProgramRepr) {
    program.state.borrow_mut().use_program(program.handle);
  }

  unsafe fn uniform_location(program: &Self::ProgramRepr, name: &str) -> i32 {
    if name.contains('\0') {
      return -1;
    }

    program
      .state
      .borrow()
      .programs
      .get(&program.handle)
      .and_then(|object| object.uniforms.iter().position(|u| u == name))
      .map_or(-1, |location| location as i32)
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    let mut st = program.state.borrow_mut();
    st.programs.remove(&program.handle);
    st.bindings.forget_program(program.handle);
    st.record(Call::DeleteProgram {
      handle: program.handle,
    });
  }
}

unsafe impl Uniformable<f32> for Mock {
  unsafe fn update(program: &Self::ProgramRepr, uniform: &Uniform<f32>, value: f32) {
    program.state.borrow_mut().set_uniform(
      program.handle,
      uniform.index(),
      UniformValue::Float(value),
    );
  }
}

unsafe impl Uniformable<i32> for Mock {
  unsafe fn update(program: &Self::ProgramRepr, uniform: &Uniform<i32>, value: i32) {
    program
      .state
      .borrow_mut()
      .set_uniform(program.handle, uniform.index(), UniformValue::Int(value));
  }
}

unsafe impl Uniformable<[[f32; 4]; 4]> for Mock {
  unsafe fn update(
    program: &Self::ProgramRepr,
    uniform: &Uniform<[[f32; 4]; 4]>,
    value: [[f32; 4]; 4],
  ) {
    program.state.borrow_mut().set_uniform(
      program.handle,
      uniform.index(),
      UniformValue::Mat44(value),
    );
  }
}

unsafe impl TextureBackend for Mock {
  type TextureRepr = MockTexture;

  unsafe fn new_texture(
    &mut self,
    target: TextureTarget,
    unit: u32,
    sampler: &Sampler,
    upload: TexelUpload,
  ) -> Result<Self::TextureRepr, TextureError> {
    let expected = upload.expected_len();

    if upload.texels.len() != expected {
      return Err(TextureError::TexelSizeMismatch {
        expected,
        found: upload.texels.len(),
      });
    }

    let mut st = self.state.borrow_mut();
    let handle = st.gen();

    st.record(Call::CreateTexture { handle });
    st.bind_texture(unit, target, handle);
    st.record(Call::TexParameters { sampler: *sampler });
    st.record(Call::TexImage2D {
      size: upload.size,
      format: upload.format,
      pixel_type: upload.pixel_type,
    });
    st.record(Call::GenerateMipmap { target });
    st.bind_texture(unit, target, 0);
    st.textures.insert(handle, upload.texels.to_vec());

    Ok(MockTexture {
      handle,
      target,
      unit,
      state: self.state.clone(),
    })
  }

  unsafe fn bind_texture(texture: &Self::TextureRepr) {
    texture
      .state
      .borrow_mut()
      .bind_texture(texture.unit, texture.target, texture.handle);
  }

  unsafe fn unbind_texture(texture: &Self::TextureRepr) {
    texture
      .state
      .borrow_mut()
      .bind_texture(texture.unit, texture.target, 0);
  }

  unsafe fn destroy_texture(texture: &mut Self::TextureRepr) {
    let mut st = texture.state.borrow_mut();
    st.textures.remove(&texture.handle);
    st.bindings.forget_texture(texture.handle);
    st.record(Call::DeleteTexture {
      handle: texture.handle,
    });
  }
}

unsafe impl RenderBackend for Mock {
  unsafe fn set_viewport(&mut self, viewport: [i32; 4]) {
    self.state.borrow_mut().record(Call::Viewport { viewport });
  }

  unsafe fn set_depth_test(&mut self, enabled: bool) {
    self.state.borrow_mut().record(Call::DepthTest { enabled });
  }

  unsafe fn clear(&mut self, color: [f32; 4], depth: bool) {
    self.state.borrow_mut().record(Call::Clear { color, depth });
  }

  unsafe fn draw_elements(&mut self, mode: Mode, count: usize, index_type: IndexType) {
    let mut st = self.state.borrow_mut();

    for fault in st.indexed_faults(count, index_type) {
      st.fault(fault);
    }

    st.record(Call::DrawElements {
      mode,
      count,
      index_type,
    });
  }

  unsafe fn draw_arrays(&mut self, mode: Mode, first: usize, count: usize) {
    let mut st = self.state.borrow_mut();

    for fault in st.arrays_faults(first, count) {
      st.fault(fault);
    }

    st.record(Call::DrawArrays { mode, first, count });
  }
}

/// Graphics context of the recording backend.
#[derive(Debug)]
pub struct MockContext {
  backend: Mock,
}

impl Default for MockContext {
  fn default() -> Self {
    Self::new()
  }
}

impl MockContext {
  pub fn new() -> Self {
    MockContext {
      backend: Mock {
        state: Rc::new(RefCell::new(MockState::default())),
      },
    }
  }

  fn state(&self) -> Ref<MockState> {
    self.backend.state.borrow()
  }

  /// Snapshot of the binding table.
  pub fn bindings(&self) -> BindingTable {
    self.state().bindings.clone()
  }

  /// Driver calls issued so far.
  pub fn calls(&self) -> Vec<Call> {
    self.state().calls.clone()
  }

  pub fn clear_calls(&mut self) {
    self.backend.state.borrow_mut().calls.clear();
  }

  /// Faults detected so far.
  pub fn faults(&self) -> Vec<Fault> {
    self.state().faults.clone()
  }

  /// Number of GPU objects not deleted yet, stages included.
  pub fn live_objects(&self) -> usize {
    self.state().live_objects()
  }

  /// Last value written to a uniform of `program`.
  pub fn uniform_value(&self, program: &Program<Mock>, name: &str) -> Option<UniformValue> {
    let location = unsafe { Mock::uniform_location(&program.repr, name) };

    self
      .state()
      .programs
      .get(&program.repr.handle)
      .and_then(|object| object.values.get(&location).copied())
  }

  /// Texels uploaded to `texture`.
  pub fn texture_texels(&self, texture: &Texture<Mock>) -> Option<Vec<u8>> {
    self.state().textures.get(&texture.repr.handle).cloned()
  }

  /// Make the next program link fail with the given log.
  pub fn fail_next_link(&mut self, log: impl Into<String>) {
    self.backend.state.borrow_mut().link_failure = Some(log.into());
  }
}

unsafe impl GraphicsContext for MockContext {
  type Backend = Mock;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uniform_declarations_are_parsed() {
    let src = "uniform mat4 model;\n  uniform sampler2D tex0;\nin vec3 pos;\nvoid main() {}";

    assert_eq!(declared_uniforms(src), vec!["model", "tex0"]);
  }

  #[test]
  fn draw_without_anything_bound_is_a_fault() {
    let mut ctx = MockContext::new();

    unsafe { ctx.backend().draw_elements(Mode::Triangles, 3, IndexType::U32) };

    assert_eq!(ctx.faults(), vec![Fault::NoProgram, Fault::NoVertexArray]);
  }
}
