//! Shader programs.
//!
//! A [`Program`] is built from the source text of two stages, a vertex stage and a fragment
//! stage. Both stages are compiled, linked together and then deleted; only the linked program is
//! kept. A `Program` value only exists if every step succeeded: compilation and link failures are
//! reported as [`ProgramError`] along with the diagnostic log of the driver.
//!
//! # Uniforms
//!
//! Uniforms are looked up by name with [`Program::uniform`], which doesn’t cache anything: keep
//! the returned [`Uniform`] around if you need it every frame. Looking up a name the linked
//! program doesn’t have yields an _unbound_ uniform; writing to it does nothing.
//!
//! Supported uniform types are `f32`, `i32` (typically texture units) and `[[f32; 4]; 4]`
//! matrices, read column by column.

use std::{
  error, fmt, fs, io,
  marker::PhantomData,
  path::{Path, PathBuf},
};

use crate::backend::shader::{Shader as ShaderBackend, Uniformable};
use crate::context::GraphicsContext;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  CompilationFailed(StageType, String),
  /// The backend couldn’t create the stage object at all.
  CreationFailed(StageType),
}

impl StageError {
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
      StageError::CreationFailed(ty) => write!(f, "cannot create {}", ty),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a program can generate.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProgramError {
  /// A stage source file couldn’t be read.
  Io { path: PathBuf, source: io::Error },
  /// A shader stage failed to compile.
  Stage(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained [`String`].
  LinkFailed(String),
  /// The backend couldn’t create the program object.
  CreationFailed,
}

impl ProgramError {
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ProgramError::Io {
        ref path,
        ref source,
      } => write!(f, "cannot read {}: {}", path.display(), source),
      ProgramError::Stage(ref e) => write!(f, "shader program has stage error: {}", e),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
      ProgramError::CreationFailed => f.write_str("cannot create shader program"),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::Io { source, .. } => Some(source),
      ProgramError::Stage(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::Stage(e)
  }
}

/// A shader uniform.
///
/// A negative index means the uniform is unbound: the program has no such active uniform.
pub struct Uniform<T>
where
  T: ?Sized,
{
  index: i32,
  _t: PhantomData<*const T>,
}

impl<T> Clone for Uniform<T>
where
  T: ?Sized,
{
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Uniform<T> where T: ?Sized {}

impl<T> fmt::Debug for Uniform<T>
where
  T: ?Sized,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Uniform({})", self.index)
  }
}

impl<T> PartialEq for Uniform<T>
where
  T: ?Sized,
{
  fn eq(&self, rhs: &Self) -> bool {
    self.index == rhs.index
  }
}

impl<T> Uniform<T>
where
  T: ?Sized,
{
  /// Wrap a raw location.
  ///
  /// # Safety
  ///
  /// The location must come from the program the uniform will be used with.
  pub unsafe fn new(index: i32) -> Self {
    Uniform {
      index,
      _t: PhantomData,
    }
  }

  /// The “not found” sentinel.
  pub fn unbound() -> Self {
    Uniform {
      index: -1,
      _t: PhantomData,
    }
  }

  pub fn index(&self) -> i32 {
    self.index
  }

  /// Whether the uniform was found in its program.
  pub fn is_active(&self) -> bool {
    self.index >= 0
  }
}

// compiled stage, deleted as soon as it goes out of scope
struct Stage<'a, B>
where
  B: ?Sized + ShaderBackend,
{
  repr: B::StageRepr,
  _b: PhantomData<&'a B>,
}

impl<B> Drop for Stage<'_, B>
where
  B: ?Sized + ShaderBackend,
{
  fn drop(&mut self) {
    unsafe { B::destroy_stage(&mut self.repr) };
  }
}

impl<'a, B> Stage<'a, B>
where
  B: ?Sized + ShaderBackend,
{
  fn new(backend: &mut B, ty: StageType, src: &str) -> Result<Self, StageError> {
    let repr = unsafe { backend.new_stage(ty, src)? };

    Ok(Stage {
      repr,
      _b: PhantomData,
    })
  }
}

/// A linked shader program.
pub struct Program<B>
where
  B: ?Sized + ShaderBackend,
{
  pub(crate) repr: B::ProgramRepr,
}

impl<B> Drop for Program<B>
where
  B: ?Sized + ShaderBackend,
{
  fn drop(&mut self) {
    unsafe { B::destroy_program(&mut self.repr) };
  }
}

impl<B> fmt::Debug for Program<B>
where
  B: ?Sized + ShaderBackend,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("Program")
  }
}

impl<B> Program<B>
where
  B: ?Sized + ShaderBackend,
{
  /// Compile and link a program from in-memory stage sources.
  pub fn from_strings<C>(
    ctx: &mut C,
    vertex_src: &str,
    fragment_src: &str,
  ) -> Result<Self, ProgramError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let backend = ctx.backend();
    let vertex = Stage::new(backend, StageType::VertexShader, vertex_src)?;
    let fragment = Stage::new(backend, StageType::FragmentShader, fragment_src)?;

    let repr = unsafe { backend.new_program(&vertex.repr, &fragment.repr)? };

    Ok(Program { repr })
  }

  /// Read the two stage sources from disk, then compile and link them.
  pub fn from_paths<C>(
    ctx: &mut C,
    vertex_path: impl AsRef<Path>,
    fragment_path: impl AsRef<Path>,
  ) -> Result<Self, ProgramError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let vertex_src = read_source(vertex_path.as_ref())?;
    let fragment_src = read_source(fragment_path.as_ref())?;

    log::debug!(
      "building program from {} and {}",
      vertex_path.as_ref().display(),
      fragment_path.as_ref().display()
    );

    Self::from_strings(ctx, &vertex_src, &fragment_src)
  }

  /// Make this program the current one for draw calls and uniform writes.
  pub fn activate(&self) {
    unsafe { B::use_program(&self.repr) }
  }

  /// Look a uniform up by name.
  ///
  /// Names the program doesn’t have yield [`Uniform::unbound`].
  pub fn uniform<T>(&self, name: &str) -> Uniform<T>
  where
    B: Uniformable<T>,
  {
    let index = unsafe { B::uniform_location(&self.repr, name) };

    if index < 0 {
      log::warn!("inactive uniform: {}", name);
      Uniform::unbound()
    } else {
      unsafe { Uniform::new(index) }
    }
  }

  /// Activate the program and write a value to one of its uniforms.
  pub fn set<T>(&self, uniform: &Uniform<T>, value: T)
  where
    B: Uniformable<T>,
  {
    self.activate();

    if uniform.is_active() {
      unsafe { B::update(&self.repr, uniform, value) }
    }
  }

  pub fn release(self) {}
}

fn read_source(path: &Path) -> Result<String, ProgramError> {
  fs::read_to_string(path).map_err(|source| ProgramError::Io {
    path: path.to_owned(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mock::{Call, MockContext, UniformValue};

  const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
uniform float scale;
uniform mat4 model;
void main() { gl_Position = model * vec4(aPos * scale, 1.0); }
";

  const FS: &str = "#version 330 core
out vec4 FragColor;
uniform sampler2D tex0;
void main() { FragColor = vec4(1.0); }
";

  #[test]
  fn stages_are_deleted_after_link() {
    let mut ctx = MockContext::new();

    let program = Program::from_strings(&mut ctx, VS, FS).unwrap();

    let calls = ctx.calls();
    let deleted = calls
      .iter()
      .filter(|c| matches!(c, Call::DeleteShader { .. }))
      .count();
    assert_eq!(deleted, 2);
    assert_eq!(ctx.live_objects(), 1);
    drop(program);
    assert_eq!(ctx.live_objects(), 0);
  }

  #[test]
  fn compilation_failure_yields_no_program() {
    let mut ctx = MockContext::new();

    let r = Program::from_strings(&mut ctx, VS, "this is not a shader");

    match r {
      Err(ProgramError::Stage(StageError::CompilationFailed(StageType::FragmentShader, _))) => (),
      r => panic!("unexpected result: {:?}", r),
    }

    // the vertex stage compiled fine and must not leak
    assert_eq!(ctx.live_objects(), 0);
  }

  #[test]
  fn link_failure_yields_no_program() {
    let mut ctx = MockContext::new();
    ctx.fail_next_link("error: vertex output never written");

    let r = Program::from_strings(&mut ctx, VS, FS);

    assert!(matches!(r, Err(ProgramError::LinkFailed(ref log)) if log.contains("never written")));
    assert_eq!(ctx.live_objects(), 0);
  }

  #[test]
  fn missing_source_file_reports_its_path() {
    let mut ctx = MockContext::new();
    let missing = std::env::temp_dir().join("lantern_no_such_shader.vert");

    let r = Program::from_paths(&mut ctx, &missing, &missing);

    match r {
      Err(ProgramError::Io { path, .. }) => assert_eq!(path, missing),
      r => panic!("unexpected result: {:?}", r),
    }
  }

  #[test]
  fn unknown_uniform_is_the_unbound_sentinel() {
    let mut ctx = MockContext::new();
    let program = Program::from_strings(&mut ctx, VS, FS).unwrap();

    let scale = program.uniform::<f32>("scale");
    let nope = program.uniform::<f32>("does_not_exist");

    assert!(scale.is_active());
    assert!(!nope.is_active());
    assert_eq!(nope, Uniform::unbound());

    // writing to the sentinel is a no-op
    program.set(&nope, 1.);
    assert!(ctx.faults().is_empty());
  }

  #[test]
  fn set_activates_and_writes() {
    let mut ctx = MockContext::new();
    let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
    let scale = program.uniform::<f32>("scale");
    let model = program.uniform::<[[f32; 4]; 4]>("model");
    let identity = [
      [1., 0., 0., 0.],
      [0., 1., 0., 0.],
      [0., 0., 1., 0.],
      [0., 0., 0., 1.],
    ];

    program.set(&scale, 0.5);
    program.set(&model, identity);

    assert_ne!(ctx.bindings().program(), 0);
    assert_eq!(
      ctx.uniform_value(&program, "scale"),
      Some(UniformValue::Float(0.5))
    );
    assert_eq!(
      ctx.uniform_value(&program, "model"),
      Some(UniformValue::Mat44(identity))
    );
  }

  #[test]
  fn activation_is_cached() {
    let mut ctx = MockContext::new();
    let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
    ctx.clear_calls();

    program.activate();
    program.activate();

    let uses = ctx
      .calls()
      .iter()
      .filter(|c| matches!(c, Call::UseProgram { .. }))
      .count();
    assert_eq!(uses, 1);
  }
}
