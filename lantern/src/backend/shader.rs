//! Shader backend interface.

use crate::shader::{ProgramError, StageError, StageType, Uniform};

/// Shader backend.
pub unsafe trait Shader {
  /// Representation of a compiled stage.
  type StageRepr;

  /// Representation of a linked program.
  type ProgramRepr;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  unsafe fn destroy_stage(stage: &mut Self::StageRepr);

  /// Link a vertex and a fragment stage into a program.
  ///
  /// Stages can be destroyed once this returns; the program keeps what it needs.
  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  unsafe fn use_program(program: &Self::ProgramRepr);

  /// Location of a uniform, or a negative value if the program has no such active uniform.
  unsafe fn uniform_location(program: &Self::ProgramRepr, name: &str) -> i32;

  unsafe fn destroy_program(program: &mut Self::ProgramRepr);
}

/// Types that can be sent to a uniform of a program.
///
/// The program is expected to be in use when [`Uniformable::update`] is called.
pub unsafe trait Uniformable<T>: Shader {
  unsafe fn update(program: &Self::ProgramRepr, uniform: &Uniform<T>, value: T);
}
