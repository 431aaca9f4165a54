use crate::gl33::{state::GLState, GL33};
use gl::{self, types::*};
use lantern::backend::shader::{Shader, Uniformable};
use lantern::shader::{ProgramError, StageError, StageType, Uniform};
use std::{
  cell::RefCell,
  ffi::CString,
  ptr::{null, null_mut},
  rc::Rc,
};

#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

unsafe fn link(handle: GLuint) -> Result<(), ProgramError> {
  gl::LinkProgram(handle);

  let mut linked: GLint = gl::FALSE.into();
  gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

  if linked == gl::TRUE.into() {
    Ok(())
  } else {
    let mut log_len: GLint = 0;
    gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

    let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
    gl::GetProgramInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

    Err(ProgramError::link_failed(info_log(log)))
  }
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(src.as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "source contains a NUL byte"))?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::CreationFailed(ty));
    }

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      log::debug!("compiled {}", ty);
      Ok(Stage { handle, ty })
    } else {
      let mut log_len: GLint = 0;
      gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

      let mut log: Vec<u8> = vec![0; log_len.max(0) as usize];
      gl::GetShaderInfoLog(handle, log_len, null_mut(), log.as_mut_ptr() as *mut GLchar);

      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, info_log(log)))
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    log::debug!("deleting {}", stage.ty);
    gl::DeleteShader(stage.handle);
  }

  unsafe fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::CreationFailed);
    }

    gl::AttachShader(handle, vertex.handle);
    gl::AttachShader(handle, fragment.handle);

    let linked = link(handle);

    gl::DetachShader(handle, vertex.handle);
    gl::DetachShader(handle, fragment.handle);

    if let Err(e) = linked {
      gl::DeleteProgram(handle);
      return Err(e);
    }

    Ok(Program {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn use_program(program: &Self::ProgramRepr) {
    program.state.borrow_mut().use_program(program.handle);
  }

  unsafe fn uniform_location(program: &Self::ProgramRepr, name: &str) -> i32 {
    match CString::new(name.as_bytes()) {
      Ok(c_name) => gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar),
      Err(_) => -1,
    }
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program.state.borrow_mut().forget_program(program.handle);
    gl::DeleteProgram(program.handle);
  }
}

// logs come NUL-terminated
fn info_log(mut log: Vec<u8>) -> String {
  if let Some(nul) = log.iter().position(|&b| b == 0) {
    log.truncate(nul);
  }

  String::from_utf8_lossy(&log).into_owned()
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

unsafe impl Uniformable<f32> for GL33 {
  unsafe fn update(_: &Self::ProgramRepr, uniform: &Uniform<f32>, value: f32) {
    gl::Uniform1f(uniform.index(), value);
  }
}

unsafe impl Uniformable<i32> for GL33 {
  unsafe fn update(_: &Self::ProgramRepr, uniform: &Uniform<i32>, value: i32) {
    gl::Uniform1i(uniform.index(), value);
  }
}

unsafe impl Uniformable<[[f32; 4]; 4]> for GL33 {
  unsafe fn update(_: &Self::ProgramRepr, uniform: &Uniform<[[f32; 4]; 4]>, value: [[f32; 4]; 4]) {
    gl::UniformMatrix4fv(uniform.index(), 1, gl::FALSE, value.as_ptr() as _);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn info_log_stops_at_nul() {
    assert_eq!(info_log(b"0:1: error\0\0\0".to_vec()), "0:1: error");
    assert_eq!(info_log(b"no nul".to_vec()), "no nul");
    assert_eq!(info_log(Vec::new()), "");
  }
}
