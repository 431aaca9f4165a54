use crate::gl33::{pixel::opengl_pixel_format, state::GLState, GL33};
use gl::types::*;
use lantern::backend::texture::{TexelUpload, Texture as TextureBackend};
use lantern::texture::{MagFilter, MinFilter, Sampler, TextureError, TextureTarget, Wrap};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug)]
pub struct Texture {
  handle: GLuint,
  target: TextureTarget,
  unit: u32,
  state: Rc<RefCell<GLState>>,
}

unsafe impl TextureBackend for GL33 {
  type TextureRepr = Texture;

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

    let mut handle: GLuint = 0;
    gl::GenTextures(1, &mut handle);

    if handle == 0 {
      return Err(TextureError::CreationFailed);
    }

    let mut state = self.state.borrow_mut();
    let gl_target = opengl_target(target);

    state.bind_texture(unit, target, handle);
    apply_sampler_to_texture(gl_target, sampler);

    let (format, iformat, ty) = opengl_pixel_format(upload.format, upload.pixel_type);

    // rows are tightly packed whatever their width
    gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
    gl::TexImage2D(
      gl_target,
      0,
      iformat as GLint,
      upload.size[0] as GLsizei,
      upload.size[1] as GLsizei,
      0,
      format,
      ty,
      upload.texels.as_ptr() as _,
    );
    gl::GenerateMipmap(gl_target);

    state.bind_texture(unit, target, 0);

    Ok(Texture {
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
    texture.state.borrow_mut().forget_texture(texture.handle);
    gl::DeleteTextures(1, &texture.handle);
  }
}

pub(crate) fn opengl_target(target: TextureTarget) -> GLenum {
  match target {
    TextureTarget::Texture2D => gl::TEXTURE_2D,
  }
}

fn apply_sampler_to_texture(target: GLenum, sampler: &Sampler) {
  unsafe {
    gl::TexParameteri(
      target,
      gl::TEXTURE_WRAP_S,
      opengl_wrap(sampler.wrap_s) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_WRAP_T,
      opengl_wrap(sampler.wrap_t) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_MIN_FILTER,
      opengl_min_filter(sampler.min_filter) as GLint,
    );
    gl::TexParameteri(
      target,
      gl::TEXTURE_MAG_FILTER,
      opengl_mag_filter(sampler.mag_filter) as GLint,
    );
  }
}

fn opengl_wrap(wrap: Wrap) -> GLenum {
  match wrap {
    Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    Wrap::Repeat => gl::REPEAT,
    Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_min_filter(filter: MinFilter) -> GLenum {
  match filter {
    MinFilter::Nearest => gl::NEAREST,
    MinFilter::Linear => gl::LINEAR,
    MinFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
    MinFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
    MinFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
    MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
  }
}

fn opengl_mag_filter(filter: MagFilter) -> GLenum {
  match filter {
    MagFilter::Nearest => gl::NEAREST,
    MagFilter::Linear => gl::LINEAR,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_wrap_mode_has_its_own_enum() {
    assert_eq!(opengl_wrap(Wrap::ClampToEdge), gl::CLAMP_TO_EDGE);
    assert_eq!(opengl_wrap(Wrap::Repeat), gl::REPEAT);
    assert_eq!(opengl_wrap(Wrap::MirroredRepeat), gl::MIRRORED_REPEAT);
  }

  #[test]
  fn mipmap_filters_only_apply_to_minification() {
    assert_eq!(
      opengl_min_filter(MinFilter::LinearMipmapLinear),
      gl::LINEAR_MIPMAP_LINEAR
    );
    assert_eq!(
      opengl_min_filter(MinFilter::NearestMipmapNearest),
      gl::NEAREST_MIPMAP_NEAREST
    );
    assert_eq!(opengl_min_filter(MinFilter::Nearest), gl::NEAREST);
    assert_eq!(opengl_mag_filter(MagFilter::Nearest), gl::NEAREST);
    assert_eq!(opengl_mag_filter(MagFilter::Linear), gl::LINEAR);
  }
}
