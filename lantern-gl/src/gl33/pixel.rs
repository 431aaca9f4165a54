use gl::types::*;
use lantern::pixel::{PixelFormat, PixelType};

// (format, internal format, type)
pub(crate) fn opengl_pixel_format(format: PixelFormat, ty: PixelType) -> (GLenum, GLenum, GLenum) {
  match (format, ty) {
    (PixelFormat::R, PixelType::UnsignedByte) => (gl::RED, gl::R8, gl::UNSIGNED_BYTE),
    (PixelFormat::R, PixelType::UnsignedShort) => (gl::RED, gl::R16, gl::UNSIGNED_SHORT),
    (PixelFormat::RGB, PixelType::UnsignedByte) => (gl::RGB, gl::RGB8, gl::UNSIGNED_BYTE),
    (PixelFormat::RGB, PixelType::UnsignedShort) => (gl::RGB, gl::RGB16, gl::UNSIGNED_SHORT),
    (PixelFormat::RGBA, PixelType::UnsignedByte) => (gl::RGBA, gl::RGBA8, gl::UNSIGNED_BYTE),
    (PixelFormat::RGBA, PixelType::UnsignedShort) => (gl::RGBA, gl::RGBA16, gl::UNSIGNED_SHORT),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sixteen_bit_formats_use_unsigned_shorts() {
    for &format in &[PixelFormat::R, PixelFormat::RGB, PixelFormat::RGBA] {
      let (_, _, ty) = opengl_pixel_format(format, PixelType::UnsignedShort);
      assert_eq!(ty, gl::UNSIGNED_SHORT);
    }
  }
}
