//! Texture backend interface.

use crate::pixel::{PixelFormat, PixelType};
use crate::texture::{Sampler, TextureError, TextureTarget};

/// Texels handed to the backend at creation.
#[derive(Clone, Copy, Debug)]
pub struct TexelUpload<'a> {
  /// Width and height, in texels.
  pub size: [u32; 2],
  pub format: PixelFormat,
  pub pixel_type: PixelType,
  /// Row-major texels, first row at the bottom, no row padding.
  pub texels: &'a [u8],
}

impl TexelUpload<'_> {
  /// Number of bytes `texels` must hold.
  pub fn expected_len(&self) -> usize {
    self.size[0] as usize
      * self.size[1] as usize
      * self.format.channels()
      * self.pixel_type.bytes_per_channel()
  }
}

/// Texture backend.
pub unsafe trait Texture {
  /// Backend representation of a texture.
  ///
  /// The representation remembers its target and unit.
  type TextureRepr;

  /// Create a texture bound to `target` on `unit`, apply the sampler, upload the texels and
  /// generate the whole mipmap chain.
  ///
  /// The texture is left unbound.
  unsafe fn new_texture(
    &mut self,
    target: TextureTarget,
    unit: u32,
    sampler: &Sampler,
    upload: TexelUpload,
  ) -> Result<Self::TextureRepr, TextureError>;

  /// Select the texture’s unit and bind the texture on it.
  unsafe fn bind_texture(texture: &Self::TextureRepr);

  /// Select the texture’s unit and bind the null texture on it.
  unsafe fn unbind_texture(texture: &Self::TextureRepr);

  unsafe fn destroy_texture(texture: &mut Self::TextureRepr);
}
