//! GPU textures.
//!
//! Textures are built once from a decoded image file. Decoding is done with the [`image`] crate;
//! the decoded image is flipped vertically so that its first row is the bottom of the picture,
//! which is what texture coordinates expect. The decoded texels only live until the upload is
//! done.
//!
//! Every texture is associated with one texture unit. Samplers of a shader program read a unit,
//! not a texture, so [`Texture::attach_to_uniform`] writes the unit index into the sampler
//! uniform once, and [`Texture::bind`] binds the texture on its unit before drawing.

use std::{
  error, fmt,
  path::{Path, PathBuf},
};

use image::{DynamicImage, GenericImageView};

use crate::backend::shader::Uniformable;
use crate::backend::texture::{TexelUpload, Texture as TextureBackend};
use crate::context::GraphicsContext;
use crate::pixel::{select_format, PixelFormat, PixelType};
use crate::shader::Program;

/// Kind of image a texture holds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TextureTarget {
  /// A 2D image.
  Texture2D,
}

/// Number of texture units a texture can be associated with.
///
/// This is the minimum number of combined texture image units an OpenGL 3.3 implementation
/// provides.
pub const MAX_TEXTURE_UNITS: u32 = 48;

/// How to wrap texture coordinates outside of [0; 1].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// Clamp to the edge texels.
  ClampToEdge,
  /// Repeat the texture.
  Repeat,
  /// Repeat the texture, mirroring it every other time.
  MirroredRepeat,
}

/// Minification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MinFilter {
  Nearest,
  Linear,
  NearestMipmapNearest,
  NearestMipmapLinear,
  LinearMipmapNearest,
  LinearMipmapLinear,
}

/// Magnification filter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MagFilter {
  Nearest,
  Linear,
}

/// A `Sampler` object gives hint on how a `Texture` should be sampled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
  /// How should we wrap around the *s* sampling coordinate?
  pub wrap_s: Wrap,
  /// How should we wrap around the *t* sampling coordinate?
  pub wrap_t: Wrap,
  /// Minification filter.
  pub min_filter: MinFilter,
  /// Magnification filter.
  pub mag_filter: MagFilter,
}

/// Repeat wrapping with linear filters.
impl Default for Sampler {
  fn default() -> Self {
    Sampler {
      wrap_s: Wrap::Repeat,
      wrap_t: Wrap::Repeat,
      min_filter: MinFilter::Linear,
      mag_filter: MagFilter::Linear,
    }
  }
}

/// Errors that might happen when working with textures.
#[non_exhaustive]
#[derive(Debug)]
pub enum TextureError {
  /// The image file couldn’t be opened or decoded.
  Decode {
    path: PathBuf,
    source: image::ImageError,
  },
  /// The backend couldn’t create the texture object.
  CreationFailed,
  /// The texels don’t cover the texture exactly.
  TexelSizeMismatch { expected: usize, found: usize },
  /// The texture unit is not below [`MAX_TEXTURE_UNITS`].
  UnsupportedUnit(u32),
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TextureError::Decode {
        ref path,
        ref source,
      } => write!(f, "cannot decode {}: {}", path.display(), source),

      TextureError::CreationFailed => f.write_str("cannot create texture"),

      TextureError::TexelSizeMismatch { expected, found } => write!(
        f,
        "texel size mismatch: expected {} bytes, found {} bytes",
        expected, found
      ),

      TextureError::UnsupportedUnit(unit) => write!(
        f,
        "unsupported texture unit {} (at most {} units)",
        unit, MAX_TEXTURE_UNITS
      ),
    }
  }
}

impl error::Error for TextureError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      TextureError::Decode { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// A decoded image, flipped so that its first row is the bottom one.
#[derive(Clone, Debug)]
pub struct DecodedImage {
  image: DynamicImage,
  channels: usize,
}

impl DecodedImage {
  /// Wrap an image the way [`decode_image`] does, flipping it vertically.
  pub fn from_image(image: DynamicImage) -> Self {
    let channels = image.color().channel_count() as usize;

    DecodedImage {
      image: image.flipv(),
      channels,
    }
  }

  /// Number of channels found in the file.
  pub fn channels(&self) -> usize {
    self.channels
  }

  pub fn size(&self) -> [u32; 2] {
    let (w, h) = self.image.dimensions();
    [w, h]
  }

  /// Texels converted to the layout of `format` and `pixel_type`.
  pub fn texels(&self, format: PixelFormat, pixel_type: PixelType) -> Vec<u8> {
    match (format, pixel_type) {
      (PixelFormat::R, PixelType::UnsignedByte) => self.image.to_luma8().into_raw(),
      (PixelFormat::RGB, PixelType::UnsignedByte) => self.image.to_rgb8().into_raw(),
      (PixelFormat::RGBA, PixelType::UnsignedByte) => self.image.to_rgba8().into_raw(),
      (PixelFormat::R, PixelType::UnsignedShort) => {
        bytemuck::cast_slice::<u16, u8>(&self.image.to_luma16().into_raw()).to_vec()
      }
      (PixelFormat::RGB, PixelType::UnsignedShort) => {
        bytemuck::cast_slice::<u16, u8>(&self.image.to_rgb16().into_raw()).to_vec()
      }
      (PixelFormat::RGBA, PixelType::UnsignedShort) => {
        bytemuck::cast_slice::<u16, u8>(&self.image.to_rgba16().into_raw()).to_vec()
      }
    }
  }
}

/// Decode an image file.
pub fn decode_image(path: impl AsRef<Path>) -> Result<DecodedImage, TextureError> {
  let path = path.as_ref();
  let image = image::open(path).map_err(|source| TextureError::Decode {
    path: path.to_owned(),
    source,
  })?;

  Ok(DecodedImage::from_image(image))
}

/// An owned GPU texture.
pub struct Texture<B>
where
  B: ?Sized + TextureBackend,
{
  pub(crate) repr: B::TextureRepr,
  target: TextureTarget,
  unit: u32,
  format: PixelFormat,
  pixel_type: PixelType,
  size: [u32; 2],
}

impl<B> Drop for Texture<B>
where
  B: ?Sized + TextureBackend,
{
  fn drop(&mut self) {
    unsafe { B::destroy_texture(&mut self.repr) }
  }
}

impl<B> fmt::Debug for Texture<B>
where
  B: ?Sized + TextureBackend,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Texture")
      .field("target", &self.target)
      .field("unit", &self.unit)
      .field("format", &self.format)
      .field("pixel_type", &self.pixel_type)
      .field("size", &self.size)
      .finish()
  }
}

impl<B> Texture<B>
where
  B: ?Sized + TextureBackend,
{
  /// Upload a decoded image to a new texture on `unit`, sampled with `sampler`.
  ///
  /// `format` is a request: if the image doesn’t have as many channels, the format is selected
  /// with [`select_format`] and the texels converted accordingly.
  pub fn new<C>(
    ctx: &mut C,
    image: &DecodedImage,
    target: TextureTarget,
    unit: u32,
    sampler: &Sampler,
    format: PixelFormat,
    pixel_type: PixelType,
  ) -> Result<Self, TextureError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    if unit >= MAX_TEXTURE_UNITS {
      return Err(TextureError::UnsupportedUnit(unit));
    }

    let selected = select_format(format, image.channels());

    if selected != format {
      log::warn!(
        "image has {} channels; uploading as {:?} instead of {:?}",
        image.channels(),
        selected,
        format
      );
    }

    let size = image.size();
    let texels = image.texels(selected, pixel_type);
    let upload = TexelUpload {
      size,
      format: selected,
      pixel_type,
      texels: &texels,
    };

    let repr = unsafe {
      ctx
        .backend()
        .new_texture(target, unit, sampler, upload)?
    };

    log::debug!(
      "created {}×{} {:?} texture on unit {}",
      size[0],
      size[1],
      selected,
      unit
    );

    Ok(Texture {
      repr,
      target,
      unit,
      format: selected,
      pixel_type,
      size,
    })
  }

  /// Decode an image file and upload it.
  pub fn from_path<C>(
    ctx: &mut C,
    path: impl AsRef<Path>,
    target: TextureTarget,
    unit: u32,
    sampler: &Sampler,
    format: PixelFormat,
    pixel_type: PixelType,
  ) -> Result<Self, TextureError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let image = decode_image(path)?;
    Self::new(ctx, &image, target, unit, sampler, format, pixel_type)
  }

  /// Select the texture’s unit and bind the texture on it.
  pub fn bind(&self) {
    unsafe { B::bind_texture(&self.repr) }
  }

  pub fn unbind(&self) {
    unsafe { B::unbind_texture(&self.repr) }
  }

  /// Write `unit` into the sampler uniform `name` of `program`.
  pub fn attach_to_uniform(&self, program: &Program<B>, name: &str, unit: u32)
  where
    B: Uniformable<i32>,
  {
    let uniform = program.uniform::<i32>(name);
    program.set(&uniform, unit as i32);
  }

  pub fn target(&self) -> TextureTarget {
    self.target
  }

  pub fn unit(&self) -> u32 {
    self.unit
  }

  /// Format the texels were uploaded with.
  pub fn format(&self) -> PixelFormat {
    self.format
  }

  pub fn pixel_type(&self) -> PixelType {
    self.pixel_type
  }

  pub fn size(&self) -> [u32; 2] {
    self.size
  }

  pub fn release(self) {}
}

#[cfg(test)]
mod tests {
  use image::{ImageBuffer, Luma, Rgb};

  use super::*;
  use crate::mock::{Call, MockContext};

  fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(w, h, |_, y| Rgb([y as u8, 0, 0])))
  }

  #[test]
  fn decoded_images_are_flipped() {
    let image = DecodedImage::from_image(gradient(2, 3));
    let texels = image.texels(PixelFormat::RGB, PixelType::UnsignedByte);

    // the bottom row of the picture (y = 2) comes first
    assert_eq!(&texels[..3], &[2, 0, 0]);
    assert_eq!(&texels[texels.len() - 3..], &[0, 0, 0]);
    assert_eq!(image.size(), [2, 3]);
  }

  #[test]
  fn sixteen_bit_texels_are_twice_as_large() {
    let image = DecodedImage::from_image(gradient(4, 4));

    let bytes = image.texels(PixelFormat::RGBA, PixelType::UnsignedByte);
    let shorts = image.texels(PixelFormat::RGBA, PixelType::UnsignedShort);

    assert_eq!(bytes.len(), 4 * 4 * 4);
    assert_eq!(shorts.len(), 2 * bytes.len());
  }

  #[test]
  fn upload_generates_mipmaps_and_unbinds() {
    let mut ctx = MockContext::new();
    let image = DecodedImage::from_image(gradient(8, 8));

    let texture = Texture::new(
      &mut ctx,
      &image,
      TextureTarget::Texture2D,
      3,
      &Sampler::default(),
      PixelFormat::RGB,
      PixelType::UnsignedByte,
    )
    .unwrap();

    let calls = ctx.calls();
    assert!(calls.iter().any(|c| matches!(c, Call::GenerateMipmap { .. })));
    assert_eq!(ctx.bindings().bound_texture(3), (TextureTarget::Texture2D, 0));
    assert_eq!(ctx.texture_texels(&texture).map(|t| t.len()), Some(8 * 8 * 3));
  }

  #[test]
  fn bind_selects_the_unit() {
    let mut ctx = MockContext::new();
    let image = DecodedImage::from_image(DynamicImage::ImageLuma8(ImageBuffer::from_pixel(
      2,
      2,
      Luma([255]),
    )));
    let texture = Texture::new(
      &mut ctx,
      &image,
      TextureTarget::Texture2D,
      1,
      &Sampler::default(),
      PixelFormat::R,
      PixelType::UnsignedByte,
    )
    .unwrap();

    texture.bind();
    assert_eq!(ctx.bindings().texture_unit(), Some(1));
    assert_ne!(ctx.bindings().bound_texture(1).1, 0);

    texture.unbind();
    let once = ctx.bindings();
    texture.unbind();
    assert_eq!(ctx.bindings(), once);
    assert_eq!(ctx.bindings().bound_texture(1).1, 0);
  }

  #[test]
  fn sampler_is_applied_at_upload() {
    let mut ctx = MockContext::new();
    let image = DecodedImage::from_image(gradient(4, 4));
    let sampler = Sampler {
      wrap_s: Wrap::ClampToEdge,
      wrap_t: Wrap::MirroredRepeat,
      min_filter: MinFilter::NearestMipmapLinear,
      mag_filter: MagFilter::Nearest,
    };

    Texture::new(
      &mut ctx,
      &image,
      TextureTarget::Texture2D,
      0,
      &sampler,
      PixelFormat::RGB,
      PixelType::UnsignedByte,
    )
    .unwrap();

    let calls = ctx.calls();
    let params = calls
      .iter()
      .position(|c| *c == Call::TexParameters { sampler })
      .unwrap();
    let upload = calls
      .iter()
      .position(|c| matches!(c, Call::TexImage2D { .. }))
      .unwrap();
    assert!(params < upload);
  }

  #[test]
  fn units_past_the_limit_are_rejected() {
    let mut ctx = MockContext::new();
    let image = DecodedImage::from_image(gradient(2, 2));

    for unit in [MAX_TEXTURE_UNITS, u32::MAX] {
      let r = Texture::new(
        &mut ctx,
        &image,
        TextureTarget::Texture2D,
        unit,
        &Sampler::default(),
        PixelFormat::RGB,
        PixelType::UnsignedByte,
      );

      assert!(matches!(r, Err(TextureError::UnsupportedUnit(u)) if u == unit));
    }

    assert!(ctx.calls().is_empty());
    assert_eq!(ctx.live_objects(), 0);
  }

  #[test]
  fn missing_file_is_a_decode_error() {
    let path = std::env::temp_dir().join("lantern_no_such_texture.png");

    match decode_image(&path) {
      Err(TextureError::Decode { path: p, .. }) => assert_eq!(p, path),
      r => panic!("unexpected result: {:?}", r.map(|i| i.size())),
    }
  }
}
