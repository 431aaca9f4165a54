use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};
use lantern::mock::{Call, MockContext};
use lantern::pixel::{PixelFormat, PixelType};
use lantern::shader::Program;
use lantern::texture::{decode_image, Sampler, Texture, TextureError, TextureTarget};

fn temp_png(name: &str, image: DynamicImage) -> PathBuf {
  let path = std::env::temp_dir().join(format!(
    "lantern_{}_{}.png",
    name,
    std::process::id()
  ));
  image.save(&path).unwrap();
  path
}

fn upload(ctx: &mut MockContext, image: DynamicImage, name: &str) -> Texture<lantern::mock::Mock> {
  let path = temp_png(name, image);
  let texture = Texture::from_path(
    ctx,
    &path,
    TextureTarget::Texture2D,
    0,
    &Sampler::default(),
    PixelFormat::RGB,
    PixelType::UnsignedByte,
  )
  .unwrap();
  std::fs::remove_file(&path).unwrap();
  texture
}

#[test]
fn format_follows_the_channel_count() {
  let mut ctx = MockContext::new();

  let r = upload(
    &mut ctx,
    DynamicImage::ImageLuma8(ImageBuffer::from_pixel(4, 2, Luma([10]))),
    "one_channel",
  );
  let ra = upload(
    &mut ctx,
    DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(4, 2, LumaA([10, 20]))),
    "two_channels",
  );
  let rgb = upload(
    &mut ctx,
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 2, Rgb([1, 2, 3]))),
    "three_channels",
  );
  let rgba = upload(
    &mut ctx,
    DynamicImage::ImageRgba8(ImageBuffer::from_pixel(4, 2, Rgba([1, 2, 3, 4]))),
    "four_channels",
  );

  assert_eq!(r.format(), PixelFormat::R);
  assert_eq!(ra.format(), PixelFormat::RGB);
  assert_eq!(rgb.format(), PixelFormat::RGB);
  assert_eq!(rgba.format(), PixelFormat::RGBA);

  // the two-channel image is converted so that the upload matches RGB
  assert_eq!(ctx.texture_texels(&ra).map(|t| t.len()), Some(4 * 2 * 3));
  assert_eq!(ctx.texture_texels(&rgba).map(|t| t.len()), Some(4 * 2 * 4));
}

#[test]
fn decoded_file_keeps_its_size() {
  let path = temp_png(
    "size",
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(5, 3, Rgb([0, 0, 0]))),
  );

  let image = decode_image(&path).unwrap();
  std::fs::remove_file(&path).unwrap();

  assert_eq!(image.size(), [5, 3]);
  assert_eq!(image.channels(), 3);
}

#[test]
fn garbage_file_is_a_decode_error() {
  let path = std::env::temp_dir().join(format!("lantern_garbage_{}.png", std::process::id()));
  std::fs::write(&path, b"definitely not a png").unwrap();

  let r = decode_image(&path);
  std::fs::remove_file(&path).unwrap();

  assert!(matches!(r, Err(TextureError::Decode { .. })));
}

#[test]
fn sampler_uniform_receives_the_unit() {
  const VS: &str = "void main() { gl_Position = vec4(0.); }";
  const FS: &str = "uniform sampler2D tex0;\nvoid main() {}";

  let mut ctx = MockContext::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let texture = upload(
    &mut ctx,
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([0, 0, 0]))),
    "sampler",
  );

  texture.attach_to_uniform(&program, "tex0", 0);

  assert_eq!(
    ctx.uniform_value(&program, "tex0"),
    Some(lantern::mock::UniformValue::Int(0))
  );
  assert!(ctx
    .calls()
    .iter()
    .any(|c| matches!(c, Call::SetUniform { location: 0, .. })));
}
