//! Scene configurations.
//!
//! A scene lists everything the render loop needs to allocate: interleaved vertex data, indices,
//! attribute bindings, the shader pair and the optional texture and transform stack.

use lantern::pixel::PixelFormat;
use lantern::texture::Sampler;
use lantern::vertex::{AttribType, VertexAttrib};
use std::mem::size_of;

const F32: usize = size_of::<f32>();

/// Names of the built-in scenes.
pub const SCENE_NAMES: [&str; 3] = ["triangle", "quad", "pyramid"];

/// Texture sampled by a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureConfig {
  /// Image file, relative to the assets directory.
  pub file: &'static str,
  /// Name of the sampler uniform.
  pub uniform: &'static str,
  pub unit: u32,
  /// Requested format; the decoder may select another one.
  pub format: PixelFormat,
  pub sampler: Sampler,
}

/// Model / view / projection transforms of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformConfig {
  /// Axis the model spins about.
  pub axis: [f32; 3],
  /// Degrees added to the model rotation on every tick.
  pub degrees_per_tick: f32,
  pub view_translation: [f32; 3],
  /// Vertical field of view, in degrees.
  pub fovy: f32,
  pub near: f32,
  pub far: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
  pub name: &'static str,
  /// Interleaved vertex data.
  pub vertices: Vec<f32>,
  pub indices: Vec<u32>,
  pub attribs: Vec<VertexAttrib>,
  /// Vertex stage source, relative to the assets directory.
  pub vertex_shader: &'static str,
  /// Fragment stage source, relative to the assets directory.
  pub fragment_shader: &'static str,
  pub texture: Option<TextureConfig>,
  /// Value of the `scale` uniform, if the scene uses it.
  pub scale: Option<f32>,
  pub transform: Option<TransformConfig>,
  pub clear_color: [f32; 4],
  pub depth_test: bool,
}

impl SceneConfig {
  /// Look a built-in scene up by name.
  pub fn by_name(name: &str) -> Option<Self> {
    match name {
      "triangle" => Some(Self::triangle()),
      "quad" => Some(Self::quad()),
      "pyramid" => Some(Self::pyramid()),
      _ => None,
    }
  }

  /// Triangle split into three smaller ones, colored per vertex.
  pub fn triangle() -> Self {
    let s = 3f32.sqrt();

    #[rustfmt::skip]
    let vertices = vec![
      -0.5,  -0.5 * s / 3., 0.,      0.8, 0.3,  0.02, // lower left
       0.5,  -0.5 * s / 3., 0.,      0.8, 0.3,  0.02, // lower right
       0.,    0.5 * s * 2. / 3., 0., 1.0, 0.6,  0.32, // upper
      -0.25,  0.5 * s / 6., 0.,      0.9, 0.45, 0.17, // inner left
       0.25,  0.5 * s / 6., 0.,      0.9, 0.45, 0.17, // inner right
       0.,   -0.5 * s / 3., 0.,      0.8, 0.3,  0.02, // inner down
    ];

    SceneConfig {
      name: "triangle",
      vertices,
      indices: vec![0, 3, 5, 3, 2, 4, 5, 4, 1],
      attribs: vec![
        VertexAttrib::new(0, 3, AttribType::F32, 6 * F32, 0),
        VertexAttrib::new(1, 3, AttribType::F32, 6 * F32, 3 * F32),
      ],
      vertex_shader: "default.vert",
      fragment_shader: "default.frag",
      texture: None,
      scale: Some(0.5),
      transform: None,
      clear_color: [0.07, 0.13, 0.17, 1.],
      depth_test: false,
    }
  }

  pub fn quad() -> Self {
    #[rustfmt::skip]
    let vertices = vec![
      -0.5, -0.5, 0.,   1., 0., 0.,   0., 0., // lower left
      -0.5,  0.5, 0.,   0., 1., 0.,   0., 1., // upper left
       0.5,  0.5, 0.,   0., 0., 1.,   1., 1., // upper right
       0.5, -0.5, 0.,   1., 1., 1.,   1., 0., // lower right
    ];

    SceneConfig {
      name: "quad",
      vertices,
      indices: vec![0, 2, 1, 0, 3, 2],
      attribs: textured_attribs(),
      vertex_shader: "quad.vert",
      fragment_shader: "textured.frag",
      texture: Some(brick()),
      scale: Some(0.5),
      transform: None,
      clear_color: [0.07, 0.13, 0.17, 1.],
      depth_test: false,
    }
  }

  /// Textured pyramid spinning about its vertical axis.
  pub fn pyramid() -> Self {
    #[rustfmt::skip]
    let vertices = vec![
      -0.5, 0.,  0.5,   0.83, 0.70, 0.44,   0.,  0.,
      -0.5, 0., -0.5,   0.83, 0.70, 0.44,   5.,  0.,
       0.5, 0., -0.5,   0.83, 0.70, 0.44,   0.,  0.,
       0.5, 0.,  0.5,   0.83, 0.70, 0.44,   5.,  0.,
       0.,  0.8, 0.,    0.92, 0.86, 0.76,   2.5, 5.,
    ];

    #[rustfmt::skip]
    let indices = vec![
      0, 1, 2,
      0, 2, 3,
      0, 1, 4,
      1, 2, 4,
      2, 3, 4,
      3, 0, 4,
    ];

    SceneConfig {
      name: "pyramid",
      vertices,
      indices,
      attribs: textured_attribs(),
      vertex_shader: "pyramid.vert",
      fragment_shader: "textured.frag",
      texture: Some(brick()),
      scale: None,
      transform: Some(TransformConfig {
        axis: [0., 1., 0.],
        degrees_per_tick: 0.5,
        view_translation: [0., -0.5, -2.],
        fovy: 45.,
        near: 0.1,
        far: 100.,
      }),
      clear_color: [0.07, 0.13, 0.17, 1.],
      depth_test: true,
    }
  }

  /// Number of vertices described by the vertex data.
  pub fn vertex_count(&self) -> usize {
    let stride = self
      .attribs
      .iter()
      .map(|attrib| attrib.effective_stride())
      .max()
      .unwrap_or(0);

    if stride == 0 {
      0
    } else {
      self.vertices.len() * F32 / stride
    }
  }
}

// position, color, texture coordinates
fn textured_attribs() -> Vec<VertexAttrib> {
  vec![
    VertexAttrib::new(0, 3, AttribType::F32, 8 * F32, 0),
    VertexAttrib::new(1, 3, AttribType::F32, 8 * F32, 3 * F32),
    VertexAttrib::new(2, 2, AttribType::F32, 8 * F32, 6 * F32),
  ]
}

fn brick() -> TextureConfig {
  TextureConfig {
    file: "brick.png",
    uniform: "tex0",
    unit: 0,
    format: PixelFormat::RGB,
    // repeat wrapping, linear filtering
    sampler: Sampler::default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_name_resolves() {
    for name in SCENE_NAMES.iter() {
      let scene = SceneConfig::by_name(name).unwrap();
      assert_eq!(scene.name, *name);
    }

    assert!(SceneConfig::by_name("cube").is_none());
  }

  #[test]
  fn indices_stay_within_vertices() {
    for name in SCENE_NAMES.iter() {
      let scene = SceneConfig::by_name(name).unwrap();
      let vertex_count = scene.vertex_count();

      assert!(scene.indices.iter().all(|&i| (i as usize) < vertex_count));
      assert_eq!(scene.indices.len() % 3, 0);
    }
  }

  #[test]
  fn vertex_counts() {
    assert_eq!(SceneConfig::triangle().vertex_count(), 6);
    assert_eq!(SceneConfig::quad().vertex_count(), 4);
    assert_eq!(SceneConfig::pyramid().vertex_count(), 5);
    assert_eq!(SceneConfig::pyramid().indices.len(), 18);
  }
}
