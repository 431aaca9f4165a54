//! The render loop shared by every scene.
//!
//! A [`RenderLoop`] owns a surface and, once initialized, one instance of each GPU resource the
//! scene asks for. Each frame runs the same sequence:
//!
//! 1. clear the framebuffer;
//! 2. activate the shader program;
//! 3. update the per-frame uniforms;
//! 4. bind the texture and the vertex array;
//! 5. issue a single indexed draw;
//! 6. present;
//! 7. poll events.
//!
//! On termination, resources are released in reverse dependency order: texture, program, index
//! buffer, vertex buffer, vertex array.

use crate::error::DemoError;
use crate::scene::SceneConfig;
use crate::spin::{self, Spin};
use lantern::backend::buffer::Buffer as BufferBackend;
use lantern::backend::render::Render as RenderBackend;
use lantern::backend::shader::{Shader as ShaderBackend, Uniformable};
use lantern::backend::texture::Texture as TextureBackend;
use lantern::backend::vertex::VertexArray as VertexArrayBackend;
use lantern::buffer::{Buffer, BufferKind};
use lantern::context::GraphicsContext;
use lantern::pixel::PixelType;
use lantern::render::{IndexType, Mode};
use lantern::shader::{Program, Uniform};
use lantern::texture::{Texture, TextureTarget};
use lantern::vertex::VertexArray;
use lantern_windowing::{Surface, WindowEvent};
use std::path::{Path, PathBuf};

/// Everything a backend must support to run the demos.
pub trait DemoBackend:
  BufferBackend
  + VertexArrayBackend
  + ShaderBackend
  + TextureBackend
  + RenderBackend
  + Uniformable<f32>
  + Uniformable<i32>
  + Uniformable<[[f32; 4]; 4]>
{
}

impl<B> DemoBackend for B where
  B: ?Sized
    + BufferBackend
    + VertexArrayBackend
    + ShaderBackend
    + TextureBackend
    + RenderBackend
    + Uniformable<f32>
    + Uniformable<i32>
    + Uniformable<[[f32; 4]; 4]>
{
}

/// Backend of a surface.
pub type SurfaceBackend<S> = <<S as Surface>::Context as GraphicsContext>::Backend;

/// State of a [`RenderLoop`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopState {
  /// Nothing allocated yet.
  Uninitialized,
  /// Resources allocated, no frame rendered yet.
  Initialized,
  Running,
  /// Resources released. Nothing else can happen.
  Terminated,
}

struct TransformUniforms {
  model: Uniform<[[f32; 4]; 4]>,
  view: Uniform<[[f32; 4]; 4]>,
  proj: Uniform<[[f32; 4]; 4]>,
}

// fields are declared in release order
struct Resources<B>
where
  B: ?Sized + DemoBackend,
{
  texture: Option<Texture<B>>,
  program: Program<B>,
  index_buffer: Buffer<B>,
  vertex_buffer: Buffer<B>,
  vertex_array: VertexArray<B>,
  scale: Option<Uniform<f32>>,
  transform: Option<TransformUniforms>,
  index_count: usize,
}

impl<B> Resources<B>
where
  B: ?Sized + DemoBackend,
{
  fn new<C>(ctx: &mut C, scene: &SceneConfig, assets: &Path) -> Result<Self, DemoError>
  where
    C: ?Sized + GraphicsContext<Backend = B>,
  {
    let mut vertex_array = VertexArray::new(ctx)?;
    vertex_array.bind();

    let vertex_buffer = Buffer::from_slice(ctx, BufferKind::Vertex, &scene.vertices)?;
    let index_buffer = Buffer::from_slice(ctx, BufferKind::Index, &scene.indices)?;

    for attrib in &scene.attribs {
      vertex_array.link_attrib(&vertex_buffer, *attrib)?;
    }

    vertex_array.set_index_buffer(&index_buffer)?;

    vertex_array.unbind();
    vertex_buffer.unbind();
    index_buffer.unbind();

    let program = Program::from_paths(
      ctx,
      assets.join(scene.vertex_shader),
      assets.join(scene.fragment_shader),
    )?;

    let scale = scene.scale.map(|_| program.uniform::<f32>("scale"));
    let transform = scene.transform.as_ref().map(|_| TransformUniforms {
      model: program.uniform("model"),
      view: program.uniform("view"),
      proj: program.uniform("proj"),
    });

    let texture = match scene.texture {
      Some(ref config) => {
        let texture = Texture::from_path(
          ctx,
          assets.join(config.file),
          TextureTarget::Texture2D,
          config.unit,
          &config.sampler,
          config.format,
          PixelType::UnsignedByte,
        )?;
        texture.attach_to_uniform(&program, config.uniform, config.unit);

        Some(texture)
      }

      None => None,
    };

    Ok(Resources {
      texture,
      program,
      index_buffer,
      vertex_buffer,
      vertex_array,
      scale,
      transform,
      index_count: scene.indices.len(),
    })
  }

  fn release(self) {
    if let Some(texture) = self.texture {
      texture.release();
    }

    self.program.release();
    self.index_buffer.release();
    self.vertex_buffer.release();
    self.vertex_array.release();
  }
}

/// Render loop of one scene on one surface.
pub struct RenderLoop<S>
where
  S: Surface,
  SurfaceBackend<S>: DemoBackend,
{
  // dropped before the surface owning the context
  resources: Option<Resources<SurfaceBackend<S>>>,
  surface: S,
  scene: SceneConfig,
  assets: PathBuf,
  state: LoopState,
  spin: Option<Spin>,
  aspect: f32,
  frame_limit: Option<u64>,
  frames: u64,
}

impl<S> RenderLoop<S>
where
  S: Surface,
  SurfaceBackend<S>: DemoBackend,
{
  /// Create a loop for `scene`, reading its assets from the `assets` directory.
  pub fn new(surface: S, scene: SceneConfig, assets: impl Into<PathBuf>) -> Self {
    let spin = scene
      .transform
      .as_ref()
      .map(|t| Spin::new(t.axis, t.degrees_per_tick));

    RenderLoop {
      resources: None,
      surface,
      scene,
      assets: assets.into(),
      state: LoopState::Uninitialized,
      spin,
      aspect: 1.,
      frame_limit: None,
      frames: 0,
    }
  }

  /// Stop after `limit` frames; `None` runs until the surface is closed.
  pub fn with_frame_limit(self, limit: Option<u64>) -> Self {
    RenderLoop {
      frame_limit: limit,
      ..self
    }
  }

  pub fn state(&self) -> LoopState {
    self.state
  }

  pub fn frames(&self) -> u64 {
    self.frames
  }

  pub fn spin(&self) -> Option<&Spin> {
    self.spin.as_ref()
  }

  /// Aspect ratio used by the projection.
  pub fn aspect(&self) -> f32 {
    self.aspect
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }

  /// Allocate the scene’s resources and set up the fixed state.
  ///
  /// Does nothing unless the loop is [`LoopState::Uninitialized`].
  pub fn init(&mut self) -> Result<(), DemoError> {
    if self.state != LoopState::Uninitialized {
      return Ok(());
    }

    self.surface.make_current();

    let [width, height] = self.surface.framebuffer_size();
    let ctx = self.surface.context();

    let resources = Resources::new(ctx, &self.scene, &self.assets)?;

    ctx.set_viewport([0, 0, width as i32, height as i32]);
    ctx.set_depth_test(self.scene.depth_test);

    self.resize(width, height);
    self.resources = Some(resources);
    self.state = LoopState::Initialized;

    log::debug!("{} scene initialized", self.scene.name);

    Ok(())
  }

  /// Render one frame, then poll events.
  ///
  /// The loop terminates if a close was requested or the frame limit is reached.
  pub fn step(&mut self) -> Result<(), DemoError> {
    match self.state {
      LoopState::Uninitialized => self.init()?,
      LoopState::Terminated => return Ok(()),
      _ => (),
    }

    self.state = LoopState::Running;

    let elapsed = self.surface.elapsed();
    let resources = match self.resources {
      Some(ref resources) => resources,
      None => return Ok(()),
    };
    let ctx = self.surface.context();

    ctx.clear(self.scene.clear_color, self.scene.depth_test);

    let program = &resources.program;
    program.activate();

    if let (Some(uniform), Some(scale)) = (resources.scale.as_ref(), self.scene.scale) {
      program.set(uniform, scale);
    }

    if let (Some(uniforms), Some(config), Some(rotation)) = (
      resources.transform.as_ref(),
      self.scene.transform.as_ref(),
      self.spin.as_mut(),
    ) {
      rotation.update(elapsed);

      let proj = spin::projection(config.fovy, self.aspect, config.near, config.far);

      program.set(&uniforms.model, rotation.model().into());
      program.set(&uniforms.view, spin::view(config.view_translation).into());
      program.set(&uniforms.proj, proj.into());
    }

    if let Some(ref texture) = resources.texture {
      texture.bind();
    }

    resources.vertex_array.bind();

    ctx.draw_indexed(
      &resources.vertex_array,
      Mode::Triangles,
      resources.index_count,
      IndexType::U32,
    )?;

    self.surface.swap_buffers();
    self.frames += 1;

    for event in self.surface.poll_events() {
      match event {
        WindowEvent::CloseRequested => {
          log::debug!("close requested");
          self.terminate();
        }

        WindowEvent::Resized { width, height } => {
          self
            .surface
            .context()
            .set_viewport([0, 0, width as i32, height as i32]);
          self.resize(width, height);
        }
      }
    }

    if self.limit_reached() {
      log::debug!("frame limit reached ({})", self.frames);
      self.terminate();
    }

    Ok(())
  }

  /// Release every resource.
  pub fn terminate(&mut self) {
    if let Some(resources) = self.resources.take() {
      resources.release();
    }

    if self.state != LoopState::Terminated {
      log::debug!("{} scene terminated after {} frames", self.scene.name, self.frames);
      self.state = LoopState::Terminated;
    }
  }

  /// Run until termination and give the surface back.
  pub fn run(mut self) -> Result<S, DemoError> {
    self.init()?;

    while self.state != LoopState::Terminated {
      if self.surface.should_close() || self.limit_reached() {
        self.terminate();
        break;
      }

      self.step()?;
    }

    let RenderLoop { surface, .. } = self;

    Ok(surface)
  }

  fn limit_reached(&self) -> bool {
    self.frame_limit.map_or(false, |limit| self.frames >= limit)
  }

  fn resize(&mut self, width: u32, height: u32) {
    if width > 0 && height > 0 {
      self.aspect = width as f32 / height as f32;
    }
  }
}
