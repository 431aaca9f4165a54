use lantern::buffer::BufferError;
use lantern::render::RenderError;
use lantern::shader::ProgramError;
use lantern::texture::TextureError;
use lantern::vertex::VertexArrayError;
use lantern_glfw::GlfwSurfaceError;
use std::{error, fmt};

/// Anything that can stop a demo.
#[non_exhaustive]
#[derive(Debug)]
pub enum DemoError {
  UnknownScene(String),
  Surface(GlfwSurfaceError),
  Buffer(BufferError),
  VertexArray(VertexArrayError),
  Program(ProgramError),
  Texture(TextureError),
  Render(RenderError),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DemoError::UnknownScene(ref name) => write!(f, "unknown scene: {}", name),
      DemoError::Surface(ref e) => write!(f, "cannot create surface: {}", e),
      DemoError::Buffer(ref e) => write!(f, "buffer error: {}", e),
      DemoError::VertexArray(ref e) => write!(f, "vertex array error: {}", e),
      DemoError::Program(ref e) => write!(f, "shader program error: {}", e),
      DemoError::Texture(ref e) => write!(f, "texture error: {}", e),
      DemoError::Render(ref e) => write!(f, "render error: {}", e),
    }
  }
}

impl error::Error for DemoError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      DemoError::UnknownScene(_) => None,
      DemoError::Surface(e) => Some(e),
      DemoError::Buffer(e) => Some(e),
      DemoError::VertexArray(e) => Some(e),
      DemoError::Program(e) => Some(e),
      DemoError::Texture(e) => Some(e),
      DemoError::Render(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError> for DemoError {
  fn from(e: GlfwSurfaceError) -> Self {
    DemoError::Surface(e)
  }
}

impl From<BufferError> for DemoError {
  fn from(e: BufferError) -> Self {
    DemoError::Buffer(e)
  }
}

impl From<VertexArrayError> for DemoError {
  fn from(e: VertexArrayError) -> Self {
    DemoError::VertexArray(e)
  }
}

impl From<ProgramError> for DemoError {
  fn from(e: ProgramError) -> Self {
    DemoError::Program(e)
  }
}

impl From<TextureError> for DemoError {
  fn from(e: TextureError) -> Self {
    DemoError::Texture(e)
  }
}

impl From<RenderError> for DemoError {
  fn from(e: RenderError) -> Self {
    DemoError::Render(e)
  }
}
