//! [GLFW](https://crates.io/crates/glfw) backend for lantern.

#![deny(missing_docs)]

use glfw::{self, Action, Context as _, Glfw, InitError, Key, SwapInterval, Window, WindowMode};
use lantern::context::GraphicsContext;
pub use lantern_gl::gl33::StateQueryError;
use lantern_gl::GL33;
use lantern_windowing::{Surface, WindowDim, WindowEvent, WindowOpt};
use std::{error, fmt, os::raw::c_void, sync::mpsc::Receiver, time::Instant};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor could be found to go fullscreen on.
  NoPrimaryMonitor,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl From<StateQueryError> for GlfwSurfaceError {
  fn from(e: StateQueryError) -> Self {
    GlfwSurfaceError::GraphicsStateError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type exposes two important concepts: the GLFW event receiver, drained by
/// [`Surface::poll_events`], and the [`GL33Context`], which allows you to perform the rendering
/// part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, glfw::WindowEvent)>,

  /// Wrapped lantern context.
  pub context: GL33Context,

  opt: WindowOpt,
  start: Instant,
}

impl GlfwSurface {
  /// Initialize GLFW, open a window with an OpenGL 3.3 core context in it and acquire the
  /// graphics state.
  pub fn new(title: &str, opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));
    glfw.window_hint(glfw::WindowHint::Samples(opt.num_samples()));

    let (mut window, events_rx) = create_window(&mut glfw, title, opt.dim())?;

    window.make_current();
    window.set_key_polling(true);
    window.set_close_polling(true);
    window.set_framebuffer_size_polling(true);

    let interval = if opt.vsync() {
      SwapInterval::Sync(1)
    } else {
      SwapInterval::None
    };
    window.glfw.set_swap_interval(interval);

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new()?;
    let context = GL33Context { window, gl };

    log::debug!("GLFW surface ready ({:?})", opt.dim());

    Ok(GlfwSurface {
      events_rx,
      context,
      opt,
      start: Instant::now(),
    })
  }

  /// Options the surface was created with.
  pub fn opts(&self) -> &WindowOpt {
    &self.opt
  }
}

fn create_window(
  glfw: &mut Glfw,
  title: &str,
  dim: WindowDim,
) -> Result<(Window, Receiver<(f64, glfw::WindowEvent)>), GlfwSurfaceError> {
  match dim {
    WindowDim::Windowed(w, h) => glfw
      .create_window(w, h, title, WindowMode::Windowed)
      .ok_or(GlfwSurfaceError::WindowCreationFailed),

    WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
      let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
      let mode = monitor
        .get_video_mode()
        .ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

      glfw
        .create_window(mode.width, mode.height, title, WindowMode::FullScreen(monitor))
        .ok_or(GlfwSurfaceError::WindowCreationFailed)
    }),

    WindowDim::FullscreenRestricted(w, h) => glfw.with_primary_monitor(|glfw, monitor| {
      let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

      glfw
        .create_window(w, h, title, WindowMode::FullScreen(monitor))
        .ok_or(GlfwSurfaceError::WindowCreationFailed)
    }),
  }
}

fn adapt_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
  match event {
    glfw::WindowEvent::Close | glfw::WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(WindowEvent::CloseRequested)
    }

    glfw::WindowEvent::FramebufferSize(width, height) => Some(WindowEvent::Resized {
      width: width.max(0) as u32,
      height: height.max(0) as u32,
    }),

    _ => None,
  }
}

impl Surface for GlfwSurface {
  type Context = GL33Context;

  fn context(&mut self) -> &mut Self::Context {
    &mut self.context
  }

  fn make_current(&mut self) {
    self.context.window.make_current();
  }

  fn swap_buffers(&mut self) {
    self.context.window.swap_buffers();
  }

  fn poll_events(&mut self) -> Vec<WindowEvent> {
    self.context.window.glfw.poll_events();

    let events: Vec<_> = glfw::flush_messages(&self.events_rx)
      .filter_map(|(_, event)| adapt_event(event))
      .collect();

    if events.contains(&WindowEvent::CloseRequested) {
      self.context.window.set_should_close(true);
    }

    events
  }

  fn should_close(&self) -> bool {
    self.context.window.should_close()
  }

  fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.context.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  fn elapsed(&self) -> f64 {
    self.start.elapsed().as_secs_f64()
  }
}

/// lantern OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}
