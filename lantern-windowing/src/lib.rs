//! # lantern windowing
//!
//! This is the base, abstract crate for windowing types in lantern. The `lantern` crate abstracts
//! over the graphics API but it doesn’t give you a way to create a context: this is tightly
//! related to the kind of application you target. Windowing crates (`lantern-glfw`, for instance)
//! open a window, create a context in it and feed back the events the render loop cares about.
//!
//! # What’s included
//!
//! - [`WindowDim`]: the dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`WindowOpt`]: hints to customize the window integration, such as multisampling or vertical
//!   synchronization.
//! - [`WindowEvent`]: the events a render loop reacts to.
//! - [`Surface`]: the trait windowing backends implement so that an application stays agnostic of
//!   the backend.

#![deny(missing_docs)]

use lantern::context::GraphicsContext;

/// Dimension metrics.
///
///   - `Windowed(width, height)` opens in windowed mode with the wished resolution.
///   - `Fullscreen` opens in fullscreen mode by using the primary monitor resolution.
///   - `FullscreenRestricted(width, height)` is a mix between `Windowed(width, height)` and
///     `Fullscreen`. It opens in fullscreen mode by using the wished resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed(u32, u32),
  /// Fullscreen mode (adapt to your screen).
  Fullscreen,
  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted(u32, u32),
}

impl WindowDim {
  /// Requested size, if the mode carries one.
  pub fn size(&self) -> Option<[u32; 2]> {
    match *self {
      WindowDim::Windowed(w, h) | WindowDim::FullscreenRestricted(w, h) => Some([w, h]),
      WindowDim::Fullscreen => None,
    }
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to
/// start with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed(800, 800)`.
  /// - `num_samples` set to `None`.
  /// - `vsync` set to `true`.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed(800, 800),
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Wait for the vertical blank when presenting. Default to `true`.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether presenting waits for the vertical blank.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

/// Events a surface reports to its render loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowEvent {
  /// The user asked to close the surface (window close button, Escape key).
  CloseRequested,
  /// The framebuffer got a new size, in pixels.
  Resized {
    /// New width.
    width: u32,
    /// New height.
    height: u32,
  },
}

/// Rendering surface.
///
/// A surface owns a window (or whatever stands for one) along with the graphics context living in
/// it. Creating the surface is the implementor’s constructor.
pub trait Surface {
  /// Graphics context the surface renders with.
  type Context: GraphicsContext;

  /// Access the graphics context.
  fn context(&mut self) -> &mut Self::Context;

  /// Make the context of this surface the current one on the calling thread.
  fn make_current(&mut self);

  /// Present the back buffer.
  fn swap_buffers(&mut self);

  /// Gather the events received since the last call.
  fn poll_events(&mut self) -> Vec<WindowEvent>;

  /// Whether the surface was asked to close.
  fn should_close(&self) -> bool;

  /// Size of the surface’s framebuffer.
  fn framebuffer_size(&self) -> [u32; 2];

  /// Seconds elapsed since the surface was created.
  fn elapsed(&self) -> f64;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_opts() {
    let opt = WindowOpt::default();

    assert_eq!(opt.dim(), WindowDim::Windowed(800, 800));
    assert_eq!(opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn builder_keeps_other_fields() {
    let opt = WindowOpt::default()
      .set_num_samples(4)
      .set_dim(WindowDim::FullscreenRestricted(640, 480))
      .set_vsync(false);

    assert_eq!(opt.num_samples(), Some(4));
    assert_eq!(opt.dim(), WindowDim::FullscreenRestricted(640, 480));
    assert!(!opt.vsync());

    let opt = opt.set_num_samples(None);
    assert_eq!(opt.num_samples(), None);
    assert_eq!(opt.dim(), WindowDim::FullscreenRestricted(640, 480));
  }

  #[test]
  fn dim_size() {
    assert_eq!(WindowDim::Windowed(3, 4).size(), Some([3, 4]));
    assert_eq!(WindowDim::Fullscreen.size(), None);
  }
}
