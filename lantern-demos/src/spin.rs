//! Model rotation and the transform stack.

use cgmath::{perspective, Deg, InnerSpace as _, Matrix4, SquareMatrix as _, Vector3};

/// Duration of one rotation tick, in seconds.
pub const TICK: f64 = 1. / 60.;

/// Rotation accumulating a fixed angle on every elapsed tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
  // normalized; `None` for a null axis, which never rotates
  axis: Option<Vector3<f32>>,
  step: Deg<f32>,
  ticks: u64,
}

impl Spin {
  pub fn new(axis: [f32; 3], degrees_per_tick: f32) -> Self {
    let axis = Vector3::from(axis);
    let axis = if axis.magnitude2() > 0. {
      Some(axis.normalize())
    } else {
      log::warn!("null rotation axis; the model will not spin");
      None
    };

    Spin {
      axis,
      step: Deg(degrees_per_tick),
      ticks: 0,
    }
  }

  /// Advance by one tick.
  pub fn tick(&mut self) {
    self.ticks += 1;
  }

  /// Catch up with `elapsed` seconds since the spin started.
  ///
  /// The spin never goes backwards.
  pub fn update(&mut self, elapsed: f64) {
    // absorb the rounding of elapsed times that are whole multiples of a tick
    let ticks = (elapsed / TICK + 1e-6).floor().max(0.) as u64;
    self.ticks = self.ticks.max(ticks);
  }

  pub fn ticks(&self) -> u64 {
    self.ticks
  }

  /// Accumulated rotation.
  pub fn angle(&self) -> Deg<f32> {
    Deg(self.step.0 * self.ticks as f32)
  }

  pub fn model(&self) -> Matrix4<f32> {
    match self.axis {
      Some(axis) => Matrix4::from_axis_angle(axis, self.angle()),
      None => Matrix4::identity(),
    }
  }
}

pub fn view(translation: [f32; 3]) -> Matrix4<f32> {
  Matrix4::from_translation(translation.into())
}

/// Perspective projection; `fovy` is in degrees.
pub fn projection(fovy: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
  perspective(Deg(fovy), aspect, near, far)
}
