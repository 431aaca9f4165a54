//! A surface without window, rendering with the recording backend.
//!
//! Time is simulated: every presented frame lasts exactly one sixtieth of a second, which keeps
//! runs deterministic.

use crate::spin::TICK;
use lantern::mock::MockContext;
use lantern_windowing::{Surface, WindowEvent};
use std::collections::VecDeque;

#[derive(Debug)]
pub struct HeadlessSurface {
  context: MockContext,
  size: [u32; 2],
  pending: VecDeque<WindowEvent>,
  closed: bool,
  presented: u64,
}

impl HeadlessSurface {
  pub fn new(size: [u32; 2]) -> Self {
    HeadlessSurface {
      context: MockContext::new(),
      size,
      pending: VecDeque::new(),
      closed: false,
      presented: 0,
    }
  }

  /// Queue an event, delivered by the next [`Surface::poll_events`].
  pub fn push_event(&mut self, event: WindowEvent) {
    self.pending.push_back(event);
  }

  /// Number of frames presented so far.
  pub fn presented(&self) -> u64 {
    self.presented
  }

  pub fn mock(&self) -> &MockContext {
    &self.context
  }
}

impl Surface for HeadlessSurface {
  type Context = MockContext;

  fn context(&mut self) -> &mut Self::Context {
    &mut self.context
  }

  fn make_current(&mut self) {}

  fn swap_buffers(&mut self) {
    self.presented += 1;
  }

  fn poll_events(&mut self) -> Vec<WindowEvent> {
    let events: Vec<_> = self.pending.drain(..).collect();

    for event in &events {
      match *event {
        WindowEvent::CloseRequested => self.closed = true,
        WindowEvent::Resized { width, height } => self.size = [width, height],
      }
    }

    events
  }

  fn should_close(&self) -> bool {
    self.closed
  }

  fn framebuffer_size(&self) -> [u32; 2] {
    self.size
  }

  fn elapsed(&self) -> f64 {
    self.presented as f64 * TICK
  }
}
