//! Binding state.
//!
//! Graphics APIs of the OpenGL family keep a single, mutable table of “what is currently bound”
//! per context: the current array buffer, the current element buffer, the current vertex array,
//! the current program and, for every texture unit, the bound texture. Every draw call reads that
//! table implicitly, which is why the order of bind calls matters so much.
//!
//! [`BindingTable`] is the host-side mirror of that table. Backends own exactly one and route
//! every bind / activate through it. Each `bind_*` method is a pure mutation returning whether the
//! driver call must actually be issued, which lets backends skip redundant calls and lets tests
//! inspect the configuration a draw call will see.

use std::collections::BTreeMap;

use crate::buffer::BufferKind;
use crate::texture::TextureTarget;

/// Raw identifier of a GPU object. `0` is the null object.
pub type RawHandle = u32;

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bind {
  /// Always issue the driver call, even if the cache says the value is already set.
  Forced,
  /// Issue the driver call only if the cached value differs.
  Cached,
}

/// Cached value.
///
/// A cached value is used to prevent issuing costly GPU commands if we know the target value is
/// already set to what the command tries to set. An empty cache is always invalid, whatever the
/// compared value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Cache a value.
  pub fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Create an empty cache.
  pub fn empty() -> Self {
    Cached(None)
  }

  /// Explicitly invalidate a value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  pub fn invalidate(&mut self) {
    self.0 = None;
  }

  /// Set the cached value.
  pub fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// Get the cached value, if any.
  pub fn get(&self) -> Option<&T> {
    self.0.as_ref()
  }

  /// Check if the cached value is invalid regarding a value.
  pub fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// The current bindings of a graphics context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingTable {
  array_buffer: RawHandle,
  // element buffer binding is vertex array state, so it becomes unknown when the vertex array
  // changes
  element_array_buffer: Cached<RawHandle>,
  vertex_array: RawHandle,
  program: RawHandle,
  texture_unit: Cached<u32>,
  // units with a non-null texture bound
  bound_textures: BTreeMap<u32, (TextureTarget, RawHandle)>,
}

impl Default for BindingTable {
  fn default() -> Self {
    Self::new()
  }
}

impl BindingTable {
  /// A table where everything is bound to the null object and unit `0` is active.
  pub fn new() -> Self {
    BindingTable {
      array_buffer: 0,
      element_array_buffer: Cached::new(0),
      vertex_array: 0,
      program: 0,
      texture_unit: Cached::new(0),
      bound_textures: BTreeMap::new(),
    }
  }

  /// Currently bound array (vertex) buffer.
  pub fn array_buffer(&self) -> RawHandle {
    self.array_buffer
  }

  /// Currently bound element (index) buffer, if known.
  pub fn element_array_buffer(&self) -> Option<RawHandle> {
    self.element_array_buffer.get().copied()
  }

  /// Currently bound vertex array.
  pub fn vertex_array(&self) -> RawHandle {
    self.vertex_array
  }

  /// Currently active program.
  pub fn program(&self) -> RawHandle {
    self.program
  }

  /// Currently active texture unit, if known.
  pub fn texture_unit(&self) -> Option<u32> {
    self.texture_unit.get().copied()
  }

  /// Texture bound on a given unit.
  pub fn bound_texture(&self, unit: u32) -> (TextureTarget, RawHandle) {
    self
      .bound_textures
      .get(&unit)
      .copied()
      .unwrap_or((TextureTarget::Texture2D, 0))
  }

  /// Record an array buffer binding.
  pub fn bind_array_buffer(&mut self, handle: RawHandle, bind: Bind) -> bool {
    if bind == Bind::Forced || self.array_buffer != handle {
      self.array_buffer = handle;
      true
    } else {
      false
    }
  }

  /// Record an element buffer binding.
  pub fn bind_element_array_buffer(&mut self, handle: RawHandle, bind: Bind) -> bool {
    if bind == Bind::Forced || self.element_array_buffer.is_invalid(&handle) {
      self.element_array_buffer.set(handle);
      true
    } else {
      false
    }
  }

  /// Record a buffer binding for a given kind.
  pub fn bind_buffer(&mut self, kind: BufferKind, handle: RawHandle, bind: Bind) -> bool {
    match kind {
      BufferKind::Vertex => self.bind_array_buffer(handle, bind),
      BufferKind::Index => self.bind_element_array_buffer(handle, bind),
    }
  }

  /// Record a vertex array binding.
  pub fn bind_vertex_array(&mut self, handle: RawHandle, bind: Bind) -> bool {
    if bind == Bind::Forced || self.vertex_array != handle {
      self.vertex_array = handle;
      self.element_array_buffer.invalidate();
      true
    } else {
      false
    }
  }

  /// Record a program activation.
  pub fn use_program(&mut self, handle: RawHandle) -> bool {
    if self.program != handle {
      self.program = handle;
      true
    } else {
      false
    }
  }

  /// Record the active texture unit.
  pub fn set_texture_unit(&mut self, unit: u32) -> bool {
    if self.texture_unit.is_invalid(&unit) {
      self.texture_unit.set(unit);
      true
    } else {
      false
    }
  }

  /// Record a texture binding on a given unit.
  pub fn bind_texture(&mut self, unit: u32, target: TextureTarget, handle: RawHandle) -> bool {
    if self.bound_texture(unit) == (target, handle) {
      return false; // cached
    }

    if handle == 0 {
      self.bound_textures.remove(&unit);
    } else {
      self.bound_textures.insert(unit, (target, handle));
    }

    true
  }

  /// Forget a buffer that is being destroyed. Destroyed objects are unbound by the driver.
  pub fn forget_buffer(&mut self, handle: RawHandle) {
    if self.array_buffer == handle {
      self.array_buffer = 0;
    }

    if self.element_array_buffer.get() == Some(&handle) {
      self.element_array_buffer.set(0);
    }
  }

  /// Forget a vertex array that is being destroyed.
  pub fn forget_vertex_array(&mut self, handle: RawHandle) {
    if self.vertex_array == handle {
      self.vertex_array = 0;
      self.element_array_buffer.invalidate();
    }
  }

  /// Forget a program that is being destroyed.
  pub fn forget_program(&mut self, handle: RawHandle) {
    if self.program == handle {
      self.program = 0;
    }
  }

  /// Forget a texture that is being destroyed, on every unit it was bound to.
  pub fn forget_texture(&mut self, handle: RawHandle) {
    self.bound_textures.retain(|_, binding| binding.1 != handle);
  }

}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_binding_skips_redundant_calls() {
    let mut table = BindingTable::new();

    assert!(table.bind_array_buffer(3, Bind::Cached));
    assert!(!table.bind_array_buffer(3, Bind::Cached));
    assert!(table.bind_array_buffer(3, Bind::Forced));
    assert_eq!(table.array_buffer(), 3);
  }

  #[test]
  fn unbinding_twice_is_the_same_as_once() {
    let mut table = BindingTable::new();
    table.bind_array_buffer(7, Bind::Cached);

    table.bind_array_buffer(0, Bind::Cached);
    let once = table.clone();
    table.bind_array_buffer(0, Bind::Cached);

    assert_eq!(table, once);
    assert_eq!(table.array_buffer(), 0);
  }

  #[test]
  fn vertex_array_change_invalidates_element_buffer() {
    let mut table = BindingTable::new();
    table.bind_element_array_buffer(4, Bind::Cached);
    assert_eq!(table.element_array_buffer(), Some(4));

    table.bind_vertex_array(2, Bind::Cached);
    assert_eq!(table.element_array_buffer(), None);

    // the same element buffer must be re-bound now
    assert!(table.bind_element_array_buffer(4, Bind::Cached));
  }

  #[test]
  fn textures_are_tracked_per_unit() {
    let mut table = BindingTable::new();

    assert!(table.bind_texture(0, TextureTarget::Texture2D, 5));
    assert!(table.bind_texture(40, TextureTarget::Texture2D, 6));
    assert!(!table.bind_texture(40, TextureTarget::Texture2D, 6));

    assert_eq!(table.bound_texture(0), (TextureTarget::Texture2D, 5));
    assert_eq!(table.bound_texture(40), (TextureTarget::Texture2D, 6));

    table.forget_texture(6);
    assert_eq!(table.bound_texture(40), (TextureTarget::Texture2D, 0));
  }

  #[test]
  fn forgetting_resets_to_null() {
    let mut table = BindingTable::new();
    table.bind_array_buffer(1, Bind::Cached);
    table.bind_vertex_array(2, Bind::Cached);
    table.use_program(3);

    table.forget_buffer(1);
    table.forget_vertex_array(2);
    table.forget_program(3);

    assert_eq!(table.array_buffer(), 0);
    assert_eq!(table.vertex_array(), 0);
    assert_eq!(table.program(), 0);
  }

  #[test]
  fn far_units_stay_sparse() {
    let mut table = BindingTable::new();

    assert!(table.bind_texture(u32::MAX, TextureTarget::Texture2D, 9));
    assert_eq!(table.bound_texture(u32::MAX), (TextureTarget::Texture2D, 9));
    assert_eq!(table.bound_textures.len(), 1);

    // unbinding leaves the table as it was
    assert!(table.bind_texture(u32::MAX, TextureTarget::Texture2D, 0));
    assert_eq!(table, BindingTable::new());
  }
}
