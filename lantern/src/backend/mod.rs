//! Backend interfaces.
//!
//! This module defines the low-level API backends must implement to be usable with the wrappers
//! of this crate. Each trait is `unsafe` to implement: the wrappers rely on backends to uphold
//! the binding invariants described in [`crate::state`].
//!
//! Representation types (`BufferRepr`, `ProgramRepr`, …) are expected to keep a reference to the
//! backend state so that they can be bound and destroyed without access to the backend itself.

pub mod buffer;
pub mod render;
pub mod shader;
pub mod texture;
pub mod vertex;
