//! OpenGL backends.
//!
//! This crate exports an [OpenGL](https://www.khronos.org/opengl/) 3.3 core backend for
//! [lantern](../lantern). The backend type is [`GL33`]; windowing crates create it once the GL
//! function pointers are loaded and the context is current.

pub mod gl33;

pub use gl33::GL33;
