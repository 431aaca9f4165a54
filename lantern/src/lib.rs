//! # Owning GPU resource wrappers
//!
//! lantern is a thin layer over a graphics API that gives every GPU object a single owner on the
//! host side. Each wrapper holds exactly one GPU identifier, binds and unbinds it against the
//! backend’s binding table and releases it when it goes out of scope (or earlier, through an
//! explicit `release`).
//!
//! # What’s included?
//!
//! - **Buffers**: [`buffer::Buffer`] holds vertex or index bytes uploaded once at creation.
//! - **Vertex arrays**: [`vertex::VertexArray`] maps regions of vertex buffers to attribute
//!   slots and remembers the index buffer used to draw.
//! - **Shader programs**: [`shader::Program`] compiles and links a vertex and a fragment stage
//!   and exposes [`shader::Uniform`] lookup and updates.
//! - **Textures**: [`texture::Texture`] decodes an image from disk and uploads it to a texture
//!   unit, mipmaps included.
//! - **Drawing**: [`context::GraphicsContext`] issues clears, viewport changes and draw calls.
//!
//! # Backends
//!
//! Wrappers are generic over a backend type implementing the traits of the [`backend`] module.
//! `lantern-gl` provides the OpenGL 3.3 backend; [`mock`] provides a recording backend that
//! doesn’t need a GPU and checks every draw it sees, which is handy in tests.
//!
//! # On binding state
//!
//! Graphics APIs of this family keep their bindings (current buffer per kind, current vertex
//! array, current program, current texture per unit) in one mutable table per context. lantern
//! makes that table explicit: see [`state::BindingTable`]. Backends own one table and every
//! bind or activate call goes through it, so redundant driver calls are skipped and the current
//! configuration can always be inspected.

//#![deny(missing_docs)]

pub mod backend;
pub mod buffer;
pub mod context;
pub mod mock;
pub mod pixel;
pub mod render;
pub mod shader;
pub mod state;
pub mod texture;
pub mod vertex;
