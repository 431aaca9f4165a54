//! lantern demos.
//!
//! Every tutorial scene (a triangle, a textured quad and a spinning textured pyramid) runs
//! through the same [`RenderLoop`](render_loop::RenderLoop). A scene is plain data: see
//! [`SceneConfig`](scene::SceneConfig).
//!
//! Scenes render either in a GLFW window or headless, with the recording backend of `lantern`.

pub mod error;
pub mod headless;
pub mod render_loop;
pub mod scene;
pub mod spin;

pub use error::DemoError;
pub use headless::HeadlessSurface;
pub use render_loop::{LoopState, RenderLoop};
pub use scene::SceneConfig;
