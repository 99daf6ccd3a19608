//! driftfield: a GPU flow-field particle viewer.
//!
//! A glTF model's vertices are packed into a square float state texture,
//! advanced each frame by a simplex-noise flow field in a compute pass, and
//! drawn as instanced soft point sprites. An egui panel exposes the flow
//! parameters live, and a short camera fly-out frames the scene at startup.

pub mod app;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod grid;
pub mod mesh;
pub mod overlay;
pub mod panel;
pub mod params;
pub mod time;

pub use camera::{CameraRig, OrbitCamera};
pub use error::{GpuError, MeshError, StartupError};
pub use grid::ParticleGrid;
pub use mesh::SurfacePoints;
pub use params::SimParams;
