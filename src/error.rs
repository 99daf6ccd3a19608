//! Error types for driftfield.
//!
//! Everything here is a fatal startup condition: once the frame loop is
//! running there is no per-frame error path (surface loss is handled inline
//! by the frame driver).

use std::fmt;

/// Errors produced while loading and sampling the source mesh.
#[derive(Debug)]
pub enum MeshError {
    /// The glTF/GLB file could not be read or parsed.
    Gltf(gltf::Error),
    /// The file contains no mesh with at least one primitive.
    NoMesh,
    /// The first primitive has no position attribute.
    NoPositions,
    /// The position buffer is present but empty.
    EmptyMesh,
    /// The geometry requires a Draco decoder, which is not available.
    CompressedGeometry,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Gltf(e) => write!(f, "Failed to load model: {}", e),
            MeshError::NoMesh => write!(f, "Model contains no mesh primitives"),
            MeshError::NoPositions => {
                write!(f, "First mesh primitive has no position attribute")
            }
            MeshError::EmptyMesh => write!(f, "Mesh position buffer is empty"),
            MeshError::CompressedGeometry => write!(
                f,
                "Model requires KHR_draco_mesh_compression; re-export without compression"
            ),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshError::Gltf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf::Error> for MeshError {
    fn from(e: gltf::Error) -> Self {
        MeshError::Gltf(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The state texture would exceed the device texture-size limit.
    TextureTooLarge { size: u32, max: u32 },
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::TextureTooLarge { size, max } => write!(
                f,
                "State texture of {}x{} exceeds the device limit of {}",
                size, size, max
            ),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Top-level startup error. Terminates initialization before the frame loop.
#[derive(Debug)]
pub enum StartupError {
    /// Mesh asset missing or unusable.
    Mesh(MeshError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Mesh(e) => write!(f, "Mesh error: {}", e),
            StartupError::Gpu(e) => write!(f, "GPU error: {}", e),
            StartupError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            StartupError::Window(e) => write!(f, "Failed to create window: {}", e),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Mesh(e) => Some(e),
            StartupError::Gpu(e) => Some(e),
            StartupError::EventLoop(e) => Some(e),
            StartupError::Window(e) => Some(e),
        }
    }
}

impl From<MeshError> for StartupError {
    fn from(e: MeshError) -> Self {
        StartupError::Mesh(e)
    }
}

impl From<GpuError> for StartupError {
    fn from(e: GpuError) -> Self {
        StartupError::Gpu(e)
    }
}

impl From<winit::error::EventLoopError> for StartupError {
    fn from(e: winit::error::EventLoopError) -> Self {
        StartupError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for StartupError {
    fn from(e: winit::error::OsError) -> Self {
        StartupError::Window(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_wrap_their_sources() {
        let err = StartupError::from(GpuError::NoAdapter);
        assert!(matches!(err, StartupError::Gpu(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("GPU error"));

        let err = StartupError::from(MeshError::EmptyMesh);
        assert!(matches!(err, StartupError::Mesh(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn texture_limit_error_names_both_sizes() {
        let err = GpuError::TextureTooLarge { size: 20000, max: 16384 };
        let text = err.to_string();
        assert!(text.contains("20000"));
        assert!(text.contains("16384"));
    }
}
