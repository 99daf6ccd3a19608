//! Surface sampler: extracts per-vertex data from the source model.
//!
//! The viewer renders one particle per vertex of the first primitive of the
//! first mesh in the asset. Positions and (when present) vertex colors are
//! copied out once at startup; each vertex additionally gets a random seed
//! in [0, 1) that the simulation reuses as its respawn phase.

use std::path::Path;

use glam::Vec3;
use rand::Rng;

use crate::error::MeshError;

/// Fixed relative path of the model asset.
pub const MODEL_PATH: &str = "assets/model.glb";

/// Per-vertex data sampled from the source mesh. All three vectors have the
/// same length and are never mutated after loading.
#[derive(Debug)]
pub struct SurfacePoints {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub seeds: Vec<f32>,
}

impl SurfacePoints {
    /// Load and sample the model at `path`.
    ///
    /// Fails if the file is missing or corrupt, carries no usable geometry,
    /// or requires Draco decompression (no decoder in this stack).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let (document, buffers, _images) = gltf::import(path)?;

        if document
            .extensions_required()
            .any(|ext| ext == "KHR_draco_mesh_compression")
        {
            return Err(MeshError::CompressedGeometry);
        }

        let mesh = document.meshes().next().ok_or(MeshError::NoMesh)?;
        let primitive = mesh.primitives().next().ok_or(MeshError::NoMesh)?;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &*data.0));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or(MeshError::NoPositions)?
            .map(Vec3::from)
            .collect();
        if positions.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        // COLOR_0 is aligned 1:1 with positions when present; otherwise the
        // sprites render untinted.
        let colors: Vec<Vec3> = match reader.read_colors(0) {
            Some(colors) => colors.into_rgb_f32().map(Vec3::from).collect(),
            None => vec![Vec3::ONE; positions.len()],
        };

        let mut rng = rand::thread_rng();
        let seeds = (0..positions.len()).map(|_| rng.gen::<f32>()).collect();

        Ok(Self::from_parts(positions, colors, seeds))
    }

    /// Assemble sampled data directly. Used by tests and by `load`.
    pub fn from_parts(positions: Vec<Vec3>, colors: Vec<Vec3>, seeds: Vec<f32>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        debug_assert_eq!(positions.len(), seeds.len());
        Self {
            positions,
            colors,
            seeds,
        }
    }

    /// Number of sampled vertices (the particle count N).
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_keeps_alignment() {
        let points = SurfacePoints::from_parts(
            vec![Vec3::X, Vec3::Y, Vec3::Z],
            vec![Vec3::ONE; 3],
            vec![0.1, 0.5, 0.9],
        );
        assert_eq!(points.len(), 3);
        assert!(!points.is_empty());
        assert_eq!(points.positions[1], Vec3::Y);
        assert_eq!(points.seeds[2], 0.9);
    }

    #[test]
    fn missing_file_is_a_mesh_error() {
        let err = SurfacePoints::load("does/not/exist.glb").unwrap_err();
        assert!(matches!(err, MeshError::Gltf(_)));
    }

    #[test]
    fn seeds_are_in_unit_range() {
        // Mirrors what load() generates; the sampler contract is [0, 1).
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let seed: f32 = rng.gen();
            assert!((0.0..1.0).contains(&seed));
        }
    }
}
