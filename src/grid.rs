//! Square-grid layout for the particle state texture.
//!
//! Each of the N source vertices owns one texel of an SxS floating-point
//! texture, where S is the smallest integer with S*S >= N. The renderer
//! addresses texels through per-instance UV coordinates generated here, so
//! the encoder and the UV generator must agree on the row-major layout
//! exactly; any mismatch silently scrambles particle positions.

use glam::Vec2;

use crate::mesh::SurfacePoints;

/// Floats per texel (RGBA).
pub const CHANNELS: usize = 4;

/// Maps vertex indices to texels of the SxS state texture.
#[derive(Debug, Clone, Copy)]
pub struct ParticleGrid {
    count: usize,
    size: u32,
}

impl ParticleGrid {
    /// Build the grid for `count` particles.
    ///
    /// `count` must be at least 1; the surface sampler rejects empty meshes
    /// before a grid is ever constructed.
    pub fn new(count: usize) -> Self {
        debug_assert!(count > 0);
        // Integer fix-up after the float sqrt so huge counts can't round the
        // wrong way.
        let mut size = (count as f64).sqrt().floor() as u32;
        while (size as usize) * (size as usize) < count {
            size += 1;
        }
        Self { count, size }
    }

    /// Number of particles actually drawn (the draw range).
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Side length S of the state texture.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total texels allocated (S*S). May exceed `count`; the surplus texels
    /// are never drawn.
    #[inline]
    pub fn texel_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// Row-major texel for vertex `i`.
    #[inline]
    pub fn texel(&self, i: usize) -> (u32, u32) {
        let row = (i / self.size as usize) as u32;
        let col = (i % self.size as usize) as u32;
        (row, col)
    }

    /// Linear index of a texel.
    #[inline]
    pub fn index_of(&self, row: u32, col: u32) -> usize {
        row as usize * self.size as usize + col as usize
    }

    /// Texel-center UV coordinate for vertex `i`.
    #[inline]
    pub fn uv(&self, i: usize) -> Vec2 {
        let (row, col) = self.texel(i);
        let s = self.size as f32;
        Vec2::new((col as f32 + 0.5) / s, (row as f32 + 0.5) / s)
    }

    /// Pack sampled surface points into the base texture layout:
    /// (x, y, z, seed) per texel, row-major. Texels past `count` stay zero
    /// and are never read by the renderer.
    pub fn encode_base_texture(&self, points: &SurfacePoints) -> Vec<f32> {
        debug_assert_eq!(points.len(), self.count);
        let mut data = vec![0.0f32; self.texel_count() * CHANNELS];
        for (i, (position, seed)) in points
            .positions
            .iter()
            .zip(points.seeds.iter())
            .enumerate()
        {
            let base = i * CHANNELS;
            data[base] = position.x;
            data[base + 1] = position.y;
            data[base + 2] = position.z;
            data[base + 3] = *seed;
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn points(n: usize) -> SurfacePoints {
        let positions: Vec<Vec3> = (0..n)
            .map(|i| Vec3::new(i as f32, i as f32 * 2.0, i as f32 * 3.0))
            .collect();
        let colors = vec![Vec3::ONE; n];
        let seeds: Vec<f32> = (0..n).map(|i| i as f32 / n as f32).collect();
        SurfacePoints::from_parts(positions, colors, seeds)
    }

    #[test]
    fn grid_size_is_smallest_cover() {
        assert_eq!(ParticleGrid::new(1).size(), 1);
        assert_eq!(ParticleGrid::new(2).size(), 2);
        assert_eq!(ParticleGrid::new(4).size(), 2);
        assert_eq!(ParticleGrid::new(5).size(), 3);
        assert_eq!(ParticleGrid::new(9).size(), 3);
        // N=10 needs S=4, not 3
        assert_eq!(ParticleGrid::new(10).size(), 4);
        assert_eq!(ParticleGrid::new(1000).size(), 32);
        assert_eq!(ParticleGrid::new(1024).size(), 32);
        assert_eq!(ParticleGrid::new(1025).size(), 33);
    }

    #[test]
    fn grid_size_covers_count() {
        for n in 1..500 {
            let grid = ParticleGrid::new(n);
            let s = grid.size() as usize;
            assert!(s * s >= n, "S^2 must cover N for N={}", n);
            if s > 1 {
                assert!((s - 1) * (s - 1) < n, "S must be minimal for N={}", n);
            }
        }
    }

    #[test]
    fn texel_mapping_is_bijective() {
        let grid = ParticleGrid::new(1000);
        let mut seen = vec![false; grid.texel_count()];
        for i in 0..grid.count() {
            let (row, col) = grid.texel(i);
            let linear = grid.index_of(row, col);
            assert!(!seen[linear], "texel reused at index {}", i);
            seen[linear] = true;
            assert_eq!(linear, i, "row-major round trip must recover the index");
        }
    }

    #[test]
    fn uv_addresses_the_same_texel() {
        let grid = ParticleGrid::new(1000);
        let s = grid.size() as f32;
        for i in [0, 1, 31, 32, 500, 999] {
            let uv = grid.uv(i);
            let col = (uv.x * s - 0.5).round() as u32;
            let row = (uv.y * s - 0.5).round() as u32;
            assert_eq!((row, col), grid.texel(i));
            assert!(uv.x > 0.0 && uv.x < 1.0);
            assert!(uv.y > 0.0 && uv.y < 1.0);
        }
    }

    #[test]
    fn draw_range_is_count_not_capacity() {
        let grid = ParticleGrid::new(1000);
        assert_eq!(grid.count(), 1000);
        assert_eq!(grid.texel_count(), 1024);
    }

    #[test]
    fn base_texture_matches_texel_layout() {
        let n = 10;
        let grid = ParticleGrid::new(n);
        let pts = points(n);
        let data = grid.encode_base_texture(&pts);
        assert_eq!(data.len(), grid.texel_count() * CHANNELS);

        for i in 0..n {
            let (row, col) = grid.texel(i);
            let base = grid.index_of(row, col) * CHANNELS;
            assert_eq!(data[base], pts.positions[i].x);
            assert_eq!(data[base + 1], pts.positions[i].y);
            assert_eq!(data[base + 2], pts.positions[i].z);
            assert_eq!(data[base + 3], pts.seeds[i]);
        }
        // Unused tail texels stay zeroed.
        for texel in n..grid.texel_count() {
            for c in 0..CHANNELS {
                assert_eq!(data[texel * CHANNELS + c], 0.0);
            }
        }
    }
}
