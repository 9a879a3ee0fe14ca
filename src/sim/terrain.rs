//! Height field queries
//!
//! The engine never owns the height field. It reads heights through the
//! [`Terrain`] trait and asks the same collaborator to dig craters.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::SamplerConfig;

/// A deformable height field
pub trait Terrain {
    /// Signed surface height at world (x, z)
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Lower the surface around `center`. Read-only terrains ignore this.
    fn deform(&mut self, _center: Vec3, _radius: f32, _depth: f32) {}
}

/// Height queries over an optional terrain.
///
/// Without a terrain every query returns 0.
#[derive(Clone, Copy)]
pub struct TerrainSampler<'a> {
    terrain: Option<&'a dyn Terrain>,
    config: &'a SamplerConfig,
}

impl<'a> TerrainSampler<'a> {
    pub fn new(terrain: Option<&'a dyn Terrain>, config: &'a SamplerConfig) -> Self {
        Self { terrain, config }
    }

    pub fn has_terrain(&self) -> bool {
        self.terrain.is_some()
    }

    /// Single center sample
    #[inline]
    pub fn simple(&self, x: f32, z: f32) -> f32 {
        match self.terrain {
            Some(terrain) => {
                let h = terrain.height_at(x, z);
                if h.is_finite() { h } else { 0.0 }
            }
            None => 0.0,
        }
    }

    /// Center plus four offset samples, weighted toward the center
    pub fn robust(&self, x: f32, z: f32) -> f32 {
        if !self.has_terrain() {
            return 0.0;
        }
        let r = self.config.radius;
        let edges = self.simple(x + r, z)
            + self.simple(x - r, z)
            + self.simple(x, z + r)
            + self.simple(x, z - r);
        self.simple(x, z) * self.config.center_weight + edges * self.config.edge_weight
    }
}

/// Constant-height terrain
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

/// Analytic terrain from a closure (read-only)
pub struct FnTerrain<F>(pub F);

impl<F> Terrain for FnTerrain<F>
where
    F: Fn(f32, f32) -> f32,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        (self.0)(x, z)
    }
}

/// Grid height field with bilinear interpolation.
///
/// Heights are row-major (Z-major): `index = x + z * width`. Queries
/// outside the grid clamp to the nearest edge cell. Deserialized grids are
/// checked the same way as [`HeightGrid::from_heights`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "HeightGridData")]
pub struct HeightGrid {
    heights: Vec<f32>,
    width: usize,
    depth: usize,
    /// World distance between adjacent samples
    spacing: f32,
    /// World (x, z) of cell (0, 0)
    origin: (f32, f32),
}

/// Unchecked on-disk form of a [`HeightGrid`]
#[derive(Deserialize)]
struct HeightGridData {
    heights: Vec<f32>,
    width: usize,
    depth: usize,
    spacing: f32,
    origin: (f32, f32),
}

impl TryFrom<HeightGridData> for HeightGrid {
    type Error = ConfigError;

    fn try_from(data: HeightGridData) -> ConfigResult<Self> {
        HeightGrid::from_heights(data.heights, data.width, data.depth, data.spacing, data.origin)
    }
}

impl HeightGrid {
    /// Grid from raw row-major heights.
    ///
    /// Rejects empty dimensions, a height count that does not match
    /// `width * depth`, and a non-positive spacing.
    pub fn from_heights(
        heights: Vec<f32>,
        width: usize,
        depth: usize,
        spacing: f32,
        origin: (f32, f32),
    ) -> ConfigResult<Self> {
        if width == 0 || depth == 0 {
            return Err(ConfigError::Invalid(format!(
                "height grid must be at least 1x1, got {width}x{depth}"
            )));
        }
        if width.checked_mul(depth) != Some(heights.len()) {
            return Err(ConfigError::Invalid(format!(
                "height grid {width}x{depth} needs {} heights, got {}",
                width.saturating_mul(depth),
                heights.len()
            )));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "height grid spacing must be positive, got {spacing}"
            )));
        }
        if !(origin.0.is_finite() && origin.1.is_finite()) {
            return Err(ConfigError::Invalid("height grid origin must be finite".to_string()));
        }
        Ok(Self {
            heights,
            width,
            depth,
            spacing,
            origin,
        })
    }

    /// Flat grid centered on the world origin covering `extent` per side
    pub fn centered(extent: f32, spacing: f32, height: f32) -> Self {
        let spacing = spacing.max(0.01);
        let cells = ((extent / spacing).ceil() as usize).max(1) + 1;
        Self {
            heights: vec![height; cells * cells],
            width: cells,
            depth: cells,
            spacing,
            origin: (-extent * 0.5, -extent * 0.5),
        }
    }

    /// Fill every cell from a height function of its world position
    pub fn from_fn<F>(extent: f32, spacing: f32, f: F) -> Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let mut grid = Self::centered(extent, spacing, 0.0);
        for gz in 0..grid.depth {
            for gx in 0..grid.width {
                let (x, z) = grid.cell_world(gx, gz);
                grid.heights[gx + gz * grid.width] = f(x, z);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Height at grid coordinates (clamped to bounds)
    #[inline]
    pub fn cell(&self, gx: usize, gz: usize) -> f32 {
        let gx = gx.min(self.width - 1);
        let gz = gz.min(self.depth - 1);
        self.heights[gx + gz * self.width]
    }

    pub fn set_cell(&mut self, gx: usize, gz: usize, height: f32) {
        if gx < self.width && gz < self.depth {
            self.heights[gx + gz * self.width] = height;
        }
    }

    fn cell_world(&self, gx: usize, gz: usize) -> (f32, f32) {
        (
            self.origin.0 + gx as f32 * self.spacing,
            self.origin.1 + gz as f32 * self.spacing,
        )
    }

    /// Bilinear sample at world (x, z)
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        let gx_f = ((x - self.origin.0) / self.spacing).clamp(0.0, max_x);
        let gz_f = ((z - self.origin.1) / self.spacing).clamp(0.0, max_z);

        let gx0 = gx_f.floor() as usize;
        let gz0 = gz_f.floor() as usize;
        let fx = gx_f - gx0 as f32;
        let fz = gz_f - gz0 as f32;

        let h00 = self.cell(gx0, gz0);
        let h10 = self.cell(gx0 + 1, gz0);
        let h01 = self.cell(gx0, gz0 + 1);
        let h11 = self.cell(gx0 + 1, gz0 + 1);

        let h0 = h00 * (1.0 - fx) + h10 * fx;
        let h1 = h01 * (1.0 - fx) + h11 * fx;
        h0 * (1.0 - fz) + h1 * fz
    }
}

impl Terrain for HeightGrid {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.sample(x, z)
    }

    /// Cosine-falloff crater: full `depth` at the center, zero at `radius`
    fn deform(&mut self, center: Vec3, radius: f32, depth: f32) {
        if !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let span = (radius / self.spacing).ceil();
        let cx = ((center.x - self.origin.0) / self.spacing).round();
        let cz = ((center.z - self.origin.1) / self.spacing).round();
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        // Cell window clipped to the grid; empty when the crater misses it
        if !(cx + span >= 0.0 && cz + span >= 0.0 && cx - span <= max_x && cz - span <= max_z) {
            return;
        }
        let (x0, x1) = ((cx - span).max(0.0) as usize, (cx + span).min(max_x) as usize);
        let (z0, z1) = ((cz - span).max(0.0) as usize, (cz + span).min(max_z) as usize);

        for gz in z0..=z1 {
            for gx in x0..=x1 {
                let (x, z) = self.cell_world(gx, gz);
                let d = ((x - center.x).powi(2) + (z - center.z).powi(2)).sqrt();
                if d < radius {
                    let falloff = 0.5 * (1.0 + (std::f32::consts::PI * d / radius).cos());
                    self.heights[gx + gz * self.width] -= depth * falloff;
                }
            }
        }
        log::trace!(
            "Crater at ({:.1}, {:.1}) r={:.1} depth={:.2}",
            center.x,
            center.z,
            radius,
            depth
        );
    }
}
