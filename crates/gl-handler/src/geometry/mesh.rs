//! CPU-side mesh data and the built-in shapes.

use glam::Vec3;

use crate::error::{GlError, Result};

/// Vertex channels of a mesh, each a flat float sequence.
///
/// `positions` holds `components` floats per vertex; normals have 3, texture
/// coordinates 2 and colours 4.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub components: usize,
    pub normals: Option<Vec<f32>>,
    pub tex_coords: Option<Vec<f32>>,
    pub colors: Option<Vec<f32>>,
    pub indices: Option<Vec<u16>>,
}

impl MeshData {
    pub fn new(positions: Vec<f32>, components: usize) -> Self {
        Self {
            positions,
            components,
            ..Self::default()
        }
    }

    /// Unit quad in the XY plane facing +Z, indexed for `TRIANGLES`.
    pub fn quad() -> Self {
        Self {
            positions: vec![-1.0, -1.0, 0.0, -1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, -1.0, 0.0],
            components: 3,
            normals: Some([0.0, 0.0, 1.0].repeat(4)),
            tex_coords: Some(vec![0.05, 0.05, 0.95, 0.05, 0.95, 0.95, 0.05, 0.95]),
            colors: None,
            indices: Some(vec![0, 2, 1, 0, 3, 2]),
        }
    }

    /// Two clip-space triangles covering the screen, 2D positions only.
    pub fn screen_quad() -> Self {
        Self::new(
            vec![-1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0],
            2,
        )
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: Vec<f32>) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    pub fn with_colors(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Components per position, 3 when unset.
    pub fn position_components(&self) -> usize {
        if self.components == 0 {
            3
        } else {
            self.components
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / self.position_components()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions.chunks_exact(3).map(Vec3::from_slice)
    }

    fn map_points(&mut self, f: impl Fn(Vec3) -> Vec3) {
        for chunk in self.positions.chunks_exact_mut(3) {
            f(Vec3::from_slice(chunk)).write_to_slice(chunk);
        }
    }

    /// Mean of all 3D positions.
    pub fn centroid(&self) -> Vec3 {
        let count = self.positions.len() / 3;
        if count == 0 {
            return Vec3::ZERO;
        }
        self.points().sum::<Vec3>() / count as f32
    }

    /// Translate 3D positions so the centroid sits at the origin.
    pub fn centre(&mut self) {
        let centroid = self.centroid();
        self.map_points(|p| p - centroid);
    }

    /// Scale 3D positions uniformly so the farthest one has length 1.
    pub fn normalize(&mut self) {
        let max = self.points().map(Vec3::length).fold(0.0, f32::max);
        if max > 0.0 {
            self.map_points(|p| p / max);
        }
    }

    /// Project every 3D position onto the unit sphere.
    pub fn normalize_each_vertex(&mut self) {
        self.map_points(Vec3::normalize_or_zero);
    }

    /// Indices joining consecutive vertices into `LINES` segments.
    ///
    /// Fails when a vertex index does not fit in 16 bits.
    pub fn line_indices(&self) -> Result<Vec<u16>> {
        let Some(last) = self.vertex_count().checked_sub(1) else {
            return Ok(Vec::new());
        };
        let last = u16::try_from(last).map_err(|_| {
            GlError::InvalidLayout(format!(
                "{} vertices exceed 16-bit indices",
                self.vertex_count()
            ))
        })?;
        let mut indices = Vec::with_capacity(usize::from(last) * 2);
        for index in 0..=last {
            if index > 1 {
                indices.push(index - 1);
            }
            indices.push(index);
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_shapes_report_counts() {
        let quad = MeshData::quad();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.index_count(), 6);

        let screen = MeshData::screen_quad();
        assert_eq!(screen.vertex_count(), 6);
        assert_eq!(screen.index_count(), 0);
    }

    #[test]
    fn vertex_count_divides_by_components() {
        assert_eq!(MeshData::new(vec![0.0; 9], 3).vertex_count(), 3);
        assert_eq!(MeshData::new(vec![0.0; 9], 0).vertex_count(), 3);
        assert_eq!(MeshData::new(vec![0.0; 8], 4).vertex_count(), 2);
    }

    #[test]
    fn centre_and_normalize() {
        let mut mesh = MeshData::new(vec![1.0, 1.0, 1.0, 3.0, 1.0, 1.0], 3);
        assert_eq!(mesh.centroid(), Vec3::new(2.0, 1.0, 1.0));
        mesh.centre();
        assert_eq!(mesh.positions, vec![-1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

        let mut mesh = MeshData::new(vec![2.0, 0.0, 0.0, 0.0, 4.0, 0.0], 3);
        mesh.normalize();
        assert_eq!(mesh.positions, vec![0.5, 0.0, 0.0, 0.0, 1.0, 0.0]);

        mesh.normalize_each_vertex();
        assert_eq!(mesh.positions, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn line_indices_chain_vertices() {
        let mesh = MeshData::new(vec![0.0; 12], 3);
        assert_eq!(mesh.line_indices().unwrap(), vec![0, 1, 1, 2, 2, 3]);
        assert!(MeshData::default().line_indices().unwrap().is_empty());
    }

    #[test]
    fn line_indices_stop_at_sixteen_bits() {
        let mesh = MeshData::new(vec![0.0; 65_536], 1);
        let indices = mesh.line_indices().unwrap();
        assert_eq!(indices.last(), Some(&u16::MAX));
        assert_eq!(indices.len(), 65_535 * 2);

        let mesh = MeshData::new(vec![0.0; 65_537], 1);
        assert!(matches!(mesh.line_indices(), Err(GlError::InvalidLayout(_))));
    }
}
