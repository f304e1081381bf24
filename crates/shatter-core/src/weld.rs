//! Vertex welding for shell assembly.
//!
//! Output shells deduplicate vertices on the triple (position, uv, normal):
//! two corners agreeing on all three within tolerance share one output
//! vertex, while corners at the same position with different normals stay
//! split (hard edges). Keys are quantized onto an epsilon grid so lookup is
//! a hash probe rather than a linear scan.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::types::quantize;

/// Default weld tolerance.
pub const DEFAULT_WELD_EPSILON: f64 = 1e-6;

type WeldKey = ([i64; 3], [i64; 2], [i64; 3]);

/// Accumulates welded vertex/uv/normal buffers for one output shell.
#[derive(Debug)]
pub struct VertexWelder {
    epsilon: f64,
    lookup: HashMap<WeldKey, u32>,
    positions: Vec<Point3<f64>>,
    uvs: Vec<[f64; 2]>,
    normals: Vec<Vector3<f64>>,
}

impl VertexWelder {
    /// Create a welder with the given tolerance.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            lookup: HashMap::new(),
            positions: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Create a welder with pre-allocated capacity.
    pub fn with_capacity(epsilon: f64, vertices: usize) -> Self {
        Self {
            epsilon,
            lookup: HashMap::with_capacity(vertices),
            positions: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    /// Resolve a corner to its output vertex index, inserting if new.
    pub fn resolve(&mut self, position: Point3<f64>, uv: [f64; 2], normal: Vector3<f64>) -> u32 {
        let key = self.key(&position, &uv, &normal);

        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.uvs.push(uv);
        self.normals.push(normal);
        self.lookup.insert(key, index);
        index
    }

    /// Number of distinct output vertices so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no vertices have been welded yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Texture coordinate of an already-welded output vertex.
    #[inline]
    pub fn uv(&self, index: u32) -> [f64; 2] {
        self.uvs[index as usize]
    }

    /// Consume the welder, yielding the output buffers.
    pub fn into_buffers(self) -> (Vec<Point3<f64>>, Vec<[f64; 2]>, Vec<Vector3<f64>>) {
        (self.positions, self.uvs, self.normals)
    }

    fn key(&self, position: &Point3<f64>, uv: &[f64; 2], normal: &Vector3<f64>) -> WeldKey {
        (
            quantize(position, self.epsilon),
            [
                (uv[0] / self.epsilon).round() as i64,
                (uv[1] / self.epsilon).round() as i64,
            ],
            [
                (normal.x / self.epsilon).round() as i64,
                (normal.y / self.epsilon).round() as i64,
                (normal.z / self.epsilon).round() as i64,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_corners_share_a_vertex() {
        let mut welder = VertexWelder::new(DEFAULT_WELD_EPSILON);
        let n = Vector3::new(0.0, 0.0, 1.0);

        let a = welder.resolve(Point3::new(1.0, 2.0, 3.0), [0.5, 0.5], n);
        let b = welder.resolve(Point3::new(1.0, 2.0, 3.0), [0.5, 0.5], n);

        assert_eq!(a, b);
        assert_eq!(welder.len(), 1);
    }

    #[test]
    fn test_differing_normal_splits_vertex() {
        let mut welder = VertexWelder::new(DEFAULT_WELD_EPSILON);
        let p = Point3::new(1.0, 2.0, 3.0);

        let a = welder.resolve(p, [0.5, 0.5], Vector3::new(0.0, 0.0, 1.0));
        let b = welder.resolve(p, [0.5, 0.5], Vector3::new(0.0, 1.0, 0.0));

        assert_ne!(a, b);
        assert_eq!(welder.len(), 2);
    }

    #[test]
    fn test_differing_uv_splits_vertex() {
        let mut welder = VertexWelder::new(DEFAULT_WELD_EPSILON);
        let p = Point3::new(1.0, 2.0, 3.0);
        let n = Vector3::new(0.0, 0.0, 1.0);

        let a = welder.resolve(p, [0.0, 0.0], n);
        let b = welder.resolve(p, [1.0, 0.0], n);

        assert_ne!(a, b);
    }

    #[test]
    fn test_jitter_below_epsilon_welds() {
        let mut welder = VertexWelder::new(1e-6);
        let n = Vector3::new(0.0, 0.0, 1.0);

        let a = welder.resolve(Point3::new(1.0, 0.0, 0.0), [0.0, 0.0], n);
        let b = welder.resolve(Point3::new(1.0 + 1e-9, 0.0, 0.0), [0.0, 0.0], n);

        assert_eq!(a, b);
    }

    #[test]
    fn test_buffers_stay_parallel() {
        let mut welder = VertexWelder::new(DEFAULT_WELD_EPSILON);
        welder.resolve(Point3::origin(), [0.1, 0.2], Vector3::x());
        welder.resolve(Point3::new(1.0, 0.0, 0.0), [0.3, 0.4], Vector3::y());

        let (positions, uvs, normals) = welder.into_buffers();
        assert_eq!(positions.len(), 2);
        assert_eq!(uvs.len(), 2);
        assert_eq!(normals.len(), 2);
        assert_eq!(uvs[1], [0.3, 0.4]);
    }
}
