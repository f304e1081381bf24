//! Core mesh and fracture data types.

use nalgebra::{Point3, Vector3};

/// A vertex in the source mesh.
///
/// UVs and normals are optional; meshes without a UV channel fracture fine
/// (closure UVs degrade to the origin of UV space).
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position in mesh-local space.
    pub position: Point3<f64>,

    /// Texture coordinate, shared per-vertex index space with positions.
    pub uv: Option<[f64; 2]>,

    /// Unit normal vector, if the source carried one.
    pub normal: Option<Vector3<f64>>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a vertex with position and texture coordinate.
    #[inline]
    pub fn with_uv(position: Point3<f64>, uv: [f64; 2]) -> Self {
        Self {
            position,
            uv: Some(uv),
            normal: None,
        }
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// Faces are `[v0, v1, v2]` indices into the vertex array with
/// counter-clockwise winding when viewed from outside. The fracture
/// pipeline assumes a single closed manifold surface; it does not check.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Whether any vertex carries a texture coordinate.
    pub fn has_uvs(&self) -> bool {
        self.vertices.iter().any(|v| v.uv.is_some())
    }

    /// Texture coordinate of a vertex, or the UV-space origin when absent.
    #[inline]
    pub fn vertex_uv(&self, index: u32) -> [f64; 2] {
        self.vertices
            .get(index as usize)
            .and_then(|v| v.uv)
            .unwrap_or([0.0, 0.0])
    }

    /// Compute the axis-aligned bounding box.
    /// Returns `(min_corner, max_corner)` or `None` if the mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = self.vertices[0].position;
        let mut max = self.vertices[0].position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }
}

/// Quantize a position onto an integer grid for exact hashing.
///
/// Two positions closer than `epsilon` along every axis land in the same
/// cell, which is what edge keys and weld keys need.
#[inline]
pub(crate) fn quantize(p: &Point3<f64>, epsilon: f64) -> [i64; 3] {
    [
        (p.x / epsilon).round() as i64,
        (p.y / epsilon).round() as i64,
        (p.z / epsilon).round() as i64,
    ]
}

/// One triangle of a fragment group, expressed in mesh-local space.
///
/// Carries the corner positions, the source-mesh vertex indices the triangle
/// was built from, and (once the group is welded into an output shell) the
/// output vertex indices it resolved to.
#[derive(Debug, Clone)]
pub struct Face {
    /// First corner position.
    pub a: Point3<f64>,
    /// Second corner position.
    pub b: Point3<f64>,
    /// Third corner position.
    pub c: Point3<f64>,
    /// Per-corner vertex indices into the source mesh.
    pub source: [u32; 3],
    /// Per-corner vertex indices into the output shell, set during welding.
    pub welded: Option<[u32; 3]>,
}

impl Face {
    /// Build a face from corner positions and their source vertex indices.
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, source: [u32; 3]) -> Self {
        Self {
            a,
            b,
            c,
            source,
            welded: None,
        }
    }

    /// Build a synthetic face with no source indices (closure triangles).
    pub fn synthetic(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::new(a, b, c, [0, 0, 0])
    }

    /// Corner mean.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Unit face normal by the right-hand rule, or zero for degenerate faces.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        (self.b - self.a)
            .cross(&(self.c - self.a))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Triangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() * 0.5
    }

    /// The three undirected edges of the face, quantized with `epsilon`.
    #[inline]
    pub fn sides(&self, epsilon: f64) -> [Side; 3] {
        [
            Side::new(&self.a, &self.b, epsilon),
            Side::new(&self.a, &self.c, epsilon),
            Side::new(&self.b, &self.c, epsilon),
        ]
    }
}

/// An undirected triangle edge, usable as an adjacency-map key.
///
/// Built from two corner positions quantized onto an `epsilon` grid and
/// stored in sorted order, so `Side::new(a, b, e) == Side::new(b, a, e)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Side {
    lo: [i64; 3],
    hi: [i64; 3],
}

impl Side {
    /// Create an edge key from two endpoint positions.
    #[inline]
    pub fn new(a: &Point3<f64>, b: &Point3<f64>, epsilon: f64) -> Self {
        let ka = quantize(a, epsilon);
        let kb = quantize(b, epsilon);
        if ka <= kb {
            Self { lo: ka, hi: kb }
        } else {
            Self { lo: kb, hi: ka }
        }
    }

    /// Whether the edge collapsed to a point under quantization.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }
}
