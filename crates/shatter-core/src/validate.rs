//! Shell validation: closure and weld checks.
//!
//! Closure is checked positionally, not by index: welded vertices split on
//! hard edges (same position, different normal), so the watertightness that
//! matters is whether every *positional* edge is shared by at least two
//! triangles.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;

use crate::shell::FragmentShell;
use crate::types::Side;
use crate::weld::DEFAULT_WELD_EPSILON;

/// Validation result for one fragment shell.
#[derive(Debug, Clone)]
pub struct ShellReport {
    /// Site index of the shell.
    pub site: usize,
    /// True when no positional edge is open.
    pub is_closed: bool,
    /// Edges used by exactly one triangle.
    pub boundary_edge_count: usize,
    /// Distinct positional edges in the shell.
    pub edge_count: usize,
    /// Output vertices sharing (position, uv, normal) with an earlier one.
    pub duplicate_vertex_count: usize,
}

/// Aggregated validation over a whole fracture outcome.
#[derive(Debug, Clone)]
pub struct FractureReport {
    /// Per-shell reports in input order.
    pub shells: Vec<ShellReport>,
}

impl FractureReport {
    /// True when every shell is closed and weld-clean.
    pub fn is_clean(&self) -> bool {
        self.shells
            .iter()
            .all(|r| r.is_closed && r.duplicate_vertex_count == 0)
    }

    /// Number of shells with at least one open edge.
    pub fn open_shell_count(&self) -> usize {
        self.shells.iter().filter(|r| !r.is_closed).count()
    }
}

/// Validate one shell's closure and weld uniqueness.
pub fn validate_shell(shell: &FragmentShell) -> ShellReport {
    let epsilon = DEFAULT_WELD_EPSILON;

    let mut edge_counts: HashMap<Side, u32> = HashMap::new();
    for tri in &shell.triangles {
        let a = &shell.vertices[tri[0] as usize];
        let b = &shell.vertices[tri[1] as usize];
        let c = &shell.vertices[tri[2] as usize];
        for side in [
            Side::new(a, b, epsilon),
            Side::new(a, c, epsilon),
            Side::new(b, c, epsilon),
        ] {
            if !side.is_degenerate() {
                *edge_counts.entry(side).or_insert(0) += 1;
            }
        }
    }

    let boundary_edge_count = edge_counts.values().filter(|&&n| n == 1).count();

    let mut seen = HashSet::with_capacity(shell.vertices.len());
    let mut duplicate_vertex_count = 0;
    for (i, position) in shell.vertices.iter().enumerate() {
        let key = (
            crate::types::quantize(position, epsilon),
            [
                (shell.uvs[i][0] / epsilon).round() as i64,
                (shell.uvs[i][1] / epsilon).round() as i64,
            ],
            [
                (shell.normals[i].x / epsilon).round() as i64,
                (shell.normals[i].y / epsilon).round() as i64,
                (shell.normals[i].z / epsilon).round() as i64,
            ],
        );
        if !seen.insert(key) {
            duplicate_vertex_count += 1;
        }
    }

    ShellReport {
        site: shell.site,
        is_closed: boundary_edge_count == 0,
        boundary_edge_count,
        edge_count: edge_counts.len(),
        duplicate_vertex_count,
    }
}

/// Validate every shell of a fracture outcome in parallel.
pub fn validate_fracture(shells: &[FragmentShell]) -> FractureReport {
    let shells = shells.par_iter().map(validate_shell).collect();
    FractureReport { shells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{fracture_mesh, FractureParams};
    use crate::types::{Mesh, Vertex};
    use nalgebra::{Point3, Vector3};

    fn quad_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(0.0, 0.0, 0.0), [0.0, 0.0]));
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(1.0, 0.0, 0.0), [1.0, 0.0]));
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(1.0, 1.0, 0.0), [1.0, 1.0]));
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(0.0, 1.0, 0.0), [0.0, 1.0]));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 2, 3]);
        mesh
    }

    #[test]
    fn test_fractured_quad_shells_are_closed() {
        let mesh = quad_mesh();
        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(3)).unwrap();
        assert!(!outcome.shells.is_empty());

        let report = validate_fracture(&outcome.shells);
        assert!(report.is_clean());
        assert_eq!(report.open_shell_count(), 0);
    }

    #[test]
    fn test_open_shell_is_reported() {
        // A bare triangle posing as a shell: every edge is open.
        let shell = FragmentShell {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            uvs: vec![[0.0, 0.0]; 3],
            normals: vec![Vector3::z(); 3],
            triangles: vec![[0, 1, 2]],
            back_point: Point3::origin(),
            site: 0,
            surface_triangles: 1,
            closure_triangles: 0,
        };

        let report = validate_shell(&shell);
        assert!(!report.is_closed);
        assert_eq!(report.boundary_edge_count, 3);
    }

    #[test]
    fn test_duplicate_vertices_are_reported() {
        let shell = FragmentShell {
            vertices: vec![Point3::origin(), Point3::origin()],
            uvs: vec![[0.0, 0.0]; 2],
            normals: vec![Vector3::z(); 2],
            triangles: Vec::new(),
            back_point: Point3::origin(),
            site: 0,
            surface_triangles: 0,
            closure_triangles: 0,
        };

        let report = validate_shell(&shell);
        assert_eq!(report.duplicate_vertex_count, 1);
    }
}
