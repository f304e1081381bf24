//! Mesh measurement: volume, surface area, dimensions.

use nalgebra::{Point3, Vector3};

use crate::types::Mesh;

/// Overall bounding-box dimensions of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

/// Estimate volume of a closed mesh using the divergence theorem.
///
/// Meaningless for open meshes; callers are expected to pass watertight
/// input.
pub fn volume(mesh: &Mesh) -> f64 {
    let positions: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
    volume_of_triangles(&positions, &mesh.faces)
}

/// Total surface area of a mesh.
pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.faces
        .iter()
        .map(|face| {
            let v0 = &mesh.vertices[face[0] as usize].position;
            let v1 = &mesh.vertices[face[1] as usize].position;
            let v2 = &mesh.vertices[face[2] as usize].position;
            (v1 - v0).cross(&(v2 - v0)).norm() * 0.5
        })
        .sum()
}

/// Bounding-box dimensions, or zero for an empty mesh.
pub fn dimensions(mesh: &Mesh) -> Dimensions {
    match mesh.bounds() {
        Some((min, max)) => Dimensions {
            width: max.x - min.x,
            depth: max.y - min.y,
            height: max.z - min.z,
        },
        None => Dimensions {
            width: 0.0,
            depth: 0.0,
            height: 0.0,
        },
    }
}

/// Signed-volume sum over triangles (tetrahedra against the origin),
/// absolute value. Exact for consistently wound closed surfaces.
pub(crate) fn volume_of_triangles(positions: &[Point3<f64>], triangles: &[[u32; 3]]) -> f64 {
    let mut total = 0.0;
    for tri in triangles {
        let v0 = &positions[tri[0] as usize];
        let v1 = &positions[tri[1] as usize];
        let v2 = &positions[tri[2] as usize];
        total += v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
    }
    total.abs()
}

/// Volume by pyramid decomposition about `apex`: the sum of unsigned
/// tetrahedron volumes from each triangle to the apex. Triangles containing
/// the apex contribute nothing, and winding does not matter. Exact for
/// surfaces star-shaped about the apex.
pub(crate) fn volume_about_point(
    positions: &[Point3<f64>],
    triangles: &[[u32; 3]],
    apex: &Point3<f64>,
) -> f64 {
    let mut total = 0.0;
    for tri in triangles {
        let a: Vector3<f64> = positions[tri[0] as usize] - apex;
        let b: Vector3<f64> = positions[tri[1] as usize] - apex;
        let c: Vector3<f64> = positions[tri[2] as usize] - apex;
        total += a.dot(&b.cross(&c)).abs() / 6.0;
    }
    total
}
