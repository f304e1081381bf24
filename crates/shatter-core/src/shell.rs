//! Shell synthesis: turning fragment groups into closed sub-meshes.
//!
//! Each non-empty fragment group becomes one watertight shell: the group's
//! original faces stay as the outward surface, and every open (boundary)
//! edge is closed against a synthetic interior "back point" with a pair of
//! opposite-winding triangles. Back-point placement is a set of empirically
//! tuned heuristics, not a physical model; the thresholds here are
//! load-bearing for how the result reads visually.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::error::{ShatterError, ShatterResult};
use crate::measure::volume_about_point;
use crate::partition::{partition_faces, FragmentGroup};
use crate::sites::site_grid;
use crate::tracing_ext::OperationTimer;
use crate::types::{Face, Mesh, Side, Vertex};
use crate::weld::{VertexWelder, DEFAULT_WELD_EPSILON};

/// Below this box dimension a group counts as paper-thin and is extruded
/// toward the mesh interior before closing.
pub const DEGENERATE_BOX_EPSILON: f64 = 0.01;

/// Below this first-normal-to-average-normal difference a group counts as
/// flat and gets a thin wedge behind its average plane.
pub const COPLANAR_NORMAL_EPSILON: f64 = 0.05;

/// Extrude distance as a fraction of mean bounding-box dimension.
pub const EXTRUDE_FACTOR: f64 = 0.22;

/// Tuning knobs for the fracture pipeline.
#[derive(Debug, Clone)]
pub struct FractureParams {
    /// Site-grid extent as a fraction of the mesh bounds, in `[0, 1]`.
    /// Controls fragment granularity.
    pub size: f64,

    /// Seed for the interior anchor jitter. `None` draws from the OS.
    pub seed: Option<u64>,

    /// Weld tolerance for output vertices and edge keys.
    pub weld_epsilon: f64,
}

impl Default for FractureParams {
    fn default() -> Self {
        Self {
            size: 0.2,
            seed: None,
            weld_epsilon: DEFAULT_WELD_EPSILON,
        }
    }
}

impl FractureParams {
    /// Params with a specific site-grid size fraction.
    pub fn with_size(size: f64) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Fix the anchor-jitter seed for reproducible output.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// The welded output mesh for one fragment group.
///
/// Vertex, UV, and normal buffers are parallel; `triangles` indexes into
/// them. Contains both the group's outward surface triangles and the
/// synthetic closure triangles against `back_point`.
#[derive(Debug, Clone)]
pub struct FragmentShell {
    /// Deduplicated vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Texture coordinates, parallel to `vertices`.
    pub uvs: Vec<[f64; 2]>,
    /// Normals, parallel to `vertices`.
    pub normals: Vec<Vector3<f64>>,
    /// Triangle index list.
    pub triangles: Vec<[u32; 3]>,
    /// The interior point the group's boundary was closed against.
    pub back_point: Point3<f64>,
    /// Index of the site this shell's group belonged to.
    pub site: usize,
    /// Number of triangles carried over from the source surface.
    pub surface_triangles: usize,
    /// Number of synthetic closure triangles.
    pub closure_triangles: usize,
}

impl FragmentShell {
    /// Number of welded vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total triangle count (surface plus closure).
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Mean of the shell's vertex positions.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Enclosed volume via pyramid decomposition about the back point.
    ///
    /// Closure triangles contain the back point and contribute nothing, so
    /// the sum over surface pyramids is exact for shells star-shaped about
    /// their back point (which the heuristics aim for) and an upper bound
    /// otherwise. A plain signed-volume sum would cancel here because every
    /// closure triangle is emitted in both winding orders.
    pub fn volume(&self) -> f64 {
        volume_about_point(&self.vertices, &self.triangles, &self.back_point)
    }

    /// Convert the shell into a standalone [`Mesh`].
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.vertices.len(), self.triangles.len());
        for (i, position) in self.vertices.iter().enumerate() {
            mesh.vertices.push(Vertex {
                position: *position,
                uv: Some(self.uvs[i]),
                normal: Some(self.normals[i]),
            });
        }
        mesh.faces.extend_from_slice(&self.triangles);
        mesh
    }
}

/// Everything one fracture run produced.
#[derive(Debug, Clone)]
pub struct FractureOutcome {
    /// One closed shell per surviving fragment group, in site order.
    pub shells: Vec<FragmentShell>,
    /// The site grid the partition used.
    pub sites: Vec<Point3<f64>>,
    /// Non-empty groups the partition produced.
    pub groups: usize,
    /// Groups dropped for having zero total face area.
    pub skipped_groups: usize,
}

impl FractureOutcome {
    /// Number of emitted shells.
    #[inline]
    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    /// Sum of shell volumes.
    pub fn total_volume(&self) -> f64 {
        self.shells.iter().map(|s| s.volume()).sum()
    }
}

/// Fracture a mesh into closed fragment shells.
///
/// Runs the full pipeline: site grid over the mesh bounds, nearest-site
/// face partition, then one welded, boundary-closed shell per group.
/// Synchronous and CPU-bound; returns only when every shell is built.
pub fn fracture_mesh(mesh: &Mesh, params: &FractureParams) -> ShatterResult<FractureOutcome> {
    let _timer =
        OperationTimer::with_context("fracture_mesh", mesh.face_count(), mesh.vertex_count());

    let (min, max) = mesh
        .bounds()
        .ok_or_else(|| ShatterError::empty_mesh("cannot fracture a mesh with no vertices"))?;
    if mesh.faces.is_empty() {
        return Err(ShatterError::empty_mesh(
            "cannot fracture a mesh with no faces",
        ));
    }
    for (i, face) in mesh.faces.iter().enumerate() {
        for &index in face {
            if index as usize >= mesh.vertices.len() {
                return Err(ShatterError::InvalidVertexIndex {
                    face: i,
                    index,
                    vertex_count: mesh.vertices.len(),
                });
            }
        }
    }

    let sites = site_grid((min, max), params.size);
    let groups = partition_faces(mesh, &sites);

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let dims = max - min;
    let extents = dims * 0.5;
    let center = min + extents;

    // One jittered interior anchor per mesh; paper-thin groups extrude
    // toward it so flat slabs gain depth in a consistent direction.
    let anchor = Point3::new(
        center.x + jitter(&mut rng, extents.x),
        center.y + jitter(&mut rng, extents.y),
        center.z + jitter(&mut rng, extents.z),
    );
    let mesh_extrude = (dims.x + dims.y + dims.z) / 3.0 * EXTRUDE_FACTOR;

    let mut shells = Vec::with_capacity(groups.len());
    let mut skipped = 0usize;
    for group in &groups {
        match build_shell(mesh, group, &anchor, mesh_extrude, params.weld_epsilon) {
            Some(shell) => shells.push(shell),
            None => skipped += 1,
        }
    }

    info!(
        faces = mesh.face_count(),
        sites = sites.len(),
        shells = shells.len(),
        skipped,
        "fractured mesh"
    );

    Ok(FractureOutcome {
        shells,
        sites,
        groups: groups.len(),
        skipped_groups: skipped,
    })
}

#[inline]
fn jitter(rng: &mut StdRng, extent: f64) -> f64 {
    if extent > 0.0 {
        rng.random_range(-0.5..0.5) * extent
    } else {
        0.0
    }
}

/// Count how many faces of the group share each undirected edge.
fn count_sides(faces: &[Face], epsilon: f64) -> HashMap<Side, u32> {
    let mut counts = HashMap::with_capacity(faces.len() * 3);
    for face in faces {
        for side in face.sides(epsilon) {
            *counts.entry(side).or_insert(0u32) += 1;
        }
    }
    counts
}

/// Build the closed shell for one fragment group, or `None` when the group
/// has zero total area and nothing meaningful can be closed.
fn build_shell(
    mesh: &Mesh,
    group: &FragmentGroup,
    anchor: &Point3<f64>,
    mesh_extrude: f64,
    epsilon: f64,
) -> Option<FragmentShell> {
    let first = group.faces.first()?;

    // An edge shared by no sibling face in this group is open, regardless
    // of whether a face in a different group touches it.
    let side_counts = count_sides(&group.faces, epsilon);

    let mut total_area = 0.0;
    let mut center_accum = Vector3::zeros();
    let mut normal_accum = Vector3::zeros();
    let mut group_min = first.a;
    let mut group_max = first.a;

    for face in &group.faces {
        let area = face.area();
        total_area += area;
        center_accum += face.center().coords * area;
        normal_accum += face.normal() * area;

        for corner in [&face.a, &face.b, &face.c] {
            group_min.x = group_min.x.min(corner.x);
            group_min.y = group_min.y.min(corner.y);
            group_min.z = group_min.z.min(corner.z);
            group_max.x = group_max.x.max(corner.x);
            group_max.y = group_max.y.max(corner.y);
            group_max.z = group_max.z.max(corner.z);
        }
    }

    if total_area <= 0.0 {
        warn!(
            site = group.site,
            faces = group.face_count(),
            "skipping zero-area fragment group"
        );
        return None;
    }

    let average_center = Point3::from(center_accum / total_area);
    let average_normal = normal_accum / total_area;
    let group_dims = group_max - group_min;

    let mut back_point = group_min + group_dims * 0.5;

    if group_dims.x < DEGENERATE_BOX_EPSILON
        || group_dims.y < DEGENERATE_BOX_EPSILON
        || group_dims.z < DEGENERATE_BOX_EPSILON
    {
        if let Some(dir) = (*anchor - average_center).try_normalize(f64::EPSILON) {
            back_point += dir * mesh_extrude;
        }
    }

    if let Some(unit_average) = average_normal.try_normalize(f64::EPSILON) {
        if (first.normal() - unit_average).norm() < COPLANAR_NORMAL_EPSILON {
            // Flat panel-like group: a thin wedge behind the average plane
            // reads better than a box-centered lump. Extrudes along the
            // unnormalized area-weighted normal, scaled to the group's own
            // box.
            let extrude =
                (group_dims.x + group_dims.y + group_dims.z) / 3.0 * EXTRUDE_FACTOR;
            back_point = average_center - average_normal * extrude;
        }
    }

    // Weld the surface faces.
    let mut welder = VertexWelder::with_capacity(epsilon, group.face_count() * 3);
    let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(group.face_count() * 3);
    let mut faces = group.faces.clone();

    for face in faces.iter_mut() {
        let normal = face.normal();
        let indices = [
            welder.resolve(face.a, mesh.vertex_uv(face.source[0]), normal),
            welder.resolve(face.b, mesh.vertex_uv(face.source[1]), normal),
            welder.resolve(face.c, mesh.vertex_uv(face.source[2]), normal),
        ];
        triangles.push(indices);
        face.welded = Some(indices);
    }

    // Close every boundary edge with a pair of opposite-winding triangles,
    // so the closure is visible from either side. Closure faces join the
    // working list but are never re-scanned for boundaries.
    let surface_count = faces.len();
    for i in 0..surface_count {
        let face = faces[i].clone();
        let [uv_a, uv_b, uv_c] = match face.welded {
            Some([ia, ib, ic]) => [welder.uv(ia), welder.uv(ib), welder.uv(ic)],
            None => continue,
        };
        let [ab, ac, bc] = face.sides(epsilon);

        if side_counts.get(&ab).copied() == Some(1) {
            close_edge(&mut welder, &mut triangles, face.b, face.a, uv_b, uv_a, back_point);
            close_edge(&mut welder, &mut triangles, face.a, face.b, uv_a, uv_b, back_point);
            faces.push(Face::synthetic(face.a, face.b, back_point));
        }
        if side_counts.get(&ac).copied() == Some(1) {
            close_edge(&mut welder, &mut triangles, face.a, face.c, uv_a, uv_c, back_point);
            close_edge(&mut welder, &mut triangles, face.c, face.a, uv_c, uv_a, back_point);
            faces.push(Face::synthetic(face.a, face.c, back_point));
        }
        if side_counts.get(&bc).copied() == Some(1) {
            close_edge(&mut welder, &mut triangles, face.c, face.b, uv_c, uv_b, back_point);
            close_edge(&mut welder, &mut triangles, face.b, face.c, uv_b, uv_c, back_point);
            faces.push(Face::synthetic(face.b, face.c, back_point));
        }
    }

    let surface_triangles = surface_count;
    let closure_triangles = triangles.len() - surface_triangles;
    let (vertices, uvs, normals) = welder.into_buffers();

    debug!(
        site = group.site,
        surface_triangles,
        closure_triangles,
        vertices = vertices.len(),
        "built fragment shell"
    );

    Some(FragmentShell {
        vertices,
        uvs,
        normals,
        triangles,
        back_point,
        site: group.site,
        surface_triangles,
        closure_triangles,
    })
}

/// Emit one closure triangle `(p, q, back)` through the weld map.
/// The apex UV is the mean of the edge endpoint UVs.
fn close_edge(
    welder: &mut VertexWelder,
    triangles: &mut Vec<[u32; 3]>,
    p: Point3<f64>,
    q: Point3<f64>,
    uv_p: [f64; 2],
    uv_q: [f64; 2],
    back: Point3<f64>,
) {
    let normal = Face::synthetic(p, q, back).normal();
    let uv_back = [(uv_p[0] + uv_q[0]) * 0.5, (uv_p[1] + uv_q[1]) * 0.5];

    let i0 = welder.resolve(p, uv_p, normal);
    let i1 = welder.resolve(q, uv_q, normal);
    let i2 = welder.resolve(back, uv_back, normal);
    triangles.push([i0, i1, i2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_shell;
    use approx::assert_relative_eq;

    /// A single triangle in the z=0 plane with UVs.
    fn single_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(0.0, 0.0, 0.0), [0.0, 0.0]));
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(1.0, 0.0, 0.0), [1.0, 0.0]));
        mesh.vertices
            .push(Vertex::with_uv(Point3::new(0.0, 1.0, 0.0), [0.0, 1.0]));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_single_triangle_closes_into_solid() {
        let mesh = single_triangle();
        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(7)).unwrap();

        // All face centers collapse onto one group.
        assert_eq!(outcome.shells.len(), 1);
        let shell = &outcome.shells[0];

        // 1 surface triangle, 3 boundary edges closed with 2 triangles each.
        assert_eq!(shell.surface_triangles, 1);
        assert_eq!(shell.closure_triangles, 6);

        let report = validate_shell(shell);
        assert!(report.is_closed, "open edges: {}", report.boundary_edge_count);
        assert!(shell.volume() > 0.0);
    }

    #[test]
    fn test_flat_group_gets_wedge_back_point() {
        let mesh = single_triangle();
        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(7)).unwrap();
        let shell = &outcome.shells[0];

        // The group is both paper-thin and coplanar; the coplanar rule runs
        // last, so the back point is fully determined by the group's own
        // box: centroid pushed behind the +z face normal.
        let extrude = (1.0 + 1.0 + 0.0) / 3.0 * EXTRUDE_FACTOR;
        assert_relative_eq!(shell.back_point.x, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(shell.back_point.y, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(shell.back_point.z, -extrude, epsilon = 1e-12);
    }

    #[test]
    fn test_closure_apex_uv_is_edge_average() {
        let mesh = single_triangle();
        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(7)).unwrap();
        let shell = &outcome.shells[0];

        // Every back-point vertex carries the mean of some edge's UVs.
        let apex_uvs: Vec<[f64; 2]> = shell
            .vertices
            .iter()
            .zip(&shell.uvs)
            .filter(|(p, _)| (*p - shell.back_point).norm() < 1e-9)
            .map(|(_, uv)| *uv)
            .collect();
        assert!(!apex_uvs.is_empty());
        for uv in apex_uvs {
            assert!(
                uv == [0.5, 0.0] || uv == [0.0, 0.5] || uv == [0.5, 0.5],
                "unexpected apex uv {:?}",
                uv
            );
        }
    }

    #[test]
    fn test_zero_area_group_is_skipped() {
        let mut mesh = Mesh::new();
        // Collinear corners: zero area, but real bounds.
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(7)).unwrap();
        assert_eq!(outcome.shell_count(), 0);
        assert_eq!(outcome.skipped_groups, 1);
        assert_eq!(outcome.groups, 1);
    }

    #[test]
    fn test_empty_mesh_is_an_error() {
        let err = fracture_mesh(&Mesh::new(), &FractureParams::default()).unwrap_err();
        assert!(matches!(err, ShatterError::EmptyMesh { .. }));
    }

    #[test]
    fn test_out_of_range_face_index_is_an_error() {
        let mut mesh = single_triangle();
        mesh.faces.push([0, 1, 9]);

        let err = fracture_mesh(&mesh, &FractureParams::default()).unwrap_err();
        assert!(matches!(
            err,
            ShatterError::InvalidVertexIndex { face: 1, index: 9, .. }
        ));
    }

    #[test]
    fn test_seeded_fracture_is_deterministic() {
        let mesh = single_triangle();
        let params = FractureParams::default().seeded(99);

        let a = fracture_mesh(&mesh, &params).unwrap();
        let b = fracture_mesh(&mesh, &params).unwrap();

        assert_eq!(a.shell_count(), b.shell_count());
        for (sa, sb) in a.shells.iter().zip(&b.shells) {
            assert_eq!(sa.back_point, sb.back_point);
            assert_eq!(sa.triangles, sb.triangles);
        }
    }

    #[test]
    fn test_shell_to_mesh_round_trip() {
        let mesh = single_triangle();
        let outcome = fracture_mesh(&mesh, &FractureParams::default().seeded(7)).unwrap();
        let shell = &outcome.shells[0];

        let as_mesh = shell.to_mesh();
        assert_eq!(as_mesh.vertex_count(), shell.vertex_count());
        assert_eq!(as_mesh.face_count(), shell.triangle_count());
        assert!(as_mesh.has_uvs());
    }
}
