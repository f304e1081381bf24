//! End-to-end fracture tests.
//!
//! The main scenario drives the full pipeline on a unit cube: site grid,
//! partition, shell synthesis, validation, and volume accounting.

use approx::assert_relative_eq;
use shatter_core::{validate_fracture, FractureParams, Mesh, Vertex, EXTRUDE_FACTOR};

/// Unit cube centered on the origin, 8 vertices, 12 triangles, CCW from
/// outside. The face diagonals are chosen so the 12 triangle centers cover
/// all 8 octants, which at `size = 0.2` maps every corner site to a
/// non-empty group.
fn unit_cube() -> Mesh {
    let mut mesh = Mesh::new();
    let corners = [
        [-0.5, -0.5, -0.5], // 0
        [0.5, -0.5, -0.5],  // 1
        [0.5, 0.5, -0.5],   // 2
        [-0.5, 0.5, -0.5],  // 3
        [-0.5, -0.5, 0.5],  // 4
        [0.5, -0.5, 0.5],   // 5
        [0.5, 0.5, 0.5],    // 6
        [-0.5, 0.5, 0.5],   // 7
    ];
    for [x, y, z] in corners {
        mesh.vertices.push(Vertex::with_uv(
            nalgebra::Point3::new(x, y, z),
            [x + 0.5, z + 0.5],
        ));
    }
    for face in [
        [0, 3, 2], // bottom
        [0, 2, 1],
        [4, 5, 7], // top
        [5, 6, 7],
        [0, 1, 5], // front
        [0, 5, 4],
        [3, 7, 6], // back
        [3, 6, 2],
        [0, 4, 3], // left
        [4, 7, 3],
        [1, 2, 6], // right
        [1, 6, 5],
    ] {
        mesh.faces.push(face);
    }
    mesh
}

#[test]
fn unit_cube_fractures_into_eight_closed_fragments() {
    let mesh = unit_cube();
    let outcome = mesh
        .fracture(&FractureParams::with_size(0.2).seeded(42))
        .unwrap();

    assert_eq!(outcome.sites.len(), 8);
    assert_eq!(outcome.groups, 8);
    assert_eq!(outcome.skipped_groups, 0);
    assert_eq!(outcome.shell_count(), 8);

    // One shell per site, sites all distinct.
    let mut sites: Vec<usize> = outcome.shells.iter().map(|s| s.site).collect();
    sites.dedup();
    assert_eq!(sites.len(), 8);

    // Every source triangle survives into exactly one shell.
    let surface_total: usize = outcome.shells.iter().map(|s| s.surface_triangles).sum();
    assert_eq!(surface_total, mesh.face_count());

    // Every shell is watertight and weld-clean.
    let report = validate_fracture(&outcome.shells);
    assert!(report.is_clean());

    for shell in &outcome.shells {
        assert!(shell.volume() > 0.0, "site {} has no volume", shell.site);
        assert!(shell.closure_triangles > 0);
    }
}

#[test]
fn unit_cube_fragment_volumes_are_deterministic() {
    // At this grid scale the cube splits into four two-face corner groups
    // (closed against the cube center, 1/6 each) and four single-face
    // corner groups (thin wedges behind the face plane). Both back-point
    // paths are independent of the anchor jitter, so the total is exact.
    let wedge_height = (1.0 + 1.0 + 0.0) / 3.0 * EXTRUDE_FACTOR;
    let wedge_volume = 0.5 * wedge_height / 3.0;
    let expected = 4.0 * (1.0 / 6.0) + 4.0 * wedge_volume;

    for seed in [1, 7, 1234] {
        let outcome = unit_cube()
            .fracture(&FractureParams::with_size(0.2).seeded(seed))
            .unwrap();
        assert_relative_eq!(outcome.total_volume(), expected, epsilon = 1e-9);
    }
}

#[test]
fn flat_mesh_uses_a_single_site_layer() {
    let mut mesh = unit_cube();
    // Squash to 0.4 units tall: vertical extent <= 0.5 halves the grid.
    for vertex in &mut mesh.vertices {
        vertex.position.y *= 0.4;
    }

    let outcome = mesh
        .fracture(&FractureParams::with_size(0.2).seeded(42))
        .unwrap();
    assert_eq!(outcome.sites.len(), 4);

    let report = validate_fracture(&outcome.shells);
    assert!(report.is_clean());

    let surface_total: usize = outcome.shells.iter().map(|s| s.surface_triangles).sum();
    assert_eq!(surface_total, mesh.face_count());
}

#[test]
fn fracture_then_export_round_trips() {
    let outcome = unit_cube()
        .fracture(&FractureParams::with_size(0.2).seeded(42))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    for (i, shell) in outcome.shells.iter().enumerate() {
        let path = dir.path().join(format!("fragment_{i:03}.obj"));
        shell.to_mesh().save(&path).unwrap();

        let loaded = Mesh::load(&path).unwrap();
        assert_eq!(loaded.vertex_count(), shell.vertex_count());
        assert_eq!(loaded.face_count(), shell.triangle_count());
        assert!(loaded.has_uvs());
    }
}

#[test]
fn larger_grid_size_still_covers_every_triangle() {
    for size in [0.0, 0.5, 1.0] {
        let outcome = unit_cube()
            .fracture(&FractureParams::with_size(size).seeded(9))
            .unwrap();
        let surface_total: usize = outcome.shells.iter().map(|s| s.surface_triangles).sum();
        assert_eq!(surface_total, 12);
        assert!(validate_fracture(&outcome.shells).is_clean());
    }
}
