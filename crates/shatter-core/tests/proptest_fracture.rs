//! Property-based tests for the fracture pipeline.
//!
//! Fractures randomly sized and positioned boxes and checks the invariants
//! that must hold for any closed input: partition completeness, shell
//! closure, and weld uniqueness.
//!
//! Run with: cargo test -p shatter-core -- proptest

use proptest::prelude::*;
use shatter_core::{
    partition_faces, site_grid, validate_fracture, FractureParams, Mesh, Vertex,
};

/// Axis-aligned box mesh from `min` with the given side lengths.
fn box_mesh(min: [f64; 3], size: [f64; 3]) -> Mesh {
    let [x, y, z] = min;
    let [sx, sy, sz] = size;
    let mut mesh = Mesh::new();
    for (dx, dy, dz) in [
        (0.0, 0.0, 0.0),
        (sx, 0.0, 0.0),
        (sx, sy, 0.0),
        (0.0, sy, 0.0),
        (0.0, 0.0, sz),
        (sx, 0.0, sz),
        (sx, sy, sz),
        (0.0, sy, sz),
    ] {
        mesh.vertices.push(Vertex::with_uv(
            nalgebra::Point3::new(x + dx, y + dy, z + dz),
            [dx / sx, dz / sz],
        ));
    }
    for face in [
        [0, 3, 2],
        [0, 2, 1],
        [4, 5, 7],
        [5, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 3],
        [4, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ] {
        mesh.faces.push(face);
    }
    mesh
}

fn arb_box() -> impl Strategy<Value = Mesh> {
    (
        prop::array::uniform3(-10.0..10.0f64),
        prop::array::uniform3(0.1..5.0f64),
    )
        .prop_map(|(min, size)| box_mesh(min, size))
}

proptest! {
    #[test]
    fn partition_assigns_every_face_exactly_once(
        mesh in arb_box(),
        size in 0.0..1.0f64,
    ) {
        let bounds = mesh.bounds().unwrap();
        let sites = site_grid(bounds, size);
        let groups = partition_faces(&mesh, &sites);

        let total: usize = groups.iter().map(|g| g.face_count()).sum();
        prop_assert_eq!(total, mesh.face_count());

        // Groups are keyed by distinct sites.
        let mut seen = std::collections::HashSet::new();
        for group in &groups {
            prop_assert!(seen.insert(group.site));
            prop_assert!(group.site < sites.len());
            prop_assert!(!group.faces.is_empty());
        }
    }

    #[test]
    fn site_count_follows_the_height_rule(
        mesh in arb_box(),
        size in 0.0..1.0f64,
    ) {
        let bounds = mesh.bounds().unwrap();
        let sites = site_grid(bounds, size);
        let height = bounds.1.y - bounds.0.y;

        if height > 0.5 {
            prop_assert_eq!(sites.len(), 8);
        } else {
            prop_assert_eq!(sites.len(), 4);
        }
    }

    #[test]
    fn fractured_boxes_produce_closed_weld_clean_shells(
        mesh in arb_box(),
        size in 0.0..1.0f64,
        seed in any::<u64>(),
    ) {
        let params = FractureParams { size, seed: Some(seed), ..Default::default() };
        let outcome = mesh.fracture(&params).unwrap();

        // A closed box never produces zero-area groups.
        prop_assert_eq!(outcome.skipped_groups, 0);

        let surface_total: usize =
            outcome.shells.iter().map(|s| s.surface_triangles).sum();
        prop_assert_eq!(surface_total, mesh.face_count());

        let report = validate_fracture(&outcome.shells);
        for shell_report in &report.shells {
            prop_assert!(
                shell_report.is_closed,
                "site {} left {} open edges",
                shell_report.site,
                shell_report.boundary_edge_count
            );
            prop_assert_eq!(shell_report.duplicate_vertex_count, 0);
        }

        for shell in &outcome.shells {
            prop_assert!(shell.volume() >= 0.0);
        }
    }
}
