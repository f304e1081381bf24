//! Nearest-site face partitioning.
//!
//! Every source triangle is assigned to the site closest to its center by
//! squared distance. This is a coarse stand-in for a Voronoi partition: only
//! triangle centers are compared (not full triangle extent) and ties break
//! by site enumeration order, so groups are neither convex nor guaranteed
//! connected when site density is low relative to mesh curvature. That is
//! the intended behavior, not an accuracy target.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::types::{Face, Mesh};

/// The set of faces assigned to one site.
#[derive(Debug, Clone)]
pub struct FragmentGroup {
    /// Index of the owning site in the site list.
    pub site: usize,
    /// Faces in source-triangle order.
    pub faces: Vec<Face>,
}

impl FragmentGroup {
    /// Number of faces in the group.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Assign every mesh triangle to its nearest site.
///
/// Returns the non-empty groups ordered by site index; sites that attract
/// no faces are absent. Every source triangle lands in exactly one group.
pub fn partition_faces(mesh: &Mesh, sites: &[Point3<f64>]) -> Vec<FragmentGroup> {
    if sites.is_empty() {
        return Vec::new();
    }

    let mut site_to_faces: HashMap<usize, Vec<Face>> = HashMap::new();

    for triangle in &mesh.faces {
        let [t0, t1, t2] = *triangle;
        let face = Face::new(
            mesh.vertices[t0 as usize].position,
            mesh.vertices[t1 as usize].position,
            mesh.vertices[t2 as usize].position,
            [t0, t1, t2],
        );

        let center = face.center();
        let mut nearest = 0;
        let mut nearest_dist = (center - sites[0]).norm_squared();

        for (index, site) in sites.iter().enumerate().skip(1) {
            let dist = (center - site).norm_squared();
            if dist < nearest_dist {
                nearest = index;
                nearest_dist = dist;
            }
        }

        site_to_faces.entry(nearest).or_default().push(face);
    }

    let mut groups: Vec<FragmentGroup> = site_to_faces
        .into_iter()
        .map(|(site, faces)| FragmentGroup { site, faces })
        .collect();
    groups.sort_by_key(|g| g.site);

    debug!(
        faces = mesh.face_count(),
        sites = sites.len(),
        groups = groups.len(),
        "partitioned faces"
    );

    groups
}
