//! Partition seed-point ("site") generation.
//!
//! Sites are a small fixed grid scaled to the mesh bounds. Faces are later
//! assigned to their nearest site, so the grid density directly controls
//! fragment granularity: a cube-ish object yields eight corner fragments,
//! a flat object (vertical extent at or below [`FLAT_HEIGHT_THRESHOLD`])
//! collapses the vertical axis to a single layer and yields four.

use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Vertical extent above which the site grid uses two vertical layers.
pub const FLAT_HEIGHT_THRESHOLD: f64 = 0.5;

/// Generate the site grid for a mesh's bounding box.
///
/// `size` in `[0, 1]` scales the grid extent as a fraction of the bounds
/// extents; out-of-range values are clamped. Sites are ordered x-major
/// (x outermost, then y, then z) and centered on the bounds center. The
/// grid is 2x1x2 or 2x2x2, so there are always at least four sites.
pub fn site_grid(bounds: (Point3<f64>, Point3<f64>), size: f64) -> Vec<Point3<f64>> {
    let (min, max) = bounds;
    let size = size.clamp(0.0, 1.0);

    let extents = (max - min) * 0.5;
    let center = min + extents;
    let scaled = extents * size;

    let nx = 2;
    let ny = if max.y - min.y > FLAT_HEIGHT_THRESHOLD {
        2
    } else {
        1
    };
    let nz = 2;

    let mut sites = Vec::with_capacity(nx * ny * nz);
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let offset = Vector3::new(
                    lerp(-scaled.x, scaled.x, axis_t(x, nx)),
                    lerp(-scaled.y, scaled.y, axis_t(y, ny)),
                    lerp(-scaled.z, scaled.z, axis_t(z, nz)),
                );
                sites.push(center + offset);
            }
        }
    }

    debug!(
        sites = sites.len(),
        layers = ny,
        size,
        "generated site grid"
    );

    sites
}

/// Interpolation parameter for sample `i` of `n` along one axis.
/// Single-sample axes sit at the axis midpoint.
#[inline]
fn axis_t(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        i as f64 / (n - 1) as f64
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
