//! Fragment generation for runtime mesh shattering.
//!
//! This crate partitions a solid triangle mesh into a small set of
//! watertight "fragment" shells that a physics simulation can drive
//! independently, giving a plausible shattering effect without
//! per-triangle fracture or pre-authored fragment art.
//!
//! # Pipeline
//!
//! 1. **Sites**: a small fixed grid of seed points (2x{1,2}x2) scaled to
//!    the mesh bounds ([`site_grid`]).
//! 2. **Partition**: every triangle goes to its nearest site by squared
//!    center distance ([`partition_faces`]). This approximates a Voronoi
//!    partition; it compares centers only and breaks ties by enumeration
//!    order.
//! 3. **Shells**: per group, open edges are detected by edge-adjacency
//!    counting and closed against a synthetic interior back point, with
//!    vertices welded on (position, uv, normal) ([`fracture_mesh`]).
//!
//! The construction is synchronous, single-threaded, and CPU-bound; it
//! runs to completion before returning. Degenerate input (zero-area
//! groups, zero-extent bounds) degrades to fewer fragments, never to a
//! panic.
//!
//! # Quick start
//!
//! ```no_run
//! use shatter_core::{FractureParams, Mesh};
//!
//! let mesh = Mesh::load("crate.obj").unwrap();
//! let outcome = mesh.fracture(&FractureParams::default()).unwrap();
//!
//! for (i, shell) in outcome.shells.iter().enumerate() {
//!     println!("fragment {}: {} triangles", i, shell.triangle_count());
//!     shell.to_mesh().save(format!("fragment_{i:03}.obj")).unwrap();
//! }
//! ```
//!
//! # Units and coordinates
//!
//! Right-handed, y-up, unit-agnostic, except that two thresholds are
//! expressed in absolute units and tuned for roughly meter-scale objects:
//! the 0.5 flat-object height cutoff ([`sites::FLAT_HEIGHT_THRESHOLD`])
//! and the 0.01 paper-thin group cutoff
//! ([`shell::DEGENERATE_BOX_EPSILON`]). Rescale inputs accordingly.
//!
//! # Logging
//!
//! All operations emit `tracing` events; see [`tracing_ext`] for the
//! timing helpers. Set `RUST_LOG=shatter_core=debug` for per-group detail.

mod error;
mod types;
mod weld;

pub mod io;
pub mod measure;
pub mod partition;
pub mod shell;
pub mod sites;
pub mod tracing_ext;
pub mod validate;

// Re-export core types at crate root.
pub use error::{ErrorCode, ShatterError, ShatterResult};
pub use types::{Face, Mesh, Side, Vertex};
pub use weld::{VertexWelder, DEFAULT_WELD_EPSILON};

// Re-export the pipeline surface.
pub use measure::{dimensions, surface_area, volume, Dimensions};
pub use partition::{partition_faces, FragmentGroup};
pub use shell::{
    fracture_mesh, FractureOutcome, FractureParams, FragmentShell, COPLANAR_NORMAL_EPSILON,
    DEGENERATE_BOX_EPSILON, EXTRUDE_FACTOR,
};
pub use sites::{site_grid, FLAT_HEIGHT_THRESHOLD};
pub use tracing_ext::{log_fracture_outcome, log_mesh_stats, OperationTimer};
pub use validate::{validate_fracture, validate_shell, FractureReport, ShellReport};

// Convenience methods on Mesh.
impl Mesh {
    /// Load a mesh from an OBJ file.
    pub fn load(path: impl AsRef<std::path::Path>) -> ShatterResult<Self> {
        io::load_obj(path.as_ref())
    }

    /// Save the mesh to an OBJ file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> ShatterResult<()> {
        io::save_obj(self, path.as_ref())
    }

    /// Fracture the mesh into closed fragment shells.
    pub fn fracture(&self, params: &FractureParams) -> ShatterResult<FractureOutcome> {
        shell::fracture_mesh(self, params)
    }

    /// Estimate the enclosed volume (assumes a closed surface).
    pub fn volume(&self) -> f64 {
        measure::volume(self)
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        measure::surface_area(self)
    }

    /// Bounding-box dimensions.
    pub fn dimensions(&self) -> Dimensions {
        measure::dimensions(self)
    }
}
